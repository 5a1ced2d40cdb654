// ============================================================================
// REACTIVITY - shared value + change subscribers
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Callback<T> = Rc<dyn Fn(&T)>;

/// Handle returned by [`ReactiveState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Reactive value with change notifications.
///
/// Clones share both the value and the subscriber list.
pub struct ReactiveState<T> {
    value: Rc<RefCell<T>>,
    subscribers: Rc<RefCell<Vec<(SubscriptionId, Callback<T>)>>>,
    next_id: Rc<Cell<u64>>,
}

impl<T: Clone> ReactiveState<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Reads the value without cloning it.
    pub fn with<R>(&self, reader: impl FnOnce(&T) -> R) -> R {
        reader(&self.value.borrow())
    }

    /// Replaces the value, notifies subscribers and returns the new value.
    pub fn set(&self, new_value: T) -> T {
        *self.value.borrow_mut() = new_value;
        self.notify()
    }

    /// Mutates the value in place, notifies subscribers and returns the new value.
    pub fn update<F>(&self, updater: F) -> T
    where
        F: FnOnce(&mut T),
    {
        updater(&mut self.value.borrow_mut());
        self.notify()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().retain(|(sub_id, _)| *sub_id != id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn notify(&self) -> T {
        let snapshot = self.get();
        // Callbacks may read this state or (un)subscribe, so no borrow is held while they run
        let callbacks: Vec<Callback<T>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback(&snapshot);
        }
        snapshot
    }
}

impl<T> Clone for ReactiveState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            subscribers: self.subscribers.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<T: Clone + Default> Default for ReactiveState<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_subscribers_with_new_value() {
        let state = ReactiveState::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        state.subscribe(move |v| sink.borrow_mut().push(*v));

        state.set(2);
        state.update(|v| *v += 3);

        assert_eq!(*seen.borrow(), vec![2, 5]);
        assert_eq!(state.get(), 5);
    }

    #[test]
    fn unsubscribed_callbacks_stop_firing() {
        let state = ReactiveState::new(0);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = state.subscribe(move |_| counter.set(counter.get() + 1));

        state.set(1);
        state.unsubscribe(id);
        state.set(2);

        assert_eq!(hits.get(), 1);
        assert_eq!(state.subscriber_count(), 0);
    }

    #[test]
    fn callbacks_can_read_the_state() {
        let state = ReactiveState::new(String::from("a"));
        let reader = state.clone();
        let seen = Rc::new(RefCell::new(String::new()));
        let sink = seen.clone();
        state.subscribe(move |_| *sink.borrow_mut() = reader.get());

        state.set("b".to_string());
        assert_eq!(*seen.borrow(), "b");
    }
}
