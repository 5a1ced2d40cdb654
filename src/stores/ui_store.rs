// ============================================================================
// UI STORE - sidebar + single active modal (not persisted)
// ============================================================================

use crate::state::{ReactiveState, SubscriptionId};

pub const MODAL_LOGOUT: &str = "logout";
pub const MODAL_NEWS: &str = "news";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub sidebar_open: bool,
    pub active_modal: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            active_modal: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct UiStore {
    state: ReactiveState<UiState>,
}

impl UiStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UiState {
        self.state.get()
    }

    pub fn toggle_sidebar(&self) -> UiState {
        self.state.update(|s| s.sidebar_open = !s.sidebar_open)
    }

    pub fn set_sidebar_open(&self, open: bool) -> UiState {
        self.state.update(|s| s.sidebar_open = open)
    }

    /// Replaces whichever modal was open.
    pub fn open_modal(&self, id: &str) -> UiState {
        self.state.update(|s| s.active_modal = Some(id.to_string()))
    }

    pub fn close_modal(&self) -> UiState {
        self.state.update(|s| s.active_modal = None)
    }

    pub fn is_modal_open(&self, id: &str) -> bool {
        self.state.with(|s| s.active_modal.as_deref() == Some(id))
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&UiState) + 'static,
    {
        self.state.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_sidebar_open_and_no_modal() {
        let store = UiStore::new();
        assert_eq!(store.state(), UiState { sidebar_open: true, active_modal: None });
    }

    #[test]
    fn toggles_sidebar() {
        let store = UiStore::new();
        assert!(!store.toggle_sidebar().sidebar_open);
        assert!(store.toggle_sidebar().sidebar_open);
        assert!(!store.set_sidebar_open(false).sidebar_open);
    }

    #[test]
    fn only_one_modal_is_active() {
        let store = UiStore::new();
        store.open_modal(MODAL_LOGOUT);
        store.open_modal(MODAL_NEWS);
        assert!(store.is_modal_open(MODAL_NEWS));
        assert!(!store.is_modal_open(MODAL_LOGOUT));

        store.close_modal();
        assert_eq!(store.state().active_modal, None);
    }
}
