// ============================================================================
// USER STORE - current session user + per-user settings (persisted)
// ============================================================================
// No validation: the auth session provider is the only writer of `user`.
// The persisted copy is provisional until the provider's first publish.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::models::{SessionUser, UserSettings, UserSettingsPatch};
use crate::state::{ReactiveState, SubscriptionId};
use crate::utils::constants::STORAGE_KEY_USER;
use crate::utils::storage::{load_from_storage, save_to_storage, KeyValueStorage};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserState {
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default)]
    pub settings: UserSettings,
}

#[derive(Clone)]
pub struct UserStore {
    state: ReactiveState<UserState>,
    storage: Rc<dyn KeyValueStorage>,
    provisional: Rc<Cell<bool>>,
}

impl UserStore {
    /// Hydrates from the persisted copy when there is one.
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        match load_from_storage::<UserState>(storage.as_ref(), STORAGE_KEY_USER) {
            Some(persisted) => {
                log::info!("💾 Restored user store (provisional)");
                Self::build(storage, persisted, true)
            }
            None => Self::build(storage, UserState::default(), false),
        }
    }

    /// Starts from `initial` without reading storage.
    pub fn with_state(storage: Rc<dyn KeyValueStorage>, initial: UserState) -> Self {
        Self::build(storage, initial, false)
    }

    fn build(storage: Rc<dyn KeyValueStorage>, initial: UserState, provisional: bool) -> Self {
        Self {
            state: ReactiveState::new(initial),
            storage,
            provisional: Rc::new(Cell::new(provisional)),
        }
    }

    pub fn state(&self) -> UserState {
        self.state.get()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.state.with(|s| s.user.clone())
    }

    pub fn settings(&self) -> UserSettings {
        self.state.with(|s| s.settings.clone())
    }

    /// True while the state is the persisted copy and no session has been
    /// published yet.
    pub fn is_provisional(&self) -> bool {
        self.provisional.get()
    }

    pub fn set_user(&self, user: SessionUser) -> UserState {
        self.provisional.set(false);
        self.commit(|s| s.user = Some(user))
    }

    pub fn clear_user(&self) -> UserState {
        self.provisional.set(false);
        self.commit(|s| s.user = None)
    }

    pub fn update_settings(&self, patch: UserSettingsPatch) -> UserState {
        self.commit(|s| s.settings = s.settings.apply(&patch))
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&UserState) + 'static,
    {
        self.state.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.state.unsubscribe(id);
    }

    fn commit(&self, mutate: impl FnOnce(&mut UserState)) -> UserState {
        let mut next = self.state.get();
        mutate(&mut next);
        // Persist before notifying so subscribers observe the stored value
        if let Err(e) = save_to_storage(self.storage.as_ref(), STORAGE_KEY_USER, &next) {
            log::error!("❌ Could not persist user store: {}", e);
        }
        self.state.set(next)
    }
}
