// ============================================================================
// SETTINGS STORE - display preferences (persisted on every mutation)
// ============================================================================

use std::rc::Rc;

use crate::models::{ChartType, Preferences, Theme};
use crate::state::{ReactiveState, SubscriptionId};
use crate::utils::constants::STORAGE_KEY_SETTINGS;
use crate::utils::storage::{load_from_storage, save_to_storage, KeyValueStorage};

#[derive(Clone)]
pub struct SettingsStore {
    state: ReactiveState<Preferences>,
    storage: Rc<dyn KeyValueStorage>,
}

impl SettingsStore {
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        let preferences = load_from_storage::<Preferences>(storage.as_ref(), STORAGE_KEY_SETTINGS)
            .unwrap_or_default();
        Self::with_preferences(storage, preferences)
    }

    pub fn with_preferences(storage: Rc<dyn KeyValueStorage>, preferences: Preferences) -> Self {
        Self {
            state: ReactiveState::new(preferences),
            storage,
        }
    }

    pub fn preferences(&self) -> Preferences {
        self.state.get()
    }

    pub fn set_theme(&self, theme: Theme) -> Preferences {
        self.commit(|p| p.theme = theme)
    }

    pub fn set_chart_type(&self, chart_type: ChartType) -> Preferences {
        self.commit(|p| p.chart_type = chart_type)
    }

    pub fn set_show_volume(&self, show_volume: bool) -> Preferences {
        self.commit(|p| p.show_volume = show_volume)
    }

    pub fn set_accent_color(&self, accent_color: impl Into<String>) -> Preferences {
        let accent_color = accent_color.into();
        self.commit(|p| p.accent_color = accent_color)
    }

    pub fn set_compact_mode(&self, compact_mode: bool) -> Preferences {
        self.commit(|p| p.compact_mode = compact_mode)
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Preferences) + 'static,
    {
        self.state.subscribe(callback)
    }

    fn commit(&self, mutate: impl FnOnce(&mut Preferences)) -> Preferences {
        let mut next = self.state.get();
        mutate(&mut next);
        if let Err(e) = save_to_storage(self.storage.as_ref(), STORAGE_KEY_SETTINGS, &next) {
            log::error!("❌ Could not persist settings: {}", e);
        }
        self.state.set(next)
    }
}
