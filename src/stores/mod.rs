// ============================================================================
// STORES - explicit, context-passed state containers
// ============================================================================

pub mod settings_store;
pub mod ui_store;
pub mod user_store;

pub use settings_store::SettingsStore;
pub use ui_store::{UiState, UiStore, MODAL_LOGOUT, MODAL_NEWS};
pub use user_store::{UserState, UserStore};
