// Shared utilities

pub mod constants;
pub mod format;
pub mod storage;

pub use constants::*;
pub use storage::{load_from_storage, remove_from_storage, save_to_storage, KeyValueStorage, MemoryStorage};

#[cfg(target_arch = "wasm32")]
pub use storage::BrowserStorage;
