// ============================================================================
// FINALYTICS CLIENT - session, preferences, watchlist and market data
// ============================================================================
// - Models: wire and domain records
// - Services: identity, documents and market-data endpoints (HTTP only)
// - Stores: persisted / in-memory state containers
// - Hooks: stateful controllers over stores + services
// - App: explicit context wiring everything together
// ============================================================================

pub mod app;
pub mod config;
pub mod error;
pub mod hooks;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod stores;
pub mod utils;

pub use app::AppContext;
pub use config::{AppConfig, FetchFailurePolicy};
pub use error::{AuthError, DocumentError, MarketDataError, StorageError};

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use futures::future::AbortHandle;
    use wasm_bindgen::prelude::*;

    use crate::app::AppContext;
    use crate::config::CONFIG;
    use crate::services::{FirebaseAuth, Firestore};
    use crate::utils::storage::{BrowserStorage, KeyValueStorage};

    // The running context plus the handle that stops the session listener
    thread_local! {
        static APP: RefCell<Option<(AppContext, AbortHandle)>> = RefCell::new(None);
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if CONFIG.is_logging_enabled() {
            wasm_logger::init(wasm_logger::Config::default());
        }
        log::info!("🚀 Finalytics client starting");

        let config = CONFIG.clone();
        let storage: Rc<dyn KeyValueStorage> = Rc::new(BrowserStorage);
        let auth = Rc::new(FirebaseAuth::new(config.firebase.clone(), storage.clone()));
        let firestore = Rc::new(Firestore::new(&config.firebase, auth.clone()));
        let context = AppContext::new(config, storage, auth, firestore);

        context.follow_user_changes(|sync| wasm_bindgen_futures::spawn_local(sync));

        // The persisted user is shown right away; sync its watchlist too
        if context.user_store.user().is_some() {
            let watchlist_context = context.clone();
            wasm_bindgen_futures::spawn_local(async move {
                watchlist_context.refresh_watchlist().await;
            });
        }

        let (handle, registration) = AbortHandle::new_pair();
        let provider = context.auth.clone();
        wasm_bindgen_futures::spawn_local(async move {
            provider.run(registration).await;
        });

        APP.with(|cell| *cell.borrow_mut() = Some((context, handle)));
        Ok(())
    }

    /// Stops the session listener and cancels pending fetches.
    #[wasm_bindgen]
    pub fn stop() {
        APP.with(|cell| {
            if let Some((context, handle)) = cell.borrow_mut().take() {
                handle.abort();
                context.teardown();
                log::info!("🛑 Finalytics client stopped");
            }
        });
    }

    /// Runs `f` against the live context, if started.
    pub fn with_app<R>(f: impl FnOnce(&AppContext) -> R) -> Option<R> {
        APP.with(|cell| cell.borrow().as_ref().map(|(context, _)| f(context)))
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{stop, with_app};
