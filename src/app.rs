// ============================================================================
// APP CONTEXT - every store, hook and client, wired explicitly
// ============================================================================
// Built once by the host and passed down. Nothing here reads globals.
// ============================================================================

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::config::AppConfig;
use crate::hooks::{AuthSessionProvider, ComparisonHook, MarketNewsHook, StockDataHook, WatchlistHook};
use crate::routes::{guard, Route, RouteDecision};
use crate::services::{
    DocumentStore, FinnhubClient, FmpClient, IdentityProvider, MarketApi, MarketauxClient, NewsService,
};
use crate::state::SubscriptionId;
use crate::stores::{SettingsStore, UiStore, UserStore};
use crate::utils::storage::KeyValueStorage;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub user_store: UserStore,
    pub settings_store: SettingsStore,
    pub ui_store: UiStore,
    pub auth: AuthSessionProvider,
    pub watchlist: WatchlistHook,
    pub stock_data: StockDataHook,
    pub market_news: MarketNewsHook,
    pub comparison: ComparisonHook,
    pub market_api: Rc<MarketApi>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        storage: Rc<dyn KeyValueStorage>,
        identity: Rc<dyn IdentityProvider>,
        documents: Rc<dyn DocumentStore>,
    ) -> Self {
        let policy = config.on_fetch_failure;
        let user_store = UserStore::new(storage.clone());
        let settings_store = SettingsStore::new(storage);
        let ui_store = UiStore::new();

        let auth = AuthSessionProvider::new(identity, documents.clone(), user_store.clone());
        let watchlist = WatchlistHook::new(documents);

        let market = &config.market;
        let market_api = Rc::new(MarketApi::new(market));
        let stock_data = StockDataHook::new(
            FinnhubClient::new(market),
            FmpClient::new(market),
            market_api.clone(),
            policy,
        );
        let news = NewsService::new(MarketauxClient::new(market), policy);
        let market_news = MarketNewsHook::new(news, ui_store.clone());
        let comparison = ComparisonHook::new(market_api.clone(), policy);

        log::info!("🧩 App context ready (fetch failures: {:?})", policy);

        Self {
            config,
            user_store,
            settings_store,
            ui_store,
            auth,
            watchlist,
            stock_data,
            market_news,
            comparison,
            market_api,
        }
    }

    /// Re-syncs the watchlist against the current user.
    pub async fn refresh_watchlist(&self) {
        self.watchlist.sync_user(self.user_store.user()).await;
    }

    /// Keeps the watchlist following the signed-in user. Each time the
    /// store's user changes identity, `spawn` receives the sync to run.
    pub fn follow_user_changes<S>(&self, spawn: S) -> SubscriptionId
    where
        S: Fn(LocalBoxFuture<'static, ()>) + 'static,
    {
        let watchlist = self.watchlist.clone();
        self.user_store.subscribe(move |state| {
            if !watchlist.needs_sync(state.user.as_ref()) {
                return;
            }
            let watchlist = watchlist.clone();
            let user = state.user.clone();
            spawn(Box::pin(async move { watchlist.sync_user(user).await }));
        })
    }

    pub fn guard(&self, route: Route) -> RouteDecision {
        guard(route, self.auth.loading(), self.user_store.user().as_ref())
    }

    /// Cancels every in-flight fetch.
    pub fn teardown(&self) {
        self.watchlist.teardown();
        self.stock_data.teardown();
        self.market_news.teardown();
        self.comparison.teardown();
    }
}
