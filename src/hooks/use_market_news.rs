// ============================================================================
// MARKET NEWS HOOK - category tabs, search and the article modal
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures::future::{AbortHandle, Abortable};

use crate::models::{category_filter, NewsArticle};
use crate::services::NewsService;
use crate::state::{ReactiveState, SubscriptionId};
use crate::stores::{UiStore, MODAL_NEWS};

#[derive(Debug, Clone, PartialEq)]
pub struct MarketNewsState {
    pub category: String,
    pub articles: Vec<NewsArticle>,
    pub selected: Option<NewsArticle>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for MarketNewsState {
    fn default() -> Self {
        Self {
            category: "All".to_string(),
            articles: Vec::new(),
            selected: None,
            loading: false,
            error: None,
        }
    }
}

#[derive(Clone)]
pub struct MarketNewsHook {
    news: NewsService,
    ui: UiStore,
    state: ReactiveState<MarketNewsState>,
    in_flight: Rc<RefCell<Option<AbortHandle>>>,
}

impl MarketNewsHook {
    pub fn new(news: NewsService, ui: UiStore) -> Self {
        Self {
            news,
            ui,
            state: ReactiveState::default(),
            in_flight: Rc::new(RefCell::new(None)),
        }
    }

    pub fn state(&self) -> MarketNewsState {
        self.state.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&MarketNewsState) + 'static,
    {
        self.state.subscribe(callback)
    }

    /// Loads the tab `category` (`All`, `Crypto`, ...). Supersedes any
    /// pending load.
    pub async fn load(&self, category: &str, now: DateTime<Utc>) -> MarketNewsState {
        self.teardown();
        let (handle, registration) = AbortHandle::new_pair();
        *self.in_flight.borrow_mut() = Some(handle);

        self.state.update(|s| {
            s.category = category.to_string();
            s.loading = true;
            s.error = None;
        });

        let filter = category_filter(category);
        let result = match Abortable::new(self.news.market_news(&filter, now), registration).await {
            Ok(result) => result,
            Err(_) => return self.state.get(),
        };
        self.in_flight.borrow_mut().take();

        match result {
            Ok(articles) => {
                log::info!("📰 {} articles for {}", articles.len(), category);
                self.state.update(|s| {
                    s.articles = articles;
                    s.loading = false;
                })
            }
            Err(e) => self.state.update(|s| {
                s.articles = Vec::new();
                s.loading = false;
                s.error = Some(e.to_string());
            }),
        }
    }

    /// Loaded articles whose title or description contain `query`.
    pub fn filtered(&self, query: &str) -> Vec<NewsArticle> {
        self.state.with(|s| {
            s.articles
                .iter()
                .filter(|article| article.matches(query))
                .cloned()
                .collect()
        })
    }

    pub fn select_article(&self, article: NewsArticle) {
        self.state.update(|s| s.selected = Some(article));
        self.ui.open_modal(MODAL_NEWS);
    }

    pub fn close_article(&self) {
        self.state.update(|s| s.selected = None);
        if self.ui.is_modal_open(MODAL_NEWS) {
            self.ui.close_modal();
        }
    }

    pub fn teardown(&self) {
        if let Some(handle) = self.in_flight.borrow_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FetchFailurePolicy, MarketConfig};
    use crate::services::MarketauxClient;

    fn hook(ui: UiStore) -> MarketNewsHook {
        let news = NewsService::new(
            MarketauxClient::new(&MarketConfig::default()),
            FetchFailurePolicy::Fallback,
        );
        MarketNewsHook::new(news, ui)
    }

    #[tokio::test]
    async fn loads_built_in_articles_and_filters() {
        let hook = hook(UiStore::new());
        let state = hook.load("Crypto", Utc::now()).await;
        assert_eq!(state.category, "Crypto");
        assert_eq!(state.articles.len(), 6);
        assert!(!state.loading);

        let hits = hook.filtered("tesla");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, "Reuters");
    }

    #[tokio::test]
    async fn selecting_an_article_opens_the_news_modal() {
        let ui = UiStore::new();
        let hook = hook(ui.clone());
        let state = hook.load("All", Utc::now()).await;

        hook.select_article(state.articles[0].clone());
        assert!(ui.is_modal_open(MODAL_NEWS));
        assert_eq!(hook.state().selected.map(|a| a.uuid), Some("1".to_string()));

        hook.close_article();
        assert_eq!(ui.state().active_modal, None);
        assert!(hook.state().selected.is_none());
    }
}
