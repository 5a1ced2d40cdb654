// ============================================================================
// NEWS SERVICE - live news with placeholder fallback
// ============================================================================

use chrono::{DateTime, Utc};

use crate::config::FetchFailurePolicy;
use crate::error::MarketDataError;
use crate::models::{placeholder_news, MarketauxResponse, NewsArticle};
use crate::services::marketaux::MarketauxClient;

#[derive(Clone)]
pub struct NewsService {
    client: MarketauxClient,
    policy: FetchFailurePolicy,
}

impl NewsService {
    pub fn new(client: MarketauxClient, policy: FetchFailurePolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> FetchFailurePolicy {
        self.policy
    }

    /// Articles for `filter`. Without a Marketaux key the built-in articles
    /// are served; fetch failures follow the configured policy.
    pub async fn market_news(&self, filter: &str, now: DateTime<Utc>) -> Result<Vec<NewsArticle>, MarketDataError> {
        if !self.client.has_api_key() {
            log::info!("📰 No news API key configured, serving built-in articles");
            return Ok(placeholder_news(now));
        }

        let result = self.client.market_news(filter).await.map(normalize);
        self.policy
            .resolve(result, "Market news", || placeholder_news(now))
    }
}

/// Marketaux articles as the news pages consume them.
pub fn normalize(response: MarketauxResponse) -> Vec<NewsArticle> {
    response.data.into_iter().map(NewsArticle::from).collect()
}
