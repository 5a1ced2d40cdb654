// ============================================================================
// MARKETAUX - financial news
// ============================================================================

use reqwest::Url;

use crate::config::MarketConfig;
use crate::error::MarketDataError;
use crate::models::MarketauxResponse;
use crate::services::api_client::ApiClient;

const PROVIDER: &str = "Marketaux";

/// Extra query parameter derived from a news filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsQuery {
    Unfiltered,
    Industries(&'static str),
    Search(String),
}

impl NewsQuery {
    /// `general`/`all` fetch top news; crypto and forex have no Marketaux
    /// industry of their own and approximate to financial services.
    pub fn from_filter(filter: &str) -> Self {
        match filter.trim().to_lowercase().as_str() {
            "" | "general" | "all" => NewsQuery::Unfiltered,
            "crypto" | "forex" => NewsQuery::Industries("Financial Services"),
            other => NewsQuery::Search(other.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct MarketauxClient {
    api: ApiClient,
    base_url: String,
    api_key: Option<String>,
}

impl MarketauxClient {
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            api: ApiClient::new(PROVIDER),
            base_url: config.marketaux_base_url.clone(),
            api_key: config.marketaux_api_key.clone(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn news_url(&self, filter: &str) -> Result<Url, MarketDataError> {
        let token = self
            .api_key
            .as_deref()
            .ok_or(MarketDataError::MissingApiKey { provider: PROVIDER })?;

        let news_query = NewsQuery::from_filter(filter);
        let mut query = vec![("language", "en"), ("api_token", token)];
        match &news_query {
            NewsQuery::Unfiltered => {}
            NewsQuery::Industries(industries) => query.push(("industries", *industries)),
            NewsQuery::Search(term) => query.push(("search", term.as_str())),
        }
        self.api.build_url(&self.base_url, "/news/all", &query)
    }

    pub async fn market_news(&self, filter: &str) -> Result<MarketauxResponse, MarketDataError> {
        let url = self.news_url(filter)?;
        self.api.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MarketauxClient {
        MarketauxClient::new(&MarketConfig {
            marketaux_api_key: Some("k".to_string()),
            ..MarketConfig::default()
        })
    }

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs().into_owned().collect()
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn general_news_has_no_filter() {
        let url = client().news_url("general").unwrap();
        assert_eq!(url.path(), "/v1/news/all");
        assert_eq!(pairs(&url), vec![pair("language", "en"), pair("api_token", "k")]);
        assert_eq!(pairs(&client().news_url("all").unwrap()).len(), 2);
    }

    #[test]
    fn crypto_and_forex_map_to_financial_services() {
        for filter in ["crypto", "forex"] {
            let url = client().news_url(filter).unwrap();
            assert_eq!(pairs(&url)[2], pair("industries", "Financial Services"));
        }
    }

    #[test]
    fn other_filters_become_search_terms() {
        let url = client().news_url("tech").unwrap();
        assert_eq!(pairs(&url)[2], pair("search", "tech"));
    }

    #[test]
    fn unconfigured_client_reports_missing_key() {
        let client = MarketauxClient::new(&MarketConfig::default());
        assert!(!client.has_api_key());
        assert!(matches!(
            client.news_url("general"),
            Err(MarketDataError::MissingApiKey { .. })
        ));
    }
}
