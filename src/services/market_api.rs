// ============================================================================
// MARKET API - the project's own backend (overview, price target)
// ============================================================================

use async_trait::async_trait;
use reqwest::Url;

use crate::config::MarketConfig;
use crate::error::MarketDataError;
use crate::models::{PriceTarget, StockOverview};
use crate::services::api_client::ApiClient;
use crate::utils::format::normalize_ticker;

const PROVIDER: &str = "Market API";

/// Per-ticker insights served by the project backend.
#[async_trait(?Send)]
pub trait MarketInsights {
    async fn stock_overview(&self, ticker: &str) -> Result<StockOverview, MarketDataError>;

    async fn price_target(&self, ticker: &str) -> Result<PriceTarget, MarketDataError>;
}

#[derive(Clone)]
pub struct MarketApi {
    api: ApiClient,
    base_url: String,
}

impl MarketApi {
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            api: ApiClient::new(PROVIDER),
            base_url: config.api_base_url.clone(),
        }
    }

    pub fn overview_url(&self, ticker: &str) -> Result<Url, MarketDataError> {
        self.ticker_url(ticker, "overview")
    }

    pub fn price_target_url(&self, ticker: &str) -> Result<Url, MarketDataError> {
        self.ticker_url(ticker, "price-target")
    }

    /// `/stocks/{TICKER}/{resource}` with the ticker normalized and escaped
    /// as one path segment.
    fn ticker_url(&self, ticker: &str, resource: &str) -> Result<Url, MarketDataError> {
        let ticker = normalize_ticker(ticker)
            .ok_or_else(|| MarketDataError::Url(format!("empty ticker for /stocks/{}", resource)))?;
        self.api
            .build_segment_url(&self.base_url, &["stocks", &ticker, resource], &[])
    }
}

#[async_trait(?Send)]
impl MarketInsights for MarketApi {
    async fn stock_overview(&self, ticker: &str) -> Result<StockOverview, MarketDataError> {
        let url = self.overview_url(ticker)?;
        self.api.get_json(url).await
    }

    async fn price_target(&self, ticker: &str) -> Result<PriceTarget, MarketDataError> {
        let url = self.price_target_url(ticker)?;
        self.api.get_json(url).await
    }
}
