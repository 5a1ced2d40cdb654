// ============================================================================
// FINNHUB - quotes and candles
// ============================================================================

use reqwest::Url;

use crate::config::MarketConfig;
use crate::error::MarketDataError;
use crate::models::{CandleSeries, Quote};
use crate::services::api_client::ApiClient;

const PROVIDER: &str = "Finnhub";

#[derive(Clone)]
pub struct FinnhubClient {
    api: ApiClient,
    base_url: String,
    api_key: Option<String>,
}

impl FinnhubClient {
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            api: ApiClient::new(PROVIDER),
            base_url: config.finnhub_base_url.clone(),
            api_key: config.finnhub_api_key.clone(),
        }
    }

    fn token(&self) -> Result<&str, MarketDataError> {
        self.api_key
            .as_deref()
            .ok_or(MarketDataError::MissingApiKey { provider: PROVIDER })
    }

    pub fn quote_url(&self, symbol: &str) -> Result<Url, MarketDataError> {
        let token = self.token()?;
        self.api
            .build_url(&self.base_url, "/quote", &[("symbol", symbol), ("token", token)])
    }

    pub fn candles_url(&self, symbol: &str, resolution: &str, from: i64, to: i64) -> Result<Url, MarketDataError> {
        let token = self.token()?;
        let from = from.to_string();
        let to = to.to_string();
        self.api.build_url(
            &self.base_url,
            "/stock/candle",
            &[
                ("symbol", symbol),
                ("resolution", resolution),
                ("from", &from),
                ("to", &to),
                ("token", token),
            ],
        )
    }

    pub async fn quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let url = self.quote_url(symbol)?;
        self.api.get_json(url).await
    }

    pub async fn candles(
        &self,
        symbol: &str,
        resolution: &str,
        from: i64,
        to: i64,
    ) -> Result<CandleSeries, MarketDataError> {
        let url = self.candles_url(symbol, resolution, from, to)?;
        self.api.get_json(url).await
    }
}
