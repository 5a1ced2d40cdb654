// ============================================================================
// FMP - company profiles
// ============================================================================

use reqwest::Url;

use crate::config::MarketConfig;
use crate::error::MarketDataError;
use crate::models::CompanyProfile;
use crate::services::api_client::ApiClient;

const PROVIDER: &str = "FMP";

#[derive(Clone)]
pub struct FmpClient {
    api: ApiClient,
    base_url: String,
    api_key: Option<String>,
}

impl FmpClient {
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            api: ApiClient::new(PROVIDER),
            base_url: config.fmp_base_url.clone(),
            api_key: config.fmp_api_key.clone(),
        }
    }

    pub fn profile_url(&self, symbol: &str) -> Result<Url, MarketDataError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(MarketDataError::MissingApiKey { provider: PROVIDER })?;
        self.api
            .build_segment_url(&self.base_url, &["profile", symbol], &[("apikey", key)])
    }

    /// FMP answers with a list; it is empty for unknown symbols.
    pub async fn company_profile(&self, symbol: &str) -> Result<Vec<CompanyProfile>, MarketDataError> {
        let url = self.profile_url(symbol)?;
        self.api.get_json(url).await
    }
}
