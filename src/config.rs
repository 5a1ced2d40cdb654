use serde::{Deserialize, Serialize};

use crate::error::MarketDataError;
use crate::utils::constants::{
    DEFAULT_API_BASE_URL, FINNHUB_BASE_URL, FIRESTORE_BASE_URL, FMP_BASE_URL,
    IDENTITY_TOOLKIT_BASE_URL, MARKETAUX_BASE_URL, SECURE_TOKEN_BASE_URL,
};

/// What a market-data call site does when its request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchFailurePolicy {
    /// Surface the error to the caller.
    Propagate,
    /// Substitute the call site's placeholder data and log the failure.
    #[default]
    Fallback,
}

impl FetchFailurePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "propagate" => Some(Self::Propagate),
            "fallback" => Some(Self::Fallback),
            _ => None,
        }
    }

    /// Settles a market-data result: failures either surface or turn into the
    /// call site's placeholder. Cancellation always surfaces.
    pub fn resolve<T>(
        self,
        result: Result<T, MarketDataError>,
        context: &str,
        placeholder: impl FnOnce() -> T,
    ) -> Result<T, MarketDataError> {
        match result {
            Ok(value) => Ok(value),
            Err(MarketDataError::Cancelled) => Err(MarketDataError::Cancelled),
            Err(e) => match self {
                FetchFailurePolicy::Propagate => {
                    log::error!("❌ {}: {}", context, e);
                    Err(e)
                }
                FetchFailurePolicy::Fallback => {
                    log::warn!("⚠️ {} failed, using placeholder: {}", context, e);
                    Ok(placeholder())
                }
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub market: MarketConfig,
    pub firebase: FirebaseConfig,
    pub on_fetch_failure: FetchFailurePolicy,
    pub enable_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            firebase: FirebaseConfig::default(),
            on_fetch_failure: FetchFailurePolicy::default(),
            enable_logging: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub finnhub_base_url: String,
    pub finnhub_api_key: Option<String>,
    pub fmp_base_url: String,
    pub fmp_api_key: Option<String>,
    pub marketaux_base_url: String,
    pub marketaux_api_key: Option<String>,
    /// Base URL of the project's own market API (overview, candles, price target).
    pub api_base_url: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            finnhub_base_url: FINNHUB_BASE_URL.to_string(),
            finnhub_api_key: None,
            fmp_base_url: FMP_BASE_URL.to_string(),
            fmp_api_key: None,
            marketaux_base_url: MARKETAUX_BASE_URL.to_string(),
            marketaux_api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub identity_base_url: String,
    pub secure_token_base_url: String,
    pub firestore_base_url: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            identity_base_url: IDENTITY_TOOLKIT_BASE_URL.to_string(),
            secure_token_base_url: SECURE_TOKEN_BASE_URL.to_string(),
            firestore_base_url: FIRESTORE_BASE_URL.to_string(),
        }
    }
}

/// Empty strings from `.env` mean "not configured".
fn non_empty(value: Option<&'static str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl AppConfig {
    /// Loads the configuration from compile-time environment variables
    /// (forwarded from `.env` by the build script).
    pub fn from_env() -> Self {
        Self {
            market: MarketConfig {
                finnhub_api_key: non_empty(option_env!("FINNHUB_API_KEY")),
                fmp_api_key: non_empty(option_env!("FMP_API_KEY")),
                marketaux_api_key: non_empty(option_env!("MARKETAUX_API_KEY")),
                api_base_url: non_empty(option_env!("API_BASE_URL"))
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                ..MarketConfig::default()
            },
            firebase: FirebaseConfig {
                api_key: option_env!("FIREBASE_API_KEY").unwrap_or("").to_string(),
                project_id: option_env!("FIREBASE_PROJECT_ID").unwrap_or("").to_string(),
                ..FirebaseConfig::default()
            },
            on_fetch_failure: option_env!("FETCH_FAILURE_POLICY")
                .and_then(FetchFailurePolicy::parse)
                .unwrap_or_default(),
            enable_logging: option_env!("ENABLE_LOGGING")
                .unwrap_or("true")
                .parse()
                .unwrap_or(true),
        }
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }

    pub fn with_fetch_failure_policy(mut self, policy: FetchFailurePolicy) -> Self {
        self.on_fetch_failure = policy;
        self
    }
}

// Only the browser entry point reads this; components get their config injected.
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(FetchFailurePolicy::parse("Propagate"), Some(FetchFailurePolicy::Propagate));
        assert_eq!(FetchFailurePolicy::parse(" fallback "), Some(FetchFailurePolicy::Fallback));
        assert_eq!(FetchFailurePolicy::parse("retry"), None);
    }

    #[test]
    fn policy_serializes_lowercase() {
        let json = serde_json::to_string(&FetchFailurePolicy::Propagate).unwrap();
        assert_eq!(json, "\"propagate\"");
    }

    #[test]
    fn fallback_substitutes_placeholder() {
        let failed: Result<Vec<u32>, _> = Err(MarketDataError::Url("bad".into()));
        let settled = FetchFailurePolicy::Fallback.resolve(failed, "candles", Vec::new);
        assert_eq!(settled.unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn propagate_returns_the_error() {
        let failed: Result<u32, _> = Err(MarketDataError::MissingApiKey { provider: "FMP" });
        let settled = FetchFailurePolicy::Propagate.resolve(failed, "profile", || 0);
        assert!(matches!(settled, Err(MarketDataError::MissingApiKey { provider: "FMP" })));
    }

    #[test]
    fn cancellation_is_never_replaced() {
        let cancelled: Result<u32, _> = Err(MarketDataError::Cancelled);
        let settled = FetchFailurePolicy::Fallback.resolve(cancelled, "quote", || 1);
        assert!(matches!(settled, Err(MarketDataError::Cancelled)));
    }

    #[test]
    fn default_market_config_points_at_public_providers() {
        let config = AppConfig::default();
        assert_eq!(config.market.finnhub_base_url, "https://finnhub.io/api/v1");
        assert!(config.market.finnhub_api_key.is_none());
        assert_eq!(config.on_fetch_failure, FetchFailurePolicy::Fallback);
    }
}
