// ============================================================================
// API CLIENT - HTTP only (stateless)
// ============================================================================
// No business logic: builds URLs, sends GETs, checks status, decodes JSON
// ============================================================================

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::MarketDataError;

/// Thin `reqwest` wrapper tagged with the provider name used in errors.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    provider: &'static str,
}

impl ApiClient {
    pub fn new(provider: &'static str) -> Self {
        Self {
            http: Client::new(),
            provider,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// `base` + `path`, with `query` appended in order.
    pub fn build_url(&self, base: &str, path: &str, query: &[(&str, &str)]) -> Result<Url, MarketDataError> {
        let raw = format!("{}{}", base.trim_end_matches('/'), path);
        let mut url = Url::parse(&raw).map_err(|e| MarketDataError::Url(format!("{}: {}", raw, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// `base` extended by `segments`, each percent-encoded as a single path
    /// segment, so a `/` or `?` inside one cannot change the route.
    pub fn build_segment_url(
        &self,
        base: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, MarketDataError> {
        let mut url = Url::parse(base).map_err(|e| MarketDataError::Url(format!("{}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| MarketDataError::Url(format!("{}: cannot hold a path", base)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, MarketDataError> {
        log::debug!("🌐 {} GET {}", self.provider, url.path());

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| MarketDataError::Http {
                provider: self.provider,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.text().await {
                Ok(text) if !text.trim().is_empty() => text,
                _ => status.canonical_reason().unwrap_or("Unknown error").to_string(),
            };
            return Err(MarketDataError::Status {
                provider: self.provider,
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| MarketDataError::Parse {
            provider: self.provider,
            message: e.to_string(),
        })
    }
}
