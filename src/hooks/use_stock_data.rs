// ============================================================================
// STOCK DATA HOOK - quote, profile, candles and price target for the dashboard
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{AbortHandle, Abortable};

use crate::config::FetchFailurePolicy;
use crate::error::MarketDataError;
use crate::models::{Candle, PriceTarget, StockData, Timeframe};
use crate::services::{FinnhubClient, FmpClient, MarketInsights};
use crate::state::{ReactiveState, SubscriptionId};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StockDataState {
    pub ticker: String,
    pub timeframe: Timeframe,
    pub data: Option<StockData>,
    pub candles: Vec<Candle>,
    pub prediction: Option<PriceTarget>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct StockSnapshot {
    data: Option<StockData>,
    candles: Vec<Candle>,
    prediction: Option<PriceTarget>,
}

#[derive(Clone)]
pub struct StockDataHook {
    finnhub: FinnhubClient,
    fmp: FmpClient,
    insights: Rc<dyn MarketInsights>,
    policy: FetchFailurePolicy,
    state: ReactiveState<StockDataState>,
    in_flight: Rc<RefCell<Option<AbortHandle>>>,
}

impl StockDataHook {
    pub fn new(
        finnhub: FinnhubClient,
        fmp: FmpClient,
        insights: Rc<dyn MarketInsights>,
        policy: FetchFailurePolicy,
    ) -> Self {
        Self {
            finnhub,
            fmp,
            insights,
            policy,
            state: ReactiveState::default(),
            in_flight: Rc::new(RefCell::new(None)),
        }
    }

    pub fn state(&self) -> StockDataState {
        self.state.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StockDataState) + 'static,
    {
        self.state.subscribe(callback)
    }

    /// Loads `ticker` over `timeframe` ending at `now` (unix seconds).
    /// A later load or `teardown` cancels this one before it applies.
    pub async fn load(&self, ticker: &str, timeframe: Timeframe, now: i64) -> StockDataState {
        self.teardown();
        let (handle, registration) = AbortHandle::new_pair();
        *self.in_flight.borrow_mut() = Some(handle);

        self.state.update(|s| {
            s.ticker = ticker.to_string();
            s.timeframe = timeframe;
            s.loading = true;
            s.error = None;
        });

        log::info!("📈 Loading {} ({})", ticker, timeframe.label());
        let fetch = fetch_snapshot(&self.finnhub, &self.fmp, self.insights.as_ref(), ticker, timeframe, now);
        let result = match Abortable::new(fetch, registration).await {
            Ok(result) => result,
            Err(_) => {
                log::debug!("🛑 Stock load for {} cancelled", ticker);
                return self.state.get();
            }
        };
        self.in_flight.borrow_mut().take();

        match self.policy.resolve(result, "Stock data", StockSnapshot::default) {
            Ok(snapshot) => self.state.update(|s| {
                s.data = snapshot.data;
                s.candles = snapshot.candles;
                s.prediction = snapshot.prediction;
                s.loading = false;
                s.error = None;
            }),
            Err(e) => self.state.update(|s| {
                s.data = None;
                s.candles = Vec::new();
                s.prediction = None;
                s.loading = false;
                s.error = Some(e.to_string());
            }),
        }
    }

    /// Cancels the in-flight load, if any.
    pub fn teardown(&self) {
        if let Some(handle) = self.in_flight.borrow_mut().take() {
            handle.abort();
        }
    }
}

async fn fetch_snapshot(
    finnhub: &FinnhubClient,
    fmp: &FmpClient,
    insights: &dyn MarketInsights,
    ticker: &str,
    timeframe: Timeframe,
    now: i64,
) -> Result<StockSnapshot, MarketDataError> {
    let quote = finnhub.quote(ticker).await?;

    let profile = match fmp.company_profile(ticker).await {
        Ok(profiles) => profiles.into_iter().next(),
        Err(e) => {
            log::warn!("⚠️ No company profile for {}: {}", ticker, e);
            None
        }
    };

    let (from, to) = timeframe.range_ending_at(now);
    let candles = finnhub
        .candles(ticker, timeframe.resolution(), from, to)
        .await?
        .into_candles();

    let prediction = prediction_or_estimate(insights.price_target(ticker).await, ticker, quote.current);

    Ok(StockSnapshot {
        data: Some(StockData::from_quote(&quote, profile.as_ref())),
        candles,
        prediction: Some(prediction),
    })
}

/// Backend price target, or one estimated from `current` when the backend
/// has none.
fn prediction_or_estimate(
    target: Result<PriceTarget, MarketDataError>,
    ticker: &str,
    current: f64,
) -> PriceTarget {
    match target {
        Ok(target) => target,
        Err(e) => {
            log::warn!("⚠️ No price target for {}, estimating: {}", ticker, e);
            PriceTarget::estimate(current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;
    use crate::services::MarketApi;

    fn hook(policy: FetchFailurePolicy) -> StockDataHook {
        let config = MarketConfig::default();
        StockDataHook::new(
            FinnhubClient::new(&config),
            FmpClient::new(&config),
            Rc::new(MarketApi::new(&config)),
            policy,
        )
    }

    #[test]
    fn backend_price_target_is_preferred() {
        let target = PriceTarget {
            target_high: 250.0,
            target_median: Some(200.0),
            ..PriceTarget::estimate(180.0)
        };
        assert_eq!(prediction_or_estimate(Ok(target.clone()), "AAPL", 180.0), target);
    }

    #[test]
    fn missing_price_target_is_estimated_from_the_quote() {
        let err = MarketDataError::Status {
            provider: "Market API",
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(
            prediction_or_estimate(Err(err), "AAPL", 180.0),
            PriceTarget::estimate(180.0)
        );
    }

    #[tokio::test]
    async fn propagate_reports_the_failure() {
        let state = hook(FetchFailurePolicy::Propagate)
            .load("AAPL", Timeframe::OneWeek, 1_700_000_000)
            .await;
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Finnhub API key is not configured"));
        assert_eq!(state.ticker, "AAPL");
        assert!(state.data.is_none());
    }

    #[tokio::test]
    async fn fallback_leaves_data_empty_without_error() {
        let state = hook(FetchFailurePolicy::Fallback)
            .load("AAPL", Timeframe::OneDay, 1_700_000_000)
            .await;
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert!(state.data.is_none());
        assert!(state.candles.is_empty());
    }
}
