// ============================================================================
// COMPARISON HOOK - side-by-side overview metrics
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{AbortHandle, Abortable};

use crate::config::FetchFailurePolicy;
use crate::models::StockOverview;
use crate::services::MarketInsights;
use crate::state::{ReactiveState, SubscriptionId};
use crate::utils::format::{
    format_market_cap_millions, format_percent, format_price, format_ratio, normalize_ticker,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonState {
    pub overviews: Vec<StockOverview>,
    pub loading: bool,
    pub error: Option<String>,
}

/// One table row: a metric label and one formatted cell per stock.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub values: Vec<String>,
}

type Metric = (&'static str, fn(&StockOverview) -> String);

const METRICS: [Metric; 5] = [
    ("Market Cap", |s| format_market_cap_millions(s.market_capitalization)),
    ("P/E Ratio", |s| format_ratio(s.pe_ratio)),
    ("Div Yield", |s| format_percent(s.dividend_yield)),
    ("52W High", |s| format_price(s.year_high)),
    ("52W Low", |s| format_price(s.year_low)),
];

pub fn metric_rows(overviews: &[StockOverview]) -> Vec<ComparisonRow> {
    METRICS
        .iter()
        .map(|&(label, format)| ComparisonRow {
            label,
            values: overviews.iter().map(format).collect(),
        })
        .collect()
}

#[derive(Clone)]
pub struct ComparisonHook {
    insights: Rc<dyn MarketInsights>,
    policy: FetchFailurePolicy,
    state: ReactiveState<ComparisonState>,
    in_flight: Rc<RefCell<Option<AbortHandle>>>,
}

impl ComparisonHook {
    pub fn new(insights: Rc<dyn MarketInsights>, policy: FetchFailurePolicy) -> Self {
        Self {
            insights,
            policy,
            state: ReactiveState::default(),
            in_flight: Rc::new(RefCell::new(None)),
        }
    }

    pub fn state(&self) -> ComparisonState {
        self.state.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ComparisonState) + 'static,
    {
        self.state.subscribe(callback)
    }

    /// Fetches each overview in order; blank tickers are skipped. Under
    /// `Fallback` a failed ticker is left out; under `Propagate` the first
    /// failure stops the load. A later load or `teardown` cancels this one
    /// before it applies.
    pub async fn load(&self, tickers: &[&str]) -> ComparisonState {
        self.teardown();
        let (handle, registration) = AbortHandle::new_pair();
        *self.in_flight.borrow_mut() = Some(handle);

        let tickers: Vec<String> = tickers.iter().filter_map(|t| normalize_ticker(t)).collect();
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let fetch = fetch_overviews(self.insights.as_ref(), &tickers, self.policy);
        let (overviews, error) = match Abortable::new(fetch, registration).await {
            Ok(fetched) => fetched,
            Err(_) => {
                log::debug!("🛑 Comparison of {:?} cancelled", tickers);
                return self.state.get();
            }
        };
        self.in_flight.borrow_mut().take();

        self.state.update(|s| {
            s.overviews = overviews;
            s.loading = false;
            s.error = error;
        })
    }

    /// Cancels the in-flight load, if any.
    pub fn teardown(&self) {
        if let Some(handle) = self.in_flight.borrow_mut().take() {
            handle.abort();
        }
    }

    pub fn rows(&self) -> Vec<ComparisonRow> {
        self.state.with(|s| metric_rows(&s.overviews))
    }
}

async fn fetch_overviews(
    insights: &dyn MarketInsights,
    tickers: &[String],
    policy: FetchFailurePolicy,
) -> (Vec<StockOverview>, Option<String>) {
    let mut overviews = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let result = insights.stock_overview(ticker).await.map(Some);
        match policy.resolve(result, "Stock overview", || None) {
            Ok(Some(overview)) => overviews.push(overview),
            Ok(None) => {}
            Err(e) => return (overviews, Some(e.to_string())),
        }
    }
    (overviews, None)
}
