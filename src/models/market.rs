use serde::{Deserialize, Serialize};

/// Finnhub `/quote` payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Quote {
    /// Current price
    #[serde(rename = "c", default)]
    pub current: f64,
    /// Change
    #[serde(rename = "d", default)]
    pub change: f64,
    /// Percent change
    #[serde(rename = "dp", default)]
    pub change_percent: f64,
    #[serde(rename = "h", default)]
    pub high: f64,
    #[serde(rename = "l", default)]
    pub low: f64,
    #[serde(rename = "o", default)]
    pub open: f64,
    /// Previous close
    #[serde(rename = "pc", default)]
    pub previous_close: f64,
    #[serde(rename = "t", default)]
    pub timestamp: i64,
}

/// Columnar bar series as returned by Finnhub `/stock/candle` and the project API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CandleSeries {
    #[serde(default)]
    pub c: Vec<f64>,
    #[serde(default)]
    pub h: Vec<f64>,
    #[serde(default)]
    pub l: Vec<f64>,
    #[serde(default)]
    pub o: Vec<f64>,
    /// Status, `"ok"` or `"no_data"`
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub t: Vec<i64>,
    #[serde(default)]
    pub v: Vec<f64>,
}

/// One chart bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub t: i64,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub v: f64,
}

impl CandleSeries {
    pub fn is_ok(&self) -> bool {
        self.s == "ok"
    }

    /// Row-oriented bars; empty unless the status is `ok`. Ragged columns are
    /// cut to the shortest one.
    pub fn into_candles(self) -> Vec<Candle> {
        if !self.is_ok() {
            return Vec::new();
        }
        let len = [
            self.t.len(),
            self.o.len(),
            self.h.len(),
            self.l.len(),
            self.c.len(),
            self.v.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0);

        (0..len)
            .map(|i| Candle {
                t: self.t[i],
                o: self.o[i],
                h: self.h[i],
                l: self.l[i],
                c: self.c[i],
                v: self.v[i],
            })
            .collect()
    }
}

/// Chart window selectable on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "1Y")]
    OneYear,
}

const DAY_SECS: i64 = 86_400;

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
        Timeframe::OneYear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
            Timeframe::OneYear => "1Y",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tf| tf.label() == label)
    }

    pub fn lookback_secs(&self) -> i64 {
        match self {
            Timeframe::OneDay => DAY_SECS,
            Timeframe::OneWeek => 7 * DAY_SECS,
            Timeframe::OneMonth => 30 * DAY_SECS,
            Timeframe::OneYear => 365 * DAY_SECS,
        }
    }

    /// Finnhub resolution code.
    pub fn resolution(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "5",
            Timeframe::OneWeek => "60",
            Timeframe::OneMonth => "D",
            Timeframe::OneYear => "W",
        }
    }

    /// `(from, to)` unix seconds ending at `now`.
    pub fn range_ending_at(&self, now: i64) -> (i64, i64) {
        (now - self.lookback_secs(), now)
    }
}

/// FMP `/profile/{symbol}` entry. Only the fields the client reads are typed
/// strictly; everything defaults when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub symbol: String,
    pub price: f64,
    pub beta: f64,
    pub vol_avg: f64,
    pub mkt_cap: f64,
    pub last_div: f64,
    pub range: String,
    pub changes: f64,
    pub company_name: String,
    pub currency: String,
    pub exchange: String,
    pub exchange_short_name: String,
    pub industry: String,
    pub website: String,
    pub description: String,
    pub ceo: String,
    pub sector: String,
    pub country: String,
    pub image: String,
    pub ipo_date: String,
    pub is_etf: bool,
    pub is_actively_trading: bool,
}

/// Headline figures shown on the dashboard stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StockData {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub market_capitalization: f64,
    pub pe_ratio: f64,
    pub volume: f64,
}

impl StockData {
    /// P/E is not available on the free tiers and stays 0; volume carries the
    /// quote's previous close.
    pub fn from_quote(quote: &Quote, profile: Option<&CompanyProfile>) -> Self {
        Self {
            price: quote.current,
            change: quote.change,
            change_percent: quote.change_percent,
            market_capitalization: profile.map(|p| p.mkt_cap).unwrap_or(0.0),
            pe_ratio: 0.0,
            volume: quote.previous_close,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTarget {
    pub target_high: f64,
    pub target_low: f64,
    pub target_mean: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_median: Option<f64>,
    pub recommendation: String,
}

impl PriceTarget {
    /// Heuristic target band around the current price.
    pub fn estimate(price: f64) -> Self {
        Self {
            target_high: price * 1.15,
            target_low: price * 0.90,
            target_mean: price * 1.05,
            target_median: None,
            recommendation: "BUY".to_string(),
        }
    }

    /// Percent distance from `current_price` to the mean target.
    pub fn potential_upside(&self, current_price: f64) -> f64 {
        if current_price == 0.0 {
            return 0.0;
        }
        (self.target_mean - current_price) / current_price * 100.0
    }
}

/// Project API `/stocks/{ticker}/overview`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StockOverview {
    pub symbol: String,
    pub name: String,
    /// In millions
    pub market_capitalization: f64,
    pub pe_ratio: f64,
    pub dividend_yield: f64,
    pub year_high: f64,
    pub year_low: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zips_ok_series_into_rows() {
        let series: CandleSeries = serde_json::from_str(
            r#"{"c":[2.0,3.0],"h":[2.5,3.5],"l":[1.5,2.5],"o":[1.8,2.9],"s":"ok","t":[100,200],"v":[10.0,20.0]}"#,
        )
        .unwrap();
        let candles = series.into_candles();
        assert_eq!(candles.len(), 2);
        assert_eq!(
            candles[1],
            Candle { t: 200, o: 2.9, h: 3.5, l: 2.5, c: 3.0, v: 20.0 }
        );
    }

    #[test]
    fn no_data_series_is_empty() {
        let series: CandleSeries = serde_json::from_str(r#"{"s":"no_data"}"#).unwrap();
        assert!(series.into_candles().is_empty());
    }

    #[test]
    fn ragged_series_is_truncated() {
        let series = CandleSeries {
            c: vec![1.0, 2.0, 3.0],
            h: vec![1.0, 2.0, 3.0],
            l: vec![1.0, 2.0, 3.0],
            o: vec![1.0, 2.0, 3.0],
            s: "ok".into(),
            t: vec![1, 2],
            v: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(series.into_candles().len(), 2);
    }

    #[test]
    fn timeframes_map_to_lookback_and_resolution() {
        assert_eq!(Timeframe::OneDay.range_ending_at(1_000_000), (913_600, 1_000_000));
        assert_eq!(Timeframe::OneWeek.resolution(), "60");
        assert_eq!(Timeframe::OneMonth.lookback_secs(), 30 * 86_400);
        assert_eq!(Timeframe::parse("1Y"), Some(Timeframe::OneYear));
        assert_eq!(Timeframe::parse("5Y"), None);
    }

    #[test]
    fn stock_data_uses_profile_market_cap() {
        let quote = Quote { current: 190.0, change: 2.0, change_percent: 1.06, previous_close: 188.0, ..Default::default() };
        let profile = CompanyProfile { mkt_cap: 2.9e12, ..Default::default() };
        let data = StockData::from_quote(&quote, Some(&profile));
        assert_eq!(data.market_capitalization, 2.9e12);
        assert_eq!(data.volume, 188.0);
        assert_eq!(StockData::from_quote(&quote, None).market_capitalization, 0.0);
    }

    #[test]
    fn estimated_target_and_upside() {
        let target = PriceTarget::estimate(100.0);
        assert!((target.target_high - 115.0).abs() < 1e-9);
        assert!((target.target_low - 90.0).abs() < 1e-9);
        assert!((target.potential_upside(100.0) - 5.0).abs() < 1e-9);
        assert_eq!(target.potential_upside(0.0), 0.0);
        assert_eq!(target.recommendation, "BUY");
    }
}
