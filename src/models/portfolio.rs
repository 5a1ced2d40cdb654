use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub shares: f64,
    pub avg_price: f64,
    pub current_price: f64,
}

impl Holding {
    pub fn new(symbol: &str, shares: f64, avg_price: f64, current_price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            shares,
            avg_price,
            current_price,
        }
    }

    pub fn value(&self) -> f64 {
        self.shares * self.current_price
    }

    pub fn cost_basis(&self) -> f64 {
        self.shares * self.avg_price
    }

    pub fn gain(&self) -> f64 {
        (self.current_price - self.avg_price) * self.shares
    }

    pub fn return_percent(&self) -> f64 {
        if self.avg_price == 0.0 {
            return 0.0;
        }
        (self.current_price - self.avg_price) / self.avg_price * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_return: f64,
    pub total_return_percent: f64,
}

impl PortfolioSummary {
    pub fn from_holdings(holdings: &[Holding]) -> Self {
        let total_value: f64 = holdings.iter().map(Holding::value).sum();
        let total_return: f64 = holdings.iter().map(Holding::gain).sum();
        let invested = total_value - total_return;
        let total_return_percent = if invested == 0.0 {
            0.0
        } else {
            total_return / invested * 100.0
        };

        Self {
            total_value,
            total_return,
            total_return_percent,
        }
    }
}

/// Sample holdings for the investments page until brokerage data exists.
pub fn demo_portfolio() -> Vec<Holding> {
    vec![
        Holding::new("AAPL", 15.0, 145.20, 152.40),
        Holding::new("MSFT", 8.0, 280.50, 310.20),
        Holding::new("TSLA", 10.0, 210.00, 195.50),
        Holding::new("NVDA", 5.0, 420.00, 485.00),
    ]
}
