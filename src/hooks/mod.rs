// ============================================================================
// HOOKS - stateful controllers consumed by the views
// ============================================================================

pub mod use_auth;
pub mod use_comparison;
pub mod use_market_news;
pub mod use_stock_data;
pub mod use_watchlist;

pub use use_auth::AuthSessionProvider;
pub use use_comparison::{metric_rows, ComparisonHook, ComparisonRow, ComparisonState};
pub use use_market_news::{MarketNewsHook, MarketNewsState};
pub use use_stock_data::{StockDataHook, StockDataState};
pub use use_watchlist::{WatchlistHook, WatchlistOutcome};
