pub mod market;
pub mod news;
pub mod portfolio;
pub mod preferences;
pub mod user;

pub use market::{Candle, CandleSeries, CompanyProfile, PriceTarget, Quote, StockData, StockOverview, Timeframe};
pub use news::{category_filter, placeholder_news, MarketauxArticle, MarketauxResponse, NewsArticle, NEWS_CATEGORIES};
pub use portfolio::{demo_portfolio, Holding, PortfolioSummary};
pub use preferences::{ChartType, Preferences, Theme};
pub use user::{new_profile_document, SessionUser, UserSettings, UserSettingsPatch};
