// ============================================================================
// SERVICES - external systems: identity, documents, market data
// ============================================================================

pub mod api_client;
pub mod documents;
pub mod finnhub;
pub mod firebase_auth;
pub mod firestore;
pub mod fmp;
pub mod identity;
pub mod market_api;
pub mod marketaux;
pub mod news_service;

pub use api_client::ApiClient;
pub use documents::{Document, DocumentPath, DocumentStore};
pub use finnhub::FinnhubClient;
pub use firebase_auth::{FirebaseAuth, IdTokenSource};
pub use firestore::Firestore;
pub use fmp::FmpClient;
pub use identity::{
    FederatedCredential, FederatedProvider, IdentityProvider, IdentityUser, SessionBroadcaster, SessionChanges,
};
pub use market_api::{MarketApi, MarketInsights};
pub use marketaux::MarketauxClient;
pub use news_service::NewsService;
