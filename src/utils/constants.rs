// ============================================================================
// CONSTANTS - storage keys and provider endpoints
// ============================================================================

/// Persisted user session (User Store).
pub const STORAGE_KEY_USER: &str = "finalytics-user-storage";
/// Persisted display preferences (Settings Store).
pub const STORAGE_KEY_SETTINGS: &str = "finalytics-settings";
/// Persisted identity tokens (Firebase REST adapter).
pub const STORAGE_KEY_AUTH_SESSION: &str = "finalytics-auth-session";

/// Version written into every persisted envelope.
pub const PERSIST_VERSION: u32 = 0;

/// Collection holding one profile document per user.
pub const USERS_COLLECTION: &str = "users";
pub const WATCHLIST_FIELD: &str = "watchlist";

pub const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";
pub const FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
pub const MARKETAUX_BASE_URL: &str = "https://api.marketaux.com/v1";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/finalytics/us-central1/api";

pub const IDENTITY_TOOLKIT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const SECURE_TOKEN_BASE_URL: &str = "https://securetoken.googleapis.com/v1";
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

pub const DEFAULT_ACCENT_COLOR: &str = "#10B981";
