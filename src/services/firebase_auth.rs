// ============================================================================
// FIREBASE AUTH - identity provider over the Identity Toolkit REST API
// ============================================================================
// Token set persisted under `finalytics-auth-session`, restored on startup.
// Session changes are broadcast on sign-in, sign-out and token refresh.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::config::FirebaseConfig;
use crate::error::AuthError;
use crate::services::identity::{
    FederatedCredential, IdentityProvider, IdentityUser, SessionBroadcaster, SessionChanges,
};
use crate::utils::constants::STORAGE_KEY_AUTH_SESSION;
use crate::utils::storage::{load_from_storage, remove_from_storage, save_to_storage, KeyValueStorage};

/// Seconds before expiry at which an id token is treated as stale.
const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;

/// Redirect URI sent with federated sign-in; the host already holds the token.
const IDP_REQUEST_URI: &str = "http://localhost";

/// Bearer tokens for authenticated calls (document store).
#[async_trait(?Send)]
pub trait IdTokenSource {
    /// A valid id token, refreshed first when it is about to expire.
    async fn id_token(&self) -> Result<String, AuthError>;
}

/// Persisted token set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub user: IdentityUser,
    pub id_token: String,
    pub refresh_token: String,
    /// Unix seconds
    pub expires_at: i64,
}

impl StoredSession {
    pub fn needs_refresh(&self, now: i64) -> bool {
        now + TOKEN_EXPIRY_SKEW_SECS >= self.expires_at
    }
}

// ============================================================================
// WIRE SHAPES
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Seconds, as a decimal string
    #[serde(default)]
    expires_in: Option<String>,
}

/// Secure Token API answers in snake_case.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn parse_expires_in(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(3600)
}

impl AccountResponse {
    fn identity(&self) -> IdentityUser {
        IdentityUser {
            uid: self.local_id.clone(),
            email: self.email.clone().filter(|e| !e.is_empty()),
            display_name: self.display_name.clone().filter(|n| !n.is_empty()),
        }
    }

    fn into_session(self, now: i64) -> Result<StoredSession, AuthError> {
        let user = self.identity();
        let expires_at = now + parse_expires_in(self.expires_in.as_deref());
        match (self.id_token, self.refresh_token) {
            (Some(id_token), Some(refresh_token)) => Ok(StoredSession {
                user,
                id_token,
                refresh_token,
                expires_at,
            }),
            _ => Err(AuthError::Provider("response carried no tokens".to_string())),
        }
    }
}

// ============================================================================
// ADAPTER
// ============================================================================

pub struct FirebaseAuth {
    http: Client,
    config: FirebaseConfig,
    storage: Rc<dyn KeyValueStorage>,
    session: RefCell<Option<StoredSession>>,
    broadcaster: SessionBroadcaster,
}

impl FirebaseAuth {
    /// Restores any persisted session from `storage`.
    pub fn new(config: FirebaseConfig, storage: Rc<dyn KeyValueStorage>) -> Self {
        let session = load_from_storage::<StoredSession>(storage.as_ref(), STORAGE_KEY_AUTH_SESSION);
        if let Some(restored) = &session {
            log::info!("🔐 Restored auth session for {}", restored.user.uid);
        }
        Self {
            http: Client::new(),
            config,
            storage,
            session: RefCell::new(session),
            broadcaster: SessionBroadcaster::new(),
        }
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn identity_url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.config.identity_base_url.trim_end_matches('/'),
            method,
            self.config.api_key
        )
    }

    fn refresh_url(&self) -> String {
        format!(
            "{}/token?key={}",
            self.config.secure_token_base_url.trim_end_matches('/'),
            self.config.api_key
        )
    }

    async fn post<T: DeserializeOwned>(&self, url: &str, body: serde_json::Value) -> Result<T, AuthError> {
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => AuthError::from_provider_code(&envelope.error.message),
                Err(_) => AuthError::Provider(format!("HTTP {}", status.as_u16())),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AuthError::Provider(format!("unexpected response: {}", e)))
    }

    /// Stores, persists and broadcasts a new session.
    fn establish(&self, session: StoredSession) -> IdentityUser {
        let user = session.user.clone();
        if let Err(e) = save_to_storage(self.storage.as_ref(), STORAGE_KEY_AUTH_SESSION, &session) {
            log::error!("❌ Could not persist auth session: {}", e);
        }
        *self.session.borrow_mut() = Some(session);
        self.broadcaster.publish(Some(user.clone()));
        user
    }

    fn end_session(&self) {
        *self.session.borrow_mut() = None;
        if let Err(e) = remove_from_storage(self.storage.as_ref(), STORAGE_KEY_AUTH_SESSION) {
            log::error!("❌ Could not remove auth session: {}", e);
        }
        self.broadcaster.publish(None);
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        log::info!("🔄 Refreshing id token");
        let url = self.refresh_url();
        let result = self
            .post::<RefreshResponse>(
                &url,
                json!({ "grant_type": "refresh_token", "refresh_token": refresh_token }),
            )
            .await;

        let refreshed = match result {
            Ok(refreshed) => refreshed,
            Err(AuthError::NotSignedIn) => {
                log::warn!("⚠️ Refresh token rejected, signing out");
                self.end_session();
                return Err(AuthError::NotSignedIn);
            }
            Err(e) => return Err(e),
        };

        let user = match self.session.borrow().as_ref() {
            Some(session) => session.user.clone(),
            // Signed out while the refresh was in flight
            None => return Err(AuthError::NotSignedIn),
        };
        let id_token = refreshed.id_token.clone();
        self.establish(StoredSession {
            user,
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: Self::now() + parse_expires_in(Some(&refreshed.expires_in)),
        });
        Ok(id_token)
    }
}

#[async_trait(?Send)]
impl IdTokenSource for FirebaseAuth {
    async fn id_token(&self) -> Result<String, AuthError> {
        let session = self.session.borrow().clone().ok_or(AuthError::NotSignedIn)?;
        if !session.needs_refresh(Self::now()) {
            return Ok(session.id_token);
        }
        self.refresh(&session.refresh_token).await
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FirebaseAuth {
    fn session_changes(&self) -> SessionChanges {
        self.broadcaster.subscribe(self.current_user())
    }

    fn current_user(&self) -> Option<IdentityUser> {
        self.session.borrow().as_ref().map(|s| s.user.clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser, AuthError> {
        log::info!("🔐 Signing in {}", email);
        let url = self.identity_url("signInWithPassword");
        let account: AccountResponse = self
            .post(
                &url,
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        let session = account.into_session(Self::now())?;
        Ok(self.establish(session))
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<IdentityUser, AuthError> {
        log::info!("📝 Creating account for {}", email);
        let url = self.identity_url("signUp");
        let account: AccountResponse = self
            .post(
                &url,
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        let session = account.into_session(Self::now())?;
        Ok(self.establish(session))
    }

    async fn set_display_name(&self, display_name: &str) -> Result<(), AuthError> {
        let id_token = self.id_token().await?;
        let url = self.identity_url("update");
        let account: AccountResponse = self
            .post(
                &url,
                json!({ "idToken": id_token, "displayName": display_name, "returnSecureToken": true }),
            )
            .await?;

        let current = self.session.borrow().clone();
        if let Some(mut session) = current {
            session.user.display_name = account.identity().display_name;
            if let (Some(id_token), Some(refresh_token)) = (account.id_token, account.refresh_token) {
                session.id_token = id_token;
                session.refresh_token = refresh_token;
                session.expires_at = Self::now() + parse_expires_in(account.expires_in.as_deref());
            }
            self.establish(session);
        }
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        log::info!("👋 Signing out");
        self.end_session();
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        log::info!("📧 Sending password reset to {}", email);
        let url = self.identity_url("sendOobCode");
        let _: serde_json::Value = self
            .post(&url, json!({ "requestType": "PASSWORD_RESET", "email": email }))
            .await?;
        Ok(())
    }

    async fn sign_in_with_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<IdentityUser, AuthError> {
        let post_body = idp_post_body(credential)?;
        log::info!("🔐 Signing in with {}", credential.provider.provider_id());
        let url = self.identity_url("signInWithIdp");
        let account: AccountResponse = self
            .post(
                &url,
                json!({
                    "postBody": post_body,
                    "requestUri": IDP_REQUEST_URI,
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }),
            )
            .await?;
        let session = account.into_session(Self::now())?;
        Ok(self.establish(session))
    }
}

/// `postBody` for `accounts:signInWithIdp`.
pub fn idp_post_body(credential: &FederatedCredential) -> Result<String, AuthError> {
    let provider_id = credential.provider.provider_id();
    match (&credential.id_token, &credential.access_token) {
        (Some(id_token), _) => Ok(format!("id_token={}&providerId={}", id_token, provider_id)),
        (None, Some(access_token)) => Ok(format!("access_token={}&providerId={}", access_token, provider_id)),
        (None, None) => Err(AuthError::Provider(format!(
            "{} credential carries no token",
            provider_id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::identity::FederatedProvider;
    use crate::utils::storage::MemoryStorage;
    use futures::StreamExt;

    fn stored(uid: &str) -> StoredSession {
        StoredSession {
            user: IdentityUser {
                uid: uid.to_string(),
                email: Some("a@b.com".to_string()),
                display_name: None,
            },
            id_token: "id".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: 10_000,
        }
    }

    #[test]
    fn restores_persisted_session() {
        let storage = MemoryStorage::new();
        save_to_storage(&storage, STORAGE_KEY_AUTH_SESSION, &stored("u1")).unwrap();

        let auth = FirebaseAuth::new(FirebaseConfig::default(), Rc::new(storage));
        assert_eq!(auth.current_user().map(|u| u.uid), Some("u1".to_string()));

        let mut changes = auth.session_changes();
        let first = futures::executor::block_on(changes.next());
        assert_eq!(first.flatten().map(|u| u.uid), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn sign_out_forgets_and_broadcasts() {
        let storage = MemoryStorage::new();
        save_to_storage(&storage, STORAGE_KEY_AUTH_SESSION, &stored("u1")).unwrap();
        let auth = FirebaseAuth::new(FirebaseConfig::default(), Rc::new(storage.clone()));
        let mut changes = auth.session_changes();

        auth.sign_out().await.unwrap();

        assert!(auth.current_user().is_none());
        assert!(storage.is_empty());
        assert!(changes.next().await.unwrap().is_some());
        assert_eq!(changes.next().await, Some(None));
        assert_eq!(auth.id_token().await, Err(AuthError::NotSignedIn));
    }

    #[test]
    fn tokens_refresh_inside_skew_window() {
        let session = stored("u1");
        assert!(!session.needs_refresh(10_000 - 61));
        assert!(session.needs_refresh(10_000 - 60));
        assert!(session.needs_refresh(20_000));
    }

    #[test]
    fn account_response_builds_session() {
        let account: AccountResponse = serde_json::from_str(
            r#"{"localId":"u7","email":"x@y.com","displayName":"","idToken":"t","refreshToken":"r","expiresIn":"3600"}"#,
        )
        .unwrap();
        let session = account.into_session(100).unwrap();
        assert_eq!(session.user.uid, "u7");
        assert_eq!(session.user.display_name, None);
        assert_eq!(session.expires_at, 3700);
    }

    #[test]
    fn idp_body_prefers_id_token() {
        let google = FederatedCredential::google_id_token("abc");
        assert_eq!(idp_post_body(&google).unwrap(), "id_token=abc&providerId=google.com");

        let github = FederatedCredential {
            provider: FederatedProvider::GitHub,
            id_token: None,
            access_token: Some("gh".to_string()),
        };
        assert_eq!(idp_post_body(&github).unwrap(), "access_token=gh&providerId=github.com");

        let empty = FederatedCredential { access_token: None, ..github };
        assert!(idp_post_body(&empty).is_err());
    }

    #[test]
    fn urls_carry_api_key() {
        let auth = FirebaseAuth::new(
            FirebaseConfig {
                api_key: "KEY".to_string(),
                ..FirebaseConfig::default()
            },
            Rc::new(MemoryStorage::new()),
        );
        assert_eq!(
            auth.identity_url("signUp"),
            "https://identitytoolkit.googleapis.com/v1/accounts:signUp?key=KEY"
        );
        assert_eq!(auth.refresh_url(), "https://securetoken.googleapis.com/v1/token?key=KEY");
    }
}
