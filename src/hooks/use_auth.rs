// ============================================================================
// AUTH SESSION PROVIDER - identity notifications -> user store
// ============================================================================
// Session changes are applied one at a time, in arrival order.
// The store only ever holds what the provider last reported.
// ============================================================================

use std::rc::Rc;

use futures::future::{AbortRegistration, Abortable};
use futures::StreamExt;

use crate::error::AuthError;
use crate::models::{new_profile_document, SessionUser};
use crate::services::documents::{DocumentPath, DocumentStore};
use crate::services::identity::{FederatedCredential, IdentityProvider, IdentityUser};
use crate::state::{ReactiveState, SubscriptionId};
use crate::stores::UserStore;

#[derive(Clone)]
pub struct AuthSessionProvider {
    identity: Rc<dyn IdentityProvider>,
    documents: Rc<dyn DocumentStore>,
    user_store: UserStore,
    loading: ReactiveState<bool>,
}

impl AuthSessionProvider {
    pub fn new(
        identity: Rc<dyn IdentityProvider>,
        documents: Rc<dyn DocumentStore>,
        user_store: UserStore,
    ) -> Self {
        Self {
            identity,
            documents,
            user_store,
            loading: ReactiveState::new(true),
        }
    }

    /// True until the first session notification has been processed.
    pub fn loading(&self) -> bool {
        self.loading.get()
    }

    pub fn subscribe_loading<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&bool) + 'static,
    {
        self.loading.subscribe(callback)
    }

    pub fn user_store(&self) -> &UserStore {
        &self.user_store
    }

    /// Applies one session notification to the user store.
    pub async fn handle_session_change(&self, change: Option<IdentityUser>) {
        match change {
            Some(identity) => {
                let user = self.load_session_user(&identity).await;
                log::info!("✅ Session user: {}", user.id);
                self.user_store.set_user(user);
            }
            None => {
                log::info!("👋 No session user");
                self.user_store.clear_user();
            }
        }
        self.loading.set(false);
    }

    /// Profile document merged over the identity; identity alone when the
    /// document is missing or unreadable.
    async fn load_session_user(&self, identity: &IdentityUser) -> SessionUser {
        match self.documents.get(&DocumentPath::user(&identity.uid)).await {
            Ok(Some(profile)) => SessionUser::from_profile(identity, &profile),
            Ok(None) => {
                log::info!("📄 No profile document for {}, using identity only", identity.uid);
                SessionUser::from_identity(identity)
            }
            Err(e) => {
                log::error!("❌ Error fetching user data: {}", e);
                SessionUser::from_identity(identity)
            }
        }
    }

    /// Consumes session notifications until the stream ends or the run is
    /// aborted. A notification interrupted by the abort is not applied.
    pub async fn run(&self, registration: AbortRegistration) {
        let mut changes = self.identity.session_changes();
        let session_loop = async {
            while let Some(change) = changes.next().await {
                self.handle_session_change(change).await;
            }
        };

        match Abortable::new(session_loop, registration).await {
            Ok(()) => log::info!("🔚 Session stream ended"),
            Err(_) => log::info!("🛑 Session listener stopped"),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IdentityUser, AuthError> {
        self.identity.sign_in(email, password).await.map_err(|e| {
            log::error!("❌ Login failed: {}", e);
            e
        })
    }

    /// Creates the account, sets its display name and writes the profile
    /// document.
    pub async fn signup(&self, email: &str, password: &str, full_name: &str) -> Result<IdentityUser, AuthError> {
        let identity = self.identity.create_account(email, password).await.map_err(|e| {
            log::error!("❌ Signup failed: {}", e);
            e
        })?;

        if let Err(e) = self.identity.set_display_name(full_name).await {
            log::warn!("⚠️ Could not set display name: {}", e);
        }

        let profile = new_profile_document(full_name, email, chrono::Utc::now());
        self.documents
            .set_merge(&DocumentPath::user(&identity.uid), profile)
            .await
            .map_err(|e| {
                log::error!("❌ Could not write profile for {}: {}", identity.uid, e);
                AuthError::from(e)
            })?;

        // The session notification for the new account may have raced the
        // profile write; reload so the store carries the profile fields.
        let still_current = self
            .user_store
            .user()
            .map_or(false, |user| user.id == identity.uid);
        if still_current {
            let user = self.load_session_user(&identity).await;
            self.user_store.set_user(user);
        }

        Ok(identity)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.identity.sign_out().await?;
        self.user_store.clear_user();
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.identity.send_password_reset(email).await
    }

    pub async fn login_with_federated(&self, credential: &FederatedCredential) -> Result<IdentityUser, AuthError> {
        self.identity
            .sign_in_with_federated(credential)
            .await
            .map_err(|e| {
                log::error!("❌ {} sign-in failed: {}", credential.provider.provider_id(), e);
                e
            })
    }
}
