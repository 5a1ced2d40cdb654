// ============================================================================
// IDENTITY - contract of the external identity/session service
// ============================================================================

use std::cell::RefCell;

use async_trait::async_trait;
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Push stream of session changes; `None` means signed out.
pub type SessionChanges = mpsc::UnboundedReceiver<Option<IdentityUser>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FederatedProvider {
    Google,
    GitHub,
}

impl FederatedProvider {
    pub fn provider_id(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "google.com",
            FederatedProvider::GitHub => "github.com",
        }
    }
}

/// Token obtained by the host from the federated provider's popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedCredential {
    pub provider: FederatedProvider,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

impl FederatedCredential {
    pub fn google_id_token(id_token: impl Into<String>) -> Self {
        Self {
            provider: FederatedProvider::Google,
            id_token: Some(id_token.into()),
            access_token: None,
        }
    }
}

/// Request/response operations plus a session notification stream.
///
/// Implementations notify on sign-in, sign-out and token refresh. No call
/// retries; failures come back as [`AuthError`].
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Subscribes to session changes. The current state is delivered first.
    fn session_changes(&self) -> SessionChanges;

    fn current_user(&self) -> Option<IdentityUser>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser, AuthError>;

    async fn create_account(&self, email: &str, password: &str) -> Result<IdentityUser, AuthError>;

    async fn set_display_name(&self, display_name: &str) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    async fn sign_in_with_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<IdentityUser, AuthError>;
}

/// Fans session changes out to every live subscriber.
#[derive(Default)]
pub struct SessionBroadcaster {
    senders: RefCell<Vec<mpsc::UnboundedSender<Option<IdentityUser>>>>,
}

impl SessionBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, current: Option<IdentityUser>) -> SessionChanges {
        let (tx, rx) = mpsc::unbounded();
        // Fresh channel, the receiver is alive: this send cannot fail
        let _ = tx.unbounded_send(current);
        self.senders.borrow_mut().push(tx);
        rx
    }

    /// Sends to all subscribers, dropping those whose receiver is gone.
    pub fn publish(&self, change: Option<IdentityUser>) {
        self.senders
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(change.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.senders.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn user(uid: &str) -> IdentityUser {
        IdentityUser {
            uid: uid.to_string(),
            email: None,
            display_name: None,
        }
    }

    #[test]
    fn delivers_current_state_then_changes() {
        let broadcaster = SessionBroadcaster::new();
        let mut changes = broadcaster.subscribe(Some(user("u1")));
        broadcaster.publish(None);

        futures::executor::block_on(async {
            assert_eq!(changes.next().await, Some(Some(user("u1"))));
            assert_eq!(changes.next().await, Some(None));
        });
    }

    #[test]
    fn drops_closed_subscribers() {
        let broadcaster = SessionBroadcaster::new();
        let changes = broadcaster.subscribe(None);
        let _kept = broadcaster.subscribe(None);
        drop(changes);

        broadcaster.publish(Some(user("u2")));
        assert_eq!(broadcaster.subscriber_count(), 1);
    }
}
