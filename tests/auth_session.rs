mod common;

use std::rc::Rc;

use futures::executor::LocalPool;
use futures::future::AbortHandle;
use futures::task::LocalSpawnExt;
use serde_json::json;

use common::{identity, FakeIdentity, MemoryDocuments};
use finalytics_client::error::AuthError;
use finalytics_client::hooks::AuthSessionProvider;
use finalytics_client::models::SessionUser;
use finalytics_client::services::{FederatedCredential, IdentityProvider};
use finalytics_client::stores::UserStore;
use finalytics_client::utils::MemoryStorage;

fn provider(
    identity: &Rc<FakeIdentity>,
    documents: &Rc<MemoryDocuments>,
    storage: &MemoryStorage,
) -> AuthSessionProvider {
    let store = UserStore::new(Rc::new(storage.clone()));
    AuthSessionProvider::new(identity.clone(), documents.clone(), store)
}

/// Spawns the session listener on `pool` and returns its stop handle.
fn start(pool: &LocalPool, provider: &AuthSessionProvider) -> AbortHandle {
    let (handle, registration) = AbortHandle::new_pair();
    let provider = provider.clone();
    pool.spawner()
        .spawn_local(async move { provider.run(registration).await })
        .unwrap();
    handle
}

#[test]
fn sign_in_without_profile_yields_minimal_user() {
    let identity_provider = FakeIdentity::new();
    let documents = MemoryDocuments::new();
    let auth = provider(&identity_provider, &documents, &MemoryStorage::new());
    assert!(auth.loading());

    let mut pool = LocalPool::new();
    let _handle = start(&pool, &auth);
    identity_provider.emit(Some(identity("u1", "a@b.com")));
    pool.run_until_stalled();

    let user = auth.user_store().user().unwrap();
    assert_eq!(
        serde_json::to_value(&user).unwrap(),
        json!({ "uid": "u1", "email": "a@b.com" })
    );
    assert!(!auth.loading());
}

#[test]
fn first_notification_ends_loading_even_when_signed_out() {
    let auth = provider(&FakeIdentity::new(), &MemoryDocuments::new(), &MemoryStorage::new());
    let mut pool = LocalPool::new();
    let _handle = start(&pool, &auth);
    pool.run_until_stalled();

    assert!(!auth.loading());
    assert_eq!(auth.user_store().user(), None);
}

#[test]
fn notifications_apply_in_arrival_order() {
    let identity_provider = FakeIdentity::new();
    let auth = provider(&identity_provider, &MemoryDocuments::new(), &MemoryStorage::new());
    let mut pool = LocalPool::new();
    let _handle = start(&pool, &auth);
    pool.run_until_stalled();

    identity_provider.emit(Some(identity("u1", "a@b.com")));
    identity_provider.emit(Some(identity("u2", "c@d.com")));
    identity_provider.emit(None);
    pool.run_until_stalled();
    assert_eq!(auth.user_store().user(), None);

    identity_provider.emit(Some(identity("u2", "c@d.com")));
    pool.run_until_stalled();
    assert_eq!(auth.user_store().user().map(|u| u.id), Some("u2".to_string()));
}

#[test]
fn stopped_listener_drops_an_interrupted_profile_load() {
    let identity_provider = FakeIdentity::new();
    let documents = MemoryDocuments::new();
    let auth = provider(&identity_provider, &documents, &MemoryStorage::new());
    let mut pool = LocalPool::new();
    let handle = start(&pool, &auth);
    pool.run_until_stalled();

    documents.hold_reads(true);
    identity_provider.emit(Some(identity("u1", "a@b.com")));
    pool.run_until_stalled();

    handle.abort();
    documents.hold_reads(false);
    pool.run_until_stalled();

    assert_eq!(auth.user_store().user(), None);
}

#[test]
fn stopped_listener_ignores_later_notifications() {
    let identity_provider = FakeIdentity::new();
    let auth = provider(&identity_provider, &MemoryDocuments::new(), &MemoryStorage::new());
    let mut pool = LocalPool::new();
    let handle = start(&pool, &auth);
    pool.run_until_stalled();

    handle.abort();
    identity_provider.emit(Some(identity("u1", "a@b.com")));
    pool.run_until_stalled();

    assert_eq!(auth.user_store().user(), None);
}

#[tokio::test]
async fn profile_document_is_merged_into_the_user() {
    let documents = MemoryDocuments::new();
    documents.insert(
        "u1",
        json!({ "fullName": "Ada Lovelace", "watchlist": ["AAPL", "MSFT"] }),
    );
    let auth = provider(&FakeIdentity::new(), &documents, &MemoryStorage::new());

    auth.handle_session_change(Some(identity("u1", "a@b.com"))).await;

    let user = auth.user_store().user().unwrap();
    assert_eq!(user.full_name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(user.watchlist, Some(vec!["AAPL".to_string(), "MSFT".to_string()]));
    assert_eq!(user.email.as_deref(), Some("a@b.com"));
}

#[tokio::test]
async fn unreadable_profile_still_signs_the_user_in() {
    let documents = MemoryDocuments::new();
    documents.insert("u1", json!({ "fullName": "Ada" }));
    documents.fail_reads(true);
    let auth = provider(&FakeIdentity::new(), &documents, &MemoryStorage::new());

    auth.handle_session_change(Some(identity("u1", "a@b.com"))).await;

    assert_eq!(
        auth.user_store().user(),
        Some(SessionUser::from_identity(&identity("u1", "a@b.com")))
    );
    assert!(!auth.loading());
}

#[tokio::test]
async fn logout_clears_the_persisted_user() {
    let identity_provider = FakeIdentity::new();
    identity_provider.add_account("a@b.com", "secret1", "u1");
    let storage = MemoryStorage::new();
    let auth = provider(&identity_provider, &MemoryDocuments::new(), &storage);

    auth.login("a@b.com", "secret1").await.unwrap();
    auth.handle_session_change(identity_provider.current_user()).await;
    assert!(UserStore::new(Rc::new(storage.clone())).user().is_some());

    auth.logout().await.unwrap();
    assert_eq!(auth.user_store().user(), None);
    assert_eq!(UserStore::new(Rc::new(storage)).user(), None);
}

#[tokio::test]
async fn wrong_password_is_reported_and_changes_nothing() {
    let identity_provider = FakeIdentity::new();
    identity_provider.add_account("a@b.com", "secret1", "u1");
    let auth = provider(&identity_provider, &MemoryDocuments::new(), &MemoryStorage::new());

    let err = auth.login("a@b.com", "nope").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
    assert_eq!(err.to_string(), "Invalid email or password");
    assert_eq!(auth.user_store().user(), None);
}

#[tokio::test]
async fn signup_writes_the_profile_document() {
    let identity_provider = FakeIdentity::new();
    let documents = MemoryDocuments::new();
    let auth = provider(&identity_provider, &documents, &MemoryStorage::new());

    let created = auth.signup("ada@b.com", "secret1", "Ada Lovelace").await.unwrap();

    let doc = documents.document(&created.uid).unwrap();
    assert_eq!(doc["fullName"], json!("Ada Lovelace"));
    assert_eq!(doc["email"], json!("ada@b.com"));
    assert_eq!(doc["watchlist"], json!([]));
    assert_eq!(doc["settings"]["theme"], json!("dark"));
    assert!(doc.contains_key("createdAt"));
}

#[tokio::test]
async fn failed_profile_write_fails_signup() {
    let documents = MemoryDocuments::new();
    documents.fail_writes(true);
    let auth = provider(&FakeIdentity::new(), &documents, &MemoryStorage::new());

    let err = auth.signup("ada@b.com", "secret1", "Ada").await.unwrap_err();
    assert!(matches!(err, AuthError::Profile(_)));
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let identity_provider = FakeIdentity::new();
    identity_provider.add_account("a@b.com", "secret1", "u1");
    let documents = MemoryDocuments::new();
    let auth = provider(&identity_provider, &documents, &MemoryStorage::new());

    let err = auth.signup("a@b.com", "secret2", "Ada").await.unwrap_err();
    assert_eq!(err, AuthError::EmailInUse);
    assert_eq!(documents.write_count(), 0);
}

#[test]
fn signed_up_user_carries_the_profile_fields() {
    let identity_provider = FakeIdentity::new();
    let auth = provider(&identity_provider, &MemoryDocuments::new(), &MemoryStorage::new());
    let mut pool = LocalPool::new();
    let _handle = start(&pool, &auth);

    pool.run_until(auth.signup("ada@b.com", "secret1", "Ada Lovelace"))
        .unwrap();
    pool.run_until_stalled();

    let user = auth.user_store().user().unwrap();
    assert_eq!(user.full_name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(user.display_name(), "Ada Lovelace");
}

#[tokio::test]
async fn password_reset_and_federated_sign_in_reach_the_provider() {
    let identity_provider = FakeIdentity::new();
    let auth = provider(&identity_provider, &MemoryDocuments::new(), &MemoryStorage::new());

    auth.reset_password("a@b.com").await.unwrap();
    assert_eq!(*identity_provider.reset_requests.borrow(), vec!["a@b.com".to_string()]);

    let user = auth
        .login_with_federated(&FederatedCredential::google_id_token("tok"))
        .await
        .unwrap();
    assert_eq!(user.uid, "google.com:tok");
}
