// In-memory identity provider and document store for the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::{json, Value};

use finalytics_client::error::{AuthError, DocumentError};
use finalytics_client::services::{
    Document, DocumentPath, DocumentStore, FederatedCredential, IdentityProvider, IdentityUser,
    SessionBroadcaster, SessionChanges,
};

pub fn identity(uid: &str, email: &str) -> IdentityUser {
    IdentityUser {
        uid: uid.to_string(),
        email: Some(email.to_string()),
        display_name: None,
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

struct Account {
    uid: String,
    password: String,
}

#[derive(Default)]
pub struct FakeIdentity {
    broadcaster: SessionBroadcaster,
    current: RefCell<Option<IdentityUser>>,
    accounts: RefCell<HashMap<String, Account>>,
    next_uid: Cell<u32>,
    pub reset_requests: RefCell<Vec<String>>,
}

impl FakeIdentity {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn add_account(&self, email: &str, password: &str, uid: &str) {
        self.accounts.borrow_mut().insert(
            email.to_string(),
            Account {
                uid: uid.to_string(),
                password: password.to_string(),
            },
        );
    }

    /// Pushes a session change as the real service would.
    pub fn emit(&self, user: Option<IdentityUser>) {
        *self.current.borrow_mut() = user.clone();
        self.broadcaster.publish(user);
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeIdentity {
    fn session_changes(&self) -> SessionChanges {
        self.broadcaster.subscribe(self.current.borrow().clone())
    }

    fn current_user(&self) -> Option<IdentityUser> {
        self.current.borrow().clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser, AuthError> {
        let uid = match self.accounts.borrow().get(email) {
            Some(account) if account.password == password => account.uid.clone(),
            _ => return Err(AuthError::InvalidCredentials),
        };
        let user = identity(&uid, email);
        self.emit(Some(user.clone()));
        Ok(user)
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<IdentityUser, AuthError> {
        if self.accounts.borrow().contains_key(email) {
            return Err(AuthError::EmailInUse);
        }
        if password.len() < 6 {
            return Err(AuthError::WeakPassword("at least 6 characters".to_string()));
        }
        self.next_uid.set(self.next_uid.get() + 1);
        let uid = format!("new-{}", self.next_uid.get());
        self.add_account(email, password, &uid);

        let user = identity(&uid, email);
        self.emit(Some(user.clone()));
        Ok(user)
    }

    async fn set_display_name(&self, display_name: &str) -> Result<(), AuthError> {
        let mut current = self.current.borrow_mut();
        let user = current.as_mut().ok_or(AuthError::NotSignedIn)?;
        user.display_name = Some(display_name.to_string());
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.emit(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.reset_requests.borrow_mut().push(email.to_string());
        Ok(())
    }

    async fn sign_in_with_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<IdentityUser, AuthError> {
        let token = credential
            .id_token
            .as_ref()
            .or(credential.access_token.as_ref())
            .ok_or_else(|| AuthError::Provider("no token".to_string()))?;
        let user = IdentityUser {
            uid: format!("{}:{}", credential.provider.provider_id(), token),
            email: None,
            display_name: None,
        };
        self.emit(Some(user.clone()));
        Ok(user)
    }
}

// ============================================================================
// DOCUMENTS
// ============================================================================

#[derive(Default)]
pub struct MemoryDocuments {
    docs: RefCell<HashMap<DocumentPath, Document>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    hold_reads: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryDocuments {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn insert(&self, uid: &str, fields: Value) {
        if let Value::Object(map) = fields {
            self.docs.borrow_mut().insert(DocumentPath::user(uid), map);
        }
    }

    pub fn document(&self, uid: &str) -> Option<Document> {
        self.docs.borrow().get(&DocumentPath::user(uid)).cloned()
    }

    pub fn watchlist(&self, uid: &str) -> Vec<Value> {
        self.document(uid)
            .and_then(|doc| doc.get("watchlist").and_then(Value::as_array).cloned())
            .unwrap_or_default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// While set, reads never complete.
    pub fn hold_reads(&self, hold: bool) {
        self.hold_reads.set(hold);
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    fn write(&self) -> Result<(), DocumentError> {
        if self.fail_writes.get() {
            return Err(DocumentError::Network("offline".to_string()));
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn with_array(&self, path: &DocumentPath, field: &str, apply: impl FnOnce(&mut Vec<Value>)) {
        let mut docs = self.docs.borrow_mut();
        let doc = docs.entry(path.clone()).or_default();
        let entry = doc.entry(field.to_string()).or_insert_with(|| json!([]));
        if !entry.is_array() {
            *entry = json!([]);
        }
        if let Value::Array(items) = entry {
            apply(items);
        }
    }
}

#[async_trait(?Send)]
impl DocumentStore for MemoryDocuments {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentError> {
        if self.hold_reads.get() {
            futures::future::pending::<()>().await;
        }
        if self.fail_reads.get() {
            return Err(DocumentError::Network("offline".to_string()));
        }
        Ok(self.docs.borrow().get(path).cloned())
    }

    async fn set_merge(&self, path: &DocumentPath, data: Document) -> Result<(), DocumentError> {
        self.write()?;
        self.docs
            .borrow_mut()
            .entry(path.clone())
            .or_default()
            .extend(data);
        Ok(())
    }

    async fn array_union(
        &self,
        path: &DocumentPath,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), DocumentError> {
        self.write()?;
        self.with_array(path, field, |items| {
            for value in values {
                if !items.contains(&value) {
                    items.push(value);
                }
            }
        });
        Ok(())
    }

    async fn array_remove(
        &self,
        path: &DocumentPath,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), DocumentError> {
        self.write()?;
        self.with_array(path, field, |items| items.retain(|item| !values.contains(item)));
        Ok(())
    }
}
