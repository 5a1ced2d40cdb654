// ============================================================================
// DOCUMENTS - contract of the per-user document store
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DocumentError;
use crate::utils::constants::USERS_COLLECTION;

/// A document's top-level fields.
pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    pub collection: String,
    pub id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// `users/{uid}`, the profile and watchlist document.
    pub fn user(uid: &str) -> Self {
        Self::new(USERS_COLLECTION, uid)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Read-one, merge-write and array-set mutations on single documents.
///
/// `array_union` and `array_remove` have set semantics and are idempotent.
#[async_trait(?Send)]
pub trait DocumentStore {
    /// `Ok(None)` when the document does not exist.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentError>;

    /// Writes the given fields, leaving other fields untouched. Creates the
    /// document when missing.
    async fn set_merge(&self, path: &DocumentPath, data: Document) -> Result<(), DocumentError>;

    async fn array_union(
        &self,
        path: &DocumentPath,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), DocumentError>;

    async fn array_remove(
        &self,
        path: &DocumentPath,
        field: &str,
        values: Vec<Value>,
    ) -> Result<(), DocumentError>;
}
