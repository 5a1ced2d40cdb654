use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::preferences::Theme;
use crate::services::documents::Document;
use crate::services::identity::IdentityUser;

/// Per-user defaults stored alongside the profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_notifications")]
    pub notifications: bool,
}

fn default_notifications() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            notifications: true,
        }
    }
}

/// Partial update for [`UserSettings`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSettingsPatch {
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
}

impl UserSettings {
    pub fn apply(&self, patch: &UserSettingsPatch) -> Self {
        Self {
            theme: patch.theme.unwrap_or(self.theme),
            notifications: patch.notifications.unwrap_or(self.notifications),
        }
    }
}

/// The signed-in person as the client sees them.
///
/// `id` is assigned by the identity provider and never changes. It is
/// persisted as `uid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(rename = "uid", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watchlist: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<UserSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SessionUser {
    /// Minimal user built from identity fields alone.
    pub fn from_identity(identity: &IdentityUser) -> Self {
        Self {
            id: identity.uid.clone(),
            email: identity.email.clone(),
            full_name: None,
            watchlist: None,
            settings: None,
            created_at: None,
        }
    }

    /// Identity fields merged with the profile document. Document fields win
    /// when present; malformed fields are ignored.
    pub fn from_profile(identity: &IdentityUser, profile: &Document) -> Self {
        let mut user = Self::from_identity(identity);
        if let Some(email) = field::<String>(profile, "email") {
            user.email = Some(email);
        }
        user.full_name = field(profile, "fullName");
        user.watchlist = field(profile, "watchlist");
        user.settings = field(profile, "settings");
        user.created_at = field(profile, "createdAt");
        user
    }

    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

fn field<T: DeserializeOwned>(doc: &Document, key: &str) -> Option<T> {
    let value = doc.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("⚠️ Ignoring malformed profile field '{}': {}", key, e);
            None
        }
    }
}

/// Profile document written at sign-up.
pub fn new_profile_document(full_name: &str, email: &str, created_at: DateTime<Utc>) -> Document {
    let value = json!({
        "fullName": full_name,
        "email": email,
        "createdAt": created_at.to_rfc3339(),
        "settings": { "theme": Theme::Dark },
        "watchlist": [],
    });
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}
