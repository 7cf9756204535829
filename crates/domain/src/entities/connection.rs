//! Connection entity - A tenant's binding to a messaging channel
//!
//! A connection holds the channel configuration (WhatsApp session, Telegram
//! bot token, Instagram credentials) for one tenant. At most one connection
//! per tenant is flagged as the default; that rule is enforced when a
//! connection is promoted, not on every write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ConnectionName, FieldUpdate};
use crate::{ConnectionId, TenantId};

/// A messaging-channel connection owned by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub tenant_id: TenantId,
    pub name: String,
    pub status: Option<String>,
    pub session: Option<String>,
    pub is_default: bool,
    pub token_telegram: Option<String>,
    pub instagram_user: Option<String>,
    pub instagram_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    pub fn new(tenant_id: TenantId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ConnectionId::new(),
            tenant_id,
            name: name.into(),
            status: None,
            session: None,
            is_default: false,
            token_telegram: None,
            instagram_user: None,
            instagram_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_instagram_key(mut self, key: impl Into<String>) -> Self {
        self.instagram_key = Some(key.into());
        self
    }

    /// Apply a partial write in place. Fields not present in `changes` are left alone.
    pub fn apply(&mut self, changes: &ConnectionChanges, now: DateTime<Utc>) {
        if let Some(name) = &changes.name {
            self.name = name.as_str().to_string();
        }
        changes.status.apply_to(&mut self.status);
        changes.session.apply_to(&mut self.session);
        if let Some(is_default) = changes.is_default {
            self.is_default = is_default;
        }
        changes.token_telegram.apply_to(&mut self.token_telegram);
        changes.instagram_user.apply_to(&mut self.instagram_user);
        if let Some(key) = &changes.instagram_key {
            self.instagram_key = Some(key.clone());
        }
        self.updated_at = now;
    }
}

/// A validated partial write to a [`Connection`].
///
/// Every field carries its own presence. `instagram_key` is only ever
/// `Some` with a non-empty value, so a blank key never replaces a stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionChanges {
    pub name: Option<ConnectionName>,
    pub status: FieldUpdate<String>,
    pub session: FieldUpdate<String>,
    pub is_default: Option<bool>,
    pub token_telegram: FieldUpdate<String>,
    pub instagram_user: FieldUpdate<String>,
    instagram_key: Option<String>,
}

impl ConnectionChanges {
    /// The single-field write used to demote a previous default.
    pub fn demote() -> Self {
        Self {
            is_default: Some(false),
            ..Self::default()
        }
    }

    /// Set the Instagram key. Empty or missing values are dropped.
    pub fn with_instagram_key(mut self, key: Option<String>) -> Self {
        self.instagram_key = key.filter(|k| !k.is_empty());
        self
    }

    pub fn instagram_key(&self) -> Option<&str> {
        self.instagram_key.as_deref()
    }

    /// True when applying these changes would only bump `updated_at`.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_keep()
            && self.session.is_keep()
            && self.is_default.is_none()
            && self.token_telegram.is_keep()
            && self.instagram_user.is_keep()
            && self.instagram_key.is_none()
    }

    pub fn promotes_to_default(&self) -> bool {
        self.is_default == Some(true)
    }
}
