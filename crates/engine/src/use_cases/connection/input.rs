//! Raw update payload and its validation into [`ConnectionChanges`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use switchboard_domain::value_objects::MIN_CONNECTION_NAME_LENGTH;
use switchboard_domain::{ConnectionChanges, ConnectionName, FieldUpdate};

use crate::use_cases::validation::{
    require_bool, require_optional_string, require_string, ValidationError,
};

/// Partial update as supplied by a caller.
///
/// Every field is kept as raw JSON. Outer `None` means the key was absent,
/// `Some(Value::Null)` is an explicit `null`. Wrong types surface from
/// [`ConnectionUpdateData::validate`] as a [`ValidationError`] rather than a
/// deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionUpdateData {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub session: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub is_default: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub token_telegram: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub instagram_user: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub instagram_key: Option<Value>,
}

/// A key that is present deserializes to `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Absent stays `Keep`, `null` becomes `Clear`, a string becomes `Set`.
fn nullable_text(
    raw: Option<Value>,
    field_name: &'static str,
) -> Result<FieldUpdate<String>, ValidationError> {
    let value = raw
        .map(|v| require_optional_string(v, field_name))
        .transpose()?;
    Ok(FieldUpdate::from_presence(value))
}

impl ConnectionUpdateData {
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = Some(Value::Bool(is_default));
        self
    }

    /// Check field shapes and build the change set. Nothing is written here.
    pub fn validate(self) -> Result<ConnectionChanges, ValidationError> {
        let name = match self.name {
            Some(raw) => {
                let raw = require_string(raw, "name")?;
                let name = ConnectionName::new(raw).map_err(|_| ValidationError::TooShort {
                    field_name: "name",
                    min: MIN_CONNECTION_NAME_LENGTH,
                })?;
                Some(name)
            }
            None => None,
        };

        let is_default = self
            .is_default
            .as_ref()
            .map(|raw| require_bool(raw, "isDefault"))
            .transpose()?;

        let instagram_key = self
            .instagram_key
            .map(|raw| require_optional_string(raw, "instagramKey"))
            .transpose()?
            .flatten();

        let mut changes = ConnectionChanges::default().with_instagram_key(instagram_key);
        changes.name = name;
        changes.status = nullable_text(self.status, "status")?;
        changes.session = nullable_text(self.session, "session")?;
        changes.is_default = is_default;
        changes.token_telegram = nullable_text(self.token_telegram, "tokenTelegram")?;
        changes.instagram_user = nullable_text(self.instagram_user, "instagramUser")?;

        Ok(changes)
    }
}
