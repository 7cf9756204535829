//! Validated name newtypes for domain entities

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Minimum length of a connection display name, in UTF-16 code units.
pub const MIN_CONNECTION_NAME_LENGTH: usize = 2;

// ============================================================================
// ConnectionName
// ============================================================================

/// A validated connection display name (at least 2 characters).
///
/// Length is measured in UTF-16 code units, so a character outside the
/// Basic Multilingual Plane (most emoji) counts as two. The value is kept
/// exactly as supplied; surrounding whitespace counts toward the length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConnectionName(String);

impl ConnectionName {
    /// Create a new validated connection name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is shorter than
    /// [`MIN_CONNECTION_NAME_LENGTH`] UTF-16 code units.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.encode_utf16().count() < MIN_CONNECTION_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "name must be at least {} characters",
                MIN_CONNECTION_NAME_LENGTH
            )));
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ConnectionName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ConnectionName> for String {
    fn from(name: ConnectionName) -> String {
        name.0
    }
}
