//! Connection use case errors.

use switchboard_domain::ConnectionId;

use crate::infrastructure::ports::RepoError;
use crate::use_cases::validation::ValidationError;

/// Error code surfaced when the target connection is missing for the tenant.
pub const ERR_NO_CONNECTION_FOUND: &str = "ERR_NO_CONNECTION_FOUND";

/// Errors from connection use cases.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Malformed `name` or `isDefault`. No write happened.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Target connection does not exist in the tenant.
    #[error("Connection not found: {0}")]
    NotFound(ConnectionId),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl ConnectionError {
    /// HTTP-style status code associated with this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Repo(_) => 500,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ERR_VALIDATION",
            Self::NotFound(_) => ERR_NO_CONNECTION_FOUND,
            Self::Repo(_) => "ERR_INTERNAL",
        }
    }
}
