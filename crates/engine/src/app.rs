//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::ConnectionRepo;
use crate::use_cases;

/// Main application state.
///
/// Holds the use cases, wired over the repository ports.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub connection: use_cases::ConnectionUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(connection_repo: Arc<dyn ConnectionRepo>, serialize_tenant_writes: bool) -> Self {
        let connection =
            use_cases::ConnectionUseCases::new(connection_repo, serialize_tenant_writes);

        Self {
            use_cases: UseCases { connection },
        }
    }
}
