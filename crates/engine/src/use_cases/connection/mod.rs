//! Connection use cases.
//!
//! Covers the partial update with single-default-per-tenant handling, plus
//! the read queries the HTTP layer needs.

mod error;
mod input;
mod queries;
mod tenant_lock;
mod update;

use std::sync::Arc;

use crate::infrastructure::ports::ConnectionRepo;

pub use error::{ConnectionError, ERR_NO_CONNECTION_FOUND};
pub use input::ConnectionUpdateData;
pub use queries::ConnectionQueries;
pub use tenant_lock::{TenantLockGuard, TenantLocks};
pub use update::{UpdateConnection, UpdatedConnection};

/// Container for connection use cases.
pub struct ConnectionUseCases {
    pub update: UpdateConnection,
    pub queries: ConnectionQueries,
}

impl ConnectionUseCases {
    /// Wire the use cases over one repository. `serialize_tenant_writes`
    /// makes updates hold a per-tenant lock.
    pub fn new(repo: Arc<dyn ConnectionRepo>, serialize_tenant_writes: bool) -> Self {
        let update = UpdateConnection::new(repo.clone());
        let update = if serialize_tenant_writes {
            update.serialized(Arc::new(TenantLocks::new()))
        } else {
            update
        };

        Self {
            update,
            queries: ConnectionQueries::new(repo),
        }
    }
}
