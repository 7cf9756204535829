//! Repository port traits for database access.

use async_trait::async_trait;
use switchboard_domain::{Connection, ConnectionChanges, ConnectionId, TenantId};

use super::error::RepoError;

// =============================================================================
// Connection Storage
// =============================================================================

/// Persistence port for channel connections.
///
/// Every lookup is scoped by tenant. `update` is a field-level partial write:
/// columns not present in the change set keep their stored values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRepo: Send + Sync {
    /// `{tenant_id, id}` lookup.
    async fn get(
        &self,
        tenant_id: TenantId,
        id: ConnectionId,
    ) -> Result<Option<Connection>, RepoError>;

    /// First connection of the tenant flagged default whose id is not `exclude`.
    ///
    /// Returns the first match even if more than one default exists.
    async fn find_default_excluding(
        &self,
        tenant_id: TenantId,
        exclude: ConnectionId,
    ) -> Result<Option<Connection>, RepoError>;

    /// All connections of a tenant, oldest first.
    async fn list_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Connection>, RepoError>;

    async fn insert(&self, connection: &Connection) -> Result<(), RepoError>;

    /// Write the present fields of `changes` to `connection` and return the stored result.
    async fn update(
        &self,
        connection: &Connection,
        changes: &ConnectionChanges,
    ) -> Result<Connection, RepoError>;
}
