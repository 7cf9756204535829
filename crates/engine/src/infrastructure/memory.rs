//! In-memory connection storage for development and testing
//!
//! Records live in an insertion-ordered Vec, so "first match" lookups behave
//! the same way on every run. Nothing is persisted.

use async_trait::async_trait;
use std::sync::Arc;
use switchboard_domain::{Connection, ConnectionChanges, ConnectionId, TenantId};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{ClockPort, ConnectionRepo, RepoError};

/// In-memory connection repository
pub struct InMemoryConnectionRepo {
    connections: RwLock<Vec<Connection>>,
    clock: Arc<dyn ClockPort>,
}

impl InMemoryConnectionRepo {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            connections: RwLock::new(Vec::new()),
            clock,
        }
    }
}

#[async_trait]
impl ConnectionRepo for InMemoryConnectionRepo {
    async fn get(
        &self,
        tenant_id: TenantId,
        id: ConnectionId,
    ) -> Result<Option<Connection>, RepoError> {
        let connections = self.connections.read().await;
        Ok(connections
            .iter()
            .find(|c| c.tenant_id == tenant_id && c.id == id)
            .cloned())
    }

    async fn find_default_excluding(
        &self,
        tenant_id: TenantId,
        exclude: ConnectionId,
    ) -> Result<Option<Connection>, RepoError> {
        let connections = self.connections.read().await;
        Ok(connections
            .iter()
            .find(|c| c.tenant_id == tenant_id && c.is_default && c.id != exclude)
            .cloned())
    }

    async fn list_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Connection>, RepoError> {
        let connections = self.connections.read().await;
        Ok(connections
            .iter()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, connection: &Connection) -> Result<(), RepoError> {
        let mut connections = self.connections.write().await;
        if connections.iter().any(|c| c.id == connection.id) {
            return Err(RepoError::database(
                "insert_connection",
                format!("duplicate connection id {}", connection.id),
            ));
        }
        connections.push(connection.clone());
        Ok(())
    }

    async fn update(
        &self,
        connection: &Connection,
        changes: &ConnectionChanges,
    ) -> Result<Connection, RepoError> {
        let mut connections = self.connections.write().await;
        let stored = connections
            .iter_mut()
            .find(|c| c.tenant_id == connection.tenant_id && c.id == connection.id)
            .ok_or_else(|| RepoError::not_found("Connection", connection.id))?;

        stored.apply(changes, self.clock.now());
        Ok(stored.clone())
    }
}
