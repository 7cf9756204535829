//! Read-only connection queries.

use std::sync::Arc;

use switchboard_domain::{Connection, ConnectionId, TenantId};

use crate::infrastructure::ports::ConnectionRepo;

use super::error::ConnectionError;

pub struct ConnectionQueries {
    repo: Arc<dyn ConnectionRepo>,
}

impl ConnectionQueries {
    pub fn new(repo: Arc<dyn ConnectionRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, tenant_id: TenantId) -> Result<Vec<Connection>, ConnectionError> {
        Ok(self.repo.list_for_tenant(tenant_id).await?)
    }

    pub async fn get(
        &self,
        tenant_id: TenantId,
        id: ConnectionId,
    ) -> Result<Connection, ConnectionError> {
        self.repo
            .get(tenant_id, id)
            .await?
            .ok_or(ConnectionError::NotFound(id))
    }
}
