//! Per-tenant write serialization.

use dashmap::DashMap;
use std::sync::Arc;
use switchboard_domain::TenantId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per tenant, created on first use and dropped once no
/// task holds or waits on it.
///
/// Only serializes writers inside this process. Other processes sharing the
/// same database are not covered.
#[derive(Default)]
pub struct TenantLocks {
    locks: DashMap<TenantId, Arc<Mutex<()>>>,
}

/// Held for the duration of a tenant-scoped write.
pub struct TenantLockGuard<'a> {
    locks: &'a TenantLocks,
    tenant_id: TenantId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl TenantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, tenant_id: TenantId) -> TenantLockGuard<'_> {
        // Clone the Arc out so the DashMap shard guard is released before awaiting.
        let lock = self
            .locks
            .entry(tenant_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;

        TenantLockGuard {
            locks: self,
            tenant_id,
            guard: Some(guard),
        }
    }

    /// Number of tenants with a live lock entry.
    pub fn tracked_tenants(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for TenantLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold their own clone, so a count of one means only the map is left.
        self.locks
            .locks
            .remove_if(&self.tenant_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
