//! Update connection use case.
//!
//! Applies a partial update to one connection and keeps at most one default
//! connection per tenant. When the update promotes the target to default, the
//! tenant's previous default (if any) is demoted first.
//!
//! The demotion and the target write are separate commits. If the target
//! turns out to be missing, the demotion is not rolled back: a caller
//! claiming default is enough to clear the previous holder. Concurrent
//! promotions in one tenant can race unless the use case is built with
//! [`UpdateConnection::serialized`].

use std::sync::Arc;

use switchboard_domain::{Connection, ConnectionChanges, ConnectionId, TenantId};

use crate::infrastructure::ports::ConnectionRepo;

use super::error::ConnectionError;
use super::input::ConnectionUpdateData;
use super::tenant_lock::TenantLocks;

/// Result of a connection update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedConnection {
    /// The target connection after the write.
    pub updated: Connection,
    /// The previous default, after demotion, if one was demoted.
    pub demoted: Option<Connection>,
}

/// Update connection use case.
///
/// Orchestrates: input validation, demotion of the previous default,
/// target lookup, partial write.
pub struct UpdateConnection {
    repo: Arc<dyn ConnectionRepo>,
    tenant_locks: Option<Arc<TenantLocks>>,
}

impl UpdateConnection {
    pub fn new(repo: Arc<dyn ConnectionRepo>) -> Self {
        Self {
            repo,
            tenant_locks: None,
        }
    }

    /// Hold a per-tenant lock for the whole update.
    pub fn serialized(mut self, locks: Arc<TenantLocks>) -> Self {
        self.tenant_locks = Some(locks);
        self
    }

    /// Execute the update.
    ///
    /// # Arguments
    /// * `data` - The partial update; absent fields are left unchanged
    /// * `target_id` - The connection to update
    /// * `tenant_id` - Tenant scope for every lookup
    ///
    /// # Returns
    /// * `Ok(UpdatedConnection)` - Target written, plus the demoted connection if any
    /// * `Err(ConnectionError::Validation)` - Bad `name` or `isDefault`, nothing written
    /// * `Err(ConnectionError::NotFound)` - Target missing for this tenant
    pub async fn execute(
        &self,
        data: ConnectionUpdateData,
        target_id: ConnectionId,
        tenant_id: TenantId,
    ) -> Result<UpdatedConnection, ConnectionError> {
        let changes = data.validate()?;

        let _guard = match &self.tenant_locks {
            Some(locks) => Some(locks.acquire(tenant_id).await),
            None => None,
        };

        let demoted = if changes.promotes_to_default() {
            self.demote_previous_default(tenant_id, target_id).await?
        } else {
            None
        };

        let Some(target) = self.repo.get(tenant_id, target_id).await? else {
            if let Some(demoted) = &demoted {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    connection_id = %target_id,
                    demoted_id = %demoted.id,
                    "Target connection not found after demoting previous default; demotion stands"
                );
            }
            return Err(ConnectionError::NotFound(target_id));
        };

        let updated = self.repo.update(&target, &changes).await?;

        tracing::info!(
            tenant_id = %tenant_id,
            connection_id = %updated.id,
            is_default = updated.is_default,
            demoted_id = ?demoted.as_ref().map(|d| d.id),
            "Connection updated"
        );

        Ok(UpdatedConnection { updated, demoted })
    }

    async fn demote_previous_default(
        &self,
        tenant_id: TenantId,
        target_id: ConnectionId,
    ) -> Result<Option<Connection>, ConnectionError> {
        let Some(previous) = self
            .repo
            .find_default_excluding(tenant_id, target_id)
            .await?
        else {
            return Ok(None);
        };

        let demoted = self
            .repo
            .update(&previous, &ConnectionChanges::demote())
            .await?;

        tracing::debug!(
            tenant_id = %tenant_id,
            connection_id = %demoted.id,
            "Demoted previous default connection"
        );

        Ok(Some(demoted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::memory::InMemoryConnectionRepo;
    use crate::infrastructure::ports::{MockConnectionRepo, RepoError};
    use crate::use_cases::connection::ERR_NO_CONNECTION_FOUND;
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::Sequence;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn data(value: serde_json::Value) -> ConnectionUpdateData {
        serde_json::from_value(value).unwrap()
    }

    fn applied(connection: &Connection, changes: &ConnectionChanges) -> Connection {
        let mut connection = connection.clone();
        connection.apply(changes, now());
        connection
    }

    // =========================================================================
    // Call ordering and side effects (mocked port)
    // =========================================================================

    #[tokio::test]
    async fn when_validation_fails_repo_is_never_touched() {
        // No expectations: any repo call panics
        let repo = MockConnectionRepo::new();
        let use_case = UpdateConnection::new(Arc::new(repo));

        let result = use_case
            .execute(
                data(json!({ "name": "A", "isDefault": true })),
                ConnectionId::new(),
                TenantId::new(),
            )
            .await;

        assert!(matches!(result, Err(ConnectionError::Validation(_))));
    }

    #[tokio::test]
    async fn when_is_default_is_not_boolean_repo_is_never_touched() {
        let repo = MockConnectionRepo::new();
        let use_case = UpdateConnection::new(Arc::new(repo));

        let result = use_case
            .execute(
                data(json!({ "isDefault": "true" })),
                ConnectionId::new(),
                TenantId::new(),
            )
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "isDefault must be a boolean");
    }

    #[tokio::test]
    async fn when_promoting_demotes_previous_default_before_loading_target() {
        let tenant_id = TenantId::new();
        let old = Connection::new(tenant_id, "Old", now()).with_default(true);
        let target = Connection::new(tenant_id, "Target", now());
        let old_id = old.id;
        let target_id = target.id;

        let mut repo = MockConnectionRepo::new();
        let mut seq = Sequence::new();

        let old_for_find = old.clone();
        repo.expect_find_default_excluding()
            .withf(move |t, exclude| *t == tenant_id && *exclude == target_id)
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(Some(old_for_find.clone())));
        repo.expect_update()
            .withf(move |c, changes| c.id == old_id && *changes == ConnectionChanges::demote())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|c, changes| Ok(applied(c, changes)));
        let target_for_get = target.clone();
        repo.expect_get()
            .withf(move |t, id| *t == tenant_id && *id == target_id)
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(Some(target_for_get.clone())));
        repo.expect_update()
            .withf(move |c, changes| c.id == target_id && changes.is_default == Some(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|c, changes| Ok(applied(c, changes)));

        let use_case = UpdateConnection::new(Arc::new(repo));
        let result = use_case
            .execute(data(json!({ "isDefault": true })), target_id, tenant_id)
            .await
            .unwrap();

        assert!(result.updated.is_default);
        let demoted = result.demoted.expect("previous default demoted");
        assert_eq!(demoted.id, old_id);
        assert!(!demoted.is_default);
    }

    #[tokio::test]
    async fn when_no_previous_default_nothing_is_demoted() {
        let tenant_id = TenantId::new();
        let target = Connection::new(tenant_id, "Target", now());
        let target_id = target.id;

        let mut repo = MockConnectionRepo::new();
        repo.expect_find_default_excluding()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_get()
            .times(1)
            .returning(move |_, _| Ok(Some(target.clone())));
        repo.expect_update()
            .withf(move |c, _| c.id == target_id)
            .times(1)
            .returning(|c, changes| Ok(applied(c, changes)));

        let use_case = UpdateConnection::new(Arc::new(repo));
        let result = use_case
            .execute(data(json!({ "isDefault": true })), target_id, tenant_id)
            .await
            .unwrap();

        assert!(result.updated.is_default);
        assert!(result.demoted.is_none());
    }

    #[tokio::test]
    async fn when_not_promoting_default_lookup_is_skipped() {
        let tenant_id = TenantId::new();
        let target = Connection::new(tenant_id, "Target", now()).with_default(true);
        let target_id = target.id;

        let mut repo = MockConnectionRepo::new();
        repo.expect_find_default_excluding().times(0);
        repo.expect_get()
            .times(1)
            .returning(move |_, _| Ok(Some(target.clone())));
        repo.expect_update()
            .times(1)
            .returning(|c, changes| Ok(applied(c, changes)));

        let use_case = UpdateConnection::new(Arc::new(repo));
        let result = use_case
            .execute(
                data(json!({ "isDefault": false, "status": "DISCONNECTED" })),
                target_id,
                tenant_id,
            )
            .await
            .unwrap();

        assert!(!result.updated.is_default);
        assert_eq!(result.updated.status.as_deref(), Some("DISCONNECTED"));
        assert!(result.demoted.is_none());
    }

    #[tokio::test]
    async fn when_target_missing_demotion_stands_and_not_found_is_returned() {
        let tenant_id = TenantId::new();
        let old = Connection::new(tenant_id, "Old", now()).with_default(true);
        let target_id = ConnectionId::new();

        let mut repo = MockConnectionRepo::new();
        repo.expect_find_default_excluding()
            .times(1)
            .returning(move |_, _| Ok(Some(old.clone())));
        // Exactly one write: the demotion. The target is never written.
        repo.expect_update()
            .withf(|_, changes| *changes == ConnectionChanges::demote())
            .times(1)
            .returning(|c, changes| Ok(applied(c, changes)));
        repo.expect_get().times(1).returning(|_, _| Ok(None));

        let use_case = UpdateConnection::new(Arc::new(repo));
        let err = use_case
            .execute(data(json!({ "isDefault": true })), target_id, tenant_id)
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectionError::NotFound(id) if id == target_id));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.code(), ERR_NO_CONNECTION_FOUND);
    }

    #[tokio::test]
    async fn when_repo_error_propagates() {
        let mut repo = MockConnectionRepo::new();
        repo.expect_get()
            .returning(|_, _| Err(RepoError::database("get_connection", "Database unavailable")));

        let use_case = UpdateConnection::new(Arc::new(repo));
        let err = use_case
            .execute(
                data(json!({ "name": "Main" })),
                ConnectionId::new(),
                TenantId::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectionError::Repo(_)));
        assert_eq!(err.status_code(), 500);
    }

    // =========================================================================
    // Behavior against the in-memory store
    // =========================================================================

    async fn seeded() -> (Arc<InMemoryConnectionRepo>, TenantId, Connection, Connection) {
        let repo = Arc::new(InMemoryConnectionRepo::new(Arc::new(FixedClock(now()))));
        let tenant_id = TenantId::new();
        let a = Connection::new(tenant_id, "Alpha", now()).with_default(true);
        let b = Connection::new(tenant_id, "Beta", now());
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();
        (repo, tenant_id, a, b)
    }

    #[tokio::test]
    async fn promoting_b_demotes_a() {
        let (repo, tenant_id, a, b) = seeded().await;
        let use_case = UpdateConnection::new(repo.clone());

        let result = use_case
            .execute(
                data(json!({ "isDefault": true, "name": "Main" })),
                b.id,
                tenant_id,
            )
            .await
            .unwrap();

        assert_eq!(result.updated.id, b.id);
        assert!(result.updated.is_default);
        assert_eq!(result.updated.name, "Main");
        let demoted = result.demoted.unwrap();
        assert_eq!(demoted.id, a.id);
        assert!(!demoted.is_default);

        let stored_a = repo.get(tenant_id, a.id).await.unwrap().unwrap();
        assert!(!stored_a.is_default);
        let defaults = repo
            .list_for_tenant(tenant_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.is_default)
            .count();
        assert_eq!(defaults, 1);
    }

    #[tokio::test]
    async fn re_promoting_current_default_demotes_nothing() {
        let (repo, tenant_id, a, _) = seeded().await;
        let use_case = UpdateConnection::new(repo.clone());

        let result = use_case
            .execute(data(json!({ "isDefault": true })), a.id, tenant_id)
            .await
            .unwrap();

        assert!(result.updated.is_default);
        assert!(result.demoted.is_none());
    }

    #[tokio::test]
    async fn promotion_in_other_tenant_leaves_default_alone() {
        let (repo, tenant_id, a, _) = seeded().await;
        let other_tenant = TenantId::new();
        let other = Connection::new(other_tenant, "Other", now());
        repo.insert(&other).await.unwrap();

        let use_case = UpdateConnection::new(repo.clone());
        let result = use_case
            .execute(data(json!({ "isDefault": true })), other.id, other_tenant)
            .await
            .unwrap();

        assert!(result.demoted.is_none());
        assert!(repo.get(tenant_id, a.id).await.unwrap().unwrap().is_default);
    }

    #[tokio::test]
    async fn target_of_other_tenant_is_not_found() {
        let (repo, _, _, b) = seeded().await;
        let use_case = UpdateConnection::new(repo.clone());

        let err = use_case
            .execute(data(json!({ "name": "Stolen" })), b.id, TenantId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectionError::NotFound(_)));
        assert_eq!(repo.get(b.tenant_id, b.id).await.unwrap().unwrap().name, "Beta");
    }

    #[tokio::test]
    async fn missing_target_still_demotes_previous_default() {
        let (repo, tenant_id, a, _) = seeded().await;
        let use_case = UpdateConnection::new(repo.clone());

        let err = use_case
            .execute(data(json!({ "isDefault": true })), ConnectionId::new(), tenant_id)
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectionError::NotFound(_)));
        assert!(!repo.get(tenant_id, a.id).await.unwrap().unwrap().is_default);
    }

    #[tokio::test]
    async fn instagram_key_is_preserved_unless_non_empty() {
        let repo = Arc::new(InMemoryConnectionRepo::new(Arc::new(FixedClock(now()))));
        let tenant_id = TenantId::new();
        let conn = Connection::new(tenant_id, "Insta", now()).with_instagram_key("secret");
        repo.insert(&conn).await.unwrap();
        let use_case = UpdateConnection::new(repo.clone());

        for payload in [
            json!({ "instagramUser": "shop" }),
            json!({ "instagramKey": "" }),
            json!({ "instagramKey": null }),
        ] {
            let result = use_case.execute(data(payload), conn.id, tenant_id).await.unwrap();
            assert_eq!(result.updated.instagram_key.as_deref(), Some("secret"));
        }

        let result = use_case
            .execute(data(json!({ "instagramKey": "rotated" })), conn.id, tenant_id)
            .await
            .unwrap();
        assert_eq!(result.updated.instagram_key.as_deref(), Some("rotated"));
        assert_eq!(result.updated.instagram_user.as_deref(), Some("shop"));
    }

    #[tokio::test]
    async fn validation_failure_leaves_store_untouched() {
        let (repo, tenant_id, a, b) = seeded().await;
        let use_case = UpdateConnection::new(repo.clone());

        let err = use_case
            .execute(data(json!({ "isDefault": true, "name": "X" })), b.id, tenant_id)
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectionError::Validation(_)));
        assert_eq!(repo.get(tenant_id, a.id).await.unwrap().unwrap(), a);
        assert_eq!(repo.get(tenant_id, b.id).await.unwrap().unwrap(), b);
    }

    // =========================================================================
    // Concurrent promotions
    // =========================================================================

    /// Delegates to the in-memory store but pauses after the default lookup,
    /// so a concurrent promotion can slip in between the read and the write.
    struct SlowDefaultLookup {
        inner: InMemoryConnectionRepo,
    }

    #[async_trait::async_trait]
    impl ConnectionRepo for SlowDefaultLookup {
        async fn get(
            &self,
            tenant_id: TenantId,
            id: ConnectionId,
        ) -> Result<Option<Connection>, RepoError> {
            self.inner.get(tenant_id, id).await
        }

        async fn find_default_excluding(
            &self,
            tenant_id: TenantId,
            exclude: ConnectionId,
        ) -> Result<Option<Connection>, RepoError> {
            let found = self.inner.find_default_excluding(tenant_id, exclude).await;
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            found
        }

        async fn list_for_tenant(
            &self,
            tenant_id: TenantId,
        ) -> Result<Vec<Connection>, RepoError> {
            self.inner.list_for_tenant(tenant_id).await
        }

        async fn insert(&self, connection: &Connection) -> Result<(), RepoError> {
            self.inner.insert(connection).await
        }

        async fn update(
            &self,
            connection: &Connection,
            changes: &ConnectionChanges,
        ) -> Result<Connection, RepoError> {
            self.inner.update(connection, changes).await
        }
    }

    /// Promote every connection of a fresh tenant at once and count the defaults left.
    async fn promote_all_concurrently(locks: Option<Arc<TenantLocks>>) -> usize {
        let repo = Arc::new(SlowDefaultLookup {
            inner: InMemoryConnectionRepo::new(Arc::new(FixedClock(now()))),
        });
        let tenant_id = TenantId::new();
        let mut ids = Vec::new();
        for i in 0..8 {
            let conn = Connection::new(tenant_id, format!("Conn {i}"), now());
            ids.push(conn.id);
            repo.insert(&conn).await.unwrap();
        }

        let use_case = UpdateConnection::new(repo.clone());
        let use_case = Arc::new(match locks {
            Some(locks) => use_case.serialized(locks),
            None => use_case,
        });

        let handles: Vec<_> = ids
            .iter()
            .map(|id| {
                let use_case = use_case.clone();
                let id = *id;
                tokio::spawn(async move {
                    use_case
                        .execute(
                            ConnectionUpdateData::default().with_default(true),
                            id,
                            tenant_id,
                        )
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        repo.list_for_tenant(tenant_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.is_default)
            .count()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn unserialized_concurrent_promotions_can_leave_several_defaults() {
        // Every task reads "no default" before any of them writes
        let defaults = promote_all_concurrently(None).await;
        assert!(defaults > 1, "expected a race, got {defaults} default(s)");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn serialized_concurrent_promotions_leave_one_default() {
        let defaults = promote_all_concurrently(Some(Arc::new(TenantLocks::new()))).await;
        assert_eq!(defaults, 1);
    }
}
