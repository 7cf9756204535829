//! SQLite-backed connection storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use switchboard_domain::{Connection, ConnectionChanges, ConnectionId, TenantId};
use uuid::Uuid;

use crate::infrastructure::ports::{ClockPort, ConnectionRepo, RepoError};

const SELECT_COLUMNS: &str = "id, tenant_id, name, status, session, is_default, token_telegram, \
     instagram_user, instagram_key, created_at, updated_at";

/// SQLite implementation for connection storage.
pub struct SqliteConnectionRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

/// A single bound value in a dynamically built UPDATE.
enum Column {
    Text(Option<String>),
    Flag(bool),
}

impl SqliteConnectionRepo {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connections", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS connections (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                name TEXT NOT NULL,
                status TEXT,
                session TEXT,
                is_default INTEGER NOT NULL DEFAULT 0,
                token_telegram TEXT,
                instagram_user TEXT,
                instagram_key TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("connections", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_connections_tenant_default \
             ON connections (tenant_id, is_default)",
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("connections", e))?;

        Ok(Self { pool, clock })
    }

    fn row_to_connection(row: &SqliteRow) -> Result<Connection, RepoError> {
        let text = |col: &'static str| -> Result<String, RepoError> {
            row.try_get::<String, _>(col)
                .map_err(|e| RepoError::serialization(format!("{col}: {e}")))
        };
        let optional = |col: &'static str| -> Result<Option<String>, RepoError> {
            row.try_get::<Option<String>, _>(col)
                .map_err(|e| RepoError::serialization(format!("{col}: {e}")))
        };

        let id = parse_uuid(&text("id")?)?;
        let tenant_id = parse_uuid(&text("tenant_id")?)?;
        let is_default: bool = row
            .try_get("is_default")
            .map_err(|e| RepoError::serialization(format!("is_default: {e}")))?;

        Ok(Connection {
            id: ConnectionId::from_uuid(id),
            tenant_id: TenantId::from_uuid(tenant_id),
            name: text("name")?,
            status: optional("status")?,
            session: optional("session")?,
            is_default,
            token_telegram: optional("token_telegram")?,
            instagram_user: optional("instagram_user")?,
            instagram_key: optional("instagram_key")?,
            created_at: parse_timestamp(&text("created_at")?)?,
            updated_at: parse_timestamp(&text("updated_at")?)?,
        })
    }

    /// Column assignments for the present fields of `changes`, in bind order.
    fn assignments(changes: &ConnectionChanges) -> Vec<(&'static str, Column)> {
        let mut columns = Vec::new();

        if let Some(name) = &changes.name {
            columns.push(("name", Column::Text(Some(name.as_str().to_string()))));
        }
        for (col, field) in [
            ("status", &changes.status),
            ("session", &changes.session),
            ("token_telegram", &changes.token_telegram),
            ("instagram_user", &changes.instagram_user),
        ] {
            if let Some(value) = field.as_write() {
                columns.push((col, Column::Text(value.cloned())));
            }
        }
        if let Some(is_default) = changes.is_default {
            columns.push(("is_default", Column::Flag(is_default)));
        }
        if let Some(key) = changes.instagram_key() {
            columns.push(("instagram_key", Column::Text(Some(key.to_string()))));
        }

        columns
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(value).map_err(|e| RepoError::serialization(format!("invalid uuid {value}: {e}")))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("invalid timestamp {value}: {e}")))
}

#[async_trait]
impl ConnectionRepo for SqliteConnectionRepo {
    async fn get(
        &self,
        tenant_id: TenantId,
        id: ConnectionId,
    ) -> Result<Option<Connection>, RepoError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM connections WHERE id = ? AND tenant_id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .bind(tenant_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_connection", e))?;

        row.as_ref().map(Self::row_to_connection).transpose()
    }

    async fn find_default_excluding(
        &self,
        tenant_id: TenantId,
        exclude: ConnectionId,
    ) -> Result<Option<Connection>, RepoError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM connections \
             WHERE tenant_id = ? AND is_default = 1 AND id <> ? \
             ORDER BY created_at, rowid LIMIT 1"
        );
        let row = sqlx::query(&query)
            .bind(tenant_id.to_string())
            .bind(exclude.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("find_default_connection", e))?;

        row.as_ref().map(Self::row_to_connection).transpose()
    }

    async fn list_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Connection>, RepoError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM connections WHERE tenant_id = ? ORDER BY created_at, rowid"
        );
        let rows = sqlx::query(&query)
            .bind(tenant_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_connections", e))?;

        rows.iter().map(Self::row_to_connection).collect()
    }

    async fn insert(&self, connection: &Connection) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO connections (
                id, tenant_id, name, status, session, is_default,
                token_telegram, instagram_user, instagram_key, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(connection.id.to_string())
        .bind(connection.tenant_id.to_string())
        .bind(&connection.name)
        .bind(&connection.status)
        .bind(&connection.session)
        .bind(connection.is_default)
        .bind(&connection.token_telegram)
        .bind(&connection.instagram_user)
        .bind(&connection.instagram_key)
        .bind(connection.created_at.to_rfc3339())
        .bind(connection.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("insert_connection", e))?;

        Ok(())
    }

    async fn update(
        &self,
        connection: &Connection,
        changes: &ConnectionChanges,
    ) -> Result<Connection, RepoError> {
        let columns = Self::assignments(changes);
        let now = self.clock.now().to_rfc3339();

        let mut sql = String::from("UPDATE connections SET ");
        for (col, _) in &columns {
            sql.push_str(col);
            sql.push_str(" = ?, ");
        }
        sql.push_str("updated_at = ? WHERE id = ? AND tenant_id = ?");

        let mut q = sqlx::query(&sql);
        for (_, value) in columns {
            q = match value {
                Column::Text(text) => q.bind(text),
                Column::Flag(flag) => q.bind(flag),
            };
        }

        let result = q
            .bind(now)
            .bind(connection.id.to_string())
            .bind(connection.tenant_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("update_connection", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Connection", connection.id));
        }

        self.get(connection.tenant_id, connection.id)
            .await?
            .ok_or_else(|| RepoError::not_found("Connection", connection.id))
    }
}
