//! Engine configuration loaded from environment variables.
//!
//! `main` loads `.env.local` / `.env` with dotenvy first, then calls
//! [`EngineConfig::from_env`]. Missing or unparseable values fall back to
//! defaults with a warning.
//!
//! # Environment Variables
//!
//! - `SWITCHBOARD_STORAGE` - `sqlite` or `memory` (default: `sqlite`)
//! - `SWITCHBOARD_DB_PATH` - SQLite file path (default: `switchboard.db`)
//! - `SERVER_HOST` - bind host (default: `0.0.0.0`)
//! - `SERVER_PORT` / `PORT` - bind port (default: 3000)
//! - `SWITCHBOARD_SERIALIZE_TENANT_WRITES` - hold a per-tenant lock around
//!   connection updates (default: false)
//! - `CORS_ALLOWED_ORIGINS` - `*` or a comma separated origin list (optional)

use std::str::FromStr;

/// Which connection store backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub storage: StorageBackend,
    pub db_path: String,
    pub server_host: String,
    pub server_port: u16,
    pub serialize_tenant_writes: bool,
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Sqlite,
            db_path: "switchboard.db".to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            serialize_tenant_writes: false,
            cors_allowed_origins: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Tests pass a map instead of the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let storage = parse_or("SWITCHBOARD_STORAGE", &lookup, defaults.storage);
        let db_path = lookup("SWITCHBOARD_DB_PATH").unwrap_or(defaults.db_path);
        let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "SERVER_PORT is not a valid port, using default");
                defaults.server_port
            }),
            None => defaults.server_port,
        };
        let serialize_tenant_writes = match lookup("SWITCHBOARD_SERIALIZE_TENANT_WRITES") {
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    value = %raw,
                    "SWITCHBOARD_SERIALIZE_TENANT_WRITES is not a boolean, ignoring"
                );
                defaults.serialize_tenant_writes
            }),
            None => defaults.serialize_tenant_writes,
        };
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            storage,
            db_path,
            server_host,
            server_port,
            serialize_tenant_writes,
            cors_allowed_origins,
        }
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Invalid configuration value, using default");
            default
        }),
        None => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
