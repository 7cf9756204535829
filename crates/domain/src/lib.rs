//! Switchboard domain - connection records, value objects and invariants.
//!
//! This crate has no I/O. Persistence and transport live in
//! `switchboard-engine`.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{Connection, ConnectionChanges};
pub use error::DomainError;
pub use ids::{ConnectionId, TenantId};
pub use value_objects::{ConnectionName, FieldUpdate};
