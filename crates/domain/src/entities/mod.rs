//! Domain entities - Core business objects with identity

mod connection;

pub use connection::{Connection, ConnectionChanges};
