//! Value objects - Immutable objects defined by their attributes

mod field_update;
mod names;

pub use field_update::FieldUpdate;
pub use names::{ConnectionName, MIN_CONNECTION_NAME_LENGTH};
