//! Explicit field presence for partial writes.

/// How a single nullable column is treated by a partial write.
///
/// `Keep` is the absent case and never touches the stored value. `Clear`
/// writes NULL. `Set` writes the given value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    /// Build from a double option: outer `None` is absent, inner `None` is null.
    pub fn from_presence(value: Option<Option<T>>) -> Self {
        match value {
            None => Self::Keep,
            Some(None) => Self::Clear,
            Some(Some(v)) => Self::Set(v),
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// The value to write, if this field is written at all.
    ///
    /// Returns `None` for `Keep`, `Some(None)` for `Clear`.
    pub fn as_write(&self) -> Option<Option<&T>> {
        match self {
            Self::Keep => None,
            Self::Clear => Some(None),
            Self::Set(v) => Some(Some(v)),
        }
    }
}

impl<T: Clone> FieldUpdate<T> {
    /// Apply to a stored slot.
    pub fn apply_to(&self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Set(v) => *slot = Some(v.clone()),
        }
    }
}
