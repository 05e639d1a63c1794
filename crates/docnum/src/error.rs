use crate::retry::Transient;

/// Result alias used throughout the numbering core.
pub type Result<T, E = StoreError> = core::result::Result<T, E>;

/// Failures surfaced by counter stores and persistence sessions.
///
/// Only [`StoreError::Transient`] is worth retrying; a [`StoreError::Collision`]
/// means the uniqueness backstop fired and the caller must allocate a fresh
/// number instead of replaying the same write.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not complete the operation right now (connection loss,
    /// lock timeout). Safe to retry.
    #[error("transient store failure: {context}")]
    Transient { context: String },

    /// A write was rejected because the document number already exists.
    #[error("document number already exists: {number}")]
    Collision { number: String },
}

impl StoreError {
    /// Shorthand for a transient failure with the given context.
    pub fn transient(context: impl Into<String>) -> Self {
        Self::Transient {
            context: context.into(),
        }
    }
}

impl Transient for StoreError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}
