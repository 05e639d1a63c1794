//! Error taxonomy for bulk issuance.
//!
//! Two tiers, matching how callers must react:
//!
//! - [`IssueError`] short-circuits the whole request. `Validation` maps to a
//!   client error (HTTP 400 at a transport boundary; nothing was written),
//!   `Store` to a server error (HTTP 500; the unit of work was rolled back).
//! - [`ItemError`] never aborts anything: each is rendered into the
//!   outcome's `errors` list and processing continues. A request where every
//!   item fails this way still returns cleanly (HTTP 200) with
//!   `success = false`.

use docnum::{RetryError, StoreError};

/// A failure that aborts the whole bulk request.
#[derive(thiserror::Error, Debug)]
pub enum IssueError {
    /// The request exceeded a hard limit. Rejected before any persistence,
    /// with zero side effects.
    #[error("invalid request: {reason}")]
    Validation { reason: String },

    /// A store interaction exhausted its retries or failed fatally; the
    /// whole unit of work was rolled back.
    #[error("store failure: {0}")]
    Store(#[from] RetryError<StoreError>),
}

impl IssueError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}

/// A per-item or per-unit problem recorded into the outcome's `errors` list.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum ItemError {
    #[error("classification {code} not found")]
    ClassificationNotFound { code: String },

    #[error("quantity {quantity} for {code} exceeds the per-item limit of {limit}")]
    QuantityLimit {
        code: String,
        quantity: u32,
        limit: u32,
    },

    #[error("quantity for {code} must be at least 1")]
    ZeroQuantity { code: String },

    #[error("could not stage a unit of {code}: {number} still collides after {attempts} attempts")]
    Collision {
        code: String,
        number: String,
        attempts: u32,
    },
}
