//! Bulk issuance of uniquely numbered archive documents.
//!
//! This crate drives the [`docnum`] sequence allocator on behalf of a
//! classification catalog: a single bulk request names classification codes
//! and per-code quantities, and the [`BulkIssuer`] validates limits, resolves
//! each classification, allocates one number per requested unit, batches the
//! writes into one open unit of work, and reports partial success.
//!
//! Collaborators are traits at the seams: [`ClassificationLookup`] for the
//! catalog, [`Session`] for scoped persistence (stage/flush/commit/rollback),
//! and [`Clock`] for calendar time. In-memory implementations of each ship
//! with the crate for tests and single-process embedding.

mod catalog;
mod clock;
mod config;
mod document;
mod error;
mod issuer;
mod request;
mod session;

pub use crate::catalog::*;
pub use crate::clock::*;
pub use crate::config::*;
pub use crate::document::*;
pub use crate::error::*;
pub use crate::issuer::*;
pub use crate::request::*;
pub use crate::session::*;
