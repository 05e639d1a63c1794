//! Per-year sequence allocation for uniquely numbered archive documents.
//!
//! This crate is the numbering core of the AGB document archive. It provides:
//!
//! - [`DocumentNumber`]: the formatted, parseable number value type
//! - [`CounterStore`]: the atomic per-year serial source, with
//!   [`MemoryCounterStore`] as the in-process implementation
//! - [`SequenceAllocator`]: one call, one atomic increment, one unique number
//! - [`RetryPolicy`]: a bounded retry executor with exponential backoff and a
//!   per-attempt timeout, used to harden every store interaction
//!
//! Uniqueness is a direct consequence of the counter contract: the store
//! increments and reads back the per-year serial in a single atomic step, so
//! no existence scan is needed and none is performed. A uniqueness constraint
//! at the storage layer remains a backstop, never the mechanism.

mod alloc;
mod counter;
mod error;
mod number;
mod retry;

pub use crate::alloc::*;
pub use crate::counter::*;
pub use crate::error::*;
pub use crate::number::*;
pub use crate::retry::*;
