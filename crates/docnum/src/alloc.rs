use crate::counter::CounterStore;
use crate::error::Result;
use crate::number::DocumentNumber;

/// Manufactures unique document numbers from a per-year counter.
///
/// One [`next`] call performs exactly one atomic increment against the
/// backing [`CounterStore`] and formats the result. Because the store hands
/// back the post-increment serial from the same atomic step, concurrent
/// allocations for the same year interleave safely without any
/// application-level lock, and no "scan for the current maximum" pass exists
/// anywhere in this crate.
///
/// # Example
///
/// ```
/// use docnum::{MemoryCounterStore, SequenceAllocator};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let allocator = SequenceAllocator::new(MemoryCounterStore::new());
/// let n = allocator.next(2025, "HQ", Some("05-07")).await.unwrap();
/// assert_eq!(n.to_string(), "AGB 05-07 HQ 000001 25");
/// # });
/// ```
///
/// [`next`]: SequenceAllocator::next
#[derive(Debug)]
pub struct SequenceAllocator<S> {
    store: S,
}

impl<S: CounterStore> SequenceAllocator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The backing counter store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Allocates the next number for `year` under the given classification
    /// attributes.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError::Transient`](crate::StoreError::Transient)
    /// from the counter store; callers run this through a
    /// [`RetryPolicy`](crate::RetryPolicy).
    pub async fn next(
        &self,
        year: i32,
        matrix: &str,
        drilling_depth: Option<&str>,
    ) -> Result<DocumentNumber> {
        let serial = self.store.increment(year).await?;
        let number = DocumentNumber::new(year, serial, matrix, drilling_depth);
        tracing::trace!(%number, year, serial, "allocated document number");
        Ok(number)
    }
}
