use crate::document::IssuedDocument;
use docnum::{Result, StoreError};
use parking_lot::Mutex;
use std::collections::HashSet;

/// A scoped persistence handle for one unit of work.
///
/// The issuer opens exactly one session per bulk request and drives it
/// through stage → flush → commit (or rollback). Flushing pushes staged rows
/// toward the store without making them durable; everything staged across
/// all flushes belongs to the same open unit of work until [`commit`] or
/// [`rollback`].
///
/// Handles are internally synchronized and taken by shared reference so that
/// retry closures can re-enter them; implementations over a real store are
/// expected to wrap a connection or transaction guard the same way.
///
/// [`commit`]: Session::commit
/// [`rollback`]: Session::rollback
pub trait Session {
    /// Adds a document to the open unit of work.
    ///
    /// # Errors
    ///
    /// [`StoreError::Collision`] when the store-side uniqueness backstop
    /// rejects the document's number at write time. Not retryable as-is; the
    /// caller allocates a fresh number instead.
    fn stage_write(&self, doc: IssuedDocument) -> impl Future<Output = Result<()>> + Send;

    /// Pushes staged rows toward the store without committing.
    fn flush(&self) -> impl Future<Output = Result<()>> + Send;

    /// Makes the whole unit of work durable.
    fn commit(&self) -> impl Future<Output = Result<()>> + Send;

    /// Discards the open unit of work. Infallible by contract; a handle that
    /// cannot roll back should drop the work on close instead.
    fn rollback(&self) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Default)]
struct MemorySessionState {
    staged: Vec<IssuedDocument>,
    flushed: Vec<IssuedDocument>,
    committed: Vec<IssuedDocument>,
    seen_numbers: HashSet<String>,
    flush_calls: u32,
    failures: MemorySessionFailures,
}

/// Scripted failure injection for [`MemorySession`].
#[derive(Debug, Default)]
struct MemorySessionFailures {
    /// Remaining flush calls to fail transiently.
    flush: u32,
    /// Remaining commit calls to fail transiently.
    commit: u32,
}

/// In-process [`Session`] with a uniqueness backstop over document numbers.
///
/// Used by the test suites and suitable for single-process embedding. The
/// backstop spans staged, flushed and committed rows, so a collision is
/// reported at stage time — the earliest point a real store could detect it.
#[derive(Debug, Default)]
pub struct MemorySession {
    state: Mutex<MemorySessionState>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds the uniqueness backstop, as if `number` were already
    /// committed by an earlier request.
    pub fn seed_number(&self, number: impl Into<String>) {
        self.state.lock().seen_numbers.insert(number.into());
    }

    /// Makes the next `calls` flushes fail transiently.
    pub fn fail_next_flushes(&self, calls: u32) {
        self.state.lock().failures.flush = calls;
    }

    /// Makes the next `calls` commits fail transiently.
    pub fn fail_next_commits(&self, calls: u32) {
        self.state.lock().failures.commit = calls;
    }

    /// Documents made durable by [`Session::commit`].
    pub fn committed(&self) -> Vec<IssuedDocument> {
        self.state.lock().committed.clone()
    }

    /// Rows staged or flushed but not yet committed.
    pub fn pending(&self) -> usize {
        let state = self.state.lock();
        state.staged.len() + state.flushed.len()
    }

    /// How many times [`Session::flush`] was invoked, failed calls included.
    pub fn flush_calls(&self) -> u32 {
        self.state.lock().flush_calls
    }
}

impl Session for MemorySession {
    async fn stage_write(&self, doc: IssuedDocument) -> Result<()> {
        let mut state = self.state.lock();
        if !state.seen_numbers.insert(doc.number.clone()) {
            return Err(StoreError::Collision { number: doc.number });
        }
        state.staged.push(doc);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.flush_calls += 1;
        if state.failures.flush > 0 {
            state.failures.flush -= 1;
            return Err(StoreError::transient("injected flush failure"));
        }
        let staged = std::mem::take(&mut state.staged);
        state.flushed.extend(staged);
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.failures.commit > 0 {
            state.failures.commit -= 1;
            return Err(StoreError::transient("injected commit failure"));
        }
        let staged = std::mem::take(&mut state.staged);
        state.flushed.extend(staged);
        let flushed = std::mem::take(&mut state.flushed);
        state.committed.extend(flushed);
        Ok(())
    }

    async fn rollback(&self) {
        let mut state = self.state.lock();
        // Numbers from the discarded rows stay burned; the counter never
        // rewinds, so they can never be handed out again anyway.
        state.staged.clear();
        state.flushed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docnum::Transient;

    fn doc(number: &str) -> IssuedDocument {
        IssuedDocument {
            number: number.to_owned(),
            title: "Core box HQ".to_owned(),
            order_reference: "ORD-1".to_owned(),
            classification_code: "HQ-A".to_owned(),
            quantity: 1,
            created_by: "user-7".into(),
            status: crate::document::DEFAULT_STATUS.to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn commit_moves_all_open_work() {
        let session = MemorySession::new();
        session.stage_write(doc("AGB HQ 000001 25")).await.unwrap();
        session.flush().await.unwrap();
        session.stage_write(doc("AGB HQ 000002 25")).await.unwrap();
        session.commit().await.unwrap();

        assert_eq!(session.committed().len(), 2);
        assert_eq!(session.pending(), 0);
    }

    #[tokio::test]
    async fn duplicate_number_is_a_collision() {
        let session = MemorySession::new();
        session.stage_write(doc("AGB HQ 000001 25")).await.unwrap();
        let err = session.stage_write(doc("AGB HQ 000001 25")).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Collision {
                number: "AGB HQ 000001 25".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn rollback_discards_uncommitted_rows() {
        let session = MemorySession::new();
        session.stage_write(doc("AGB HQ 000001 25")).await.unwrap();
        session.flush().await.unwrap();
        session.rollback().await;
        assert_eq!(session.pending(), 0);
        assert!(session.committed().is_empty());
    }

    #[tokio::test]
    async fn injected_flush_failures_are_transient_and_bounded() {
        let session = MemorySession::new();
        session.fail_next_flushes(1);
        session.stage_write(doc("AGB HQ 000001 25")).await.unwrap();
        assert!(session.flush().await.unwrap_err().is_transient());
        session.flush().await.unwrap();
        assert_eq!(session.pending(), 1);
    }
}
