use crate::catalog::{ClassificationLookup, ClassificationRecord};
use crate::clock::Clock;
use crate::config::IssueLimits;
use crate::document::{ActorId, DEFAULT_STATUS, IssuedDocument};
use crate::error::{IssueError, ItemError};
use crate::request::{BulkIssueOutcome, BulkIssueRequest};
use crate::session::Session;
use docnum::{CounterStore, DocumentNumber, RetryError, RetryPolicy, SequenceAllocator, StoreError};

/// How many fresh numbers to try when the uniqueness backstop rejects one.
///
/// Unreachable under the atomic allocator; only a store-side backstop firing
/// (e.g. rows imported from a legacy numbering scheme) can get us here.
const COLLISION_REALLOC_ATTEMPTS: u32 = 3;

/// A document waiting in the write buffer, keeping its structured number
/// alongside the row so a collision can be re-allocated with the same
/// classification attributes.
struct PendingUnit {
    number: DocumentNumber,
    doc: IssuedDocument,
}

/// What became of one buffered unit at stage time.
enum Staged {
    Written(IssuedDocument),
    Skipped(ItemError),
}

/// Orchestrates a multi-item issuance request into one unit of work.
///
/// `issue` validates the request limits, resolves each classification,
/// allocates one number per requested unit through the retry policy, buffers
/// rows and flushes every [`IssueLimits::batch_size`] staged writes, and
/// commits once at the end. Item-level problems (unknown code, oversized
/// quantity) degrade that item only; the rest of the request proceeds and
/// the outcome reports both the created documents and the accumulated
/// errors. Only limit violations and retry exhaustion abort the request.
pub struct BulkIssuer<S, L, C> {
    allocator: SequenceAllocator<S>,
    catalog: L,
    clock: C,
    limits: IssueLimits,
    retry: RetryPolicy,
}

impl<S, L, C> BulkIssuer<S, L, C>
where
    S: CounterStore,
    L: ClassificationLookup,
    C: Clock,
{
    pub fn new(counter_store: S, catalog: L, clock: C) -> Self {
        Self {
            allocator: SequenceAllocator::new(counter_store),
            catalog,
            clock,
            limits: IssueLimits::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_limits(mut self, limits: IssueLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Issues documents for every item in `request` on behalf of `actor`.
    ///
    /// The session is the request's unit of work: everything staged across
    /// all intermediate flushes is committed together, or rolled back
    /// together. Partial success is success — `Ok` with `success = true` can
    /// carry a non-empty `errors` list, and an all-items-invalid request is
    /// `Ok` with `success = false`, not an error.
    ///
    /// # Errors
    ///
    /// - [`IssueError::Validation`] when the request exceeds
    ///   [`IssueLimits::max_item_types`] or [`IssueLimits::max_total_items`];
    ///   nothing was written and no counter moved.
    /// - [`IssueError::Store`] when a store interaction exhausted its
    ///   retries; the unit of work was rolled back.
    pub async fn issue<Ses>(
        &self,
        request: &BulkIssueRequest,
        actor: &ActorId,
        session: &Ses,
    ) -> Result<BulkIssueOutcome, IssueError>
    where
        Ses: Session + Sync,
    {
        if request.items.len() > self.limits.max_item_types {
            return Err(IssueError::validation(format!(
                "{} item types exceed the limit of {}",
                request.items.len(),
                self.limits.max_item_types
            )));
        }
        let total = request.total_quantity();
        if total > self.limits.max_total_items {
            return Err(IssueError::validation(format!(
                "total quantity {} exceeds the limit of {}",
                total, self.limits.max_total_items
            )));
        }

        match self.process(request, actor, session).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(error = %e, "bulk issuance aborted, rolling back");
                session.rollback().await;
                Err(IssueError::Store(e))
            }
        }
    }

    async fn process<Ses>(
        &self,
        request: &BulkIssueRequest,
        actor: &ActorId,
        session: &Ses,
    ) -> Result<BulkIssueOutcome, RetryError<StoreError>>
    where
        Ses: Session + Sync,
    {
        let year = self.clock.current_year();
        let batch_size = self.limits.batch_size as usize;
        let mut pending: Vec<PendingUnit> = Vec::with_capacity(batch_size);
        let mut created: Vec<IssuedDocument> = Vec::new();
        let mut errors: Vec<ItemError> = Vec::new();

        for item in &request.items {
            let code = item.classification_code.as_str();
            if item.quantity == 0 {
                errors.push(ItemError::ZeroQuantity {
                    code: code.to_owned(),
                });
                continue;
            }
            if item.quantity > self.limits.batch_size {
                errors.push(ItemError::QuantityLimit {
                    code: code.to_owned(),
                    quantity: item.quantity,
                    limit: self.limits.batch_size,
                });
                continue;
            }

            let record = match self.retry.run(|| self.catalog.find(code)).await? {
                Some(record) => record,
                None => {
                    tracing::warn!(code, "classification not found, skipping item");
                    errors.push(ItemError::ClassificationNotFound {
                        code: code.to_owned(),
                    });
                    continue;
                }
            };

            for _ in 0..item.quantity {
                let number = self
                    .retry
                    .run(|| {
                        self.allocator
                            .next(year, &record.matrix, record.drilling_depth.as_deref())
                    })
                    .await?;
                pending.push(self.build_unit(number, &record, request, actor));

                if pending.len() >= batch_size {
                    self.flush_batch(session, &mut pending, &mut created, &mut errors, year)
                        .await?;
                }
            }
        }

        if !pending.is_empty() {
            self.flush_batch(session, &mut pending, &mut created, &mut errors, year)
                .await?;
        }

        if created.is_empty() {
            session.rollback().await;
            tracing::info!(
                order_reference = %request.order_reference,
                errors = errors.len(),
                "bulk issuance created nothing, rolled back"
            );
            return Ok(BulkIssueOutcome {
                success: false,
                message: "no documents were created".to_owned(),
                documents: Vec::new(),
                errors: errors.iter().map(ToString::to_string).collect(),
            });
        }

        self.retry.run(|| session.commit()).await?;
        tracing::info!(
            order_reference = %request.order_reference,
            created = created.len(),
            errors = errors.len(),
            "bulk issuance committed"
        );
        Ok(BulkIssueOutcome {
            success: true,
            message: format!(
                "created {} of {} requested documents",
                created.len(),
                request.total_quantity()
            ),
            documents: created,
            errors: errors.iter().map(ToString::to_string).collect(),
        })
    }

    /// Stages every buffered unit, then flushes the session. The flush pushes
    /// rows toward the store but commits nothing; the unit of work stays
    /// open.
    async fn flush_batch<Ses>(
        &self,
        session: &Ses,
        pending: &mut Vec<PendingUnit>,
        created: &mut Vec<IssuedDocument>,
        errors: &mut Vec<ItemError>,
        year: i32,
    ) -> Result<(), RetryError<StoreError>>
    where
        Ses: Session + Sync,
    {
        let batch = pending.len();
        for unit in pending.drain(..) {
            match self.stage_unit(session, unit, year).await? {
                Staged::Written(doc) => created.push(doc),
                Staged::Skipped(e) => {
                    tracing::warn!(error = %e, "unit skipped at stage time");
                    errors.push(e);
                }
            }
        }
        self.retry.run(|| session.flush()).await?;
        tracing::debug!(batch, staged_total = created.len(), "batch flushed");
        Ok(())
    }

    /// Stages one unit, re-allocating a fresh number (bounded) when the
    /// store-side uniqueness backstop reports a collision.
    async fn stage_unit<Ses>(
        &self,
        session: &Ses,
        mut unit: PendingUnit,
        year: i32,
    ) -> Result<Staged, RetryError<StoreError>>
    where
        Ses: Session + Sync,
    {
        let mut attempts = 1u32;
        loop {
            match self.retry.run(|| session.stage_write(unit.doc.clone())).await {
                Ok(()) => return Ok(Staged::Written(unit.doc)),
                Err(RetryError::Fatal(StoreError::Collision { number })) => {
                    if attempts >= COLLISION_REALLOC_ATTEMPTS {
                        return Ok(Staged::Skipped(ItemError::Collision {
                            code: unit.doc.classification_code,
                            number,
                            attempts,
                        }));
                    }
                    attempts += 1;
                    tracing::warn!(
                        %number,
                        attempts,
                        "uniqueness backstop fired, re-allocating"
                    );
                    // The counter never rewinds, so a fresh allocation cannot
                    // hand the colliding number back out.
                    let fresh = self
                        .retry
                        .run(|| {
                            self.allocator.next(
                                year,
                                unit.number.matrix(),
                                unit.number.drilling_depth(),
                            )
                        })
                        .await?;
                    unit.doc.number = fresh.to_string();
                    unit.number = fresh;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn build_unit(
        &self,
        number: DocumentNumber,
        record: &ClassificationRecord,
        request: &BulkIssueRequest,
        actor: &ActorId,
    ) -> PendingUnit {
        let title = match record.drilling_depth.as_deref() {
            Some(depth) => format!("{} {} {}", record.name, record.matrix, depth),
            None => format!("{} {}", record.name, record.matrix),
        };
        let now = self.clock.now();
        let doc = IssuedDocument {
            number: number.to_string(),
            title,
            order_reference: request.order_reference.clone(),
            classification_code: record.code.clone(),
            quantity: 1,
            created_by: actor.clone(),
            status: DEFAULT_STATUS.to_owned(),
            created_at: now,
            updated_at: now,
        };
        PendingUnit { number, doc }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::clock::FixedClock;
    use crate::request::BulkIssueItem;
    use crate::session::MemorySession;
    use docnum::MemoryCounterStore;

    fn catalog_with(codes: &[(&str, &str, Option<&str>)]) -> MemoryCatalog {
        let catalog = MemoryCatalog::new();
        for (code, matrix, depth) in codes {
            catalog.put(ClassificationRecord {
                code: (*code).to_owned(),
                name: format!("Core box {matrix}"),
                matrix: (*matrix).to_owned(),
                drilling_depth: depth.map(str::to_owned),
                height: None,
                thread_code: None,
                product_type: "core-box".to_owned(),
                active: true,
            });
        }
        catalog
    }

    fn issuer(
        catalog: MemoryCatalog,
    ) -> BulkIssuer<MemoryCounterStore, MemoryCatalog, FixedClock> {
        BulkIssuer::new(
            MemoryCounterStore::new(),
            catalog,
            FixedClock::start_of_year(2025),
        )
    }

    fn request(items: &[(&str, u32)]) -> BulkIssueRequest {
        BulkIssueRequest {
            order_reference: "ORD-2025-0117".to_owned(),
            items: items
                .iter()
                .map(|(code, quantity)| BulkIssueItem {
                    classification_code: (*code).to_owned(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn defaults_title_from_classification_attributes() {
        let issuer = issuer(catalog_with(&[("HQ-A", "HQ", Some("05-07"))]));
        let session = MemorySession::new();
        let outcome = issuer
            .issue(&request(&[("HQ-A", 1)]), &"user-7".into(), &session)
            .await
            .unwrap();
        assert_eq!(outcome.documents[0].title, "Core box HQ HQ 05-07");
        assert_eq!(outcome.documents[0].status, DEFAULT_STATUS);
        assert_eq!(outcome.documents[0].quantity, 1);
    }

    #[tokio::test]
    async fn oversized_item_quantity_degrades_that_item_only() {
        let issuer = issuer(catalog_with(&[
            ("HQ-A", "HQ", None),
            ("PQ-B", "PQ", None),
        ]));
        let session = MemorySession::new();
        let outcome = issuer
            .issue(&request(&[("HQ-A", 21), ("PQ-B", 2)]), &"user-7".into(), &session)
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.documents.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("per-item limit"));
    }

    #[tokio::test]
    async fn zero_quantity_is_an_item_error() {
        let issuer = issuer(catalog_with(&[("HQ-A", "HQ", None)]));
        let session = MemorySession::new();
        let outcome = issuer
            .issue(&request(&[("HQ-A", 0)]), &"user-7".into(), &session)
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("at least 1"));
    }

    #[tokio::test]
    async fn collision_regenerates_a_fresh_number() {
        let issuer = issuer(catalog_with(&[("HQ-A", "HQ", None)]));
        let session = MemorySession::new();
        // Burn the number the first allocation will produce.
        session.seed_number("AGB HQ 000001 25");

        let outcome = issuer
            .issue(&request(&[("HQ-A", 2)]), &"user-7".into(), &session)
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.errors.is_empty());
        let numbers: Vec<_> = outcome.documents.iter().map(|d| d.number.as_str()).collect();
        // Unit 1 collided on 000001 and re-allocated 000003; unit 2 got 000002.
        assert_eq!(numbers, ["AGB HQ 000003 25", "AGB HQ 000002 25"]);
    }
}
