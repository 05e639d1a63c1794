use crate::document::IssuedDocument;
use serde::{Deserialize, Serialize};

/// One line of a bulk issuance request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIssueItem {
    pub classification_code: String,
    pub quantity: u32,
}

/// A bulk issuance request: mint `quantity` numbered documents for each
/// named classification, all tied to one external order reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIssueRequest {
    pub order_reference: String,
    pub items: Vec<BulkIssueItem>,
}

impl BulkIssueRequest {
    /// Total quantity summed across all items, saturating on overflow so a
    /// hostile request cannot wrap past the limit check.
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }
}

/// Result of a bulk issuance request.
///
/// `success` means "at least one document was created and committed" —
/// partial success is success, and `errors` may be non-empty alongside
/// `success = true`. Callers must inspect both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIssueOutcome {
    pub success: bool,
    pub message: String,
    pub documents: Vec<IssuedDocument>,
    pub errors: Vec<String>,
}
