use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default status assigned to newly issued documents.
pub const DEFAULT_STATUS: &str = "active";

/// Opaque identity of the user a document is issued on behalf of.
///
/// The issuer never inspects this; it is carried through to the persisted
/// record verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// A uniquely numbered record minted by the bulk issuer.
///
/// Immutable once created as far as this crate is concerned; status changes
/// and deletion belong to other collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedDocument {
    /// Globally unique formatted number, e.g. `AGB 05-07 HQ 000001 25`.
    pub number: String,
    pub title: String,
    pub order_reference: String,
    /// Business code of the classification this document was issued against.
    pub classification_code: String,
    /// Always ≥ 1; bulk-issued units are always 1.
    pub quantity: u32,
    pub created_by: ActorId,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
