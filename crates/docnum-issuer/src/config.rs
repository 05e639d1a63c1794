/// Hard limits on a single bulk issuance request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IssueLimits {
    /// Maximum number of distinct item entries per request.
    pub max_item_types: usize,
    /// Maximum total quantity summed across all items.
    pub max_total_items: u32,
    /// Per-item quantity ceiling; also the staged-write batch size.
    pub batch_size: u32,
}

impl IssueLimits {
    pub const MAX_ITEM_TYPES: usize = 25;
    pub const MAX_TOTAL_ITEMS: u32 = 100;
    pub const BATCH_SIZE: u32 = 20;
}

impl Default for IssueLimits {
    fn default() -> Self {
        Self {
            max_item_types: Self::MAX_ITEM_TYPES,
            max_total_items: Self::MAX_TOTAL_ITEMS,
            batch_size: Self::BATCH_SIZE,
        }
    }
}
