//! Item-level ↔ SKU-level inventory translation.
//!
//! Pure, single-pass transformations over one batch at a time (no IO, no
//! clocks). Conditions a caller should review are returned as
//! [`Diagnostic`]s alongside each result and never abort the batch.
//!
//! - [`scan`]: validate scanned item records and aggregate them per SKU
//! - [`count_update`]: shape the physical-count payload and its idempotency key
//! - [`retire`]: FIFO selection of items to retire for a sale
//! - [`snapshot`]: before/after view of per-SKU counts around a sale

pub mod count_update;
pub mod diagnostics;
pub mod item;
pub mod retire;
pub mod scan;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use count_update::{
    CountUpdate, CountUpdateBatch, IdempotencyKey, InventoryChange, PhysicalCount, build_count_update,
    idempotency_key,
};
pub use diagnostics::{Diagnostic, Flow};
pub use item::{ItemRecord, ItemStatus, RawItemRecord, StatusFilter, Zone};
pub use retire::{LineFulfillment, Retirement, RetirementBatch, SaleSelection, apply_retirements, select_retirements};
pub use scan::{ScanAggregation, SkuAggregate, ValidatedBatch, aggregate_scan, validate_batch};
pub use snapshot::{InventorySnapshot, SnapshotRow};
