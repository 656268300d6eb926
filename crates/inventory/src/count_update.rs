use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use tagsync_core::{CatalogObjectId, LocationId, StoreId};
use tagsync_events::Event;

use crate::diagnostics::{Diagnostic, Flow};
use crate::scan::ScanAggregation;

/// Deterministic token identifying one count-update batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the idempotency key for a scan batch.
///
/// Depends only on the store and the scan's own timestamp, so replaying the
/// same batch yields the same key no matter when the sync runs. Sub-second
/// precision is kept; whole-second timestamps render without a fraction.
pub fn idempotency_key(store_id: &StoreId, scan_timestamp: DateTime<Utc>) -> IdempotencyKey {
    IdempotencyKey(format!(
        "sync_{}_{}",
        store_id,
        scan_timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    ))
}

/// Absolute on-hand quantity for one catalog object at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalCount {
    pub catalog_object_id: CatalogObjectId,
    pub location_id: LocationId,
    /// Sent as a decimal string, as the POS API expects.
    #[serde(with = "decimal_string")]
    pub quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// One entry of a batch inventory change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryChange {
    PhysicalCount { physical_count: PhysicalCount },
}

impl InventoryChange {
    pub fn physical_count(&self) -> &PhysicalCount {
        match self {
            InventoryChange::PhysicalCount { physical_count } => physical_count,
        }
    }
}

/// Outbound payload for the SKU-level system.
///
/// Serializes to the POS batch-change body; store and scan time travel
/// alongside for logging and receipts only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountUpdateBatch {
    pub idempotency_key: IdempotencyKey,
    #[serde(skip)]
    pub store_id: StoreId,
    #[serde(skip)]
    pub occurred_at: DateTime<Utc>,
    pub changes: Vec<InventoryChange>,
}

impl CountUpdateBatch {
    pub fn counts(&self) -> impl Iterator<Item = &PhysicalCount> {
        self.changes.iter().map(InventoryChange::physical_count)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl Event for CountUpdateBatch {
    fn event_type(&self) -> &'static str {
        "inventory.physical_count.batch"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// A count-update batch plus what was left out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountUpdate {
    pub batch: CountUpdateBatch,
    pub diagnostics: Vec<Diagnostic>,
}

/// Shape the physical-count payload for an aggregated scan.
///
/// One change per mapped SKU, in aggregation order. Unmapped SKUs are
/// excluded and reported.
pub fn build_count_update(
    aggregation: &ScanAggregation,
    store_id: &StoreId,
    scan_timestamp: DateTime<Utc>,
) -> CountUpdate {
    let mut changes = Vec::with_capacity(aggregation.skus.len());
    let mut diagnostics = Vec::new();

    for aggregate in &aggregation.skus {
        let Some(target) = &aggregate.target else {
            let d = Diagnostic::unmapped(Flow::Scan, aggregate.sku.clone());
            d.emit();
            diagnostics.push(d);
            continue;
        };

        changes.push(InventoryChange::PhysicalCount {
            physical_count: PhysicalCount {
                catalog_object_id: target.catalog_object_id.clone(),
                location_id: target.location_id.clone(),
                quantity: aggregate.count,
                occurred_at: scan_timestamp,
            },
        });
    }

    let idempotency_key = idempotency_key(store_id, scan_timestamp);
    tracing::info!(
        %idempotency_key,
        changes = changes.len(),
        unmapped = diagnostics.len(),
        "built physical count batch"
    );

    CountUpdate {
        batch: CountUpdateBatch {
            idempotency_key,
            store_id: store_id.clone(),
            occurred_at: scan_timestamp,
            changes,
        },
        diagnostics,
    }
}

mod decimal_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim().parse().map_err(serde::de::Error::custom)
    }
}
