use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tagsync_core::Sku;

use crate::scan::ScanAggregation;

/// Per-SKU counts at one point in time, sorted by SKU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventorySnapshot {
    counts: BTreeMap<Sku, u64>,
}

/// One row of a before/after comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub sku: Sku,
    pub before: u64,
    pub after: u64,
}

impl SnapshotRow {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }

    /// Units that left stock between the two snapshots.
    pub fn delta(&self) -> i64 {
        self.after as i64 - self.before as i64
    }
}

impl InventorySnapshot {
    pub fn from_aggregation(aggregation: &ScanAggregation) -> Self {
        Self {
            counts: aggregation.counts(),
        }
    }

    pub fn count_of(&self, sku: &Sku) -> u64 {
        self.counts.get(sku).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Rows for every SKU present in either snapshot, sorted by SKU.
    pub fn compare(before: &InventorySnapshot, after: &InventorySnapshot) -> Vec<SnapshotRow> {
        let mut skus: Vec<&Sku> = before.counts.keys().chain(after.counts.keys()).collect();
        skus.sort();
        skus.dedup();

        skus.into_iter()
            .map(|sku| SnapshotRow {
                sku: sku.clone(),
                before: before.count_of(sku),
                after: after.count_of(sku),
            })
            .collect()
    }
}
