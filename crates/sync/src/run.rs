//! One end-to-end sync run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use tagsync_catalog::CatalogMapping;
use tagsync_core::{Sku, StoreId};
use tagsync_inventory::{
    CountUpdateBatch, Diagnostic, InventorySnapshot, LineFulfillment, RetirementBatch, ScanAggregation,
    SnapshotRow, StatusFilter, Zone, aggregate_scan, apply_retirements, build_count_update,
    select_retirements, validate_batch,
};

use crate::fixtures::SyncInputs;
use crate::sink::{CountUpdateSink, RetirementSink, SinkError, SinkReceipt};

/// Per-SKU line of the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkuCountRow {
    pub sku: Sku,
    pub count: u64,
    pub zones: BTreeMap<Zone, u64>,
    pub mapped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

/// Flow A outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub scanned: usize,
    pub valid: usize,
    pub in_stock: usize,
    pub skus: Vec<SkuCountRow>,
    pub payload: CountUpdateBatch,
    pub receipt: SinkReceipt,
}

/// Flow B outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleReport {
    pub event_id: String,
    pub lines: Vec<LineFulfillment>,
    pub payload: RetirementBatch,
    pub receipt: SinkReceipt,
    /// Per-SKU counts before and after the retirements.
    pub snapshot: Vec<SnapshotRow>,
}

/// Everything a caller needs to review after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub store_id: StoreId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    pub scan_timestamp: DateTime<Utc>,
    pub scan: ScanReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale: Option<SaleReport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SyncReport {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

fn sku_rows(aggregation: &ScanAggregation, catalog: &CatalogMapping) -> Vec<SkuCountRow> {
    aggregation
        .skus
        .iter()
        .map(|a| SkuCountRow {
            sku: a.sku.clone(),
            count: a.count,
            zones: a.zones.clone(),
            mapped: a.target.is_some(),
            product_name: catalog.product_name(&a.sku).map(str::to_string),
        })
        .collect()
}

/// Run flow A, then (if a sale for the same store is present) flow B against
/// the same pool.
///
/// Record-level problems end up in `diagnostics`; only a sink failure stops
/// the run.
pub fn run_sync<C, R>(
    inputs: &SyncInputs,
    filter: &StatusFilter,
    counts: &C,
    retirements: &R,
) -> Result<SyncReport, SinkError>
where
    C: CountUpdateSink + ?Sized,
    R: RetirementSink + ?Sized,
{
    let scan = &inputs.scan;
    let mut diagnostics = Vec::new();

    // Flow A: scan → counts.
    let validated = validate_batch(&scan.items);
    diagnostics.extend(validated.diagnostics.iter().cloned());

    let aggregation = aggregate_scan(&validated.records, filter, &inputs.catalog);
    let update = build_count_update(&aggregation, &scan.store_id, scan.scan_timestamp);
    diagnostics.extend(update.diagnostics.iter().cloned());

    let receipt = counts.submit(&update.batch)?;
    tracing::info!(
        applied = receipt.applied,
        duplicate = receipt.duplicate,
        idempotency_key = %update.batch.idempotency_key,
        "count update submitted"
    );

    let scan_report = ScanReport {
        scanned: scan.items.len(),
        valid: validated.records.len(),
        in_stock: aggregation.accepted,
        skus: sku_rows(&aggregation, &inputs.catalog),
        payload: update.batch,
        receipt,
    };

    // Flow B: sale → retirements. A sale for another store is not applied to
    // this store's items.
    let sale_report = match &inputs.sale {
        None => None,
        Some(sale) if sale.store_id != scan.store_id => {
            let d = Diagnostic::store_mismatch(scan.store_id.clone(), sale.store_id.clone());
            d.emit();
            diagnostics.push(d);
            None
        }
        Some(sale) => {
            let selection = select_retirements(sale, &validated.records, &inputs.catalog);
            diagnostics.extend(selection.diagnostics.iter().cloned());

            let receipt = retirements.submit(&selection.batch)?;
            tracing::info!(applied = receipt.applied, event_id = %sale.event_id, "retirements submitted");

            let after_pool = apply_retirements(&validated.records, &selection.batch);
            let after = aggregate_scan(&after_pool, filter, &inputs.catalog);
            let snapshot = InventorySnapshot::compare(
                &InventorySnapshot::from_aggregation(&aggregation),
                &InventorySnapshot::from_aggregation(&after),
            );

            Some(SaleReport {
                event_id: sale.event_id.clone(),
                lines: selection.lines,
                payload: selection.batch,
                receipt,
                snapshot,
            })
        }
    };

    tracing::info!(diagnostics = diagnostics.len(), "sync run complete");

    Ok(SyncReport {
        store_id: scan.store_id.clone(),
        store_name: scan.store_name.clone(),
        scan_timestamp: scan.scan_timestamp,
        scan: scan_report,
        sale: sale_report,
        diagnostics,
    })
}
