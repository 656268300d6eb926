use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tagsync_catalog::CatalogMapping;
use tagsync_core::{Epc, OrderId, Sku, StoreId};
use tagsync_events::{Event, SaleEvent};

use crate::diagnostics::{Diagnostic, Flow};
use crate::item::{ItemRecord, ItemStatus};

/// Request to flip one item to `sold` on the RFID platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retirement {
    pub epc: Epc,
    pub sku: Sku,
    pub status: ItemStatus,
    pub sold_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
}

/// Outbound payload for the item-level system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementBatch {
    /// Sale event this batch answers.
    pub source_event_id: String,
    pub store_id: StoreId,
    pub sold_at: DateTime<Utc>,
    pub retirements: Vec<Retirement>,
}

impl RetirementBatch {
    pub fn epcs(&self) -> impl Iterator<Item = &Epc> {
        self.retirements.iter().map(|r| &r.epc)
    }

    pub fn len(&self) -> usize {
        self.retirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retirements.is_empty()
    }
}

impl Event for RetirementBatch {
    fn event_type(&self) -> &'static str {
        "rfid.items.retired"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.sold_at
    }
}

/// How one sale line was fulfilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineFulfillment {
    pub sku: Sku,
    pub requested: u64,
    pub selected: Vec<Epc>,
}

impl LineFulfillment {
    pub fn shortfall(&self) -> u64 {
        self.requested.saturating_sub(self.selected.len() as u64)
    }
}

/// Outcome of FIFO selection for one sale event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleSelection {
    pub batch: RetirementBatch,
    /// One entry per valid, mapped line, in sale order.
    pub lines: Vec<LineFulfillment>,
    pub diagnostics: Vec<Diagnostic>,
}

/// In-store items of one SKU, oldest scan first; consumed front to back.
struct FifoQueue<'a> {
    items: Vec<&'a ItemRecord>,
    next: usize,
}

impl<'a> FifoQueue<'a> {
    fn take(&mut self, n: u64) -> &[&'a ItemRecord] {
        let start = self.next;
        let end = start.saturating_add(n as usize).min(self.items.len());
        self.next = end;
        &self.items[start..end]
    }
}

fn fifo_queues(pool: &[ItemRecord]) -> HashMap<&Sku, FifoQueue<'_>> {
    let mut queues: HashMap<&Sku, FifoQueue<'_>> = HashMap::new();
    for record in pool.iter().filter(|r| r.is_in_store()) {
        queues
            .entry(&record.sku)
            .or_insert_with(|| FifoQueue {
                items: Vec::new(),
                next: 0,
            })
            .items
            .push(record);
    }

    // Oldest scan first; EPC breaks ties so reruns pick the same items.
    for queue in queues.values_mut() {
        queue
            .items
            .sort_by(|a, b| a.scanned_at.cmp(&b.scanned_at).then_with(|| a.epc.cmp(&b.epc)));
    }

    queues
}

/// Choose which physical items a sale retired.
///
/// The POS reports quantities per SKU only, so for each line the oldest
/// in-store items of that SKU are taken. Lines for the same SKU share one
/// queue, so an item is never picked twice. Short lines are fulfilled as far
/// as stock allows and reported; malformed and unmapped lines are skipped and
/// reported.
pub fn select_retirements(
    sale: &SaleEvent,
    pool: &[ItemRecord],
    catalog: &CatalogMapping,
) -> SaleSelection {
    let mut queues = fifo_queues(pool);
    let mut retirements = Vec::new();
    let mut lines = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, line) in sale.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                let d = Diagnostic::malformed(Flow::Sale, index, e.to_string());
                d.emit();
                diagnostics.push(d);
                continue;
            }
        };

        if !catalog.contains(&line.sku) {
            let d = Diagnostic::unmapped(Flow::Sale, line.sku.clone());
            d.emit();
            diagnostics.push(d);
            continue;
        }

        let taken: &[&ItemRecord] = match queues.get_mut(&line.sku) {
            Some(queue) => queue.take(line.quantity),
            None => &[],
        };

        let selected: Vec<Epc> = taken.iter().map(|r| r.epc.clone()).collect();
        retirements.extend(taken.iter().map(|r| Retirement {
            epc: r.epc.clone(),
            sku: r.sku.clone(),
            status: ItemStatus::Sold,
            sold_at: sale.occurred_at,
            order_id: sale.order_id.clone(),
        }));

        tracing::debug!(
            sku = %line.sku,
            requested = line.quantity,
            selected = selected.len(),
            "selected items for sale line"
        );

        let fulfillment = LineFulfillment {
            sku: line.sku,
            requested: line.quantity,
            selected,
        };
        if fulfillment.shortfall() > 0 {
            let d = Diagnostic::shortfall(
                fulfillment.sku.clone(),
                fulfillment.requested,
                fulfillment.selected.len() as u64,
            );
            d.emit();
            diagnostics.push(d);
        }
        lines.push(fulfillment);
    }

    tracing::info!(
        event_id = %sale.event_id,
        retired = retirements.len(),
        issues = diagnostics.len(),
        "selected items to retire (FIFO)"
    );

    SaleSelection {
        batch: RetirementBatch {
            source_event_id: sale.event_id.clone(),
            store_id: sale.store_id.clone(),
            sold_at: sale.occurred_at,
            retirements,
        },
        lines,
        diagnostics,
    }
}

/// Apply a retirement batch to an item pool.
///
/// Only items currently in store flip to `sold`; anything else is left as is,
/// so applying the same batch twice changes nothing the second time.
pub fn apply_retirements(pool: &[ItemRecord], batch: &RetirementBatch) -> Vec<ItemRecord> {
    let retired: HashSet<&Epc> = batch.epcs().collect();

    pool.iter()
        .map(|record| {
            let mut record = record.clone();
            if record.is_in_store() && retired.contains(&record.epc) {
                record.status = ItemStatus::Sold;
            }
            record
        })
        .collect()
}
