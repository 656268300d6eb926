//! Outbound sinks for the two payloads.
//!
//! Real adapters would carry these over the vendors' HTTP APIs; the in-memory
//! sinks here record what was submitted so a run can be inspected.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tagsync_events::Event;
use tagsync_inventory::{CountUpdateBatch, IdempotencyKey, RetirementBatch};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Internal lock poisoning.
    #[error("sink state poisoned")]
    Poisoned,
}

/// Acknowledgement for one submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkReceipt {
    pub event_type: String,
    /// Entries applied by the receiver (0 for a discarded duplicate).
    pub applied: usize,
    /// The receiver had already seen this batch and discarded it.
    pub duplicate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<IdempotencyKey>,
}

/// Receiver of physical-count batches (SKU-level system).
pub trait CountUpdateSink {
    fn submit(&self, batch: &CountUpdateBatch) -> Result<SinkReceipt, SinkError>;
}

/// Receiver of item retirements (item-level system).
pub trait RetirementSink {
    fn submit(&self, batch: &RetirementBatch) -> Result<SinkReceipt, SinkError>;
}

/// In-memory stand-in for the SKU-level inventory API.
///
/// Honours idempotency keys: a batch whose key was already accepted is
/// acknowledged but not recorded again.
#[derive(Debug, Default)]
pub struct InMemoryCountSink {
    state: Mutex<CountSinkState>,
}

#[derive(Debug, Default)]
struct CountSinkState {
    seen: HashSet<IdempotencyKey>,
    accepted: Vec<CountUpdateBatch>,
}

impl InMemoryCountSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches applied so far, in submission order.
    pub fn accepted(&self) -> Vec<CountUpdateBatch> {
        self.state
            .lock()
            .map(|s| s.accepted.clone())
            .unwrap_or_default()
    }
}

impl CountUpdateSink for InMemoryCountSink {
    fn submit(&self, batch: &CountUpdateBatch) -> Result<SinkReceipt, SinkError> {
        let mut state = self.state.lock().map_err(|_| SinkError::Poisoned)?;

        let duplicate = !state.seen.insert(batch.idempotency_key.clone());
        let applied = if duplicate {
            tracing::info!(
                idempotency_key = %batch.idempotency_key,
                "duplicate count batch discarded"
            );
            0
        } else {
            state.accepted.push(batch.clone());
            batch.len()
        };

        tracing::debug!(event_type = batch.event_type(), applied, "count batch submitted");

        Ok(SinkReceipt {
            event_type: batch.event_type().to_string(),
            applied,
            duplicate,
            idempotency_key: Some(batch.idempotency_key.clone()),
        })
    }
}

/// In-memory stand-in for the RFID platform's item status API.
#[derive(Debug, Default)]
pub struct InMemoryRetirementSink {
    accepted: Mutex<Vec<RetirementBatch>>,
}

impl InMemoryRetirementSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted(&self) -> Vec<RetirementBatch> {
        self.accepted.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl RetirementSink for InMemoryRetirementSink {
    fn submit(&self, batch: &RetirementBatch) -> Result<SinkReceipt, SinkError> {
        let mut accepted = self.accepted.lock().map_err(|_| SinkError::Poisoned)?;
        accepted.push(batch.clone());

        tracing::debug!(event_type = batch.event_type(), applied = batch.len(), "retirement batch submitted");

        Ok(SinkReceipt {
            event_type: batch.event_type().to_string(),
            applied: batch.len(),
            duplicate: false,
            idempotency_key: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tagsync_core::StoreId;
    use tagsync_inventory::idempotency_key;

    fn batch(minute: u32) -> CountUpdateBatch {
        let store_id = StoreId::new("STORE-042").unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, minute, 0).unwrap();
        CountUpdateBatch {
            idempotency_key: idempotency_key(&store_id, at),
            store_id,
            occurred_at: at,
            changes: Vec::new(),
        }
    }

    #[test]
    fn count_sink_discards_replayed_key() {
        let sink = InMemoryCountSink::new();

        let first = sink.submit(&batch(0)).unwrap();
        let replay = sink.submit(&batch(0)).unwrap();
        let next = sink.submit(&batch(5)).unwrap();

        assert!(!first.duplicate);
        assert!(replay.duplicate);
        assert_eq!(replay.applied, 0);
        assert!(!next.duplicate);
        assert_eq!(sink.accepted().len(), 2);
        assert_eq!(first.event_type, "inventory.physical_count.batch");
    }

    #[test]
    fn retirement_sink_records_batches() {
        let sink = InMemoryRetirementSink::new();
        let batch = RetirementBatch {
            source_event_id: "evt_001".to_string(),
            store_id: StoreId::new("STORE-042").unwrap(),
            sold_at: Utc.with_ymd_and_hms(2025, 3, 14, 15, 0, 0).unwrap(),
            retirements: Vec::new(),
        };

        let receipt = sink.submit(&batch).unwrap();
        assert_eq!(receipt.applied, 0);
        assert_eq!(receipt.event_type, "rfid.items.retired");
        assert_eq!(sink.accepted(), vec![batch]);
    }
}
