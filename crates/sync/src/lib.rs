//! `tagsync-sync`: runs both sync flows over one set of inputs.
//!
//! Flow A: scan batch → per-SKU physical counts → count-update sink.
//! Flow B: sale event → FIFO item retirements → retirement sink.
//!
//! Payloads are handed to in-process sinks; no network calls are made.

pub mod config;
pub mod fixtures;
pub mod run;
pub mod sink;

pub use config::{SyncArgs, SyncConfig};
pub use fixtures::{CatalogFile, ScanFile, SyncInputs};
pub use run::{SyncReport, run_sync};
pub use sink::{
    CountUpdateSink, InMemoryCountSink, InMemoryRetirementSink, RetirementSink, SinkError, SinkReceipt,
};
