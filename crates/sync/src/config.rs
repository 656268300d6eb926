//! Runtime configuration for the `tagsync` binary.
//!
//! Every option can come from the command line or the environment (a `.env`
//! file in the working directory is honoured). Default input paths are
//! relative to the workspace root, where `cargo run -p tagsync-sync` runs.

use std::path::PathBuf;

use clap::Parser;

use tagsync_inventory::{ItemStatus, StatusFilter};
use tagsync_observability::LogFormat;

#[derive(Debug, Clone, Parser)]
#[command(name = "tagsync")]
#[command(about = "Sync RFID item scans with SKU-level POS inventory", long_about = None)]
pub struct SyncArgs {
    /// Scan batch file (JSON)
    #[arg(long, env = "TAGSYNC_SCAN_PATH", default_value = "mock_data/rfid_scan.json")]
    pub scan: PathBuf,

    /// Catalog mapping file (JSON)
    #[arg(long, env = "TAGSYNC_CATALOG_PATH", default_value = "mock_data/catalog.json")]
    pub catalog: PathBuf,

    /// Sale event file (JSON)
    #[arg(long, env = "TAGSYNC_SALE_PATH", default_value = "mock_data/sale_event.json")]
    pub sale: PathBuf,

    /// Only run the scan → count flow
    #[arg(long, env = "TAGSYNC_SKIP_SALE")]
    pub skip_sale: bool,

    /// Extra item statuses that count as stock (in_store always does)
    #[arg(long = "accept-status", env = "TAGSYNC_ACCEPT_STATUSES", value_delimiter = ',')]
    pub accept_statuses: Vec<String>,

    /// Log output: json, pretty or compact
    #[arg(long, env = "TAGSYNC_LOG_FORMAT", default_value = "json")]
    pub log_format: LogFormat,

    /// Also write the run report to this file
    #[arg(long, env = "TAGSYNC_REPORT_PATH")]
    pub report: Option<PathBuf>,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub scan_path: PathBuf,
    pub catalog_path: PathBuf,
    /// `None` when the sale flow is skipped.
    pub sale_path: Option<PathBuf>,
    pub status_filter: StatusFilter,
    pub log_format: LogFormat,
    pub report_path: Option<PathBuf>,
}

impl SyncConfig {
    /// Load `.env` (if present), then parse arguments and environment.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        SyncArgs::parse().into()
    }
}

impl From<SyncArgs> for SyncConfig {
    fn from(args: SyncArgs) -> Self {
        let extra = args
            .accept_statuses
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(ItemStatus::from);

        Self {
            scan_path: args.scan,
            catalog_path: args.catalog,
            sale_path: (!args.skip_sale).then_some(args.sale),
            status_filter: StatusFilter::any_of(std::iter::once(ItemStatus::InStore).chain(extra)),
            log_format: args.log_format,
            report_path: args.report,
        }
    }
}
