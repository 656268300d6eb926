//! Input files: scan batch, catalog mapping, sale event.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use tagsync_catalog::{CatalogEntry, CatalogMapping};
use tagsync_core::{Decoded, StoreId};
use tagsync_events::SaleEvent;
use tagsync_inventory::RawItemRecord;

use crate::config::SyncConfig;

/// One scan batch as exported by the RFID platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFile {
    pub store_id: StoreId,
    #[serde(default)]
    pub store_name: Option<String>,
    pub scan_timestamp: DateTime<Utc>,
    /// Decoded one by one; a wrong-typed record is reported, not fatal.
    #[serde(default)]
    pub items: Vec<Decoded<RawItemRecord>>,
}

/// Catalog mapping reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub entries: Vec<CatalogEntry>,
}

/// Everything one sync run consumes.
#[derive(Debug, Clone)]
pub struct SyncInputs {
    pub scan: ScanFile,
    pub catalog: CatalogMapping,
    pub sale: Option<SaleEvent>,
}

impl SyncInputs {
    /// Read and parse all input files named by the configuration.
    pub fn load(config: &SyncConfig) -> anyhow::Result<Self> {
        let scan: ScanFile = read_json(&config.scan_path)?;
        let catalog_file: CatalogFile = read_json(&config.catalog_path)?;
        let catalog = CatalogMapping::from_entries(catalog_file.entries)
            .with_context(|| format!("invalid catalog mapping in {}", config.catalog_path.display()))?;
        let sale = match &config.sale_path {
            Some(path) => Some(read_json::<SaleEvent>(path)?),
            None => None,
        };

        tracing::info!(
            store_id = %scan.store_id,
            scanned = scan.items.len(),
            catalog_skus = catalog.len(),
            sale = sale.as_ref().map(|s| s.event_id.as_str()).unwrap_or("-"),
            "loaded sync inputs"
        );

        Ok(Self { scan, catalog, sale })
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
