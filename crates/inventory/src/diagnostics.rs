use serde::{Deserialize, Serialize};

use tagsync_core::{Sku, StoreId};

/// Which sync flow raised a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    /// Scan batch → SKU counts.
    Scan,
    /// Sale event → item retirements.
    Sale,
}

impl core::fmt::Display for Flow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Flow::Scan => f.write_str("scan"),
            Flow::Sale => f.write_str("sale"),
        }
    }
}

/// A non-fatal condition found while processing a batch.
///
/// The affected record or line is left out of the outbound payload; the rest
/// of the batch goes through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A SKU has no catalog mapping and cannot be pushed downstream.
    UnmappedSku { flow: Flow, sku: Sku },

    /// A sale asked for more units than are in stock; partially fulfilled.
    StockShortfall {
        sku: Sku,
        requested: u64,
        fulfilled: u64,
        shortfall: u64,
    },

    /// A record or line could not be validated and was skipped.
    MalformedRecord { flow: Flow, index: usize, reason: String },

    /// A sale event names a different store than the scan batch; the sale
    /// is not applied to this store's items.
    StoreMismatch { scan_store: StoreId, sale_store: StoreId },
}

impl Diagnostic {
    pub fn unmapped(flow: Flow, sku: Sku) -> Self {
        Self::UnmappedSku { flow, sku }
    }

    pub fn shortfall(sku: Sku, requested: u64, fulfilled: u64) -> Self {
        Self::StockShortfall {
            sku,
            requested,
            fulfilled,
            shortfall: requested.saturating_sub(fulfilled),
        }
    }

    pub fn malformed(flow: Flow, index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            flow,
            index,
            reason: reason.into(),
        }
    }

    pub fn store_mismatch(scan_store: StoreId, sale_store: StoreId) -> Self {
        Self::StoreMismatch {
            scan_store,
            sale_store,
        }
    }

    /// Log this diagnostic as a structured warning.
    pub fn emit(&self) {
        match self {
            Diagnostic::UnmappedSku { flow, sku } => {
                tracing::warn!(%flow, %sku, "SKU not found in catalog mapping; excluded from payload");
            }
            Diagnostic::StockShortfall {
                sku,
                requested,
                fulfilled,
                shortfall,
            } => {
                tracing::warn!(%sku, requested, fulfilled, shortfall, "sold more units than are in stock");
            }
            Diagnostic::MalformedRecord { flow, index, reason } => {
                tracing::warn!(%flow, index, %reason, "skipping malformed record");
            }
            Diagnostic::StoreMismatch {
                scan_store,
                sale_store,
            } => {
                tracing::warn!(%scan_store, %sale_store, "sale event is for another store; not applied");
            }
        }
    }
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Diagnostic::UnmappedSku { flow, sku } => {
                write!(f, "[{flow}] SKU {sku} is not in the catalog mapping")
            }
            Diagnostic::StockShortfall {
                sku,
                requested,
                fulfilled,
                shortfall,
            } => write!(
                f,
                "[sale] SKU {sku}: requested {requested}, fulfilled {fulfilled}, short by {shortfall}"
            ),
            Diagnostic::MalformedRecord { flow, index, reason } => {
                write!(f, "[{flow}] record #{index} skipped: {reason}")
            }
            Diagnostic::StoreMismatch {
                scan_store,
                sale_store,
            } => write!(
                f,
                "[sale] event for store {sale_store} not applied to scan of store {scan_store}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_is_the_deficit() {
        let d = Diagnostic::shortfall(Sku::new("A-1").unwrap(), 5, 2);
        match d {
            Diagnostic::StockShortfall { shortfall, .. } => assert_eq!(shortfall, 3),
            other => panic!("Expected StockShortfall, got {other:?}"),
        }
    }

    #[test]
    fn serializes_with_kind_tag() {
        let d = Diagnostic::unmapped(Flow::Scan, Sku::new("ZZZ-999").unwrap());
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "unmapped_sku");
        assert_eq!(json["flow"], "scan");
        assert_eq!(json["sku"], "ZZZ-999");
    }

    #[test]
    fn display_mentions_the_record() {
        let d = Diagnostic::malformed(Flow::Sale, 4, "missing field: sku");
        assert_eq!(d.to_string(), "[sale] record #4 skipped: missing field: sku");
    }

    #[test]
    fn store_mismatch_names_both_stores() {
        let d = Diagnostic::store_mismatch(
            StoreId::new("STORE-042").unwrap(),
            StoreId::new("STORE-007").unwrap(),
        );
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "store_mismatch");
        assert_eq!(json["sale_store"], "STORE-007");
        assert_eq!(d.to_string(), "[sale] event for store STORE-007 not applied to scan of store STORE-042");
    }
}
