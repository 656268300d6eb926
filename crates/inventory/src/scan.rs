use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use tagsync_catalog::{CatalogMapping, CatalogTarget};
use tagsync_core::{Decoded, Epc, Sku};

use crate::diagnostics::{Diagnostic, Flow};
use crate::item::{ItemRecord, RawItemRecord, StatusFilter, Zone};

/// Result of validating a raw scan feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBatch {
    /// Valid records, in feed order.
    pub records: Vec<ItemRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validate raw scan records.
///
/// Records that failed to decode, miss a field, carry an unparsable timestamp
/// or repeat an EPC already seen in the batch are skipped and reported. The
/// first occurrence of an EPC wins.
pub fn validate_batch(raw: &[Decoded<RawItemRecord>]) -> ValidatedBatch {
    let mut records = Vec::with_capacity(raw.len());
    let mut diagnostics = Vec::new();
    let mut seen: HashSet<Epc> = HashSet::with_capacity(raw.len());

    for (index, candidate) in raw.iter().enumerate() {
        let record = match candidate.get().and_then(RawItemRecord::validate) {
            Ok(record) => record,
            Err(e) => {
                let d = Diagnostic::malformed(Flow::Scan, index, e.to_string());
                d.emit();
                diagnostics.push(d);
                continue;
            }
        };

        if !seen.insert(record.epc.clone()) {
            let d = Diagnostic::malformed(Flow::Scan, index, format!("duplicate EPC {}", record.epc));
            d.emit();
            diagnostics.push(d);
            continue;
        }

        records.push(record);
    }

    tracing::debug!(
        received = raw.len(),
        valid = records.len(),
        skipped = diagnostics.len(),
        "validated scan batch"
    );

    ValidatedBatch { records, diagnostics }
}

/// Stock of one SKU as observed by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuAggregate {
    pub sku: Sku,
    pub count: u64,
    /// Informational; not part of the POS payload.
    pub zones: BTreeMap<Zone, u64>,
    /// Member EPCs in scan-feed order.
    pub epcs: Vec<Epc>,
    /// `None` when the SKU has no catalog mapping.
    pub target: Option<CatalogTarget>,
}

/// Per-SKU aggregation of one scan batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanAggregation {
    /// One entry per SKU, in first-seen order.
    pub skus: Vec<SkuAggregate>,
    /// Records that passed the status filter.
    pub accepted: usize,
    /// Records dropped by the status filter.
    pub filtered_out: usize,
}

impl ScanAggregation {
    pub fn get(&self, sku: &Sku) -> Option<&SkuAggregate> {
        self.skus.iter().find(|a| &a.sku == sku)
    }

    pub fn count_of(&self, sku: &Sku) -> u64 {
        self.get(sku).map(|a| a.count).unwrap_or(0)
    }

    /// `SKU → count` view.
    pub fn counts(&self) -> BTreeMap<Sku, u64> {
        self.skus.iter().map(|a| (a.sku.clone(), a.count)).collect()
    }

    pub fn total(&self) -> u64 {
        self.skus.iter().map(|a| a.count).sum()
    }
}

/// Group records by SKU, counting only those the filter accepts.
///
/// Filtered-out records are dropped silently. Each SKU's catalog target is
/// resolved here; unmapped SKUs are still counted and reported later, when the
/// count update is built.
pub fn aggregate_scan(
    records: &[ItemRecord],
    filter: &StatusFilter,
    catalog: &CatalogMapping,
) -> ScanAggregation {
    let mut skus: Vec<SkuAggregate> = Vec::new();
    let mut index: HashMap<&Sku, usize> = HashMap::new();
    let mut accepted = 0usize;

    for record in records {
        if !filter.accepts(&record.status) {
            continue;
        }
        accepted += 1;

        let slot = *index.entry(&record.sku).or_insert_with(|| {
            skus.push(SkuAggregate {
                sku: record.sku.clone(),
                count: 0,
                zones: BTreeMap::new(),
                epcs: Vec::new(),
                target: catalog.resolve(&record.sku).cloned(),
            });
            skus.len() - 1
        });

        let aggregate = &mut skus[slot];
        aggregate.count += 1;
        *aggregate.zones.entry(record.zone.clone()).or_insert(0) += 1;
        aggregate.epcs.push(record.epc.clone());
    }

    let filtered_out = records.len() - accepted;
    tracing::info!(
        skus = skus.len(),
        accepted,
        filtered_out,
        "aggregated scan batch by SKU"
    );

    ScanAggregation {
        skus,
        accepted,
        filtered_out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemStatus;
    use crate::testing::{catalog, item, sku, with_status, with_zone};
    use proptest::prelude::*;

    fn raw(epc: Option<&str>, sku: &str) -> Decoded<RawItemRecord> {
        RawItemRecord {
            epc: epc.map(str::to_string),
            sku: Some(sku.to_string()),
            status: Some("in_store".to_string()),
            zone: Some("floor".to_string()),
            scanned_at: Some("2025-03-14T09:00:00Z".to_string()),
        }
        .into()
    }

    #[test]
    fn groups_by_sku_in_first_seen_order() {
        let records = vec![
            item("E3", "TEE-002-WHT-S", 0),
            item("E1", "BJM-001-BLU-M", 1),
            item("E2", "BJM-001-BLU-M", 2),
            item("E4", "TEE-002-WHT-S", 3),
            item("E5", "BJM-001-BLU-M", 4),
        ];
        let agg = aggregate_scan(&records, &StatusFilter::default(), &catalog(&["BJM-001-BLU-M"]));

        let order: Vec<&str> = agg.skus.iter().map(|a| a.sku.as_str()).collect();
        assert_eq!(order, vec!["TEE-002-WHT-S", "BJM-001-BLU-M"]);
        assert_eq!(agg.count_of(&sku("BJM-001-BLU-M")), 3);
        assert_eq!(agg.count_of(&sku("TEE-002-WHT-S")), 2);

        let bjm = agg.get(&sku("BJM-001-BLU-M")).unwrap();
        let epcs: Vec<&str> = bjm.epcs.iter().map(|e| e.as_str()).collect();
        assert_eq!(epcs, vec!["E1", "E2", "E5"]);
        assert!(bjm.target.is_some());
        assert!(agg.get(&sku("TEE-002-WHT-S")).unwrap().target.is_none());
    }

    #[test]
    fn status_filter_drops_silently() {
        let records = vec![
            item("E1", "A", 0),
            with_status(item("E2", "A", 1), ItemStatus::Sold),
            with_status(item("E3", "B", 2), ItemStatus::Other("in_transit".to_string())),
        ];
        let agg = aggregate_scan(&records, &StatusFilter::default(), &catalog(&["A", "B"]));

        assert_eq!(agg.accepted, 1);
        assert_eq!(agg.filtered_out, 2);
        assert_eq!(agg.counts().len(), 1);
        assert!(agg.get(&sku("B")).is_none());
    }

    #[test]
    fn zone_breakdown_sums_to_count() {
        let records = vec![
            item("E1", "A", 0),
            with_zone(item("E2", "A", 1), Zone::Stockroom),
            with_zone(item("E3", "A", 2), Zone::Stockroom),
        ];
        let agg = aggregate_scan(&records, &StatusFilter::default(), &catalog(&["A"]));
        let a = agg.get(&sku("A")).unwrap();

        assert_eq!(a.zones.get(&Zone::Floor), Some(&1));
        assert_eq!(a.zones.get(&Zone::Stockroom), Some(&2));
        assert_eq!(a.zones.values().sum::<u64>(), a.count);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let records = vec![item("E1", "A", 0), item("E2", "B", 1), item("E3", "A", 2)];
        let cat = catalog(&["A", "B"]);
        let first = aggregate_scan(&records, &StatusFilter::default(), &cat);
        let second = aggregate_scan(&records, &StatusFilter::default(), &cat);
        assert_eq!(first, second);
    }

    #[test]
    fn wrong_typed_field_rejects_only_its_record() {
        let feed: Vec<Decoded<RawItemRecord>> = serde_json::from_str(
            r#"[
                {"epc": "E1", "sku": "A", "status": "in_store", "zone": "floor", "last_seen": "2025-03-14T08:00:00Z"},
                {"epc": 12345, "sku": "A", "status": "in_store", "zone": "floor", "last_seen": "2025-03-14T08:01:00Z"},
                {"epc": "E3", "sku": "A", "status": "in_store", "zone": "floor", "last_seen": "2025-03-14T08:02:00Z"}
            ]"#,
        )
        .unwrap();
        let batch = validate_batch(&feed);

        let epcs: Vec<&str> = batch.records.iter().map(|r| r.epc.as_str()).collect();
        assert_eq!(epcs, vec!["E1", "E3"]);
        match batch.diagnostics.as_slice() {
            [Diagnostic::MalformedRecord { flow: Flow::Scan, index: 1, reason }] => {
                assert!(reason.contains("invalid type"));
            }
            other => panic!("Expected one MalformedRecord at index 1, got {other:?}"),
        }
    }

    #[test]
    fn validate_batch_skips_malformed_and_duplicates() {
        let feed = vec![
            raw(Some("E1"), "A"),
            raw(None, "A"),
            raw(Some("E1"), "B"),
            raw(Some("E2"), "B"),
        ];
        let batch = validate_batch(&feed);

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].sku.as_str(), "A");
        assert_eq!(batch.diagnostics.len(), 2);
        match &batch.diagnostics[0] {
            Diagnostic::MalformedRecord { flow, index, reason } => {
                assert_eq!(*flow, Flow::Scan);
                assert_eq!(*index, 1);
                assert!(reason.contains("epc"));
            }
            other => panic!("Expected MalformedRecord, got {other:?}"),
        }
        match &batch.diagnostics[1] {
            Diagnostic::MalformedRecord { index, reason, .. } => {
                assert_eq!(*index, 2);
                assert!(reason.contains("duplicate EPC E1"));
            }
            other => panic!("Expected MalformedRecord, got {other:?}"),
        }
    }

    fn arb_status() -> impl Strategy<Value = ItemStatus> {
        prop_oneof![
            3 => Just(ItemStatus::InStore),
            1 => Just(ItemStatus::Sold),
            1 => Just(ItemStatus::Other("in_transit".to_string())),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the per-SKU counts add up to the number of records that
        /// passed the status filter.
        #[test]
        fn counts_sum_to_accepted_records(
            rows in prop::collection::vec((0usize..8, arb_status(), 0i64..500), 0..60)
        ) {
            let records: Vec<ItemRecord> = rows
                .iter()
                .enumerate()
                .map(|(i, (s, status, minutes))| {
                    with_status(item(&format!("E{i:04}"), &format!("SKU-{s}"), *minutes), status.clone())
                })
                .collect();
            let filter = StatusFilter::default();
            let agg = aggregate_scan(&records, &filter, &catalog(&[]));

            let passing = records.iter().filter(|r| filter.accepts(&r.status)).count();
            prop_assert_eq!(agg.total(), passing as u64);
            prop_assert_eq!(agg.accepted, passing);
            prop_assert_eq!(agg.accepted + agg.filtered_out, records.len());
        }
    }
}
