use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tagsync_core::{CatalogObjectId, DomainError, DomainResult, LocationId, Sku};

/// One row of the catalog mapping as stored in reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub sku: Sku,
    pub catalog_object_id: CatalogObjectId,
    pub location_id: LocationId,
    /// Display name, used only for reporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

/// Where a SKU's count lands on the POS side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTarget {
    pub catalog_object_id: CatalogObjectId,
    pub location_id: LocationId,
    pub product_name: Option<String>,
}

/// Read-only lookup from SKU to POS target identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogMapping {
    targets: HashMap<Sku, CatalogTarget>,
}

impl CatalogMapping {
    /// Build a mapping from reference rows.
    ///
    /// A SKU listed twice is rejected even if both rows agree: the reference
    /// data is supposed to be a function of SKU.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> DomainResult<Self> {
        let mut targets = HashMap::new();

        for entry in entries {
            let target = CatalogTarget {
                catalog_object_id: entry.catalog_object_id,
                location_id: entry.location_id,
                product_name: entry.product_name,
            };
            if targets.insert(entry.sku.clone(), target).is_some() {
                return Err(DomainError::conflict(format!(
                    "SKU {} is mapped more than once",
                    entry.sku
                )));
            }
        }

        Ok(Self { targets })
    }

    pub fn resolve(&self, sku: &Sku) -> Option<&CatalogTarget> {
        self.targets.get(sku)
    }

    pub fn contains(&self, sku: &Sku) -> bool {
        self.targets.contains_key(sku)
    }

    pub fn product_name(&self, sku: &Sku) -> Option<&str> {
        self.resolve(sku).and_then(|t| t.product_name.as_deref())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(sku: &str, object: &str) -> CatalogEntry {
        CatalogEntry {
            sku: Sku::new(sku).unwrap(),
            catalog_object_id: CatalogObjectId::new(object).unwrap(),
            location_id: LocationId::new("LOC-MAIN").unwrap(),
            product_name: Some(format!("Product {sku}")),
        }
    }

    #[test]
    fn resolves_mapped_sku() {
        let catalog = CatalogMapping::from_entries(vec![
            entry("BJM-001-BLU-M", "OBJ-1"),
            entry("TEE-002-WHT-S", "OBJ-2"),
        ])
        .unwrap();

        let target = catalog.resolve(&Sku::new("TEE-002-WHT-S").unwrap()).unwrap();
        assert_eq!(target.catalog_object_id.as_str(), "OBJ-2");
        assert_eq!(target.location_id.as_str(), "LOC-MAIN");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn unmapped_sku_does_not_resolve() {
        let catalog = CatalogMapping::from_entries(vec![entry("BJM-001-BLU-M", "OBJ-1")]).unwrap();
        let missing = Sku::new("ZZZ-999").unwrap();

        assert!(catalog.resolve(&missing).is_none());
        assert!(!catalog.contains(&missing));
        assert!(catalog.product_name(&missing).is_none());
    }

    #[test]
    fn duplicate_sku_is_a_conflict() {
        let err = CatalogMapping::from_entries(vec![
            entry("BJM-001-BLU-M", "OBJ-1"),
            entry("BJM-001-BLU-M", "OBJ-9"),
        ])
        .unwrap_err();

        match err {
            DomainError::Conflict(msg) if msg.contains("BJM-001-BLU-M") => {}
            other => panic!("Expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn entries_deserialize_without_product_name() {
        let json = r#"[{"sku": "A-1", "catalog_object_id": "OBJ-A", "location_id": "LOC-1"}]"#;
        let entries: Vec<CatalogEntry> = serde_json::from_str(json).unwrap();
        let catalog = CatalogMapping::from_entries(entries).unwrap();

        assert_eq!(catalog.product_name(&Sku::new("A-1").unwrap()), None);
        assert!(!catalog.is_empty());
    }
}
