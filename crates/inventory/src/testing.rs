//! Shared fixtures for unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use tagsync_catalog::{CatalogEntry, CatalogMapping};
use tagsync_core::{CatalogObjectId, Epc, LocationId, Sku, StoreId};

use crate::item::{ItemRecord, ItemStatus, Zone};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
}

pub fn at(minutes: i64) -> DateTime<Utc> {
    t0() + Duration::minutes(minutes)
}

pub fn sku(code: &str) -> Sku {
    Sku::new(code).unwrap()
}

pub fn store() -> StoreId {
    StoreId::new("STORE-042").unwrap()
}

pub fn item(epc: &str, sku_code: &str, minutes: i64) -> ItemRecord {
    ItemRecord {
        epc: Epc::new(epc).unwrap(),
        sku: sku(sku_code),
        status: ItemStatus::InStore,
        zone: Zone::Floor,
        scanned_at: at(minutes),
    }
}

pub fn with_status(mut record: ItemRecord, status: ItemStatus) -> ItemRecord {
    record.status = status;
    record
}

pub fn with_zone(mut record: ItemRecord, zone: Zone) -> ItemRecord {
    record.zone = zone;
    record
}

pub fn catalog(skus: &[&str]) -> CatalogMapping {
    CatalogMapping::from_entries(skus.iter().map(|code| CatalogEntry {
        sku: sku(code),
        catalog_object_id: CatalogObjectId::new(format!("OBJ-{code}")).unwrap(),
        location_id: LocationId::new("LOC-MAIN").unwrap(),
        product_name: None,
    }))
    .unwrap()
}
