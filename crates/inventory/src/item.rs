use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tagsync_core::{DomainError, DomainResult, Entity, Epc, Sku};

/// Item lifecycle status as reported by the RFID platform.
///
/// Statuses this sync does not act on are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemStatus {
    InStore,
    Sold,
    Other(String),
}

impl ItemStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ItemStatus::InStore => "in_store",
            ItemStatus::Sold => "sold",
            ItemStatus::Other(s) => s,
        }
    }
}

impl From<String> for ItemStatus {
    fn from(value: String) -> Self {
        match value.trim() {
            "in_store" => ItemStatus::InStore,
            "sold" => ItemStatus::Sold,
            other => ItemStatus::Other(other.to_string()),
        }
    }
}

impl From<ItemStatus> for String {
    fn from(value: ItemStatus) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the store an item was last seen. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Zone {
    Floor,
    Stockroom,
    Other(String),
}

impl Zone {
    pub fn as_str(&self) -> &str {
        match self {
            Zone::Floor => "floor",
            Zone::Stockroom => "stockroom",
            Zone::Other(s) => s,
        }
    }
}

impl From<String> for Zone {
    fn from(value: String) -> Self {
        match value.trim() {
            "floor" => Zone::Floor,
            "stockroom" => Zone::Stockroom,
            other => Zone::Other(other.to_string()),
        }
    }
}

impl From<Zone> for String {
    fn from(value: Zone) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for Zone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated scanned item: one physical garment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub epc: Epc,
    pub sku: Sku,
    pub status: ItemStatus,
    pub zone: Zone,
    pub scanned_at: DateTime<Utc>,
}

impl ItemRecord {
    pub fn is_in_store(&self) -> bool {
        self.status == ItemStatus::InStore
    }
}

impl Entity for ItemRecord {
    type Id = Epc;

    fn id(&self) -> &Self::Id {
        &self.epc
    }
}

/// Item record as delivered by the scan feed, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawItemRecord {
    #[serde(default)]
    pub epc: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default, alias = "last_seen", alias = "timestamp")]
    pub scanned_at: Option<String>,
}

impl RawItemRecord {
    /// Validate into an [`ItemRecord`].
    ///
    /// Every field is required; blank strings count as missing.
    pub fn validate(&self) -> DomainResult<ItemRecord> {
        let epc = Epc::new(required(&self.epc, "epc")?)?;
        let sku = Sku::new(required(&self.sku, "sku")?)?;
        let status = ItemStatus::from(required(&self.status, "status")?.to_string());
        let zone = Zone::from(required(&self.zone, "zone")?.to_string());

        let raw_ts = required(&self.scanned_at, "scanned_at")?;
        let scanned_at = DateTime::parse_from_rfc3339(raw_ts)
            .map_err(|e| DomainError::validation(format!("scanned_at {raw_ts:?}: {e}")))?
            .with_timezone(&Utc);

        Ok(ItemRecord {
            epc,
            sku,
            status,
            zone,
            scanned_at,
        })
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> DomainResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::missing(field)),
    }
}

/// Which statuses count towards stock in an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter {
    accepted: Vec<ItemStatus>,
}

impl StatusFilter {
    pub fn only(status: ItemStatus) -> Self {
        Self {
            accepted: vec![status],
        }
    }

    pub fn any_of(statuses: impl IntoIterator<Item = ItemStatus>) -> Self {
        let mut accepted: Vec<ItemStatus> = Vec::new();
        for status in statuses {
            if !accepted.contains(&status) {
                accepted.push(status);
            }
        }
        Self { accepted }
    }

    pub fn accepts(&self, status: &ItemStatus) -> bool {
        self.accepted.contains(status)
    }

    pub fn statuses(&self) -> &[ItemStatus] {
        &self.accepted
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::only(ItemStatus::InStore)
    }
}
