use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tagsync_core::{Decoded, DomainError, DomainResult, OrderId, Sku, StoreId};

use crate::event::Event;

/// Quantity as it arrives on the wire.
///
/// The POS webhook encodes quantities as decimal strings ("2"); hand-written
/// fixtures tend to use plain numbers. Both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireQuantity {
    Number(i64),
    Text(String),
}

impl WireQuantity {
    /// Parse into a strictly positive unit count.
    pub fn units(&self) -> DomainResult<u64> {
        let value = match self {
            WireQuantity::Number(n) => *n,
            WireQuantity::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| DomainError::validation(format!("quantity {s:?} is not an integer")))?,
        };

        if value <= 0 {
            return Err(DomainError::validation(format!(
                "quantity must be positive (got {value})"
            )));
        }

        Ok(value as u64)
    }
}

/// One line of a sale webhook, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawSaleLine {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity: Option<WireQuantity>,
}

impl RawSaleLine {
    pub fn new(sku: impl Into<String>, quantity: i64) -> Self {
        Self {
            sku: Some(sku.into()),
            quantity: Some(WireQuantity::Number(quantity)),
        }
    }

    /// Validate into a [`SaleLineItem`].
    pub fn validate(&self) -> DomainResult<SaleLineItem> {
        let sku = self.sku.as_deref().ok_or(DomainError::missing("sku"))?;
        let sku = Sku::new(sku).map_err(|_| DomainError::missing("sku"))?;
        let quantity = self
            .quantity
            .as_ref()
            .ok_or(DomainError::missing("quantity"))?
            .units()?;

        Ok(SaleLineItem { sku, quantity })
    }
}

/// A validated sale line: units of one SKU sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLineItem {
    pub sku: Sku,
    pub quantity: u64,
}

/// Inbound event: a completed payment reported by the POS.
///
/// The POS only knows SKUs and quantities; which physical items left the
/// store is decided downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub event_id: String,
    pub store_id: StoreId,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    /// Each line is decoded on its own; a wrong-typed line is rejected alone.
    #[serde(default)]
    pub line_items: Vec<Decoded<RawSaleLine>>,
}

impl SaleEvent {
    /// Validate every line, in webhook order.
    pub fn lines(&self) -> impl Iterator<Item = DomainResult<SaleLineItem>> + '_ {
        self.line_items
            .iter()
            .map(|line| line.get().and_then(RawSaleLine::validate))
    }
}

impl Event for SaleEvent {
    fn event_type(&self) -> &'static str {
        "pos.payment.completed"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
