//! `tagsync-core`: shared building blocks for the RFID ↔ POS sync.
//!
//! This crate contains **pure** primitives (no IO, no logging setup).

pub mod decoded;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use decoded::Decoded;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CatalogObjectId, Epc, LocationId, OrderId, Sku, StoreId};
pub use value_object::ValueObject;
