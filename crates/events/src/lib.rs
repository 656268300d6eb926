//! Integration events exchanged with the two upstream systems.
//!
//! Inbound: the POS sale webhook. The outbound batches built by
//! `tagsync-inventory` (count updates, item retirements) implement the same
//! [`Event`] trait.

pub mod event;
pub mod sale;

pub use event::Event;
pub use sale::{RawSaleLine, SaleEvent, SaleLineItem, WireQuantity};
