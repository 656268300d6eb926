//! Catalog mapping between the two inventory systems.
//!
//! Static reference data: which POS catalog object and location a SKU counts
//! against. Injected into both sync flows; never mutated by them.

pub mod mapping;

pub use mapping::{CatalogEntry, CatalogMapping, CatalogTarget};
