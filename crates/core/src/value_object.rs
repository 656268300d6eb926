//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Codes such as a SKU or a catalog object id carry no identity of their own;
/// two values with the same text are the same value.
///
/// ```ignore
/// let a = Sku::new("BJM-001-BLU-M")?;
/// let b = Sku::new("BJM-001-BLU-M")?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
