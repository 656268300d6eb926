//! Entity trait: identity that survives status changes.

/// Entity marker + minimal interface.
///
/// An item record is an entity: its status may flip from in-store to sold,
/// but the EPC keeps identifying the same physical garment.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
