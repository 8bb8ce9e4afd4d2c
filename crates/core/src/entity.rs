//! Entity trait: identity + continuity across state changes.

/// Something identified by an id rather than by its attribute values.
///
/// A cart line keeps its identity (the variant) while its quantity changes.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether both values denote the same entity, whatever their attributes.
    fn is_same_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
