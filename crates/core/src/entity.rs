//! Entity trait: identity + continuity across state changes.

/// Marker + minimal interface for identity-bearing domain objects.
///
/// An entity stays "the same thing" across mutation: a listing keeps its id
/// through price edits and moderation passes, and a catalog card keeps its
/// id across reprint metadata updates. Two entities with equal fields but
/// different ids are still different things - compare entities by id,
/// value objects by value.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
