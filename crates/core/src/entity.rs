//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Stock entries are entities keyed by a composite `(part, warehouse)` key;
/// catalog records are keyed by their own ids.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
