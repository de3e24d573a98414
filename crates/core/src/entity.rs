//! Entity traits: identity + continuity across state changes.

use crate::id::UserId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity that carries an owner reference.
///
/// The owner is the only identity (besides an administrator, where an
/// endpoint grants that override) permitted to mutate the entity. It is set
/// once at creation and never reassigned.
pub trait Owned: Entity {
    /// Owner reference, `None` for records that lost theirs.
    fn owner_id(&self) -> Option<&UserId>;
}
