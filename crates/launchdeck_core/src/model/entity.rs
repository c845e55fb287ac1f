//! Identity contract for entities held by a repository.

use std::fmt::Debug;
use std::hash::Hash;

/// An entity served by a remote collection endpoint.
///
/// The repository treats entities as opaque apart from their identifier.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Unique identifier type.
    type Id: Eq + Hash + Clone + Debug + Send + Sync + 'static;

    /// Endpoint identity of the collection this entity is listed under.
    const RESOURCE: &'static str;

    fn id(&self) -> &Self::Id;
}
