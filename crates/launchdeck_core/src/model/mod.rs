//! Client-side data model for remote collections.
//!
//! # Responsibility
//! - Define the identity contract every fetched entity satisfies.
//! - Keep an ordered, identifier-unique collection shape for UI projections.
//!
//! # Invariants
//! - No two elements of a `Collection` share an identifier.
//! - Collections are replaced wholesale, never mutated in place by observers.

pub mod collection;
pub mod entity;
pub mod launch;
