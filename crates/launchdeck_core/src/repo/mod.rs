//! Reactive client-side repositories.
//!
//! # Responsibility
//! - Own observable collection and loading state for one remote resource.
//! - Coordinate single-flight refreshes through an injected `Fetcher`.
//! - Apply local optimistic mutations ahead of any server confirmation.
//!
//! # Invariants
//! - At most one fetch is outstanding per repository instance.
//! - Fetch failures never reach collection or loading observers as errors.
//! - Only the repository publishes its state; observers get read-only views.

pub mod collection_repo;
