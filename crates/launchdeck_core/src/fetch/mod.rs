//! Fetcher contract consumed by repositories.
//!
//! # Responsibility
//! - Define the async capability that turns a `ResourceRequest` into a
//!   typed collection.
//! - Provide a fixture-backed implementation for local runs and tests.
//!
//! # Invariants
//! - Fetchers never touch repository state; they only return a result.
//! - Network transport and authentication belong to implementations, not to
//!   the repository.

use crate::model::collection::Collection;
use crate::router::ResourceRequest;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fixture;

pub type FetchResult<T> = Result<T, FetchError>;

/// Failure of one fetch call.
///
/// Repositories treat every variant identically as "no new data".
#[derive(Debug)]
pub enum FetchError {
    Transport(String),
    Status(u16),
    Decode(String),
    Io(std::io::Error),
    /// The fetch task panicked or was cancelled before settling.
    Aborted(String),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport failure: {message}"),
            Self::Status(code) => write!(f, "unexpected response status {code}"),
            Self::Decode(message) => write!(f, "response decode failed: {message}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Aborted(message) => write!(f, "fetch aborted: {message}"),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Transport(_) | Self::Status(_) | Self::Decode(_) | Self::Aborted(_) => None,
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

/// Async capability that retrieves a full collection for one request.
#[async_trait]
pub trait Fetcher<T>: Send + Sync + 'static {
    async fn fetch(&self, request: &ResourceRequest) -> FetchResult<Collection<T>>;
}
