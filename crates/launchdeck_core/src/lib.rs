//! Reactive client-side data repository core for launchdeck.
//! This crate owns observable collection state and the refresh protocol.

pub mod config;
pub mod dispatch;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod observable;
pub mod repo;
pub mod router;

pub use config::{ConfigError, CoreConfig};
pub use dispatch::{ActorPublisher, InlinePublisher, PublishContext, PublishJob};
pub use fetch::fixture::FixtureFetcher;
pub use fetch::{FetchError, FetchResult, Fetcher};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::collection::Collection;
pub use model::entity::Entity;
pub use model::launch::{Launch, LaunchId};
pub use observable::{ObservableValue, Subscription};
pub use repo::collection_repo::{
    RefreshDisposition, RefreshOutcome, Repository, RepositoryOptions,
};
pub use router::{PageRequest, ResourceRequest, Router, DEFAULT_API_BASE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
