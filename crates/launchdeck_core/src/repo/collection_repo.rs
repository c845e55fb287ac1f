//! Observable collection repository backed by an async fetcher.
//!
//! # Responsibility
//! - Publish the current collection and loading flag to observers.
//! - Run refreshes on the background runtime and publish their result on
//!   the configured publish context.
//!
//! # Invariants
//! - The loading flag is the single-flight lock: it flips `false -> true`
//!   atomically when a refresh is accepted and back to `false` exactly once
//!   when that refresh settles, success or failure.
//! - Within one cycle observers see `loading=true`, then the new collection
//!   (success only), then the outcome, then `loading=false`.
//! - A successful fetch replaces the collection in full.
//! - `delete` is local only and publishes only when something was removed.
//!
//! Observers are notified while the repository's publish gate is held, so a
//! callback must not call `delete` or `refresh` on the same repository.

use crate::dispatch::PublishContext;
use crate::fetch::{FetchError, FetchResult, Fetcher};
use crate::model::collection::Collection;
use crate::model::entity::Entity;
use crate::observable::{ObservableValue, PublishGate};
use crate::router::{PageRequest, Router};
use log::{debug, info, warn};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::runtime::Handle;

/// Construction options for `Repository`.
#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    /// Trigger one refresh during construction.
    pub eager_refresh: bool,
    /// Paging applied by `refresh()`. Both fields are `None` by default.
    pub page: PageRequest,
    pub router: Router,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            eager_refresh: true,
            page: PageRequest::default(),
            router: Router::default(),
        }
    }
}

/// Result of the most recent settled refresh.
///
/// Published separately from the collection so a "could not load" signal can
/// be shown without changing collection or loading semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    NotYetRun,
    Loaded { count: usize },
    Failed { reason: String },
}

/// What a `refresh` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDisposition {
    /// A new fetch was dispatched.
    Started,
    /// A fetch was already in flight; the call was dropped.
    AlreadyInFlight,
}

struct RepositoryState<T> {
    collection: ObservableValue<Collection<T>>,
    loading: ObservableValue<bool>,
    last_refresh: ObservableValue<RefreshOutcome>,
}

/// Reactive repository for one remote collection of `T`.
pub struct Repository<T: Entity> {
    state: Arc<RepositoryState<T>>,
    fetcher: Arc<dyn Fetcher<T>>,
    runtime: Handle,
    publisher: Arc<dyn PublishContext>,
    router: Router,
    default_page: PageRequest,
}

impl<T: Entity> Repository<T> {
    /// Creates a repository with default options and triggers one refresh.
    ///
    /// `runtime` runs fetches; `publisher` receives the final publication of
    /// each refresh cycle.
    pub fn new(
        fetcher: Arc<dyn Fetcher<T>>,
        runtime: Handle,
        publisher: Arc<dyn PublishContext>,
    ) -> Self {
        Self::with_options(fetcher, runtime, publisher, RepositoryOptions::default())
    }

    /// Creates a repository with explicit options.
    ///
    /// State starts as an empty collection with `loading=false`.
    pub fn with_options(
        fetcher: Arc<dyn Fetcher<T>>,
        runtime: Handle,
        publisher: Arc<dyn PublishContext>,
        options: RepositoryOptions,
    ) -> Self {
        let gate = Arc::new(PublishGate::default());
        let state = Arc::new(RepositoryState {
            collection: ObservableValue::with_gate(Collection::default(), Arc::clone(&gate)),
            loading: ObservableValue::with_gate(false, Arc::clone(&gate)),
            last_refresh: ObservableValue::with_gate(RefreshOutcome::NotYetRun, gate),
        });

        let repository = Self {
            state,
            fetcher,
            runtime,
            publisher,
            router: options.router,
            default_page: options.page,
        };

        if options.eager_refresh {
            repository.refresh();
        }
        repository
    }

    /// Live, replay-latest collection.
    pub fn observe_collection(&self) -> ObservableValue<Collection<T>> {
        self.state.collection.clone()
    }

    /// Live, replay-latest loading flag.
    pub fn observe_loading(&self) -> ObservableValue<bool> {
        self.state.loading.clone()
    }

    /// Live, replay-latest outcome of the last settled refresh.
    pub fn observe_last_refresh(&self) -> ObservableValue<RefreshOutcome> {
        self.state.last_refresh.clone()
    }

    pub fn collection(&self) -> Collection<T> {
        self.state.collection.get()
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading.get()
    }

    /// Removes element(s) with identifier `id` from the local collection.
    ///
    /// Publishes synchronously on the calling thread. Never contacts the
    /// remote source. No-op when nothing matches.
    pub fn delete(&self, id: &T::Id) {
        let removed = self.state.collection.update(|current| current.without(id));
        if removed {
            info!(
                "event=delete module=repo status=ok resource={} id={:?}",
                T::RESOURCE,
                id
            );
        } else {
            debug!(
                "event=delete module=repo status=skipped resource={} id={:?} reason=not_found",
                T::RESOURCE,
                id
            );
        }
    }

    /// Re-fetches the full collection with the configured default paging.
    ///
    /// Never blocks. Dropped (not queued) while another refresh is in flight.
    pub fn refresh(&self) -> RefreshDisposition {
        self.refresh_page(self.default_page)
    }

    /// Re-fetches with explicit paging; `limit`/`offset` go to the fetcher
    /// untouched. Same single-flight rule as `refresh`.
    pub fn refresh_page(&self, page: PageRequest) -> RefreshDisposition {
        // Publishes loading=true on the calling thread when accepted.
        if !self.state.loading.compare_and_set(&false, true) {
            debug!(
                "event=refresh_skipped module=repo status=skipped resource={} reason=in_flight",
                T::RESOURCE
            );
            return RefreshDisposition::AlreadyInFlight;
        }

        let request = self.router.request(T::RESOURCE, page);
        info!(
            "event=refresh_start module=repo status=start resource={} url={}",
            request.resource, request.url
        );

        let fetcher = Arc::clone(&self.fetcher);
        let publisher = Arc::clone(&self.publisher);
        let state = Arc::downgrade(&self.state);
        let runtime = self.runtime.clone();
        let started_at = Instant::now();

        self.runtime.spawn(async move {
            let resource = request.resource.clone();
            // Awaiting a separate task turns a panicking fetcher into an error,
            // so the loading flag is still cleared.
            let fetch = runtime.spawn(async move { fetcher.fetch(&request).await });
            let result = match fetch.await {
                Ok(result) => result,
                Err(join_error) => Err(FetchError::Aborted(join_error.to_string())),
            };
            publisher.post(Box::new(move || {
                complete_refresh(&state, &resource, result, started_at);
            }));
        });

        RefreshDisposition::Started
    }
}

fn complete_refresh<T: Entity>(
    state: &Weak<RepositoryState<T>>,
    resource: &str,
    result: FetchResult<Collection<T>>,
    started_at: Instant,
) {
    let Some(state) = state.upgrade() else {
        debug!(
            "event=refresh_done module=repo status=skipped resource={} reason=repository_dropped",
            resource
        );
        return;
    };

    let duration_ms = started_at.elapsed().as_millis();
    let outcome = match result {
        Ok(collection) => {
            let count = collection.len();
            state.collection.set(collection);
            info!(
                "event=refresh_done module=repo status=ok resource={} count={} duration_ms={}",
                resource, count, duration_ms
            );
            RefreshOutcome::Loaded { count }
        }
        Err(err) => {
            warn!(
                "event=refresh_failed module=repo status=error resource={} duration_ms={} error={}",
                resource, duration_ms, err
            );
            RefreshOutcome::Failed {
                reason: err.to_string(),
            }
        }
    };

    state.last_refresh.set(outcome);
    state.loading.set(false);
}
