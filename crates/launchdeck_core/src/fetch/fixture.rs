//! Fixture-backed fetcher reading JSON documents from a directory.
//!
//! # Responsibility
//! - Serve `<dir>/<resource>.json` as the remote collection for a resource.
//! - Apply `offset` then `limit` the way a paging server would.
//!
//! # Invariants
//! - Resource names never escape the fixture directory.

use crate::fetch::{FetchError, FetchResult, Fetcher};
use crate::model::collection::Collection;
use crate::model::entity::Entity;
use crate::router::ResourceRequest;
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Fetcher serving JSON array documents from a local directory.
pub struct FixtureFetcher<T> {
    dir: PathBuf,
    _entity: PhantomData<fn() -> T>,
}

impl<T> FixtureFetcher<T> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _entity: PhantomData,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves the fixture document for `resource`.
    pub fn path_for(&self, resource: &str) -> FetchResult<PathBuf> {
        let valid = !resource.is_empty()
            && resource
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(FetchError::Transport(format!(
                "resource `{resource}` cannot be mapped to a fixture file"
            )));
        }
        Ok(self.dir.join(format!("{resource}.json")))
    }
}

#[async_trait]
impl<T> Fetcher<T> for FixtureFetcher<T>
where
    T: Entity + DeserializeOwned,
{
    async fn fetch(&self, request: &ResourceRequest) -> FetchResult<Collection<T>> {
        let path = self.path_for(&request.resource)?;
        let bytes = tokio::fs::read(&path).await?;
        let items: Vec<T> = serde_json::from_slice(&bytes)?;
        let available = items.len();

        let offset = request.page.offset.map_or(0, |value| value as usize);
        let page = items.into_iter().skip(offset);
        let items: Vec<T> = match request.page.limit {
            Some(limit) => page.take(limit as usize).collect(),
            None => page.collect(),
        };

        debug!(
            "event=fixture_fetch module=fetch status=ok resource={} available={} returned={}",
            request.resource,
            available,
            items.len()
        );
        Ok(Collection::from_vec(items))
    }
}
