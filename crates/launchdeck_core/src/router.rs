//! Resource request construction for collection endpoints.
//!
//! # Responsibility
//! - Map an endpoint identity plus optional paging to a request descriptor.
//! - Map an endpoint identity plus one item key to a single-item descriptor.
//! - Attach the header set every request carries.
//!
//! # Invariants
//! - `limit`/`offset` are forwarded untouched; the router never invents paging.

use std::collections::BTreeMap;
use std::fmt::Display;

/// Base URL of the public launch API.
pub const DEFAULT_API_BASE: &str = "https://api.spacexdata.com/v4";

/// Optional paging parameters forwarded to the remote source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageRequest {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self { limit, offset }
    }
}

/// Request descriptor handed to a `Fetcher`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    /// Endpoint identity, e.g. `launches`.
    pub resource: String,
    /// Fully built URL including paging query parameters.
    pub url: String,
    pub page: PageRequest,
    pub headers: BTreeMap<String, String>,
}

/// Routing helper that builds `ResourceRequest`s against one API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    base_url: String,
    headers: BTreeMap<String, String>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl Router {
    /// Creates a router with the default JSON header set.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self { base_url, headers }
    }

    /// Adds or replaces one header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request descriptor for `resource` with `page` applied.
    pub fn request(&self, resource: &str, page: PageRequest) -> ResourceRequest {
        let resource = resource.trim_matches('/');
        let mut url = format!("{}/{}", self.base_url, resource);

        let query: Vec<String> = [("limit", page.limit), ("offset", page.offset)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| format!("{key}={value}")))
            .collect();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }

        ResourceRequest {
            resource: resource.to_string(),
            url,
            page,
            headers: self.headers.clone(),
        }
    }

    /// Builds the request descriptor for one item of `resource`, e.g.
    /// `launches/42`. Paging never applies to single items.
    pub fn request_item(&self, resource: &str, key: impl Display) -> ResourceRequest {
        let resource = resource.trim_matches('/');
        let key = key.to_string();
        ResourceRequest {
            resource: resource.to_string(),
            url: format!("{}/{}/{}", self.base_url, resource, key.trim_matches('/')),
            page: PageRequest::default(),
            headers: self.headers.clone(),
        }
    }
}
