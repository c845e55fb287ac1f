#![allow(dead_code)]

use async_trait::async_trait;
use launchdeck_core::{
    Collection, FetchError, FetchResult, Fetcher, InlinePublisher, Launch, Repository,
    RepositoryOptions, ResourceRequest, Subscription,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

pub enum Response {
    Items(Vec<Launch>),
    Fail(&'static str),
    Panic,
}

/// Fetcher replaying a fixed script of responses, optionally held until
/// `release` is called.
pub struct ScriptedFetcher {
    calls: AtomicUsize,
    requests: Mutex<Vec<ResourceRequest>>,
    responses: Mutex<VecDeque<Response>>,
    gate: Option<Semaphore>,
}

impl ScriptedFetcher {
    pub fn new(responses: Vec<Response>) -> Arc<Self> {
        Arc::new(Self::build(responses, None))
    }

    pub fn gated(responses: Vec<Response>) -> Arc<Self> {
        Arc::new(Self::build(responses, Some(Semaphore::new(0))))
    }

    fn build(responses: Vec<Response>, gate: Option<Semaphore>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
            gate,
        }
    }

    /// Lets one held fetch settle.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ResourceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher<Launch> for ScriptedFetcher {
    async fn fetch(&self, request: &ResourceRequest) -> FetchResult<Collection<Launch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Response::Items(Vec::new()));
        match response {
            Response::Items(items) => Ok(Collection::from_vec(items)),
            Response::Fail(message) => Err(FetchError::Transport(message.to_string())),
            Response::Panic => panic!("scripted fetcher panic"),
        }
    }
}

pub fn launch(id: &str) -> Launch {
    Launch {
        id: id.to_string(),
        flight_number: id.len() as u32,
        name: format!("mission-{id}"),
        date_utc: "2020-10-16T00:00:00.000Z".to_string(),
        success: None,
        details: None,
    }
}

pub fn launches(ids: &[&str]) -> Vec<Launch> {
    ids.iter().map(|id| launch(id)).collect()
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub fn repository(fetcher: Arc<ScriptedFetcher>, eager_refresh: bool) -> Repository<Launch> {
    Repository::with_options(
        fetcher,
        Handle::current(),
        Arc::new(InlinePublisher),
        RepositoryOptions {
            eager_refresh,
            ..RepositoryOptions::default()
        },
    )
}

/// Polls `condition` until it holds, failing the test after five seconds.
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition should hold within timeout");
}

pub async fn settle(repo: &Repository<Launch>) {
    wait_for(|| !repo.is_loading()).await;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Loading(bool),
    Collection(Vec<String>),
}

/// Records collection and loading publications in one shared timeline.
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    _subscriptions: Vec<Subscription>,
}

impl Recorder {
    pub fn attach(repo: &Repository<Launch>) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&events);
        let collection = repo.observe_collection().subscribe(move |value| {
            sink.lock().unwrap().push(Event::Collection(value.ids()));
        });
        let sink = Arc::clone(&events);
        let loading = repo.observe_loading().subscribe(move |value| {
            sink.lock().unwrap().push(Event::Loading(*value));
        });

        Self {
            events,
            _subscriptions: vec![collection, loading],
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}
