//! Publish contexts for repository continuations.
//!
//! # Responsibility
//! - Carry the final state publication of a refresh cycle back onto the
//!   context observers expect.
//!
//! # Invariants
//! - Jobs posted to one context run one at a time, in post order.
//! - A posted job is never silently dropped: if the context is gone the job
//!   runs inline on the posting thread.

use log::{error, info, warn};
use std::fmt::{Debug, Formatter};
use std::thread::JoinHandle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

/// Deferred state publication.
pub type PublishJob = Box<dyn FnOnce() + Send + 'static>;

/// Execution context on which repository state is published.
pub trait PublishContext: Send + Sync {
    fn post(&self, job: PublishJob);
}

/// Runs jobs on the posting thread.
///
/// Suitable when observers are thread-agnostic; notifications stay
/// serialized by the repository's publish gate.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlinePublisher;

impl PublishContext for InlinePublisher {
    fn post(&self, job: PublishJob) {
        job();
    }
}

/// Single-threaded actor that runs jobs on one dedicated, named OS thread.
///
/// Only posted jobs run here. A repository publishes the end of each refresh
/// cycle (new collection, outcome, `loading=false`) through its context, while
/// `loading=true` and local deletes are published synchronously on the thread
/// that called `refresh` or `delete`. Observers that need a single thread
/// should drive those calls from the actor thread as well.
pub struct ActorPublisher {
    name: String,
    sender: UnboundedSender<PublishJob>,
    _thread: JoinHandle<()>,
}

impl ActorPublisher {
    /// Spawns the actor thread.
    ///
    /// # Errors
    /// - Returns the OS error when the thread cannot be spawned.
    pub fn spawn(name: impl Into<String>) -> std::io::Result<Self> {
        let name = name.into();
        let (sender, mut receiver) = unbounded_channel::<PublishJob>();
        let thread_name = name.clone();

        let thread = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                info!("event=publisher_start module=dispatch status=ok thread={thread_name}");
                while let Some(job) = receiver.blocking_recv() {
                    job();
                }
                info!("event=publisher_stop module=dispatch status=ok thread={thread_name}");
            })
            .map_err(|err| {
                error!(
                    "event=publisher_start module=dispatch status=error thread={} error={}",
                    name, err
                );
                err
            })?;

        Ok(Self {
            name,
            sender,
            _thread: thread,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PublishContext for ActorPublisher {
    fn post(&self, job: PublishJob) {
        if let Err(rejected) = self.sender.send(job) {
            warn!(
                "event=publish_fallback module=dispatch status=skipped thread={} reason=actor_stopped",
                self.name
            );
            (rejected.0)();
        }
    }
}

impl Debug for ActorPublisher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorPublisher")
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ActorPublisher, InlinePublisher, PublishContext};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn inline_publisher_runs_job_immediately() {
        let (tx, rx) = mpsc::channel();
        InlinePublisher.post(Box::new(move || tx.send(7).unwrap()));
        assert_eq!(rx.try_recv().unwrap(), 7);
    }

    #[test]
    fn actor_runs_jobs_in_order_on_named_thread() {
        let publisher = ActorPublisher::spawn("launchdeck-test-publish").unwrap();
        let (tx, rx) = mpsc::channel();

        for index in 0..5 {
            let tx = tx.clone();
            publisher.post(Box::new(move || {
                let thread = std::thread::current().name().map(str::to_string);
                tx.send((index, thread)).unwrap();
            }));
        }

        let received: Vec<_> = (0..5)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        let order: Vec<_> = received.iter().map(|(index, _)| *index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert!(received
            .iter()
            .all(|(_, thread)| thread.as_deref() == Some("launchdeck-test-publish")));
        assert_eq!(publisher.name(), "launchdeck-test-publish");
    }
}
