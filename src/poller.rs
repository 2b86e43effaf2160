//! Interval refresh while something is still active.
//!
//! The poller fetches once right away, then on every tick, and publishes
//! each outcome on a channel. It stops when:
//! - the latest snapshot has nothing active
//! - its cancellation token fires
//! - the receiver is dropped
//! - the [`PollerHandle`] is dropped
//!
//! Fetch errors are published and polling goes on.
//!
//! # Dependency Injection
//!
//! [`spawn_poller`] takes any fetch closure; [`poll_jobs`] and [`poll_job`]
//! wire it to a [`CopilotClient`], which may itself run on the mock
//! transport in tests.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::{CopilotClient, JobFilter};
use crate::error::{CopilotError, CopilotResult};
use crate::models::Job;

/// Shortest interval a poller will tick at; shorter requests are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One poll outcome.
#[derive(Debug)]
pub enum PollUpdate<T> {
    Snapshot(T),
    Failed(CopilotError),
}

/// Owns a running poller. Dropping it stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the poller task to end on its own (or after [`stop`](Self::stop)).
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Poller task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn a poller.
///
/// # Arguments
///
/// * `interval` - time between fetches, raised to [`MIN_POLL_INTERVAL`]
/// * `fetch` - produces one snapshot
/// * `is_active` - polling continues while this holds for the latest snapshot
/// * `cancel` - external stop signal; the handle uses a child token
pub fn spawn_poller<T, F, Fut, P>(
    interval: Duration,
    mut fetch: F,
    is_active: P,
    cancel: CancellationToken,
) -> (PollerHandle, mpsc::UnboundedReceiver<PollUpdate<T>>)
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = CopilotResult<T>> + Send,
    P: Fn(&T) -> bool + Send + 'static,
{
    if interval < MIN_POLL_INTERVAL {
        tracing::warn!(
            "Poll interval {:?} is below {:?}, using the minimum",
            interval,
            MIN_POLL_INTERVAL
        );
    }
    let interval = interval.max(MIN_POLL_INTERVAL);

    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = cancel.child_token();
    let task_cancel = cancel.clone();

    let task = tokio::spawn(async move {
        tracing::info!("Poller started (interval: {:?})", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = task_cancel.cancelled() => {
                    tracing::debug!("Poller cancelled");
                    break;
                }
                _ = tx.closed() => {
                    tracing::debug!("Poller receiver dropped");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                biased;
                _ = task_cancel.cancelled() => break,
                outcome = fetch() => outcome,
            };

            let keep_going = match outcome {
                Ok(snapshot) => {
                    let active = is_active(&snapshot);
                    if tx.send(PollUpdate::Snapshot(snapshot)).is_err() {
                        break;
                    }
                    active
                }
                Err(e) => {
                    tracing::warn!(code = e.error_code(), "Poll failed: {}", e);
                    if tx.send(PollUpdate::Failed(e)).is_err() {
                        break;
                    }
                    true
                }
            };

            if !keep_going {
                tracing::info!("Nothing active, poller finished");
                break;
            }
        }

        tracing::debug!("Poller stopped");
    });

    (
        PollerHandle {
            cancel,
            task: Some(task),
        },
        rx,
    )
}

/// Poll the job list while any listed job is pending or running.
pub fn poll_jobs(
    client: CopilotClient,
    filter: JobFilter,
    interval: Duration,
    cancel: CancellationToken,
) -> (PollerHandle, mpsc::UnboundedReceiver<PollUpdate<Vec<Job>>>) {
    spawn_poller(
        interval,
        move || {
            let client = client.clone();
            async move { client.list_jobs(&filter).await }
        },
        |jobs: &Vec<Job>| jobs.iter().any(Job::is_active),
        cancel,
    )
}

/// Poll one job until it leaves the active states.
pub fn poll_job(
    client: CopilotClient,
    job_id: String,
    interval: Duration,
    cancel: CancellationToken,
) -> (PollerHandle, mpsc::UnboundedReceiver<PollUpdate<Job>>) {
    spawn_poller(
        interval,
        move || {
            let client = client.clone();
            let job_id = job_id.clone();
            async move { client.get_job(&job_id).await }
        },
        Job::is_active,
        cancel,
    )
}
