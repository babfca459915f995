//! Background saver.
//!
//! Requests carry a full snapshot. A newer request replaces any snapshot that
//! has not been picked up yet, and only one save runs at a time, so a slow
//! write can never land after a later one.

use super::PersistenceBridge;
use crate::schedule::ScheduleMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Clone)]
struct SaveRequest {
    generation: u64,
    snapshot: ScheduleMap,
}

pub struct SaveQueue {
    requests: watch::Sender<Option<SaveRequest>>,
    completed: watch::Receiver<u64>,
    requested: AtomicU64,
    worker: JoinHandle<()>,
}

impl SaveQueue {
    /// Starts the worker on the current tokio runtime.
    pub fn spawn(bridge: PersistenceBridge) -> Self {
        let (requests, pending) = watch::channel(None);
        let (done, completed) = watch::channel(0);
        let worker = tokio::spawn(run(bridge, pending, done));
        Self {
            requests,
            completed,
            requested: AtomicU64::new(0),
            worker,
        }
    }

    /// Queues `snapshot`, superseding any request that has not started.
    pub fn request(&self, snapshot: ScheduleMap) -> u64 {
        let generation = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.send_replace(Some(SaveRequest {
            generation,
            snapshot,
        }));
        generation
    }

    /// Number of save requests issued so far.
    pub fn requested(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    /// Generation of the newest request the worker has finished with.
    pub fn completed(&self) -> u64 {
        *self.completed.borrow()
    }

    /// Waits until every request made so far has been attempted.
    pub async fn flush(&self) {
        let target = self.requested();
        let mut completed = self.completed.clone();
        // Err means the worker is gone; nothing left to wait for.
        let _ = completed.wait_for(|done| *done >= target).await;
    }

    pub async fn shutdown(self) {
        self.flush().await;
        let SaveQueue {
            requests, worker, ..
        } = self;
        drop(requests);
        if let Err(err) = worker.await {
            warn!(error = %err, "save worker ended abnormally");
        }
    }
}

async fn run(
    bridge: PersistenceBridge,
    mut pending: watch::Receiver<Option<SaveRequest>>,
    done: watch::Sender<u64>,
) {
    while pending.changed().await.is_ok() {
        let latest = pending.borrow_and_update().clone();
        let Some(request) = latest else {
            continue;
        };
        let generation = request.generation;
        let bridge = bridge.clone();
        let result = tokio::task::spawn_blocking(move || bridge.save(&request.snapshot)).await;
        match result {
            Ok(Ok(())) => debug!(generation, "schedule save finished"),
            Ok(Err(err)) => {
                warn!(generation, error = %err, "schedule save failed, keeping in-memory state")
            }
            Err(err) => warn!(generation, error = %err, "schedule save task panicked"),
        }
        done.send_replace(generation);
    }
}
