//! The resizable set of requesters.
//!
//! Workers form a stack: growing pushes a new worker whose id is its stack
//! position, shrinking stops the most recently started one. Stopping is
//! cooperative, so a worker finishes and records its in-flight request first.
//! A process-wide shutdown is not: workers abandon whatever is in flight and
//! record it as a failure.

mod request;
mod worker;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::http::Fetch;
use crate::reporter::Reporter;
use crate::shutdown::ShutdownSender;

pub use request::{FAILURE_MARKER, build_request_url, hit_id, should_inject_failure};
pub use worker::{PoolOutputs, RequesterConfig};

use worker::{RequesterContext, run_requester};

/// Largest number of unit steps a single resize command applies.
pub const MAX_RESIZE_STEP: u64 = 10_000;

#[derive(Debug)]
pub struct WorkerHandle {
    pub id: usize,
    stop: oneshot::Sender<()>,
    task: JoinHandle<u64>,
}

impl WorkerHandle {
    fn stop(self) -> JoinHandle<u64> {
        drop(self.stop.send(()));
        self.task
    }
}

pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    retired: Vec<JoinHandle<u64>>,
    fetcher: Arc<dyn Fetch>,
    config: Arc<RequesterConfig>,
    outputs: PoolOutputs,
    reporter: Reporter,
    shutdown_tx: ShutdownSender,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .field("retired", &self.retired.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkerPool {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        config: RequesterConfig,
        outputs: PoolOutputs,
        reporter: Reporter,
        shutdown_tx: &ShutdownSender,
    ) -> Self {
        Self {
            workers: Vec::new(),
            retired: Vec::new(),
            fetcher,
            config: Arc::new(config),
            outputs,
            reporter,
            shutdown_tx: shutdown_tx.clone(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Applies `delta` one worker at a time and returns the new pool size.
    ///
    /// Shrinking an empty pool is reported and ignored.
    pub fn resize(&mut self, delta: i64) -> usize {
        let mut steps = delta.unsigned_abs();
        if steps > MAX_RESIZE_STEP {
            warn!(
                "Resize by {} exceeds the per-command limit; applying {}",
                delta, MAX_RESIZE_STEP
            );
            steps = MAX_RESIZE_STEP;
        }
        for _ in 0..steps {
            if delta > 0 {
                self.grow();
            } else {
                self.shrink();
            }
        }
        self.len()
    }

    fn grow(&mut self) {
        let id = self.workers.len();
        let (stop_tx, stop_rx) = oneshot::channel();
        let context = RequesterContext {
            id,
            fetcher: Arc::clone(&self.fetcher),
            config: Arc::clone(&self.config),
            outputs: self.outputs.clone(),
            reporter: self.reporter.clone(),
            shutdown_rx: self.shutdown_tx.subscribe(),
        };
        let task = tokio::spawn(run_requester(context, stop_rx));
        debug!("Started worker {}", id);
        self.workers.push(WorkerHandle {
            id,
            stop: stop_tx,
            task,
        });
    }

    fn shrink(&mut self) {
        match self.workers.pop() {
            Some(handle) => {
                debug!("Stopping worker {}", handle.id);
                self.retired.retain(|task| !task.is_finished());
                self.retired.push(handle.stop());
            }
            None => {
                warn!("Ignoring decrease: there are no workers");
                self.reporter.info("ignoring decrease: there are no workers");
            }
        }
    }

    /// Stops every worker, newest first, and waits for all of them.
    ///
    /// Returns the total number of requests the awaited workers made.
    pub async fn shutdown(&mut self) -> u64 {
        while let Some(handle) = self.workers.pop() {
            self.retired.push(handle.stop());
        }
        let mut total: u64 = 0;
        for task in self.retired.drain(..) {
            match task.await {
                Ok(requests) => total = total.saturating_add(requests),
                Err(err) => warn!("Worker task failed: {}", err),
            }
        }
        total
    }
}

/// What the controller saw over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Pool size when the controller stopped, before the final shutdown.
    pub final_workers: usize,
    pub peak_workers: usize,
    pub requests: u64,
}

/// Applies resize commands from `commands` until shutdown or until every
/// command sender is gone, then stops the pool.
#[must_use]
pub fn spawn_pool_controller(
    mut pool: WorkerPool,
    mut commands: mpsc::Receiver<i64>,
    shutdown_tx: &ShutdownSender,
) -> JoinHandle<PoolReport> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut peak_workers = 0;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                maybe_delta = commands.recv() => {
                    let Some(delta) = maybe_delta else {
                        break;
                    };
                    let before = pool.len();
                    let count = pool.resize(delta);
                    peak_workers = peak_workers.max(count);
                    let message = if count > before {
                        "increasing workers"
                    } else if count < before {
                        "decreasing workers"
                    } else {
                        "worker count unchanged"
                    };
                    info!("{} to {}", message, count);
                    pool.reporter.worker_count(count, message);
                }
            }
        }
        let final_workers = pool.len();
        let requests = pool.shutdown().await;
        info!("Worker pool stopped after {} requests", requests);
        PoolReport {
            final_workers,
            peak_workers,
            requests,
        }
    })
}
