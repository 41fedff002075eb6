use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};
use url::Url;

use crate::clock;
use crate::http::{Fetch, FetchOutcome};
use crate::reporter::Reporter;
use crate::shutdown::ShutdownReceiver;
use crate::stats::{Outcome, Sample};

use super::request::{build_request_url, hit_id, should_inject_failure};

/// Shared, read-only settings for every requester.
#[derive(Debug, Clone)]
pub struct RequesterConfig {
    pub target: Url,
    /// Chance of an injected failure, in tenths (`0..=10`).
    pub failure_tenths: u8,
    pub delay: Duration,
}

/// Where requesters send their measurements.
#[derive(Debug, Clone)]
pub struct PoolOutputs {
    pub samples: mpsc::Sender<Sample>,
    pub completions: mpsc::Sender<u32>,
}

pub(super) struct RequesterContext {
    pub(super) id: usize,
    pub(super) fetcher: Arc<dyn Fetch>,
    pub(super) config: Arc<RequesterConfig>,
    pub(super) outputs: PoolOutputs,
    pub(super) reporter: Reporter,
    pub(super) shutdown_rx: ShutdownReceiver,
}

/// Issues requests until `stop` fires or its sender is dropped.
///
/// `stop` lets the in-flight request finish and be recorded. A process-wide
/// shutdown abandons it instead and records it as a failure, so a target that
/// never answers cannot hold the exit.
///
/// Returns the number of requests recorded.
pub(super) async fn run_requester(context: RequesterContext, mut stop: oneshot::Receiver<()>) -> u64 {
    let RequesterContext {
        id,
        fetcher,
        config,
        outputs,
        reporter,
        mut shutdown_rx,
    } = context;
    let mut rng = StdRng::from_entropy();
    let mut sequence: u64 = 0;

    loop {
        match stop.try_recv() {
            Err(oneshot::error::TryRecvError::Empty) => {}
            Ok(()) | Err(oneshot::error::TryRecvError::Closed) => break,
        }
        match shutdown_rx.try_recv() {
            Err(broadcast::error::TryRecvError::Empty) => {}
            Ok(())
            | Err(
                broadcast::error::TryRecvError::Closed | broadcast::error::TryRecvError::Lagged(_),
            ) => break,
        }

        sequence = sequence.saturating_add(1);
        let hit = hit_id(id, sequence);
        let inject = should_inject_failure(&mut rng, config.failure_tenths);
        let url = build_request_url(&config.target, &hit, inject);

        let started = Instant::now();
        let (outcome, abandoned) = tokio::select! {
            outcome = fetcher.fetch(&url) => (outcome, false),
            _ = shutdown_rx.recv() => {
                debug!("Worker {} abandoned request {} on shutdown", id, hit);
                let outcome = FetchOutcome::TransportError {
                    message: "abandoned on shutdown".to_owned(),
                };
                (outcome, true)
            }
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let second = clock::current_second();
        let ok = outcome.is_success();
        if !ok {
            debug!("Request {} failed: {:?}", hit, outcome);
        }

        let sample = Sample {
            hit_id: hit.clone(),
            duration_ms,
            byte_count: outcome.byte_count(),
            completed_at_second: second,
            outcome: if ok { Outcome::Success } else { Outcome::Failure },
        };
        if outputs.samples.send(sample).await.is_err()
            || outputs.completions.send(second).await.is_err()
        {
            debug!("Worker {} lost its stats channels", id);
            break;
        }
        reporter.request(hit, ok);
        if abandoned {
            break;
        }

        tokio::time::sleep(config.delay).await;
    }

    info!("Worker {} stopped after {} requests", id, sequence);
    reporter.worker_stopped(id, sequence);
    sequence
}
