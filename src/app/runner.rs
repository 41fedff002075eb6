use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::args::ClusterRole;
use crate::cluster::{
    MasterContext, MasterCoordinator, SlaveContext, bind_listener, spawn_slave_listener,
};
use crate::error::AppResult;
use crate::fanout::Broadcast;
use crate::http::{Fetch, HttpFetcher};
use crate::pool::{PoolOutputs, RequesterConfig, WorkerPool, spawn_pool_controller};
use crate::reporter::reporter_channel;
use crate::shutdown::{ShutdownSender, shutdown_channel};
use crate::shutdown_handlers::{
    setup_duration_handler, setup_keyboard_handler, setup_signal_shutdown_handler,
};
use crate::stats::{RunTotals, Sample, StatsInputs, spawn_stats_aggregator};
use crate::ui::{UiState, setup_headless_output, setup_render_ui};

use super::settings::{DisplayMode, RunSettings};

const SAMPLE_CHANNEL_CAPACITY: usize = 10_000;
const COMPLETION_CHANNEL_CAPACITY: usize = 10_000;
const RESIZE_CHANNEL_CAPACITY: usize = 1024;

/// How a finished run went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub totals: RunTotals,
    pub final_workers: usize,
    pub peak_workers: usize,
    pub slaves_connected: usize,
}

/// Runs until quit, a signal, or the configured duration.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built or the slave port
/// cannot be bound.
pub async fn run_load(settings: &RunSettings) -> AppResult<RunReport> {
    let fetcher = HttpFetcher::build(settings.request_timeout)?;
    let (shutdown_tx, _) = shutdown_channel();
    run_with_fetcher(settings, Arc::new(fetcher), &shutdown_tx).await
}

pub(crate) async fn run_with_fetcher(
    settings: &RunSettings,
    fetcher: Arc<dyn Fetch>,
    shutdown_tx: &ShutdownSender,
) -> AppResult<RunReport> {
    let mut shutdown_rx = shutdown_tx.subscribe();

    // Bind before anything runs so a taken port fails the start cleanly.
    let slave_listener = match &settings.role {
        ClusterRole::Slave { port } => Some(bind_listener(*port).await?),
        ClusterRole::Standalone | ClusterRole::Master { .. } => None,
    };

    let (reporter, display_rx) = reporter_channel();
    let (samples_tx, samples_rx) = mpsc::channel::<Sample>(SAMPLE_CHANNEL_CAPACITY);
    let (completions_tx, completions) = Broadcast::<u32>::channel(COMPLETION_CHANNEL_CAPACITY);
    let (resize_tx, resize) = Broadcast::<i64>::channel(RESIZE_CHANNEL_CAPACITY);

    let (_, stats_completions) = completions.subscribe(COMPLETION_CHANNEL_CAPACITY);
    let (_, pool_commands) = resize.subscribe(RESIZE_CHANNEL_CAPACITY);

    let stats_handle = spawn_stats_aggregator(
        settings.lookback,
        StatsInputs {
            samples: samples_rx,
            completions: stats_completions,
        },
        reporter.clone(),
        shutdown_tx,
    );

    let pool = WorkerPool::new(
        fetcher,
        RequesterConfig {
            target: settings.target.clone(),
            failure_tenths: settings.failure_tenths,
            delay: settings.delay,
        },
        PoolOutputs {
            samples: samples_tx,
            completions: completions_tx.clone(),
        },
        reporter.clone(),
        shutdown_tx,
    );
    let controller_handle = spawn_pool_controller(pool, pool_commands, shutdown_tx);

    let listener_handle = slave_listener.map(|listener| {
        if let Ok(addr) = listener.local_addr() {
            info!("Listening for a master on {}", addr);
        }
        spawn_slave_listener(
            listener,
            SlaveContext {
                commands: resize_tx.clone(),
                completions: completions.clone(),
                reporter: reporter.clone(),
            },
            shutdown_tx,
        )
    });

    let coordinator = match &settings.role {
        ClusterRole::Master { slaves } => {
            let coordinator = MasterCoordinator::connect(
                slaves,
                &MasterContext {
                    resize: resize.clone(),
                    completions: completions_tx.clone(),
                    reporter: reporter.clone(),
                },
            )
            .await;
            info!(
                "Controlling {} of {} slaves",
                coordinator.active_count(),
                slaves.len()
            );
            Some(coordinator)
        }
        ClusterRole::Standalone | ClusterRole::Slave { .. } => None,
    };
    drop(completions_tx);

    let signal_handle = setup_signal_shutdown_handler(shutdown_tx);
    let duration_handle = settings
        .run_duration
        .map(|duration| setup_duration_handler(shutdown_tx, duration));
    let (display_handle, keyboard_handle) = match settings.display {
        DisplayMode::Dashboard => {
            let state = UiState::new(settings.target.as_str(), &settings.role);
            (
                setup_render_ui(shutdown_tx, display_rx, state),
                Some(setup_keyboard_handler(shutdown_tx, resize_tx.clone())),
            )
        }
        DisplayMode::Headless => (setup_headless_output(shutdown_tx, display_rx), None),
    };

    for _ in 0..settings.initial_workers {
        if resize_tx.send(1).await.is_err() {
            warn!("Resize channel closed before the initial workers started");
            break;
        }
    }
    info!(
        "Load run started against {} with {} initial workers",
        settings.target, settings.initial_workers
    );

    drop(shutdown_rx.recv().await);

    let pool_report = controller_handle.await?;
    let aggregator = stats_handle.await?;
    let slaves_connected = match coordinator {
        Some(coordinator) => {
            let count = coordinator.connections().len();
            coordinator.shutdown().await;
            count
        }
        None => 0,
    };
    if let Some(handle) = listener_handle {
        handle.await?;
    }
    if let Some(handle) = keyboard_handle {
        handle.await?;
    }
    if let Some(handle) = duration_handle {
        handle.await?;
    }
    signal_handle.await?;
    display_handle.await?;

    let totals = aggregator.totals();
    info!(
        "Run finished: {} requests, {} failed, {} bytes",
        totals.requests, totals.failures, totals.bytes
    );
    Ok(RunReport {
        totals,
        final_workers: pool_report.final_workers,
        peak_workers: pool_report.peak_workers,
        slaves_connected,
    })
}
