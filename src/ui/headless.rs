use tracing::info;

use crate::reporter::{DisplayEvent, DisplayReceiver};
use crate::shutdown::ShutdownSender;

/// Drains display events into the log when no terminal dashboard runs.
#[must_use]
pub fn setup_headless_output(
    shutdown_tx: &ShutdownSender,
    mut display_rx: DisplayReceiver,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                event = display_rx.recv() => match event {
                    Some(event) => log_event(&event),
                    None => break,
                },
            }
        }
    })
}

pub(crate) fn log_event(event: &DisplayEvent) {
    match event {
        DisplayEvent::WorkerCount { count, message } => info!("{}: {}", message, count),
        DisplayEvent::WorkerStopped { id, requests } => {
            info!("worker {} stopped after {} requests", id, requests);
        }
        DisplayEvent::Request { hit_id, ok } => {
            if !ok {
                info!("request fail {}", hit_id);
            }
        }
        DisplayEvent::Info(message) => info!("{}", message),
        DisplayEvent::Summary(summary) => info!(
            "second {:02}: latency {} req/s {} bytes/s {} failures {}",
            summary.second,
            summary.avg_latency,
            summary.rps_line(),
            summary.bytes_per_sec,
            summary.failures_in_window
        ),
    }
}
