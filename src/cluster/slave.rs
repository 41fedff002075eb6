use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ClusterError};
use crate::fanout::Broadcast;
use crate::reporter::Reporter;
use crate::shutdown::ShutdownSender;

use super::protocol::{StatsForInterval, encode_report, parse_commands};

const READ_BUFFER_BYTES: usize = 1024;
const REPORT_CHANNEL_CAPACITY: usize = 1024;

/// Everything a slave connection needs from the local process.
#[derive(Debug, Clone)]
pub struct SlaveContext {
    /// Inbound side of the resize broadcast.
    pub commands: mpsc::Sender<i64>,
    pub completions: Broadcast<u32>,
    pub reporter: Reporter,
}

/// Binds the control port on all interfaces.
///
/// # Errors
///
/// Returns an error when the port cannot be bound.
pub async fn bind_listener(port: u16) -> AppResult<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr).await.map_err(|source| {
        AppError::cluster(ClusterError::Bind {
            addr: addr.to_string(),
            source,
        })
    })
}

/// Accepts masters until shutdown, one task per connection.
#[must_use]
pub fn spawn_slave_listener(
    listener: TcpListener,
    context: SlaveContext,
    shutdown_tx: &ShutdownSender,
) -> JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!("Master connected from {}", peer);
                        context.reporter.info(format!("master connected from {}", peer));
                        let context = context.clone();
                        let shutdown_tx = shutdown_tx.clone();
                        tokio::spawn(async move {
                            if let Err(err) =
                                handle_master_connection(stream, peer, context, &shutdown_tx).await
                            {
                                warn!("Connection from {} closed: {}", peer, err);
                            }
                        });
                    }
                    Err(err) => warn!("Failed to accept master connection: {}", err),
                },
            }
        }
        debug!("Slave listener stopped");
    })
}

/// Serves one master until it disconnects, sends garbage, or shutdown.
///
/// # Errors
///
/// Returns an error for read failures and unparsable commands; a clean close
/// by the master is `Ok`.
pub async fn handle_master_connection(
    stream: TcpStream,
    peer: SocketAddr,
    context: SlaveContext,
    shutdown_tx: &ShutdownSender,
) -> Result<(), ClusterError> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let (mut read_half, write_half) = stream.into_split();
    let mut write_half = Some(write_half);
    let mut reporting: Option<ReportingTask> = None;
    let mut buffer = vec![0u8; READ_BUFFER_BYTES];

    let result = loop {
        let read = tokio::select! {
            _ = shutdown_rx.recv() => break Ok(()),
            read = read_half.read(&mut buffer) => read,
        };
        let received = match read {
            Ok(0) => {
                info!("Master {} disconnected", peer);
                break Ok(());
            }
            Ok(received) => received,
            Err(source) => {
                break Err(ClusterError::Read {
                    addr: peer.to_string(),
                    source,
                });
            }
        };

        let deltas = match parse_commands(buffer.get(..received).unwrap_or_default()) {
            Ok(deltas) => deltas,
            Err(err) => break Err(err),
        };
        if !deltas.is_empty()
            && reporting.is_none()
            && let Some(writer) = write_half.take()
        {
            reporting = Some(ReportingTask::start(writer, peer, &context.completions));
        }

        let mut forwarded = true;
        for delta in deltas {
            debug!("Master {} requested resize by {}", peer, delta);
            context
                .reporter
                .info(format!("master {} says {:+}", peer, delta));
            if context.commands.send(delta).await.is_err() {
                forwarded = false;
                break;
            }
        }
        if !forwarded {
            break Err(ClusterError::CommandChannelClosed);
        }
    };

    if let Some(task) = reporting {
        task.stop(&context.completions).await;
    }
    context
        .reporter
        .info(format!("master {} disconnected", peer));
    result
}

struct ReportingTask {
    subscription: mpsc::Sender<u32>,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ReportingTask {
    fn start(writer: OwnedWriteHalf, peer: SocketAddr, completions: &Broadcast<u32>) -> Self {
        let (subscription, notifications) = completions.subscribe(REPORT_CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            if let Err(err) = run_reporting(writer, notifications, stop_rx).await {
                warn!("Reporting to {} stopped: {}", peer, err);
            }
        });
        debug!("Reporting completions to {}", peer);
        Self {
            subscription,
            stop_tx,
            task,
        }
    }

    async fn stop(self, completions: &Broadcast<u32>) {
        completions.leave_and_close(self.subscription);
        drop(self.stop_tx.send(()));
        if let Err(err) = self.task.await {
            warn!("Reporting task failed: {}", err);
        }
    }
}

/// Writes one report per completion notification, batching whatever else is
/// already queued.
///
/// # Errors
///
/// Returns an error when a report cannot be encoded or written.
pub async fn run_reporting(
    mut writer: OwnedWriteHalf,
    mut notifications: mpsc::Receiver<u32>,
    mut stop_rx: oneshot::Receiver<()>,
) -> Result<(), ClusterError> {
    loop {
        let second = tokio::select! {
            _ = &mut stop_rx => break,
            maybe_second = notifications.recv() => match maybe_second {
                Some(second) => second,
                None => break,
            },
        };
        let mut report = StatsForInterval::default();
        report.record(second);
        while let Ok(queued) = notifications.try_recv() {
            report.record(queued);
        }
        let payload = encode_report(&report)?;
        writer
            .write_all(&payload)
            .await
            .map_err(|source| ClusterError::Write {
                addr: writer
                    .peer_addr()
                    .map_or_else(|_| "master".to_owned(), |addr| addr.to_string()),
                source,
            })?;
    }
    drop(writer.shutdown().await);
    Ok(())
}
