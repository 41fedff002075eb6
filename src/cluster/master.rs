use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ClusterError;
use crate::fanout::Broadcast;
use crate::reporter::Reporter;

use super::protocol::{ReportDecoder, StatsForInterval, encode_command, parse_second_label};

const COMMAND_CHANNEL_CAPACITY: usize = 64;
const READ_BUFFER_BYTES: usize = 4096;
/// Most completions one report entry may replay.
pub(crate) const MAX_REPORTED_PER_SECOND: u64 = 100_000;

/// Local endpoints a master wires every slave into.
#[derive(Debug, Clone)]
pub struct MasterContext {
    pub resize: Broadcast<i64>,
    /// Inbound side of the completion broadcast.
    pub completions: mpsc::Sender<u32>,
    pub reporter: Reporter,
}

/// One dialed slave. Closed for good once either half fails.
#[derive(Debug)]
pub struct SlaveConnection {
    remote_address: SocketAddr,
    last_error: Arc<Mutex<Option<String>>>,
    closed_tx: Arc<watch::Sender<bool>>,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl SlaveConnection {
    #[must_use]
    pub const fn remote_address(&self) -> SocketAddr {
        self.remote_address
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed_tx.borrow()
    }

    /// Closes both halves and waits for their tasks.
    pub async fn close(self) {
        self.closed_tx.send_replace(true);
        for (half, task) in [("writer", self.writer), ("reader", self.reader)] {
            if let Err(err) = task.await {
                warn!(
                    "Slave {} {} task failed: {}",
                    self.remote_address, half, err
                );
            }
        }
    }
}

/// Dials `addr`, subscribes it to resize commands and starts folding its
/// reports into the completion stream.
///
/// # Errors
///
/// Returns an error when the connection cannot be established.
pub async fn connect_to_slave(
    addr: SocketAddr,
    context: &MasterContext,
) -> Result<SlaveConnection, ClusterError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClusterError::Connection {
            addr: addr.to_string(),
            source,
        })?;
    info!("Connected to slave {}", addr);
    let (read_half, write_half) = stream.into_split();
    let last_error = Arc::new(Mutex::new(None));
    let (closed_tx, _) = watch::channel(false);
    let closed_tx = Arc::new(closed_tx);

    let (subscription, commands) = context.resize.subscribe(COMMAND_CHANNEL_CAPACITY);
    let link = LinkState {
        addr,
        last_error: Arc::clone(&last_error),
        closed_tx: Arc::clone(&closed_tx),
        reporter: context.reporter.clone(),
    };

    let writer = {
        let link = link.clone();
        let resize = context.resize.clone();
        tokio::spawn(async move {
            let result = run_command_writer(write_half, commands, link.closed_tx.subscribe()).await;
            resize.leave_and_close(subscription);
            link.finish("writer", result);
        })
    };
    let reader = {
        let completions = context.completions.clone();
        tokio::spawn(async move {
            let result = run_report_reader(read_half, &completions, link.closed_tx.subscribe()).await;
            link.finish("reader", result);
        })
    };

    Ok(SlaveConnection {
        remote_address: addr,
        last_error,
        closed_tx,
        writer,
        reader,
    })
}

#[derive(Clone)]
struct LinkState {
    addr: SocketAddr,
    last_error: Arc<Mutex<Option<String>>>,
    closed_tx: Arc<watch::Sender<bool>>,
    reporter: Reporter,
}

impl LinkState {
    fn finish(&self, half: &str, result: Result<(), ClusterError>) {
        if let Err(err) = result {
            warn!("Slave {} {} failed: {}", self.addr, half, err);
            self.reporter
                .info(format!("lost slave {}: {}", self.addr, err));
            *self
                .last_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(err.to_string());
        } else {
            debug!("Slave {} {} finished", self.addr, half);
        }
        self.closed_tx.send_replace(true);
    }
}

async fn run_command_writer(
    mut writer: OwnedWriteHalf,
    mut commands: mpsc::Receiver<i64>,
    mut closed_rx: watch::Receiver<bool>,
) -> Result<(), ClusterError> {
    loop {
        if *closed_rx.borrow() {
            break;
        }
        let delta = tokio::select! {
            _ = closed_rx.changed() => continue,
            maybe_delta = commands.recv() => match maybe_delta {
                Some(delta) => delta,
                None => break,
            },
        };
        let addr = writer
            .peer_addr()
            .map_or_else(|_| "slave".to_owned(), |addr| addr.to_string());
        writer
            .write_all(encode_command(delta).as_bytes())
            .await
            .map_err(|source| ClusterError::Write { addr, source })?;
    }
    drop(writer.shutdown().await);
    Ok(())
}

async fn run_report_reader(
    mut reader: OwnedReadHalf,
    completions: &mpsc::Sender<u32>,
    mut closed_rx: watch::Receiver<bool>,
) -> Result<(), ClusterError> {
    let addr = reader
        .peer_addr()
        .map_or_else(|_| "slave".to_owned(), |addr| addr.to_string());
    let mut decoder = ReportDecoder::new();
    let mut buffer = vec![0u8; READ_BUFFER_BYTES];
    loop {
        if *closed_rx.borrow() {
            return Ok(());
        }
        let read = tokio::select! {
            _ = closed_rx.changed() => continue,
            read = reader.read(&mut buffer) => read,
        };
        let received = match read {
            Ok(0) => return Err(ClusterError::ConnectionClosed),
            Ok(received) => received,
            Err(source) => {
                return Err(ClusterError::Read {
                    addr,
                    source,
                });
            }
        };
        for report in decoder.push(buffer.get(..received).unwrap_or_default())? {
            fold_report(&report, completions).await?;
        }
    }
}

/// Replays a slave report into the local completion stream, one event per
/// counted request. Labels that are not a second of the minute are skipped.
///
/// # Errors
///
/// Returns an error when the completion stream is gone.
pub async fn fold_report(
    report: &StatsForInterval,
    completions: &mpsc::Sender<u32>,
) -> Result<u64, ClusterError> {
    let mut replayed: u64 = 0;
    for (label, count) in &report.counts_by_second {
        let second = match parse_second_label(label) {
            Ok(second) => second,
            Err(err) => {
                warn!("Skipping report entry: {}", err);
                continue;
            }
        };
        for _ in 0..replay_count(label, *count) {
            if completions.send(second).await.is_err() {
                return Err(ClusterError::CompletionChannelClosed);
            }
            replayed = replayed.saturating_add(1);
        }
    }
    Ok(replayed)
}

/// Bounds a reported count to what one second can plausibly hold.
pub(crate) fn replay_count(label: &str, count: i64) -> u64 {
    let count = u64::try_from(count).unwrap_or(0);
    if count > MAX_REPORTED_PER_SECOND {
        warn!(
            "Clamping reported count {} for second {} to {}",
            count, label, MAX_REPORTED_PER_SECOND
        );
        return MAX_REPORTED_PER_SECOND;
    }
    count
}

/// The master's set of slave connections.
#[derive(Debug, Default)]
pub struct MasterCoordinator {
    connections: Vec<SlaveConnection>,
}

impl MasterCoordinator {
    /// Dials every slave; unreachable ones are logged and left out.
    pub async fn connect(slaves: &[SocketAddr], context: &MasterContext) -> Self {
        let mut connections = Vec::with_capacity(slaves.len());
        for addr in slaves {
            match connect_to_slave(*addr, context).await {
                Ok(connection) => {
                    context.reporter.info(format!("controlling slave {}", addr));
                    connections.push(connection);
                }
                Err(err) => {
                    warn!("Skipping slave {}: {}", addr, err);
                    context
                        .reporter
                        .info(format!("couldn't reach slave {}: {}", addr, err));
                }
            }
        }
        Self { connections }
    }

    #[must_use]
    pub fn connections(&self) -> &[SlaveConnection] {
        &self.connections
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|connection| !connection.is_closed())
            .count()
    }

    pub async fn shutdown(self) {
        for connection in self.connections {
            connection.close().await;
        }
    }
}
