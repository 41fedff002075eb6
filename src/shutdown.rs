use tokio::sync::broadcast;
use tracing::info;

/// Broadcast channel size for shutdown notifications (single signal fan-out).
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Asks every task holding a receiver to stop.
pub fn request_shutdown(shutdown_tx: &ShutdownSender, reason: &str) {
    info!("Shutting down: {}", reason);
    drop(shutdown_tx.send(()));
}
