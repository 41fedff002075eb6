//! One inbound channel fanned out to any number of joined subscribers.
//!
//! Each message is handed to every subscriber in join order, and the next
//! subscriber only sees it once the previous one accepted it. A slow
//! subscriber therefore holds back everyone else and, through the bounded
//! inbound channel, the publishers too. There is no per-subscriber buffering
//! beyond the subscriber's own channel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

type Registry<T> = Arc<Mutex<Vec<mpsc::Sender<T>>>>;

pub struct Broadcast<T> {
    subscribers: Registry<T>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> std::fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcast")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T> Broadcast<T>
where
    T: Clone + Send + 'static,
{
    /// Starts forwarding everything received on `inbound`.
    ///
    /// The forwarding task ends once every sender of `inbound` is dropped.
    #[must_use]
    pub fn new(inbound: mpsc::Receiver<T>) -> Self {
        let (broadcast, _forwarder) = Self::spawn(inbound);
        broadcast
    }

    /// Creates the inbound channel together with the broadcast reading it.
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<T>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }

    /// Like [`Broadcast::new`], also returning the forwarding task.
    #[must_use]
    pub fn spawn(inbound: mpsc::Receiver<T>) -> (Self, JoinHandle<()>) {
        let subscribers: Registry<T> = Arc::new(Mutex::new(Vec::new()));
        let forwarder = tokio::spawn(forward(inbound, Arc::clone(&subscribers)));
        (Self { subscribers }, forwarder)
    }

    /// Creates a subscriber channel and joins it.
    ///
    /// The returned sender identifies the subscription for [`Broadcast::leave`].
    #[must_use]
    pub fn subscribe(&self, capacity: usize) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.join(tx.clone());
        (tx, rx)
    }
}

impl<T> Broadcast<T> {
    /// Registers `outbound`; it receives messages forwarded from now on.
    pub fn join(&self, outbound: mpsc::Sender<T>) {
        lock(&self.subscribers).push(outbound);
    }

    /// Deregisters `outbound`. Returns `false` when it was not joined.
    pub fn leave(&self, outbound: &mpsc::Sender<T>) -> bool {
        let mut subscribers = lock(&self.subscribers);
        let before = subscribers.len();
        subscribers.retain(|subscriber| !subscriber.same_channel(outbound));
        subscribers.len() != before
    }

    /// Deregisters `outbound` and drops the caller's sender with it.
    ///
    /// The subscriber's receiver sees the channel close once no other sender
    /// remains, so the caller must not keep writing to it elsewhere.
    pub fn leave_and_close(&self, outbound: mpsc::Sender<T>) {
        self.leave(&outbound);
        drop(outbound);
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }
}

async fn forward<T>(mut inbound: mpsc::Receiver<T>, subscribers: Registry<T>)
where
    T: Clone + Send + 'static,
{
    while let Some(message) = inbound.recv().await {
        let snapshot: Vec<mpsc::Sender<T>> = lock(&subscribers).clone();
        for subscriber in snapshot {
            if !is_joined(&subscribers, &subscriber) {
                continue;
            }
            if subscriber.send(message.clone()).await.is_err() {
                debug!("Pruning broadcast subscriber with a closed receiver");
                lock(&subscribers).retain(|joined| !joined.same_channel(&subscriber));
            }
        }
    }
    debug!("Broadcast inbound closed; forwarding stopped");
}

fn is_joined<T>(subscribers: &Registry<T>, candidate: &mpsc::Sender<T>) -> bool {
    lock(subscribers)
        .iter()
        .any(|joined| joined.same_channel(candidate))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests;
