//! User-visible output, kept apart from diagnostic logging.
//!
//! Components receive a [`Reporter`] when they are built and push
//! [`DisplayEvent`]s through it. The dashboard (or the headless log writer)
//! owns the receiving end. A reporter whose receiver is gone drops events.

use tokio::sync::mpsc;

use crate::stats::StatsSummary;

pub type DisplayReceiver = mpsc::UnboundedReceiver<DisplayEvent>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    WorkerCount { count: usize, message: String },
    WorkerStopped { id: usize, requests: u64 },
    Request { hit_id: String, ok: bool },
    Info(String),
    Summary(Box<StatsSummary>),
}

#[derive(Debug, Clone)]
pub struct Reporter {
    tx: mpsc::UnboundedSender<DisplayEvent>,
}

#[must_use]
pub fn reporter_channel() -> (Reporter, DisplayReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Reporter { tx }, rx)
}

impl Reporter {
    pub fn worker_count(&self, count: usize, message: impl Into<String>) {
        self.emit(DisplayEvent::WorkerCount {
            count,
            message: message.into(),
        });
    }

    pub fn worker_stopped(&self, id: usize, requests: u64) {
        self.emit(DisplayEvent::WorkerStopped { id, requests });
    }

    pub fn request(&self, hit_id: impl Into<String>, ok: bool) {
        self.emit(DisplayEvent::Request {
            hit_id: hit_id.into(),
            ok,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(DisplayEvent::Info(message.into()));
    }

    pub fn summary(&self, summary: StatsSummary) {
        self.emit(DisplayEvent::Summary(Box::new(summary)));
    }

    fn emit(&self, event: DisplayEvent) {
        drop(self.tx.send(event));
    }
}
