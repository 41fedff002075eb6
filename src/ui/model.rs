use std::collections::VecDeque;

use crate::args::ClusterRole;
use crate::reporter::DisplayEvent;
use crate::stats::StatsSummary;

/// Recent event lines kept for the message panel.
pub const MESSAGE_HISTORY: usize = 8;

/// What the dashboard shows, folded from [`DisplayEvent`]s.
#[derive(Debug, Clone)]
pub struct UiState {
    pub target: String,
    pub role: String,
    pub workers: usize,
    pub requests_ok: u64,
    pub requests_failed: u64,
    pub summary: Option<StatsSummary>,
    pub messages: VecDeque<String>,
}

impl UiState {
    #[must_use]
    pub fn new(target: &str, role: &ClusterRole) -> Self {
        Self {
            target: target.to_owned(),
            role: role_label(role),
            workers: 0,
            requests_ok: 0,
            requests_failed: 0,
            summary: None,
            messages: VecDeque::with_capacity(MESSAGE_HISTORY),
        }
    }

    pub fn apply(&mut self, event: DisplayEvent) {
        match event {
            DisplayEvent::WorkerCount { count, message } => {
                self.workers = count;
                self.push_message(format!("{}: {}", message, count));
            }
            DisplayEvent::WorkerStopped { id, requests } => {
                self.push_message(format!("worker {} stopped after {} requests", id, requests));
            }
            DisplayEvent::Request { hit_id, ok } => {
                if ok {
                    self.requests_ok = self.requests_ok.saturating_add(1);
                } else {
                    self.requests_failed = self.requests_failed.saturating_add(1);
                    self.push_message(format!("request fail {}", hit_id));
                }
            }
            DisplayEvent::Info(message) => self.push_message(message),
            DisplayEvent::Summary(summary) => self.summary = Some(*summary),
        }
    }

    fn push_message(&mut self, message: String) {
        if self.messages.len() >= MESSAGE_HISTORY {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }
}

fn role_label(role: &ClusterRole) -> String {
    match role {
        ClusterRole::Standalone => "standalone".to_owned(),
        ClusterRole::Slave { port } => format!("slave on port {}", port),
        ClusterRole::Master { slaves } => format!("master of {} slave(s)", slaves.len()),
    }
}
