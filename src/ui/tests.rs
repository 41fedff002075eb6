use super::model::{MESSAGE_HISTORY, UiState};
use super::render::{Ui, UiActions};
use crate::args::ClusterRole;
use crate::error::{AppError, AppResult};
use crate::reporter::DisplayEvent;
use crate::stats::{LatencyReadout, StatsSummary};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

fn render_to_text(state: &UiState) -> AppResult<String> {
    let backend = TestBackend::new(80, 32);
    let mut terminal = match Terminal::new(backend) {
        Ok(term) => term,
        Err(err) => {
            return Err(AppError::validation(format!(
                "Failed to create TestBackend terminal: {}",
                err
            )));
        }
    };
    Ui::render(&mut terminal, state);
    let buffer = terminal.backend().buffer();
    let width = usize::from(buffer.area.width.max(1));
    let mut text = String::new();
    for (idx, cell) in buffer.content.iter().enumerate() {
        if idx > 0 && idx.checked_rem(width) == Some(0) {
            text.push('\n');
        }
        text.push_str(&cell.symbol);
    }
    Ok(text)
}

fn sample_summary() -> StatsSummary {
    let mut summary = StatsSummary::empty(12, 5);
    summary.avg_latency = LatencyReadout::CentiMillis(1750);
    summary.rps_1 = 20;
    summary.rps_5 = 6;
    summary.rps_60 = 15;
    summary.bytes_per_sec = 20_000;
    summary.failures_in_window = 1;
    if let Some(last) = summary.columns.last_mut() {
        *last = 20;
    }
    if let Some(last) = summary.fail_columns.last_mut() {
        *last = 1;
    }
    summary.max = 20;
    summary
}

#[test]
fn worker_count_event_updates_state() -> AppResult<()> {
    let mut state = UiState::new("http://localhost/", &ClusterRole::Standalone);
    state.apply(DisplayEvent::WorkerCount {
        count: 3,
        message: "increasing workers".to_owned(),
    });
    if state.workers != 3 {
        return Err(AppError::validation(format!("workers = {}", state.workers)));
    }
    if state.messages.back().map(String::as_str) != Some("increasing workers: 3") {
        return Err(AppError::validation("Expected worker count message"));
    }
    Ok(())
}

#[test]
fn failed_request_is_listed_and_counted() -> AppResult<()> {
    let mut state = UiState::new("http://localhost/", &ClusterRole::Standalone);
    state.apply(DisplayEvent::Request {
        hit_id: "0:1".to_owned(),
        ok: true,
    });
    state.apply(DisplayEvent::Request {
        hit_id: "0:2".to_owned(),
        ok: false,
    });
    if state.requests_ok != 1 || state.requests_failed != 1 {
        return Err(AppError::validation("Expected one success and one failure"));
    }
    if state.messages.len() != 1 {
        return Err(AppError::validation("Only failures should produce messages"));
    }
    if state.messages.back().map(String::as_str) != Some("request fail 0:2") {
        return Err(AppError::validation("Expected failure message"));
    }
    Ok(())
}

#[test]
fn message_history_is_bounded() -> AppResult<()> {
    let mut state = UiState::new("http://localhost/", &ClusterRole::Standalone);
    for idx in 0..20 {
        state.apply(DisplayEvent::Info(format!("line {}", idx)));
    }
    if state.messages.len() != MESSAGE_HISTORY {
        return Err(AppError::validation(format!(
            "history holds {} lines",
            state.messages.len()
        )));
    }
    if state.messages.back().map(String::as_str) != Some("line 19") {
        return Err(AppError::validation("Newest message should be last"));
    }
    Ok(())
}

#[test]
fn role_is_described() -> AppResult<()> {
    let state = UiState::new("http://localhost/", &ClusterRole::Slave { port: 7777 });
    if state.role != "slave on port 7777" {
        return Err(AppError::validation(format!("role = {}", state.role)));
    }
    Ok(())
}

#[test]
fn render_without_summary_shows_placeholder() -> AppResult<()> {
    let state = UiState::new("http://localhost/", &ClusterRole::Standalone);
    let screen = render_to_text(&state)?;
    if !screen.contains("waiting for the first second") {
        return Err(AppError::validation("Expected chart placeholder"));
    }
    if !screen.contains("no data") {
        return Err(AppError::validation("Expected empty latency readout"));
    }
    Ok(())
}

#[test]
fn render_shows_summary_figures() -> AppResult<()> {
    let mut state = UiState::new("http://localhost/", &ClusterRole::Standalone);
    state.apply(DisplayEvent::Summary(Box::new(sample_summary())));
    state.apply(DisplayEvent::Info("master 127.0.0.1:9 says +2".to_owned()));
    let screen = render_to_text(&state)?;
    for needle in [
        "17.50 ms",
        "20/06/15",
        "20000",
        "req/s over 60s (max 20)",
        "master 127.0.0.1:9 says +2",
    ] {
        if !screen.contains(needle) {
            return Err(AppError::validation(format!("screen lacks {:?}", needle)));
        }
    }
    Ok(())
}

#[test]
fn headless_logging_accepts_every_event() {
    let events = [
        DisplayEvent::WorkerCount {
            count: 1,
            message: "increasing workers".to_owned(),
        },
        DisplayEvent::WorkerStopped { id: 0, requests: 4 },
        DisplayEvent::Request {
            hit_id: "0:1".to_owned(),
            ok: false,
        },
        DisplayEvent::Info("hello".to_owned()),
        DisplayEvent::Summary(Box::new(sample_summary())),
    ];
    for event in &events {
        super::headless::log_event(event);
    }
}
