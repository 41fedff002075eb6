use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::{Backend, Frame, text},
    text::Span,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap},
};

use crate::stats::StatsSummary;
use crate::ui::model::UiState;

use super::theme::{
    ACCENT_GREEN_RGB, ACCENT_RATE_RGB, ACCENT_RED_RGB, BAR_GAP, BAR_WIDTH, CHART_MIN_HEIGHT,
    MESSAGES_HEIGHT, PANEL_BORDER_RGB, PANEL_MUTED_RGB, STATUS_HEIGHT, UI_MARGIN, fg,
};

const KEY_HELP: &str = "+/Up add worker  -/Down remove worker  q quit";

pub fn draw_frame<B: Backend>(f: &mut Frame<'_, B>, state: &UiState) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(UI_MARGIN)
        .constraints([
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(MESSAGES_HEIGHT),
            Constraint::Min(CHART_MIN_HEIGHT),
        ])
        .split(size);

    let (status_chunk, messages_chunk, chart_chunk) = match chunks.as_ref() {
        [a, b, c] => (a, b, c),
        _ => return,
    };

    f.render_widget(status_panel(state), *status_chunk);
    f.render_widget(messages_panel(state), *messages_chunk);
    render_chart(f, state.summary.as_ref(), *chart_chunk);
}

fn status_panel(state: &UiState) -> Paragraph<'static> {
    let label = fg(PANEL_MUTED_RGB);
    let (latency, lookback, rps, bytes, failures) = match state.summary.as_ref() {
        Some(summary) => (
            summary.avg_latency.to_string(),
            summary.lookback_secs,
            summary.rps_line(),
            summary.bytes_per_sec.to_string(),
            summary.failures_in_window,
        ),
        None => ("no data".to_owned(), 0, "0/00/00".to_owned(), "0".to_owned(), 0),
    };

    let lines = vec![
        text::Line::from(vec![
            Span::styled("target: ", label),
            Span::from(state.target.clone()),
            Span::styled("   role: ", label),
            Span::from(state.role.clone()),
        ]),
        text::Line::from(vec![
            Span::styled("workers: ", label),
            Span::styled(state.workers.to_string(), fg(ACCENT_RATE_RGB)),
        ]),
        text::Line::from(vec![
            Span::styled(format!("latency ({}s): ", lookback), label),
            Span::from(latency),
        ]),
        text::Line::from(vec![
            Span::styled("req/s (last/5s/60s): ", label),
            Span::styled(rps, fg(ACCENT_GREEN_RGB)),
            Span::styled("   bytes/s: ", label),
            Span::from(bytes),
        ]),
        text::Line::from(vec![
            Span::styled("ok: ", label),
            Span::styled(state.requests_ok.to_string(), fg(ACCENT_GREEN_RGB)),
            Span::styled("   failed: ", label),
            Span::styled(state.requests_failed.to_string(), fg(ACCENT_RED_RGB)),
            Span::styled(format!("   failures ({}s): ", lookback), label),
            Span::styled(failures.to_string(), fg(ACCENT_RED_RGB)),
        ]),
        text::Line::from(""),
        text::Line::from(Span::styled(KEY_HELP, label)),
    ];

    Paragraph::new(lines).block(
        Block::default()
            .title("loadpool")
            .borders(Borders::ALL)
            .border_style(fg(PANEL_BORDER_RGB)),
    )
}

fn messages_panel(state: &UiState) -> Paragraph<'static> {
    let lines: Vec<text::Line<'static>> = state
        .messages
        .iter()
        .map(|message| text::Line::from(message.clone()))
        .collect();
    Paragraph::new(lines)
        .block(
            Block::default()
                .title("events")
                .borders(Borders::ALL)
                .border_style(fg(PANEL_BORDER_RGB)),
        )
        .wrap(Wrap { trim: true })
}

fn render_chart<B: Backend>(f: &mut Frame<'_, B>, summary: Option<&StatsSummary>, area: Rect) {
    let Some(summary) = summary else {
        let placeholder = Paragraph::new(text::Line::from("waiting for the first second"))
            .block(Block::default().title("req/s").borders(Borders::ALL));
        f.render_widget(placeholder, area);
        return;
    };

    let bars: Vec<Bar<'static>> = summary
        .columns
        .iter()
        .zip(summary.fail_columns.iter())
        .map(|(count, failed)| {
            let color = if *failed > 0 {
                ACCENT_RED_RGB
            } else {
                ACCENT_GREEN_RGB
            };
            Bar::default()
                .value(u64::try_from(*count).unwrap_or(0))
                .style(fg(color))
                .text_value(String::new())
        })
        .collect();
    let max = u64::try_from(summary.max).unwrap_or(0).max(1);

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!("req/s over 60s (max {})", summary.max))
                .borders(Borders::ALL)
                .border_style(fg(PANEL_BORDER_RGB)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(BAR_WIDTH)
        .bar_gap(BAR_GAP)
        .max(max);
    f.render_widget(chart, area);
}
