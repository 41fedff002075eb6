use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};

use crate::reporter::DisplayReceiver;
use crate::shutdown::ShutdownSender;
use crate::ui::model::UiState;

use super::dashboard::{Ui, UiActions};

/// Redraw cadence; events between redraws only mark the frame dirty.
const RENDER_INTERVAL: Duration = Duration::from_millis(100);

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        Ui::cleanup();
    }
}

#[must_use]
pub fn setup_render_ui(
    shutdown_tx: &ShutdownSender,
    mut display_rx: DisplayReceiver,
    mut state: UiState,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let mut terminal = match Ui::setup_terminal() {
            Ok(terminal) => terminal,
            Err(err) => {
                eprintln!("Failed to setup terminal: {}", err);
                return;
            }
        };
        let _guard = TerminalGuard;

        let mut redraw = interval(RENDER_INTERVAL);
        redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut dirty = true;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                event = display_rx.recv() => match event {
                    Some(event) => {
                        state.apply(event);
                        dirty = true;
                    }
                    None => break,
                },
                _ = redraw.tick() => {
                    if dirty {
                        Ui::render(&mut terminal, &state);
                        dirty = false;
                    }
                }
            }
        }
    })
}
