use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll, read};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use crate::shutdown::{ShutdownSender, request_shutdown};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Keyboard polling interval; also bounds how long shutdown takes to notice.
const KEYBOARD_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Grow,
    Shrink,
    Quit,
}

impl KeyAction {
    /// Resize delta for the pool, if this key resizes it.
    #[must_use]
    pub const fn delta(self) -> Option<i64> {
        match self {
            Self::Grow => Some(1),
            Self::Shrink => Some(-1),
            Self::Quit => None,
        }
    }
}

#[must_use]
pub fn key_action(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Quit)
        }
        KeyCode::Char('+' | '=' | 's') | KeyCode::Up => Some(KeyAction::Grow),
        KeyCode::Char('-') | KeyCode::Down => Some(KeyAction::Shrink),
        KeyCode::Char('q') => Some(KeyAction::Quit),
        _ => None,
    }
}

/// Turns key presses into resize commands until shutdown.
///
/// Runs on a blocking thread because crossterm polling blocks.
pub fn setup_keyboard_handler(
    shutdown_tx: &ShutdownSender,
    commands: mpsc::Sender<i64>,
) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::task::spawn_blocking(move || {
        loop {
            match shutdown_rx.try_recv() {
                Ok(()) | Err(broadcast::error::TryRecvError::Closed) => break,
                Err(
                    broadcast::error::TryRecvError::Empty
                    | broadcast::error::TryRecvError::Lagged(_),
                ) => {}
            }

            let has_event = poll(KEYBOARD_POLL_INTERVAL).unwrap_or_default();
            if !has_event {
                continue;
            }
            let Ok(Event::Key(key)) = read() else {
                continue;
            };
            match key_action(&key) {
                Some(KeyAction::Quit) => {
                    request_shutdown(&shutdown_tx, "quit key pressed");
                    break;
                }
                Some(action) => {
                    if let Some(delta) = action.delta()
                        && commands.blocking_send(delta).is_err()
                    {
                        debug!("Resize channel closed; keyboard handler exiting");
                        break;
                    }
                }
                None => {}
            }
        }
    })
}

pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();

        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                tracing::warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    request_shutdown(&shutdown_tx, "interrupted");
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    request_shutdown(&shutdown_tx, "terminated");
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    request_shutdown(&shutdown_tx, "interrupted");
                }
            }
        }
    })
}

/// Requests shutdown once `duration` has elapsed, unless something else did.
pub fn setup_duration_handler(
    shutdown_tx: &ShutdownSender,
    duration: Duration,
) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_rx.recv() => {}
            () = tokio::time::sleep(duration) => {
                request_shutdown(&shutdown_tx, "run duration elapsed");
            }
        }
    })
}
