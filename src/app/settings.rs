use std::io::IsTerminal;
use std::time::Duration;

use tracing::info;
use url::Url;

use crate::args::{ClusterRole, LoadArgs};
use crate::error::{AppResult, ValidationError};
use crate::http::parse_target_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Dashboard,
    Headless,
}

/// Validated inputs for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub target: Url,
    pub role: ClusterRole,
    pub initial_workers: usize,
    pub failure_tenths: u8,
    pub delay: Duration,
    pub lookback: usize,
    pub request_timeout: Option<Duration>,
    pub run_duration: Option<Duration>,
    pub display: DisplayMode,
}

impl RunSettings {
    /// # Errors
    ///
    /// Returns an error when the URL is missing or not an http(s) URL.
    pub fn from_args(args: &LoadArgs) -> AppResult<Self> {
        let raw_url = args.url.as_deref().ok_or(ValidationError::MissingUrl)?;
        let target = parse_target_url(raw_url)?;

        let display = if args.no_ui {
            DisplayMode::Headless
        } else if std::io::stdout().is_terminal() {
            DisplayMode::Dashboard
        } else {
            info!("UI disabled because stdout is not a TTY.");
            DisplayMode::Headless
        };

        Ok(Self {
            target,
            role: args.role(),
            initial_workers: args.workers,
            failure_tenths: args.random_fails.tenths(),
            delay: args.delay(),
            lookback: args.lookback.secs(),
            request_timeout: args.request_timeout(),
            run_duration: args.run_duration(),
            display,
        })
    }

    /// Headless settings for `target`, used by embedders and tests.
    #[must_use]
    pub fn headless(target: Url) -> Self {
        Self {
            target,
            role: ClusterRole::Standalone,
            initial_workers: 0,
            failure_tenths: 0,
            delay: Duration::from_millis(crate::args::DEFAULT_DELAY_MS),
            lookback: crate::args::Lookback::default().secs(),
            request_timeout: None,
            run_duration: None,
            display: DisplayMode::Headless,
        }
    }
}
