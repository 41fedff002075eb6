use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{AppResult, ValidationError};

use super::defaults::{DEFAULT_DELAY_MS, DEFAULT_LOG_FILE};
use super::parsers::{
    parse_failure_rate, parse_listen_port, parse_lookback, parse_positive_u64, parse_slave_address,
};
use super::types::{ClusterRole, FailureRate, Lookback, PositiveU64};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Interactive HTTP load generator: grow and shrink a pool of requesters while watching per-second throughput, optionally across several machines."
)]
pub struct LoadArgs {
    /// Target URL to load
    #[arg(long, short, env = "LOADPOOL_URL")]
    pub url: Option<String>,

    /// File that receives diagnostic logs
    #[arg(long = "logfile", default_value = DEFAULT_LOG_FILE)]
    pub logfile: String,

    /// Run as a slave: accept resize commands from a master on this port
    #[arg(long = "listen", value_parser = parse_listen_port, conflicts_with = "control")]
    pub listen: Option<u16>,

    /// Run as a master: comma-separated ip:port list of slaves to control
    #[arg(
        long = "control",
        value_delimiter = ',',
        value_parser = parse_slave_address
    )]
    pub control: Vec<SocketAddr>,

    /// Artificially fail this many tenths of requests (0-10)
    #[arg(long = "random-fails", default_value = "0", value_parser = parse_failure_rate)]
    pub random_fails: FailureRate,

    /// Workers to start with before any key is pressed
    #[arg(long = "workers", short = 'w', default_value_t = 0)]
    pub workers: usize,

    /// Pause between requests of one worker, in milliseconds
    #[arg(long = "delay-ms", default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Seconds covered by the moving latency and bytes/sec averages (1-60)
    #[arg(long = "lookback", default_value = "5", value_parser = parse_lookback)]
    pub lookback: Lookback,

    /// Per-request timeout in milliseconds (no timeout when omitted)
    #[arg(long = "request-timeout", value_parser = parse_positive_u64)]
    pub request_timeout: Option<PositiveU64>,

    /// Stop after this many seconds (runs until quit when omitted)
    #[arg(long = "duration", short = 't', value_parser = parse_positive_u64)]
    pub duration: Option<PositiveU64>,

    /// Run without the dashboard; per-second summaries go to the log file
    #[arg(long = "no-ui")]
    pub no_ui: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by LOADPOOL_LOG/RUST_LOG)
    #[arg(long, short)]
    pub verbose: bool,

    /// Path to config file (TOML/JSON). Defaults to ./loadpool.toml or ./loadpool.json if present.
    #[arg(long, short)]
    pub config: Option<String>,
}

impl LoadArgs {
    /// Checks combinations that flag parsing alone cannot see, such as
    /// values merged in from a config file.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is missing or both cluster roles are set.
    pub fn validate(&self) -> AppResult<()> {
        if self.url.as_deref().is_none_or(|url| url.trim().is_empty()) {
            return Err(ValidationError::MissingUrl.into());
        }
        if self.listen.is_some() && !self.control.is_empty() {
            return Err(ValidationError::ListenAndControl.into());
        }
        Ok(())
    }

    #[must_use]
    pub fn role(&self) -> ClusterRole {
        match self.listen {
            Some(port) => ClusterRole::Slave { port },
            None if !self.control.is_empty() => ClusterRole::Master {
                slaves: self.control.clone(),
            },
            None => ClusterRole::Standalone,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
            .map(|ms| Duration::from_millis(ms.get()))
    }

    #[must_use]
    pub fn run_duration(&self) -> Option<Duration> {
        self.duration.map(|secs| Duration::from_secs(secs.get()))
    }
}
