//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::LoadArgs;
pub use types::{ClusterRole, FailureRate, Lookback, PositiveU64};

pub(crate) use defaults::{
    DEFAULT_CONFIG_FILES, DEFAULT_DELAY_MS, DEFAULT_LOG_FILE, DEFAULT_USER_AGENT,
};
