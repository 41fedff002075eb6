use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::parsers::{parse_listen_port, parse_slave_address, parse_slave_list};
use crate::args::{FailureRate, LoadArgs, Lookback, PositiveU64};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{ConfigFile, ControlList};

/// Applies configuration values to CLI arguments.
///
/// Values given on the command line or through the environment win.
///
/// # Errors
///
/// Returns an error when a config value is out of range.
pub fn apply_config(args: &mut LoadArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_explicit(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_explicit(matches, "logfile")
        && let Some(logfile) = config.logfile.clone()
    {
        args.logfile = logfile;
    }

    if !is_explicit(matches, "listen")
        && let Some(port) = config.listen
    {
        args.listen = Some(field("listen", parse_listen_port(&port.to_string()))?);
    }

    if !is_explicit(matches, "control")
        && let Some(control) = config.control.as_ref()
    {
        args.control = match control {
            ControlList::Joined(joined) => field("control", parse_slave_list(joined))?,
            ControlList::Entries(entries) => entries
                .iter()
                .map(|entry| field("control", parse_slave_address(entry)))
                .collect::<AppResult<Vec<_>>>()?,
        };
    }

    if !is_explicit(matches, "random_fails")
        && let Some(rate) = config.random_fails
    {
        args.random_fails = field("random_fails", FailureRate::try_from(rate))?;
    }

    if !is_explicit(matches, "workers")
        && let Some(workers) = config.workers
    {
        args.workers = workers;
    }

    if !is_explicit(matches, "delay_ms")
        && let Some(delay_ms) = config.delay_ms
    {
        args.delay_ms = delay_ms;
    }

    if !is_explicit(matches, "lookback")
        && let Some(lookback) = config.lookback
    {
        args.lookback = field("lookback", Lookback::try_from(lookback))?;
    }

    if !is_explicit(matches, "request_timeout")
        && let Some(timeout) = config.request_timeout_ms
    {
        args.request_timeout = Some(field("request_timeout_ms", PositiveU64::try_from(timeout))?);
    }

    if !is_explicit(matches, "duration")
        && let Some(duration) = config.duration
    {
        args.duration = Some(field("duration", PositiveU64::try_from(duration))?);
    }

    if !is_explicit(matches, "no_ui")
        && let Some(no_ui) = config.no_ui
    {
        args.no_ui = no_ui;
    }

    if !is_explicit(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn field<T>(name: &'static str, value: Result<T, ValidationError>) -> AppResult<T> {
    value.map_err(|source| AppError::config(ConfigError::InvalidField { field: name, source }))
}
