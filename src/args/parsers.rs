use std::net::SocketAddr;

use super::types::{FailureRate, Lookback, PositiveU64};
use crate::error::{AppError, AppResult, ValidationError};

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(super) fn parse_failure_rate(s: &str) -> AppResult<FailureRate> {
    s.parse::<FailureRate>().map_err(AppError::from)
}

pub(super) fn parse_lookback(s: &str) -> AppResult<Lookback> {
    s.parse::<Lookback>().map_err(AppError::from)
}

pub(crate) fn parse_listen_port(s: &str) -> Result<u16, ValidationError> {
    let port: u16 = s
        .trim()
        .parse()
        .map_err(|err| ValidationError::InvalidNumber { source: err })?;
    if port == 0 {
        return Err(ValidationError::ListenPortZero);
    }
    Ok(port)
}

pub(crate) fn parse_slave_address(s: &str) -> Result<SocketAddr, ValidationError> {
    s.trim()
        .parse::<SocketAddr>()
        .map_err(|source| ValidationError::InvalidSlaveAddress {
            value: s.to_owned(),
            source,
        })
}

/// Splits a comma-separated `ip:port` list, ignoring empty entries.
pub(crate) fn parse_slave_list(s: &str) -> Result<Vec<SocketAddr>, ValidationError> {
    s.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_slave_address)
        .collect()
}
