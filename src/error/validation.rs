use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing URL (set --url or provide it in the config file).")]
    MissingUrl,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid number: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Failure rate {value} is out of range; use 0-10 (tenths of requests).")]
    FailureRateOutOfRange { value: u64 },
    #[error("Lookback {value} is out of range; use 1-60 seconds.")]
    LookbackOutOfRange { value: u64 },
    #[error("'{value}' doesn't look like an ip:port address: {source}")]
    InvalidSlaveAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("Listen port must be > 0.")]
    ListenPortZero,
    #[error("You can't have both --listen and --control.")]
    ListenAndControl,
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
