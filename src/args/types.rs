use std::net::SocketAddr;
use std::num::NonZeroU64;

use crate::error::ValidationError;
use crate::ring::SLOTS;

use super::defaults::DEFAULT_LOOKBACK_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveU64(NonZeroU64);

impl PositiveU64 {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for PositiveU64 {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        NonZeroU64::new(value)
            .map(PositiveU64)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveU64 {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveU64::try_from(value)
    }
}

/// Share of requests sent with the failure marker, in tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FailureRate(u8);

impl FailureRate {
    pub const MAX: u8 = 10;

    #[must_use]
    pub const fn tenths(self) -> u8 {
        self.0
    }
}

impl TryFrom<u64> for FailureRate {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(tenths) if tenths <= Self::MAX => Ok(Self(tenths)),
            Ok(_) | Err(_) => Err(ValidationError::FailureRateOutOfRange { value }),
        }
    }
}

impl std::str::FromStr for FailureRate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        Self::try_from(value)
    }
}

/// Seconds covered by the moving averages, `1..=60`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookback(u8);

impl Lookback {
    #[must_use]
    pub fn secs(self) -> usize {
        usize::from(self.0)
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self(DEFAULT_LOOKBACK_SECS)
    }
}

impl TryFrom<u64> for Lookback {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        let max = u64::try_from(SLOTS).unwrap_or(60);
        match u8::try_from(value) {
            Ok(secs) if secs >= 1 && value <= max => Ok(Self(secs)),
            Ok(_) | Err(_) => Err(ValidationError::LookbackOutOfRange { value }),
        }
    }
}

impl std::str::FromStr for Lookback {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        Self::try_from(value)
    }
}

/// How this process takes part in a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterRole {
    Standalone,
    Slave { port: u16 },
    Master { slaves: Vec<SocketAddr> },
}
