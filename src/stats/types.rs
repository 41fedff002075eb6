use std::fmt;

use crate::ring::SLOTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// One completed request as measured by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub hit_id: String,
    pub duration_ms: u64,
    /// Response body size, `-1` when unknown.
    pub byte_count: i64,
    pub completed_at_second: u32,
    pub outcome: Outcome,
}

/// Moving-average latency, or the absence of samples in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyReadout {
    NoData,
    /// Hundredths of a millisecond.
    CentiMillis(u64),
}

impl fmt::Display for LatencyReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "no data"),
            Self::CentiMillis(value) => {
                write!(f, "{}.{:02} ms", value / 100, value % 100)
            }
        }
    }
}

/// Everything the display needs for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSummary {
    pub second: u32,
    pub avg_latency: LatencyReadout,
    pub lookback_secs: usize,
    pub rps_1: i64,
    pub rps_5: i64,
    pub rps_60: i64,
    pub failures_in_window: i64,
    pub bytes_per_sec: i64,
    /// Requests per second, oldest first; the last column is the current second.
    pub columns: [i64; SLOTS],
    pub fail_columns: [i64; SLOTS],
    pub max: i64,
}

impl StatsSummary {
    #[must_use]
    pub fn empty(second: u32, lookback_secs: usize) -> Self {
        Self {
            second,
            avg_latency: LatencyReadout::NoData,
            lookback_secs,
            rps_1: 0,
            rps_5: 0,
            rps_60: 0,
            failures_in_window: 0,
            bytes_per_sec: 0,
            columns: [0; SLOTS],
            fail_columns: [0; SLOTS],
            max: 0,
        }
    }

    /// Throughput line in the `last/5s/60s` form.
    #[must_use]
    pub fn rps_line(&self) -> String {
        format!("{}/{:02}/{:02}", self.rps_1, self.rps_5, self.rps_60)
    }
}

/// Local measurements since the aggregator started, outside any window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub requests: u64,
    pub failures: u64,
    pub bytes: u64,
}

impl RunTotals {
    pub fn record(&mut self, sample: &Sample) {
        self.requests = self.requests.saturating_add(1);
        if !sample.outcome.is_success() {
            self.failures = self.failures.saturating_add(1);
        }
        if let Ok(bytes) = u64::try_from(sample.byte_count) {
            self.bytes = self.bytes.saturating_add(bytes);
        }
    }
}
