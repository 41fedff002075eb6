//! Wall-clock second-of-minute helpers shared by the workers and the tick.

use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};

/// Second of the current minute, always in `0..60`.
#[must_use]
pub fn current_second() -> u32 {
    second_of(&Utc::now())
}

/// Time left until the next wall-clock second boundary.
#[must_use]
pub fn until_next_second() -> Duration {
    until_next_second_from(&Utc::now())
}

pub(crate) fn second_of(now: &DateTime<Utc>) -> u32 {
    // Leap seconds report 60.
    now.second().min(59)
}

pub(crate) fn until_next_second_from(now: &DateTime<Utc>) -> Duration {
    let elapsed = Duration::from_nanos(u64::from(now.nanosecond() % 1_000_000_000));
    Duration::from_secs(1).saturating_sub(elapsed)
}
