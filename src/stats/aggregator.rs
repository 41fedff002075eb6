use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::clock;
use crate::reporter::Reporter;
use crate::ring::{RingBuffer, SLOTS};
use crate::shutdown::ShutdownSender;

use super::{LatencyReadout, Outcome, RunTotals, Sample, StatsSummary};

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const SHORT_WINDOW_SECS: usize = 5;

/// Per-second counters and the windowed rates derived from them.
///
/// Owns its buffers exclusively; [`StatsAggregator::on_tick`] is the only
/// place their heads move.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    lookback: usize,
    seconds_seen: usize,
    durations: RingBuffer,
    sampled: RingBuffer,
    requests: RingBuffer,
    bytes: RingBuffer,
    failures: RingBuffer,
    totals: RunTotals,
}

impl StatsAggregator {
    /// `lookback` is clamped into `1..=60`; buffers start with their head on
    /// `second` so samples taken before the first tick are kept.
    #[must_use]
    pub fn new(lookback: usize, second: u32) -> Self {
        Self {
            lookback: lookback.clamp(1, SLOTS),
            seconds_seen: 0,
            durations: RingBuffer::starting_at(second),
            sampled: RingBuffer::starting_at(second),
            requests: RingBuffer::starting_at(second),
            bytes: RingBuffer::starting_at(second),
            failures: RingBuffer::starting_at(second),
            totals: RunTotals::default(),
        }
    }

    #[must_use]
    pub const fn lookback(&self) -> usize {
        self.lookback
    }

    #[must_use]
    pub const fn totals(&self) -> RunTotals {
        self.totals
    }

    pub fn record_sample(&mut self, sample: &Sample) {
        self.totals.record(sample);
        let slot = second_slot(sample.completed_at_second);
        self.durations
            .add_at(slot, i64::try_from(sample.duration_ms).unwrap_or(i64::MAX));
        self.sampled.increment_at(slot);
        if sample.byte_count > 0 {
            self.bytes.add_at(slot, sample.byte_count);
        }
        if sample.outcome == Outcome::Failure {
            self.failures.increment_at(slot);
        }
    }

    /// Counts one finished request, local or reported by a slave.
    pub fn record_completion(&mut self, second: u32) {
        self.requests.increment_at(second_slot(second));
    }

    /// Moves every buffer to `second` and summarizes the closed windows.
    pub fn on_tick(&mut self, second: u32) -> StatsSummary {
        for buffer in self.buffers_mut() {
            buffer.sync_to(second);
        }
        self.seconds_seen = self.seconds_seen.saturating_add(1).min(SLOTS);
        self.summary(second)
    }

    #[must_use]
    pub fn summary(&self, second: u32) -> StatsSummary {
        let seen = self.seconds_seen.max(1);
        let seen_i64 = i64::try_from(seen).unwrap_or(1);

        let window_durations = self.durations.sum_of_previous_n(self.lookback);
        let window_samples = self.sampled.sum_of_previous_n(self.lookback);
        let window_bytes = self.bytes.sum_of_previous_n(self.lookback);

        let mut summary = StatsSummary::empty(second, self.lookback);
        summary.avg_latency = average_latency(window_durations, window_samples);
        summary.rps_1 = self.requests.previous_value();
        summary.rps_5 = self
            .requests
            .sum_of_previous_n(SHORT_WINDOW_SECS)
            .checked_div(5)
            .unwrap_or(0);
        summary.rps_60 = self
            .requests
            .sum_of_previous_n(seen)
            .checked_div(seen_i64)
            .unwrap_or(0);
        summary.failures_in_window = self.failures.sum_of_previous_n(seen);
        summary.bytes_per_sec = window_bytes
            .saturating_mul(1000)
            .checked_div(window_durations.max(1))
            .unwrap_or(0);
        summary.columns = chronological(&self.requests);
        summary.fail_columns = chronological(&self.failures);
        summary.max = self.requests.max();
        summary
    }

    fn buffers_mut(&mut self) -> [&mut RingBuffer; 5] {
        [
            &mut self.durations,
            &mut self.sampled,
            &mut self.requests,
            &mut self.bytes,
            &mut self.failures,
        ]
    }
}

fn average_latency(total_ms: i64, count: i64) -> LatencyReadout {
    if count <= 0 {
        return LatencyReadout::NoData;
    }
    let centi = total_ms.saturating_mul(100).checked_div(count).unwrap_or(0);
    LatencyReadout::CentiMillis(u64::try_from(centi).unwrap_or(0))
}

fn chronological(buffer: &RingBuffer) -> [i64; SLOTS] {
    let mut columns = [0i64; SLOTS];
    let oldest = 1i64.saturating_sub(i64::try_from(SLOTS).unwrap_or(60));
    for (offset, column) in (oldest..=0).zip(columns.iter_mut()) {
        *column = buffer.value_at_relative(offset);
    }
    columns
}

fn second_slot(second: u32) -> usize {
    usize::try_from(second).unwrap_or(0)
}

/// Inputs consumed by the aggregator task.
#[derive(Debug)]
pub struct StatsInputs {
    pub samples: mpsc::Receiver<Sample>,
    pub completions: mpsc::Receiver<u32>,
}

/// Runs the aggregator, publishing one summary per wall second.
///
/// Shutdown stops the summaries but not the intake: samples keep being
/// recorded until every sample sender is gone, so requests finishing while
/// the pool winds down still reach the totals.
#[must_use]
pub fn spawn_stats_aggregator(
    lookback: usize,
    inputs: StatsInputs,
    reporter: Reporter,
    shutdown_tx: &ShutdownSender,
) -> JoinHandle<StatsAggregator> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let StatsInputs {
            mut samples,
            mut completions,
        } = inputs;
        let mut aggregator = StatsAggregator::new(lookback, clock::current_second());
        let start = Instant::now()
            .checked_add(clock::until_next_second())
            .unwrap_or_else(Instant::now);
        let mut ticker = tokio::time::interval_at(start, TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut samples_open = true;
        let mut completions_open = true;
        let mut draining = false;

        loop {
            if draining && !samples_open {
                break;
            }
            tokio::select! {
                _ = shutdown_rx.recv(), if !draining => {
                    debug!("Stats aggregator draining samples");
                    draining = true;
                }
                maybe_sample = samples.recv(), if samples_open => match maybe_sample {
                    Some(sample) => aggregator.record_sample(&sample),
                    None => samples_open = false,
                },
                maybe_second = completions.recv(), if completions_open => match maybe_second {
                    Some(second) => aggregator.record_completion(second),
                    None => completions_open = false,
                },
                _ = ticker.tick(), if !draining => {
                    let summary = aggregator.on_tick(clock::current_second());
                    reporter.summary(summary);
                }
            }
        }
        debug!("Stats aggregator stopped");
        aggregator
    })
}
