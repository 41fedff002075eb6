mod aggregator;
mod types;

pub use aggregator::{StatsAggregator, StatsInputs, spawn_stats_aggregator};
pub use types::{LatencyReadout, Outcome, RunTotals, Sample, StatsSummary};
