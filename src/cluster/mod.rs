//! Master/slave coordination over plain TCP.
//!
//! A slave accepts resize deltas as decimal text and answers with JSON
//! completion counts per second. A master dials its slaves, forwards every
//! local resize to them and folds their counts into its own statistics.

mod master;
mod protocol;
mod slave;

pub use master::{MasterContext, MasterCoordinator, SlaveConnection, connect_to_slave, fold_report};
pub use protocol::{
    MAX_REPORT_BYTES, ReportDecoder, STATUS_OK, StatsForInterval, encode_command, encode_report,
    parse_commands, parse_second_label,
};
pub use slave::{
    SlaveContext, bind_listener, handle_master_connection, run_reporting, spawn_slave_listener,
};
