//! Core library for the `loadpool` CLI.
//!
//! An interactive HTTP load generator: a resizable pool of requesters, per
//! second statistics over a one minute window, and an optional master/slave
//! mode that drives several machines from one dashboard. The binary is the
//! primary interface; the library exposes the building blocks it wires
//! together.
pub mod app;
pub mod args;
pub mod clock;
pub mod cluster;
pub mod config;
pub mod entry;
pub mod error;
pub mod fanout;
pub mod http;
pub mod logger;
pub mod pool;
pub mod reporter;
pub mod ring;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod stats;
pub mod ui;

#[cfg(test)]
mod test_support;
