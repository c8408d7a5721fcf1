//! The `stx` command-line harness.
//!
//! `stx complete` prints the proposals for each placeholder of a fixture's
//! input; `stx check` completes fixture inputs towards their expected
//! programs and reports which ones get there.

pub mod args;
pub mod commands;
pub mod fixture;
pub mod report;
pub mod tracing_config;
