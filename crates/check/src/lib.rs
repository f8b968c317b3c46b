//! `smart-errors-check` library crate.
//!
//! Reads collector output, runs the SMART error check for every service and
//! renders the results. Re-exports internal modules for integration
//! testing. The binary entrypoint lives in `main.rs`.

pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod runner;
