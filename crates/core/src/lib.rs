//! SMART error counter domain logic.
//!
//! Pure functions from collector rows to check outcomes. No I/O happens in
//! this crate; the `smart-errors-check` binary handles input, concurrency and
//! output.
//!
//! - [`section`] parses collector rows into a [`section::Section`].
//! - [`describe`] builds the human-readable device label.
//! - [`discovery`] turns a section into service identities.
//! - [`thresholds`] evaluates counter values against configured levels.
//! - [`check`] produces the state, result lines and metrics for one service.

pub mod check;
pub mod counters;
pub mod describe;
pub mod discovery;
pub mod error;
pub mod metric_names;
pub mod render;
pub mod section;
pub mod thresholds;
pub mod types;
