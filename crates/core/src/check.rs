//! The SMART error check.
//!
//! One call evaluates one service against one parsed [`Section`]: it emits
//! absolute and per-TB metrics for every operation the collector reported,
//! rates the read/write/verify counters against the configured levels, and
//! aggregates the worst state.

use serde::Serialize;

use crate::counters::{CounterKind, Operation};
use crate::discovery::ServiceIdentity;
use crate::metric_names::{bytes_metric, counter_metric, rate_metric, METRIC_TOTAL_BYTES_PROCESSED};
use crate::render::{format_bytes, format_levels};
use crate::section::{DataRecord, DeviceRecord, ErrorCounters, Section};
use crate::thresholds::{evaluate, worst, Evaluation, State, ThresholdConfig};
use crate::types::{BYTES_PER_GB, GB_PER_TB};

/// A single performance value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
}

impl Metric {
    fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A state-tagged line of check output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub state: State,
    pub summary: String,
}

impl CheckResult {
    fn new(state: State, summary: impl Into<String>) -> Self {
        Self {
            state,
            summary: summary.into(),
        }
    }

    fn ok(summary: impl Into<String>) -> Self {
        Self::new(State::Ok, summary)
    }
}

/// Everything one check invocation produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub state: State,
    pub results: Vec<CheckResult>,
    pub metrics: Vec<Metric>,
}

impl CheckOutcome {
    /// Outcome with a single result and no metrics.
    pub fn terminal(state: State, summary: impl Into<String>) -> Self {
        Self {
            state,
            results: vec![CheckResult::new(state, summary)],
            metrics: Vec::new(),
        }
    }

    /// Value of the named metric, if it was emitted.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
    }

    /// All result messages joined the way the monitoring host shows them.
    pub fn summary(&self) -> String {
        self.results
            .iter()
            .map(|r| r.summary.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Run the check for one service item.
pub fn check(item: &ServiceIdentity, config: &ThresholdConfig, section: &Section) -> CheckOutcome {
    let data = match item.locate(section) {
        None => {
            tracing::debug!(service = %item, "Device missing from current section");
            return CheckOutcome::terminal(
                State::Unknown,
                format!("Device {} not found", item.device_name()),
            );
        }
        Some((_, DeviceRecord::Error(error))) => {
            return CheckOutcome::terminal(State::Crit, format!("Error: {}", error.message));
        }
        Some((_, DeviceRecord::Data(data))) => data,
    };

    let description = data.description();
    if data.error_counters.is_empty() {
        return CheckOutcome::terminal(
            State::Unknown,
            format!("{description}: No error counter data available"),
        );
    }

    let mut metrics = Vec::new();
    let total_processed_gb = emit_metrics(&data.error_counters, config, &mut metrics);

    let mut results = vec![CheckResult::ok(description)];
    let mut states = Vec::new();

    evaluate_counters(data, config, &mut results, &mut states);

    if let Some(levels) = config.uncorrected_per_tb_levels() {
        if total_processed_gb > 0.0 {
            let uncorrected = data
                .error_counters
                .iter()
                .fold(0u64, |acc, (_, c)| acc.saturating_add(c.total_uncorrected_errors));
            let rate = uncorrected as f64 / (total_processed_gb / GB_PER_TB);
            let state = levels.evaluate(rate);
            states.push(state);
            if state != State::Ok {
                results.push(CheckResult::new(
                    state,
                    format!(
                        "Uncorrected errors per TB: {rate:.2} {}",
                        format_levels(levels.warn, levels.crit)
                    ),
                ));
            }
        }
    }

    for op in Operation::ALL {
        let processed_gb = data
            .error_counters
            .get(op.name())
            .map_or(0.0, |c| c.gigabytes_processed);
        if processed_gb > 0.0 {
            results.push(CheckResult::ok(format!(
                "{}: {} processed",
                op.label(),
                format_bytes(processed_gb * BYTES_PER_GB)
            )));
        }
    }

    let state = worst(states);
    tracing::debug!(
        service = %item,
        state = %state,
        results = results.len(),
        metrics = metrics.len(),
        "Check complete",
    );

    CheckOutcome {
        state,
        results,
        metrics,
    }
}

/// Emit absolute and relative metrics for every reported operation.
///
/// Returns the total gigabytes processed across operations.
fn emit_metrics(counters: &ErrorCounters, config: &ThresholdConfig, metrics: &mut Vec<Metric>) -> f64 {
    let mut total_gb = 0.0;

    for (operation, values) in counters.iter() {
        let processed_gb = values.gigabytes_processed;

        for kind in CounterKind::METRIC_ORDER {
            // Processed bytes sit right before the uncorrected counter.
            if kind == CounterKind::TotalUncorrected {
                metrics.push(Metric::new(
                    bytes_metric(operation),
                    processed_gb * BYTES_PER_GB,
                ));
            }
            metrics.push(Metric::new(
                counter_metric(operation, kind),
                kind.value(values) as f64,
            ));
        }

        if processed_gb > 0.0 {
            let processed_tb = processed_gb / GB_PER_TB;
            for kind in CounterKind::METRIC_ORDER {
                if kind.always_has_rate_metric() || config.uncorrected_per_tb_metric {
                    metrics.push(Metric::new(
                        rate_metric(operation, kind),
                        kind.value(values) as f64 / processed_tb,
                    ));
                }
            }
        }

        total_gb += processed_gb;
    }

    metrics.push(Metric::new(
        METRIC_TOTAL_BYTES_PROCESSED,
        total_gb * BYTES_PER_GB,
    ));
    total_gb
}

/// Rate every non-zero read/write/verify counter and push its result line.
fn evaluate_counters(
    data: &DataRecord,
    config: &ThresholdConfig,
    results: &mut Vec<CheckResult>,
    states: &mut Vec<State>,
) {
    for op in Operation::ALL {
        let Some(values) = data.error_counters.get(op.name()) else {
            continue;
        };

        for kind in CounterKind::EVALUATION_ORDER {
            let value = kind.value(values);
            if value == 0 {
                continue;
            }

            let line = format!("{} {}: {value}", op.label(), kind.label());
            let evaluation = evaluate(value, config.levels_for(op, kind), kind.default_policy());
            states.extend(evaluation.state());
            match evaluation {
                Evaluation::Rated { state, levels } => {
                    let summary = if state == State::Ok {
                        line
                    } else {
                        format!("{line} {}", format_levels(levels.warn, levels.crit))
                    };
                    results.push(CheckResult::new(state, summary));
                }
                Evaluation::Informational => results.push(CheckResult::ok(line)),
                Evaluation::Suppressed => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
