//! Operations and counter kinds tracked by the check engine.
//!
//! Every per-kind decision (labels, metric names, configuration keys,
//! default policy) is read from these tables so the five kinds behave the
//! same way for all three operations.

use serde::Serialize;

use crate::section::OperationCounters;
use crate::thresholds::DefaultPolicy;

/// The SMART operations that are evaluated against thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Verify,
}

impl Operation {
    /// Fixed evaluation and summary order.
    pub const ALL: [Operation; 3] = [Operation::Read, Operation::Write, Operation::Verify];

    /// Key used in `error_counters` and as metric name prefix.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Verify => "verify",
        }
    }

    /// Capitalised label used in result messages.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Read => "Read",
            Operation::Write => "Write",
            Operation::Verify => "Verify",
        }
    }
}

/// A SMART error counter that can be compared against levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    TotalUncorrected,
    EccFast,
    EccDelayed,
    RereadsRewrites,
    AlgorithmInvocations,
}

impl CounterKind {
    /// Order in which result lines are produced for one operation.
    pub const EVALUATION_ORDER: [CounterKind; 5] = [
        CounterKind::TotalUncorrected,
        CounterKind::EccFast,
        CounterKind::EccDelayed,
        CounterKind::RereadsRewrites,
        CounterKind::AlgorithmInvocations,
    ];

    /// Order in which absolute metrics are emitted. The bytes-processed metric
    /// sits between invocations and uncorrected errors (see `check`).
    pub const METRIC_ORDER: [CounterKind; 5] = [
        CounterKind::EccFast,
        CounterKind::EccDelayed,
        CounterKind::RereadsRewrites,
        CounterKind::AlgorithmInvocations,
        CounterKind::TotalUncorrected,
    ];

    /// Metric name suffix, identical to the collector's field name.
    pub fn metric_suffix(self) -> &'static str {
        match self {
            CounterKind::TotalUncorrected => "total_uncorrected_errors",
            CounterKind::EccFast => "errors_corrected_by_eccfast",
            CounterKind::EccDelayed => "errors_corrected_by_eccdelayed",
            CounterKind::RereadsRewrites => "errors_corrected_by_rereads_rewrites",
            CounterKind::AlgorithmInvocations => "correction_algorithm_invocations",
        }
    }

    /// Middle part of the `<op>_<kind>_abs` threshold key.
    pub fn param_kind(self) -> &'static str {
        match self {
            CounterKind::TotalUncorrected => "uncorrected_errors",
            CounterKind::EccFast => "eccfast_errors",
            CounterKind::EccDelayed => "eccdelayed_errors",
            CounterKind::RereadsRewrites => "rereads_rewrites_errors",
            CounterKind::AlgorithmInvocations => "algorithm_invocations",
        }
    }

    /// Label used in `"<Operation> <label>: <value>"` result lines.
    pub fn label(self) -> &'static str {
        match self {
            CounterKind::TotalUncorrected => "uncorrected errors",
            CounterKind::EccFast => "ECC fast",
            CounterKind::EccDelayed => "ECC delayed",
            CounterKind::RereadsRewrites => "rereads/rewrites",
            CounterKind::AlgorithmInvocations => "algorithm invocations",
        }
    }

    /// What happens when no levels are configured for this kind.
    pub fn default_policy(self) -> DefaultPolicy {
        match self {
            CounterKind::TotalUncorrected => DefaultPolicy::CriticalOnAny,
            CounterKind::EccFast | CounterKind::EccDelayed | CounterKind::RereadsRewrites => {
                DefaultPolicy::ReportOnly
            }
            CounterKind::AlgorithmInvocations => DefaultPolicy::Suppress,
        }
    }

    /// Whether a `_per_tb` metric is always emitted for this kind. The
    /// uncorrected rate is opt-in through the threshold configuration.
    pub fn always_has_rate_metric(self) -> bool {
        !matches!(self, CounterKind::TotalUncorrected)
    }

    pub fn value(self, counters: &OperationCounters) -> u64 {
        match self {
            CounterKind::TotalUncorrected => counters.total_uncorrected_errors,
            CounterKind::EccFast => counters.errors_corrected_by_eccfast,
            CounterKind::EccDelayed => counters.errors_corrected_by_eccdelayed,
            CounterKind::RereadsRewrites => counters.errors_corrected_by_rereads_rewrites,
            CounterKind::AlgorithmInvocations => counters.correction_algorithm_invocations,
        }
    }
}

/// Threshold key for one operation and counter kind, e.g. `read_eccfast_errors_abs`.
pub fn param_key(op: Operation, kind: CounterKind) -> String {
    format!("{}_{}_abs", op.name(), kind.param_kind())
}
