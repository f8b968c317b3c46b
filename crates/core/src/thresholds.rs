//! Threshold evaluation for SMART error counters.
//!
//! Pure logic. The caller loads a [`ThresholdConfig`] once per run and
//! passes it into every check; nothing here mutates it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::counters::{param_key, CounterKind, Operation};
use crate::error::CoreError;

/// Service state as understood by the monitoring host.
///
/// `Ok < Warn < Crit` is the aggregation order. `Unknown` is only produced
/// by the engine's short-circuits and never aggregated with the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    Ok,
    Warn,
    Crit,
    Unknown,
}

impl State {
    /// Exit/status code used by local checks and monitoring plugins.
    pub fn code(self) -> u8 {
        match self {
            State::Ok => 0,
            State::Warn => 1,
            State::Crit => 2,
            State::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            State::Ok => "OK",
            State::Warn => "WARN",
            State::Crit => "CRIT",
            State::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper warning/critical levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Levels<T> {
    pub warn: T,
    pub crit: T,
}

impl<T> Levels<T> {
    pub const fn new(warn: T, crit: T) -> Self {
        Self { warn, crit }
    }
}

impl<T: PartialOrd> Levels<T> {
    /// `value >= crit` is CRIT, `value >= warn` is WARN, anything else OK.
    pub fn evaluate(&self, value: T) -> State {
        if value >= self.crit {
            State::Crit
        } else if value >= self.warn {
            State::Warn
        } else {
            State::Ok
        }
    }
}

/// Levels applied to uncorrected errors when none are configured.
pub const ANY_UNCORRECTED_IS_CRITICAL: Levels<u64> = Levels::new(1, 1);

/// Behaviour for a counter kind without configured levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPolicy {
    /// Any positive value is critical.
    CriticalOnAny,
    /// Report the value, do not affect the service state.
    ReportOnly,
    /// Do not report the value at all.
    Suppress,
}

/// Outcome of evaluating one counter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// Compared against levels; contributes `state` to the aggregate.
    Rated { state: State, levels: Levels<u64> },
    /// Shown as OK without contributing to the aggregate.
    Informational,
    /// Not shown.
    Suppressed,
}

impl Evaluation {
    /// State contributed to the aggregate, if any.
    pub fn state(&self) -> Option<State> {
        match self {
            Evaluation::Rated { state, .. } => Some(*state),
            Evaluation::Informational | Evaluation::Suppressed => None,
        }
    }
}

/// Evaluate `value` against configured levels, or the kind's default policy.
pub fn evaluate(value: u64, configured: Option<Levels<u64>>, policy: DefaultPolicy) -> Evaluation {
    let levels = match (configured, policy) {
        (Some(levels), _) => levels,
        (None, DefaultPolicy::CriticalOnAny) => ANY_UNCORRECTED_IS_CRITICAL,
        (None, DefaultPolicy::ReportOnly) => return Evaluation::Informational,
        (None, DefaultPolicy::Suppress) => return Evaluation::Suppressed,
    };
    Evaluation::Rated {
        state: levels.evaluate(value),
        levels,
    }
}

/// Worst of the given states under `Ok < Warn < Crit`.
pub fn worst<I: IntoIterator<Item = State>>(states: I) -> State {
    states.into_iter().fold(State::Ok, State::max)
}

/// Levels as they appear in rule configuration: either a bare
/// `[warn, crit]` pair or `{"levels_upper": [warn, crit]}`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LevelsSpec<T> {
    Pair((T, T)),
    Upper { levels_upper: (T, T) },
}

impl<T: Copy> LevelsSpec<T> {
    pub fn levels(&self) -> Levels<T> {
        match *self {
            LevelsSpec::Pair((warn, crit)) | LevelsSpec::Upper {
                levels_upper: (warn, crit),
            } => Levels::new(warn, crit),
        }
    }
}

/// Check parameters for the SMART error check.
///
/// Absolute levels live under `<op>_<kind>_abs` keys; a missing key means the
/// kind's [`DefaultPolicy`] applies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdConfig {
    /// Levels for total uncorrected errors per TB processed, all operations.
    #[serde(default)]
    pub uncorrected_errors_per_tb: Option<LevelsSpec<f64>>,

    /// Emit `<op>_total_uncorrected_errors_per_tb` metrics.
    #[serde(default)]
    pub uncorrected_per_tb_metric: bool,

    #[serde(flatten)]
    absolute: BTreeMap<String, LevelsSpec<u64>>,
}

impl ThresholdConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let config: ThresholdConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Set absolute levels for one operation and counter kind.
    pub fn with_levels(mut self, op: Operation, kind: CounterKind, warn: u64, crit: u64) -> Self {
        self.absolute
            .insert(param_key(op, kind), LevelsSpec::Pair((warn, crit)));
        self
    }

    /// Set levels for uncorrected errors per TB.
    pub fn with_uncorrected_per_tb(mut self, warn: f64, crit: f64) -> Self {
        self.uncorrected_errors_per_tb = Some(LevelsSpec::Pair((warn, crit)));
        self
    }

    /// Configured absolute levels for `op`/`kind`, if any.
    pub fn levels_for(&self, op: Operation, kind: CounterKind) -> Option<Levels<u64>> {
        self.absolute
            .get(&param_key(op, kind))
            .map(LevelsSpec::levels)
    }

    pub fn uncorrected_per_tb_levels(&self) -> Option<Levels<f64>> {
        self.uncorrected_errors_per_tb.as_ref().map(LevelsSpec::levels)
    }

    /// Reject unknown keys and inverted or negative levels.
    pub fn validate(&self) -> Result<(), CoreError> {
        let known: Vec<String> = Operation::ALL
            .into_iter()
            .flat_map(|op| {
                CounterKind::EVALUATION_ORDER
                    .into_iter()
                    .map(move |kind| param_key(op, kind))
            })
            .collect();

        for (key, spec) in &self.absolute {
            if !known.contains(key) {
                return Err(CoreError::UnknownThresholdKey(key.clone()));
            }
            let levels = spec.levels();
            if levels.warn > levels.crit {
                return Err(CoreError::Validation(format!(
                    "{key}: warning level ({}) must be <= critical level ({})",
                    levels.warn, levels.crit
                )));
            }
        }

        if let Some(levels) = self.uncorrected_per_tb_levels() {
            if !(levels.warn >= 0.0 && levels.crit >= 0.0) {
                return Err(CoreError::Validation(format!(
                    "uncorrected_errors_per_tb levels must be non-negative, got {}/{}",
                    levels.warn, levels.crit
                )));
            }
            if levels.warn > levels.crit {
                return Err(CoreError::Validation(format!(
                    "uncorrected_errors_per_tb: warning level ({}) must be <= critical level ({})",
                    levels.warn, levels.crit
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn levels_boundaries() {
        let levels = Levels::new(10u64, 20);
        assert_eq!(levels.evaluate(9), State::Ok);
        assert_eq!(levels.evaluate(10), State::Warn);
        assert_eq!(levels.evaluate(19), State::Warn);
        assert_eq!(levels.evaluate(20), State::Crit);
    }

    #[test]
    fn evaluation_is_monotonic() {
        let levels = Levels::new(3u64, 7);
        let states: Vec<State> = (0..12).map(|v| levels.evaluate(v)).collect();
        assert!(states.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn uncorrected_default_is_critical() {
        let eval = evaluate(7, None, DefaultPolicy::CriticalOnAny);
        assert_matches!(eval, Evaluation::Rated { state: State::Crit, .. });
    }

    #[test]
    fn configured_levels_override_default() {
        let eval = evaluate(7, Some(Levels::new(10, 20)), DefaultPolicy::CriticalOnAny);
        assert_eq!(eval.state(), Some(State::Ok));
    }

    #[test]
    fn report_only_and_suppress_have_no_state() {
        assert_eq!(
            evaluate(5, None, DefaultPolicy::ReportOnly),
            Evaluation::Informational
        );
        assert_eq!(
            evaluate(5, None, DefaultPolicy::Suppress),
            Evaluation::Suppressed
        );
        assert_eq!(Evaluation::Informational.state(), None);
    }

    #[test]
    fn worst_state() {
        assert_eq!(worst(Vec::new()), State::Ok);
        assert_eq!(worst([State::Ok, State::Warn]), State::Warn);
        assert_eq!(worst([State::Crit, State::Warn, State::Ok]), State::Crit);
    }

    #[test]
    fn config_accepts_both_level_forms() {
        let config = ThresholdConfig::from_json(
            r#"{
                "read_uncorrected_errors_abs": [10, 20],
                "write_eccfast_errors_abs": {"levels_upper": [100, 1000]},
                "uncorrected_errors_per_tb": [0.5, 2.0]
            }"#,
        )
        .expect("valid config");

        assert_eq!(
            config.levels_for(Operation::Read, CounterKind::TotalUncorrected),
            Some(Levels::new(10, 20))
        );
        assert_eq!(
            config.levels_for(Operation::Write, CounterKind::EccFast),
            Some(Levels::new(100, 1000))
        );
        assert_eq!(
            config.levels_for(Operation::Verify, CounterKind::EccFast),
            None
        );
        assert_eq!(config.uncorrected_per_tb_levels(), Some(Levels::new(0.5, 2.0)));
        assert!(!config.uncorrected_per_tb_metric);
    }

    #[test]
    fn config_rejects_unknown_key() {
        let err = ThresholdConfig::from_json(r#"{"read_temperature_abs": [1, 2]}"#)
            .expect_err("unknown key");
        assert_matches!(err, CoreError::UnknownThresholdKey(key) if key == "read_temperature_abs");
    }

    #[test]
    fn config_rejects_inverted_levels() {
        let err = ThresholdConfig::from_json(r#"{"verify_algorithm_invocations_abs": [50, 5]}"#)
            .expect_err("inverted levels");
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn config_rejects_malformed_levels() {
        let err = ThresholdConfig::from_json(r#"{"read_eccfast_errors_abs": "high"}"#)
            .expect_err("malformed levels");
        assert_matches!(err, CoreError::InvalidConfig(_));
    }

    #[test]
    fn empty_config_is_valid() {
        let config = ThresholdConfig::from_json("{}").expect("empty config");
        assert_eq!(config.uncorrected_per_tb_levels(), None);
    }

    #[test]
    fn builder_sets_levels() {
        let config = ThresholdConfig::default()
            .with_levels(Operation::Read, CounterKind::AlgorithmInvocations, 1, 2)
            .with_uncorrected_per_tb(1.0, 3.0);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.levels_for(Operation::Read, CounterKind::AlgorithmInvocations),
            Some(Levels::new(1, 2))
        );
    }
}
