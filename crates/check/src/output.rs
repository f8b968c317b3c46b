//! Rendering of discovery and check results.
//!
//! Text output follows the local check format understood by monitoring
//! hosts: `<code> "<service>" <metrics> <summary>`.

use serde::Serialize;

use smart_errors_core::check::Metric;
use smart_errors_core::discovery::ServiceIdentity;
use smart_errors_core::metric_names::{graph_catalog, metric_catalog, GraphDefinition, MetricDefinition};
use smart_errors_core::types::Timestamp;

use crate::runner::ServiceReport;

/// Prefix of every service name.
pub const SERVICE_PREFIX: &str = "SMART Errors";

/// Placeholder for "no metrics" in a local check line.
const NO_METRICS: &str = "-";

pub fn service_name(service: &ServiceIdentity) -> String {
    format!("{SERVICE_PREFIX} {service}")
}

fn format_metrics(metrics: &[Metric]) -> String {
    if metrics.is_empty() {
        return NO_METRICS.to_string();
    }
    metrics
        .iter()
        .map(|m| format!("{}={}", m.name, m.value))
        .collect::<Vec<_>>()
        .join("|")
}

/// One local check line for a service.
pub fn local_check_line(report: &ServiceReport) -> String {
    format!(
        "{} \"{}\" {} {}",
        report.outcome.state.code(),
        service_name(&report.service),
        format_metrics(&report.outcome.metrics),
        report.outcome.summary(),
    )
}

/// JSON document for a batch of check results.
#[derive(Debug, Serialize)]
pub struct CheckReport<'a> {
    pub generated_at: Timestamp,
    pub services: &'a [ServiceReport],
}

/// JSON document for a discovery run.
#[derive(Debug, Serialize)]
pub struct DiscoveryReport<'a> {
    pub generated_at: Timestamp,
    pub services: &'a [ServiceIdentity],
}

/// Metric and graph definitions for the monitoring host.
#[derive(Debug, Serialize)]
pub struct Catalog {
    pub metrics: Vec<MetricDefinition>,
    pub graphs: Vec<GraphDefinition>,
}

impl Catalog {
    pub fn build() -> Self {
        Self {
            metrics: metric_catalog(),
            graphs: graph_catalog(),
        }
    }
}

/// Exit code for a batch: the highest state code printed, 0 when empty.
pub fn exit_code(reports: &[ServiceReport]) -> u8 {
    reports
        .iter()
        .map(|r| r.outcome.state.code())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use smart_errors_core::check::CheckOutcome;
    use smart_errors_core::thresholds::State;

    use super::*;

    fn report(item: &str, outcome: CheckOutcome) -> ServiceReport {
        ServiceReport {
            service: ServiceIdentity::from_item(item),
            outcome,
        }
    }

    #[test]
    fn line_without_metrics_uses_dash() {
        let line = local_check_line(&report(
            "/dev/sdb (ABCDEFGH)",
            CheckOutcome::terminal(State::Crit, "Error: timeout"),
        ));
        assert_eq!(line, "2 \"SMART Errors /dev/sdb (ABCDEFGH)\" - Error: timeout");
    }

    #[test]
    fn exit_code_is_worst_state() {
        let reports = vec![
            report("a", CheckOutcome::terminal(State::Ok, "x")),
            report("b", CheckOutcome::terminal(State::Crit, "y")),
            report("c", CheckOutcome::terminal(State::Warn, "z")),
        ];
        assert_eq!(exit_code(&reports), 2);
        assert_eq!(exit_code(&[]), 0);
    }
}
