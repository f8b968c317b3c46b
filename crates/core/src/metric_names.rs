//! Well-known SMART error metric names and their display catalog.
//!
//! The check engine only uses the name builders. The catalog and graph
//! groupings are rendering metadata handed to the monitoring host as-is.

use serde::Serialize;

use crate::counters::{CounterKind, Operation};

/// Total bytes processed across all operations.
pub const METRIC_TOTAL_BYTES_PROCESSED: &str = "total_bytes_processed";

/// Suffix of the per-operation processed bytes metric.
pub const BYTES_PROCESSED_SUFFIX: &str = "bytes_processed";

/// Suffix appended to relative (per terabyte) metrics.
pub const PER_TB_SUFFIX: &str = "_per_tb";

/// Absolute counter metric, e.g. `read_errors_corrected_by_eccfast`.
pub fn counter_metric(operation: &str, kind: CounterKind) -> String {
    format!("{operation}_{}", kind.metric_suffix())
}

/// Relative counter metric, e.g. `read_errors_corrected_by_eccfast_per_tb`.
pub fn rate_metric(operation: &str, kind: CounterKind) -> String {
    format!("{operation}_{}{PER_TB_SUFFIX}", kind.metric_suffix())
}

/// Processed bytes metric, e.g. `write_bytes_processed`.
pub fn bytes_metric(operation: &str) -> String {
    format!("{operation}_{BYTES_PROCESSED_SUFFIX}")
}

/// Unit of a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricUnit {
    Count,
    Bytes,
}

/// Display definition of one metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricDefinition {
    pub name: String,
    pub title: String,
    pub unit: MetricUnit,
}

/// A group of metrics drawn together.
#[derive(Debug, Clone, Serialize)]
pub struct GraphDefinition {
    pub name: String,
    pub title: String,
    pub metrics: Vec<String>,
}

fn kind_title(kind: CounterKind) -> &'static str {
    match kind {
        CounterKind::TotalUncorrected => "Total Uncorrected Errors",
        CounterKind::EccFast => "Errors Corrected by ECC Fast",
        CounterKind::EccDelayed => "Errors Corrected by ECC Delayed",
        CounterKind::RereadsRewrites => "Errors Corrected by Rereads/Rewrites",
        CounterKind::AlgorithmInvocations => "Correction Algorithm Invocations",
    }
}

/// Every metric the check can emit, per operation then total.
pub fn metric_catalog() -> Vec<MetricDefinition> {
    let mut catalog = Vec::new();

    for op in Operation::ALL {
        for kind in CounterKind::METRIC_ORDER {
            catalog.push(MetricDefinition {
                name: counter_metric(op.name(), kind),
                title: format!("{} {}", op.label(), kind_title(kind)),
                unit: MetricUnit::Count,
            });
        }
        catalog.push(MetricDefinition {
            name: bytes_metric(op.name()),
            title: format!("{} Bytes Processed", op.label()),
            unit: MetricUnit::Bytes,
        });
        for kind in CounterKind::METRIC_ORDER {
            catalog.push(MetricDefinition {
                name: rate_metric(op.name(), kind),
                title: format!("{} {} per TB", op.label(), kind_title(kind)),
                unit: MetricUnit::Count,
            });
        }
    }

    catalog.push(MetricDefinition {
        name: METRIC_TOTAL_BYTES_PROCESSED.to_string(),
        title: "Total Bytes Processed".to_string(),
        unit: MetricUnit::Bytes,
    });
    catalog
}

/// Absolute and relative graphs per operation, plus processed bytes.
pub fn graph_catalog() -> Vec<GraphDefinition> {
    let mut graphs = Vec::new();

    for op in Operation::ALL {
        graphs.push(GraphDefinition {
            name: format!("smart_errors_{}_absolute", op.name()),
            title: format!("SMART {} Errors (Absolute)", op.label()),
            metrics: CounterKind::METRIC_ORDER
                .into_iter()
                .map(|kind| counter_metric(op.name(), kind))
                .collect(),
        });
    }
    for op in Operation::ALL {
        graphs.push(GraphDefinition {
            name: format!("smart_errors_{}_relative", op.name()),
            title: format!("SMART {} Errors per TB", op.label()),
            metrics: CounterKind::METRIC_ORDER
                .into_iter()
                .map(|kind| rate_metric(op.name(), kind))
                .collect(),
        });
    }

    let mut bytes: Vec<String> = Operation::ALL
        .into_iter()
        .map(|op| bytes_metric(op.name()))
        .collect();
    bytes.push(METRIC_TOTAL_BYTES_PROCESSED.to_string());
    graphs.push(GraphDefinition {
        name: "smart_errors_bytes_processed".to_string(),
        title: "SMART Bytes Processed".to_string(),
        metrics: bytes,
    });

    graphs
}
