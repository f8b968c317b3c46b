//! Concurrent check execution.
//!
//! Each service is checked on the tokio blocking pool. The section and the
//! threshold configuration are shared read-only through `Arc`; results come
//! back in the order the services were given.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use smart_errors_core::check::{check, CheckOutcome};
use smart_errors_core::discovery::ServiceIdentity;
use smart_errors_core::section::Section;
use smart_errors_core::thresholds::{State, ThresholdConfig};

/// Message reported for a service whose check task did not complete.
pub const CHECK_FAILED: &str = "Check failed unexpectedly";

/// Outcome of one service check, as printed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceReport {
    pub service: ServiceIdentity,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

/// Check every service in `services` against the same section and levels.
pub async fn check_all(
    services: Vec<ServiceIdentity>,
    section: Arc<Section>,
    config: Arc<ThresholdConfig>,
) -> Vec<ServiceReport> {
    run_checks(services, move |item| check(item, &config, &section)).await
}

/// Run `check_fn` for every service concurrently.
///
/// A task that panics is logged and reported as UNKNOWN for its service
/// only.
pub async fn run_checks<F>(services: Vec<ServiceIdentity>, check_fn: F) -> Vec<ServiceReport>
where
    F: Fn(&ServiceIdentity) -> CheckOutcome + Send + Sync + 'static,
{
    let check_fn = Arc::new(check_fn);
    let mut tasks = JoinSet::new();

    for (index, item) in services.iter().cloned().enumerate() {
        let check_fn = Arc::clone(&check_fn);
        tasks.spawn_blocking(move || (index, check_fn(&item)));
    }

    let mut outcomes: Vec<Option<CheckOutcome>> = vec![None; services.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => tracing::error!(error = %e, "Check task failed"),
        }
    }

    services
        .into_iter()
        .zip(outcomes)
        .map(|(service, outcome)| {
            let outcome = outcome.unwrap_or_else(|| {
                tracing::warn!(service = %service, "No check result, reporting UNKNOWN");
                CheckOutcome::terminal(State::Unknown, CHECK_FAILED)
            });
            ServiceReport { service, outcome }
        })
        .collect()
}
