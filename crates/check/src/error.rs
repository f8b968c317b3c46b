use smart_errors_core::error::CoreError;

/// Failures that abort a run before or while printing results.
///
/// Per-device data problems never end up here; they become check outcomes.
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read standard input: {0}")]
    ReadStdin(#[source] std::io::Error),

    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("Invalid field separator {0:?}: expected a single character")]
    Separator(String),

    #[error(transparent)]
    Thresholds(#[from] CoreError),

    #[error("Failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}
