#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown threshold key: {0}")]
    UnknownThresholdKey(String),

    #[error("Invalid threshold configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
