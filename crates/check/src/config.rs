//! Command line and environment configuration.
//!
//! Every option falls back to an environment variable, so a `.env` file
//! next to the binary is enough to configure it.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use smart_errors_core::thresholds::ThresholdConfig;

use crate::error::CheckerError;

/// Field separator of collector rows when neither the command line nor a
/// section header names one.
pub const DEFAULT_SEPARATOR: char = '\t';

/// SMART error counter check for monitoring hosts.
#[derive(Debug, Parser)]
#[command(name = "smart-errors-check", version)]
#[command(about = "Evaluate SMART error counters and print local check results")]
pub struct Cli {
    /// Collector output file (stdin when omitted)
    #[arg(long, short, env = "SMART_ERRORS_INPUT", global = true)]
    pub input: Option<PathBuf>,

    /// Threshold configuration JSON file
    #[arg(long, short, env = "SMART_ERRORS_PARAMS", global = true)]
    pub params: Option<PathBuf>,

    /// Field separator of collector rows (a single character, `\t` for tab).
    /// Defaults to the section header's `sep(N)`, then tab
    #[arg(long, env = "SMART_ERRORS_SEPARATOR", global = true)]
    pub separator: Option<String>,

    /// Output format
    #[arg(long, value_enum, env = "SMART_ERRORS_FORMAT", default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List the services found in the collector output
    Discover,
    /// Check one service, or every discovered service
    Check {
        /// Service item, e.g. "/dev/sda (34567890)"
        item: Option<String>,
    },
    /// Print the metric and graph catalog as JSON
    Metrics,
}

impl Cli {
    /// The explicitly configured separator, if any.
    pub fn separator(&self) -> Result<Option<char>, CheckerError> {
        self.separator.as_deref().map(parse_separator).transpose()
    }

    /// Load and validate threshold levels, or the defaults when no file is set.
    pub async fn thresholds(&self) -> Result<ThresholdConfig, CheckerError> {
        let Some(path) = &self.params else {
            return Ok(ThresholdConfig::default());
        };

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CheckerError::ReadFile {
                path: path.display().to_string(),
                source,
            })?;
        let config = ThresholdConfig::from_json(&text)?;

        tracing::debug!(path = %path.display(), "Loaded threshold configuration");
        Ok(config)
    }
}

/// Accepts one character or one of the escapes `\t`, `\s`.
pub fn parse_separator(raw: &str) -> Result<char, CheckerError> {
    match raw {
        "\\t" => return Ok('\t'),
        "\\s" => return Ok(' '),
        _ => {}
    }

    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CheckerError::Separator(raw.to_string())),
    }
}
