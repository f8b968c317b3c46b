//! Command dispatch shared by the binary and the integration tests.

use std::io::Write;
use std::sync::Arc;

use chrono::Utc;

use smart_errors_core::discovery::{discover, ServiceIdentity};
use smart_errors_core::section::{parse_section, Section};

use crate::config::{Cli, Command, OutputFormat};
use crate::error::CheckerError;
use crate::input::{read_input, split_rows};
use crate::output::{exit_code, local_check_line, Catalog, CheckReport, DiscoveryReport};
use crate::runner::check_all;

/// Execute the selected command, writing results to `out`.
///
/// Returns the process exit code.
pub async fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<u8, CheckerError> {
    match &cli.command {
        Command::Metrics => {
            serde_json::to_writer_pretty(&mut *out, &Catalog::build())?;
            writeln!(out)?;
            Ok(0)
        }
        Command::Discover => {
            let section = load_section(cli).await?;
            let services = discover(&section);
            tracing::info!(services = services.len(), "Discovery complete");

            match cli.format {
                OutputFormat::Text => {
                    for service in &services {
                        writeln!(out, "{service}")?;
                    }
                }
                OutputFormat::Json => {
                    let report = DiscoveryReport {
                        generated_at: Utc::now(),
                        services: &services,
                    };
                    serde_json::to_writer_pretty(&mut *out, &report)?;
                    writeln!(out)?;
                }
            }
            Ok(0)
        }
        Command::Check { item } => {
            // Levels are validated before any input is read.
            let config = cli.thresholds().await?;
            let section = load_section(cli).await?;

            let services = match item {
                Some(item) => vec![ServiceIdentity::from_item(item.as_str())],
                None => discover(&section),
            };

            let reports = check_all(services, Arc::new(section), Arc::new(config)).await;
            let code = exit_code(&reports);
            tracing::info!(services = reports.len(), exit_code = code, "Checks complete");

            match cli.format {
                OutputFormat::Text => {
                    for report in &reports {
                        writeln!(out, "{}", local_check_line(report))?;
                    }
                }
                OutputFormat::Json => {
                    let report = CheckReport {
                        generated_at: Utc::now(),
                        services: &reports,
                    };
                    serde_json::to_writer_pretty(&mut *out, &report)?;
                    writeln!(out)?;
                }
            }
            Ok(code)
        }
    }
}

async fn load_section(cli: &Cli) -> Result<Section, CheckerError> {
    let separator = cli.separator()?;
    let text = read_input(cli.input.as_deref()).await?;
    let rows = split_rows(&text, separator);
    let section = parse_section(rows);
    tracing::debug!(rows = section.len(), "Parsed collector output");
    Ok(section)
}
