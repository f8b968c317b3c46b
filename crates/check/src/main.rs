//! `smart-errors-check` -- SMART error counter check.
//!
//! Reads collector output (one row per device), checks every discovered
//! service and prints one local check line per service on stdout. Logs go
//! to stderr.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default | Description                          |
//! |--------------------------|----------|---------|--------------------------------------|
//! | `SMART_ERRORS_INPUT`     | no       | stdin   | Collector output file                |
//! | `SMART_ERRORS_PARAMS`    | no       | --      | Threshold configuration JSON file    |
//! | `SMART_ERRORS_SEPARATOR` | no       | header `sep(N)`, else `\t` | Field separator of collector rows |
//! | `SMART_ERRORS_FORMAT`    | no       | `text`  | `text` or `json`                     |
//! | `RUST_LOG`               | no       | `smart_errors_check=info,smart_errors_core=warn` | Log filter |

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smart_errors_check::app;
use smart_errors_check::config::Cli;
use smart_errors_core::thresholds::State;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_errors_check=info,smart_errors_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            let message = format!("{e:#}");
            tracing::error!(error = %message, "smart-errors-check failed");
            ExitCode::from(State::Unknown.code())
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<u8> {
    tracing::debug!(command = ?cli.command, format = ?cli.format, "Starting smart-errors-check");

    let mut stdout = std::io::stdout().lock();
    app::run(cli, &mut stdout)
        .await
        .context("Check run aborted")
}
