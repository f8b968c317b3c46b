//! Collector output reading and row splitting.

use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::config::DEFAULT_SEPARATOR;
use crate::error::CheckerError;

/// A row is split into at most this many fields: device, payload, detail.
const MAX_FIELDS: usize = 3;

/// Read the whole collector output from `path`, or stdin when `None`.
pub async fn read_input(path: Option<&Path>) -> Result<String, CheckerError> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CheckerError::ReadFile {
                path: path.display().to_string(),
                source,
            }),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .map_err(CheckerError::ReadStdin)?;
            Ok(text)
        }
    }
}

/// Whether a line is a monitoring-host section header such as `<<<smart_errors>>>`.
fn is_section_header(line: &str) -> bool {
    line.starts_with("<<<") && line.ends_with(">>>")
}

/// Separator announced by a section header option, e.g. `sep(124)` for `|`.
pub fn header_separator(header: &str) -> Option<char> {
    let options = header.strip_prefix("<<<")?.strip_suffix(">>>")?;
    options
        .split(':')
        .skip(1)
        .find_map(|option| option.strip_prefix("sep(")?.strip_suffix(')'))
        .and_then(|code| code.trim().parse::<u32>().ok())
        .and_then(char::from_u32)
}

/// Split collector output into rows of fields.
///
/// Blank lines and section headers are dropped. Without an `explicit`
/// separator each section is split by the separator its header announces,
/// falling back to [`DEFAULT_SEPARATOR`]. Only the first two separators
/// split, so an error detail may contain the separator itself.
pub fn split_rows(text: &str, explicit: Option<char>) -> Vec<Vec<String>> {
    let mut separator = explicit.unwrap_or(DEFAULT_SEPARATOR);
    let mut rows = Vec::new();

    for line in text.lines().map(|line| line.trim_end_matches('\r')) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_section_header(trimmed) {
            if explicit.is_none() {
                separator = header_separator(trimmed).unwrap_or(DEFAULT_SEPARATOR);
                tracing::debug!(header = %trimmed, separator = ?separator, "Section header");
            }
            continue;
        }
        rows.push(
            line.splitn(MAX_FIELDS, separator)
                .map(str::to_string)
                .collect(),
        );
    }

    rows
}
