//! Collector output parsing.
//!
//! Turns the collector's rows (already split into fields) into a
//! [`Section`]: one [`DeviceRecord`] per device name. Parsing never fails as
//! a whole; a bad row only turns that device into an [`ErrorRecord`].

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::describe::describe_device;
use crate::types::DeviceName;

/// Field 1 value marking a collector-side failure for the device.
pub const ERROR_MARKER: &str = "ERROR";

/// Message used when an `ERROR` row carries no detail field.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Message used when the data blob is not a valid JSON object.
pub const INVALID_JSON: &str = "Invalid JSON data";

/// Parsed collector output for one collection cycle, in collector order.
pub type Section = IndexMap<DeviceName, DeviceRecord>;

/// Everything known about one device in the current cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceRecord {
    Error(ErrorRecord),
    Data(DataRecord),
}

impl DeviceRecord {
    pub fn error(message: impl Into<String>) -> Self {
        DeviceRecord::Error(ErrorRecord {
            message: message.into(),
        })
    }

    pub fn as_data(&self) -> Option<&DataRecord> {
        match self {
            DeviceRecord::Data(data) => Some(data),
            DeviceRecord::Error(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataRecord {
    pub device_path: String,
    pub protocol: String,
    pub model: String,
    pub serial: String,
    pub capacity_bytes: u64,
    pub error_counters: ErrorCounters,
}

impl DataRecord {
    /// Human-readable label, see [`describe_device`].
    pub fn description(&self) -> String {
        describe_device(
            &self.device_path,
            &self.model,
            &self.serial,
            self.capacity_bytes,
        )
    }
}

/// Per-operation counters in the order the collector reported them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorCounters(Vec<(String, OperationCounters)>);

impl ErrorCounters {
    pub fn get(&self, operation: &str) -> Option<&OperationCounters> {
        self.0
            .iter()
            .find(|(name, _)| name == operation)
            .map(|(_, counters)| counters)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OperationCounters)> {
        self.0.iter().map(|(name, counters)| (name.as_str(), counters))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Insert or replace, keeping the position of an existing entry.
    pub fn insert(&mut self, operation: impl Into<String>, counters: OperationCounters) {
        let operation = operation.into();
        match self.0.iter_mut().find(|(name, _)| *name == operation) {
            Some(slot) => slot.1 = counters,
            None => self.0.push((operation, counters)),
        }
    }
}

impl FromIterator<(String, OperationCounters)> for ErrorCounters {
    fn from_iter<I: IntoIterator<Item = (String, OperationCounters)>>(iter: I) -> Self {
        let mut counters = ErrorCounters::default();
        for (operation, values) in iter {
            counters.insert(operation, values);
        }
        counters
    }
}

impl Serialize for ErrorCounters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// SMART error counter log for one operation (read, write or verify).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationCounters {
    #[serde(deserialize_with = "null_as_zero")]
    pub errors_corrected_by_eccfast: u64,
    #[serde(deserialize_with = "null_as_zero")]
    pub errors_corrected_by_eccdelayed: u64,
    #[serde(deserialize_with = "null_as_zero")]
    pub errors_corrected_by_rereads_rewrites: u64,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_errors_corrected: u64,
    #[serde(deserialize_with = "null_as_zero")]
    pub correction_algorithm_invocations: u64,
    #[serde(deserialize_with = "gigabytes")]
    pub gigabytes_processed: f64,
    #[serde(deserialize_with = "null_as_zero")]
    pub total_uncorrected_errors: u64,
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

/// smartctl reports `gigabytes_processed` as a decimal string; accept numbers too.
fn gigabytes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    let value = match Option::<NumberOrText>::deserialize(deserializer)? {
        None => 0.0,
        Some(NumberOrText::Number(v)) => v,
        Some(NumberOrText::Text(text)) => text.trim().parse::<f64>().map_err(|e| {
            D::Error::custom(format!("invalid gigabytes_processed {text:?}: {e}"))
        })?,
    };
    if !value.is_finite() || value < 0.0 {
        return Err(D::Error::custom(format!(
            "gigabytes_processed must be a non-negative number, got {value}"
        )));
    }
    Ok(value)
}

/// Top-level blob as written by the collector. Every key is optional.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    device: Option<String>,
    #[serde(default)]
    protocol: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    serial: Option<String>,
    #[serde(default)]
    capacity_bytes: Option<u64>,
    #[serde(default)]
    error_counters: Option<serde_json::Map<String, Value>>,
}

/// Parse all rows of one collection cycle.
///
/// Rows with fewer than two fields are skipped. When a device appears more
/// than once the last row wins, at the position of the first.
pub fn parse_section<I, R, S>(rows: I) -> Section
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut section = Section::new();
    for row in rows {
        if let Some((device, record)) = parse_row(row.as_ref()) {
            if section.insert(device.clone(), record).is_some() {
                tracing::debug!(device = %device, "Duplicate row for device, keeping the last one");
            }
        }
    }
    section
}

/// Parse a single row into a `(device name, record)` pair.
pub fn parse_row<S: AsRef<str>>(fields: &[S]) -> Option<(DeviceName, DeviceRecord)> {
    if fields.len() < 2 {
        tracing::debug!(fields = fields.len(), "Skipping incomplete collector row");
        return None;
    }

    let device = fields[0].as_ref().to_string();
    let payload = fields[1].as_ref();

    let record = if payload == ERROR_MARKER {
        let message = fields
            .get(2)
            .map(|m| m.as_ref().to_string())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        DeviceRecord::error(message)
    } else {
        parse_blob(&device, payload)
    };

    Some((device, record))
}

fn parse_blob(device: &str, blob: &str) -> DeviceRecord {
    let object = match serde_json::from_str::<Value>(blob) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            tracing::warn!(device = %device, "Collector data is not a JSON object");
            return DeviceRecord::error(INVALID_JSON);
        }
        Err(e) => {
            tracing::warn!(device = %device, error = %e, "Collector sent invalid JSON");
            return DeviceRecord::error(INVALID_JSON);
        }
    };

    if let Some(error) = object.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return DeviceRecord::error(message);
    }

    let raw: RawRecord = match serde_json::from_value(Value::Object(object)) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(device = %device, error = %e, "Collector data has unexpected field types");
            return DeviceRecord::error(INVALID_JSON);
        }
    };

    let mut error_counters = ErrorCounters::default();
    for (operation, value) in raw.error_counters.unwrap_or_default() {
        if !value.is_object() {
            tracing::debug!(device = %device, operation = %operation, "Ignoring non-object counter entry");
            continue;
        }
        match serde_json::from_value::<OperationCounters>(value) {
            Ok(counters) => error_counters.insert(operation, counters),
            Err(e) => {
                tracing::warn!(
                    device = %device,
                    operation = %operation,
                    error = %e,
                    "Malformed counter data",
                );
                return DeviceRecord::error(format!("Invalid counter data for {operation}"));
            }
        }
    }

    tracing::debug!(
        device = %device,
        operations = error_counters.len(),
        "Parsed device record",
    );

    DeviceRecord::Data(DataRecord {
        device_path: raw.device.unwrap_or_else(|| device.to_string()),
        protocol: raw.protocol.unwrap_or_else(|| "unknown".to_string()),
        model: raw.model.unwrap_or_default(),
        serial: raw.serial.unwrap_or_default(),
        capacity_bytes: raw.capacity_bytes.unwrap_or_default(),
        error_counters,
    })
}
