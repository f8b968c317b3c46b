/// Device names are the collector's first field, e.g. `/dev/sda`.
pub type DeviceName = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Bytes in one "gigabyte" as reported by the collector (binary).
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Gigabytes in one terabyte, for per-TB rates.
pub const GB_PER_TB: f64 = 1024.0;
