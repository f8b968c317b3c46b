//! Device label formatting.

use crate::render::format_bytes;

/// Number of trailing serial characters shown in labels and service names.
pub const SERIAL_SUFFIX_LEN: usize = 8;

/// Last [`SERIAL_SUFFIX_LEN`] characters of a serial number (or all of it).
pub fn serial_suffix(serial: &str) -> &str {
    let count = serial.chars().count();
    if count <= SERIAL_SUFFIX_LEN {
        return serial;
    }
    let skip = count - SERIAL_SUFFIX_LEN;
    let start = serial
        .char_indices()
        .nth(skip)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &serial[start..]
}

/// Build a friendly device label such as
/// `"ST4000NM0023 (3.64 TiB) S/N: 0000W123 (sdc)"`.
///
/// Falls back to `device_path` unchanged when there is nothing to add.
pub fn describe_device(device_path: &str, model: &str, serial: &str, capacity_bytes: u64) -> String {
    let mut parts = Vec::with_capacity(3);

    if !model.is_empty() {
        parts.push(model.to_string());
    }
    if capacity_bytes > 0 {
        parts.push(format!("({})", format_bytes(capacity_bytes as f64)));
    }
    if !serial.is_empty() {
        parts.push(format!("S/N: {}", serial_suffix(serial)));
    }

    if parts.is_empty() {
        return device_path.to_string();
    }

    let basename = device_path.rsplit('/').next().unwrap_or(device_path);
    format!("{} ({basename})", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_parts_present() {
        assert_eq!(
            describe_device("/dev/sda", "X", "1234567890", 1_073_741_824),
            "X (1.00 GiB) S/N: 34567890 (sda)"
        );
    }

    #[test]
    fn short_serial_is_shown_whole() {
        assert_eq!(describe_device("/dev/sdb", "", "ABC", 0), "S/N: ABC (sdb)");
    }

    #[test]
    fn path_without_slash_is_its_own_basename() {
        assert_eq!(describe_device("nvme0", "Model", "", 0), "Model (nvme0)");
    }

    #[test]
    fn nothing_known_returns_path() {
        assert_eq!(describe_device("/dev/sdz", "", "", 0), "/dev/sdz");
    }

    #[test]
    fn serial_suffix_handles_multibyte_characters() {
        assert_eq!(serial_suffix("ÄÖÜ123456789"), "23456789");
        assert_eq!(serial_suffix("ÄÖÜ"), "ÄÖÜ");
    }

    #[test]
    fn description_is_deterministic() {
        let a = describe_device("/dev/sda", "M", "SERIAL0001", 4_000_787_030_016);
        let b = describe_device("/dev/sda", "M", "SERIAL0001", 4_000_787_030_016);
        assert_eq!(a, b);
    }
}
