//! Human-readable value formatting for result messages.

const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

/// Format a byte count with binary (IEC) units.
///
/// Whole bytes below 1 KiB, two decimals above; the unit grows with the
/// value so the output is monotonic.
pub fn format_bytes(bytes: f64) -> String {
    const STEP: f64 = 1024.0;

    if bytes < STEP {
        return format!("{} B", bytes.max(0.0).round() as u64);
    }

    let mut value = bytes / STEP;
    let mut unit = 0;
    while value >= STEP && unit < UNITS.len() - 1 {
        value /= STEP;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Format a level pair as shown after a non-OK counter.
pub fn format_levels<T: std::fmt::Display>(warn: T, crit: T) -> String {
    format!("(warn/crit at {warn}/{crit})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0.0), "0 B");
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(1024.0), "1.00 KiB");
        assert_eq!(format_bytes(1_048_576.0), "1.00 MiB");
        assert_eq!(format_bytes(1_073_741_824.0), "1.00 GiB");
        assert_eq!(format_bytes(1_099_511_627_776.0), "1.00 TiB");
        assert_eq!(format_bytes(1_000_000_000_000.0), "931.32 GiB");
    }

    #[test]
    fn huge_values_stay_in_the_largest_unit() {
        assert_eq!(format_bytes(1024f64.powi(6)), "1024.00 PiB");
    }

    #[test]
    fn levels_text() {
        assert_eq!(format_levels(1, 5), "(warn/crit at 1/5)");
    }
}
