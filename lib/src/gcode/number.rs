//! Compact number formatting for G-code fields.

/// Format `value` with at most `decimals` decimal places, as short as
/// possible.
///
/// Trailing zeros, a trailing decimal point and a leading `0` before the
/// decimal point are dropped (`0.0100` becomes `.01`). If nothing
/// significant is left the result is `"0"`, also for tiny negative values
/// that would otherwise round to `-0`. Marlin and RepRapFirmware both
/// accept numbers without the leading zero.
pub fn format_smallest(value: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, value);
    let trimmed = if s.contains('.') {
        let t = s.strip_prefix('0').unwrap_or(&s).trim_end_matches('0');
        t.strip_suffix('.').unwrap_or(t)
    } else {
        s.as_str()
    };
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_untouched() {
        assert_eq!(format_smallest(1024.0, 4), "1024");
        assert_eq!(format_smallest(300.0, 4), "300");
        assert_eq!(format_smallest(300.0, 0), "300");
    }

    #[test]
    fn test_trailing_zeros() {
        assert_eq!(format_smallest(12.5, 4), "12.5");
        assert_eq!(format_smallest(12.111111111111, 4), "12.1111");
        assert_eq!(format_smallest(1.499999999999, 4), "1.5");
        assert_eq!(format_smallest(123.12345555555, 4), "123.1235");
    }

    #[test]
    fn test_leading_zero_dropped() {
        assert_eq!(format_smallest(0.01, 4), ".01");
        assert_eq!(format_smallest(0.001, 4), ".001");
        assert_eq!(format_smallest(0.0001, 4), ".0001");
    }

    #[test]
    fn test_vanishing_values() {
        assert_eq!(format_smallest(0.00001, 4), "0");
        assert_eq!(format_smallest(0.00005, 4), ".0001");
        assert_eq!(format_smallest(0.00001, 5), ".00001");
        assert_eq!(format_smallest(0.0, 3), "0");
    }

    #[test]
    fn test_negative() {
        assert_eq!(format_smallest(-2.50, 2), "-2.5");
        assert_eq!(format_smallest(-0.5, 2), "-0.5");
    }

    #[test]
    fn test_negative_zero_is_plain_zero() {
        assert_eq!(format_smallest(-0.00001, 4), "0");
        assert_eq!(format_smallest(-0.0, 3), "0");
        assert_eq!(format_smallest(-0.2, 0), "0");
        assert_eq!(format_smallest(-0.00005, 4), "-0.0001");
    }
}
