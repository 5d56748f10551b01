//! Human-readable time formatting
//!
//! Answer times are fractional seconds, so the formats keep sub-second
//! precision where it matters.

/// Below this many seconds: `X.XXs`
const SHORT_FORMAT_MAX: f64 = 100.0;
/// Below this many seconds: `M:SS.Xs`, otherwise `H:MM:SS`
const MEDIUM_FORMAT_MAX: f64 = 6000.0;

/// Format seconds for display.
///
/// - `< 100s` → `X.XXs`
/// - `< 100m` → `M:SS.Xs`
/// - otherwise → `H:MM:SS`
///
/// Negative values keep the format of their magnitude with a leading `-`.
/// Non-finite values render as `--`.
///
/// # Examples
///
/// ```
/// use songclash_common::human_time::format_seconds;
///
/// assert_eq!(format_seconds(6.666), "6.67s");
/// assert_eq!(format_seconds(330.0), "5:30.0s");
/// assert_eq!(format_seconds(7200.0), "2:00:00");
/// ```
pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "--".to_string();
    }

    let is_negative = seconds < 0.0;
    let abs_seconds = seconds.abs();

    // Tier is picked after rounding to that tier's precision
    let hundredths = (abs_seconds * 100.0).round() as u64;
    let tenths = (abs_seconds * 10.0).round() as u64;

    let formatted = if hundredths < (SHORT_FORMAT_MAX * 100.0) as u64 {
        format!("{}.{:02}s", hundredths / 100, hundredths % 100)
    } else if tenths < (MEDIUM_FORMAT_MAX * 10.0) as u64 {
        let minutes = tenths / 600;
        let rem = tenths % 600;
        format!("{}:{:02}.{}s", minutes, rem / 10, rem % 10)
    } else {
        let whole = abs_seconds.round() as u64;
        let hours = whole / 3600;
        let mins = (whole % 3600) / 60;
        let secs = whole % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    };

    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Format a signed difference, always carrying a sign (`+1.50s`, `-0.25s`)
pub fn format_delta(seconds: f64) -> String {
    if seconds >= 0.0 {
        format!("+{}", format_seconds(seconds))
    } else {
        format_seconds(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_format() {
        assert_eq!(format_seconds(0.0), "0.00s");
        assert_eq!(format_seconds(4.0), "4.00s");
        assert_eq!(format_seconds(20.0 / 3.0), "6.67s");
        assert_eq!(format_seconds(99.99), "99.99s");
    }

    #[test]
    fn test_medium_format() {
        assert_eq!(format_seconds(100.0), "1:40.0s");
        assert_eq!(format_seconds(125.5), "2:05.5s");
        assert_eq!(format_seconds(5999.0), "99:59.0s");
    }

    #[test]
    fn test_rounding_carries_into_next_field() {
        assert_eq!(format_seconds(99.999), "1:40.0s");
        assert_eq!(format_seconds(119.97), "2:00.0s");
        assert_eq!(format_seconds(59.999), "60.00s");
        assert_eq!(format_seconds(5999.97), "1:40:00");
        assert_eq!(format_seconds(-99.999), "-1:40.0s");
    }

    #[test]
    fn test_long_format() {
        assert_eq!(format_seconds(6000.0), "1:40:00");
        assert_eq!(format_seconds(3661.0 + 3600.0), "2:01:01");
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(format_seconds(-5.0), "-5.00s");
        assert_eq!(format_seconds(-120.0), "-2:00.0s");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_seconds(f64::NAN), "--");
        assert_eq!(format_seconds(f64::INFINITY), "--");
    }

    #[test]
    fn test_delta_sign() {
        assert_eq!(format_delta(1.5), "+1.50s");
        assert_eq!(format_delta(0.0), "+0.00s");
        assert_eq!(format_delta(-0.25), "-0.25s");
    }
}
