//! Timestamp formatting for the callback surface
//!
//! Positions and durations cross the controller boundary as already-formatted
//! `m:ss` strings; the UI never sees raw engine time.

use std::time::Duration;

/// Format a playback position as `m:ss`
///
/// Sub-second precision is floored, so 3.95 seconds reports as "0:03".
pub fn format_timestamp(position: Duration) -> String {
    let total_secs = position.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_formats_as_0_00() {
        assert_eq!(format_timestamp(Duration::ZERO), "0:00");
    }

    #[test]
    fn sub_minute_positions() {
        assert_eq!(format_timestamp(Duration::from_secs(3)), "0:03");
        assert_eq!(format_timestamp(Duration::from_secs(59)), "0:59");
    }

    #[test]
    fn fractional_seconds_floor() {
        assert_eq!(format_timestamp(Duration::from_millis(3950)), "0:03");
        assert_eq!(format_timestamp(Duration::from_millis(5049)), "0:05");
    }

    #[test]
    fn minutes_roll_over() {
        assert_eq!(format_timestamp(Duration::from_secs(60)), "1:00");
        assert_eq!(format_timestamp(Duration::from_secs(65)), "1:05");
        assert_eq!(format_timestamp(Duration::from_secs(754)), "12:34");
    }
}
