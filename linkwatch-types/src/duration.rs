//! Duration representation for link status payloads.
//!
//! The monitor API reports delays and limits in milliseconds. We keep the
//! raw unit in a signed wrapper so clock-skewed payloads still parse;
//! display formatting clamps negative values to zero.

use std::time::Duration;

/// Duration in milliseconds.
///
/// This wrapper matches the wire unit of the monitor API. The value is
/// signed because upstream monitors compute delays from two clocks and can
/// briefly report a negative delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Milliseconds(pub i64);

impl Milliseconds {
    /// Zero duration.
    pub const ZERO: Self = Self(0);

    /// Create from milliseconds.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Create from seconds.
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * 1000)
    }

    /// Get the value in milliseconds.
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Get the value in whole seconds (truncated toward zero).
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }

    /// Convert to a standard Duration, clamping negatives to zero.
    pub fn to_duration(&self) -> Duration {
        Duration::from_millis(self.0.max(0) as u64)
    }

    /// Format as a compact days/hours/minutes/seconds breakdown.
    ///
    /// Leading zero-valued units are omitted and each unit is floor-divided
    /// from the remainder, so `65_000` renders as `"1m 5s"`. A zero (or
    /// negative) duration renders as `"0s"`.
    pub fn format_compact(&self) -> String {
        let total_secs = self.0.max(0) / 1000;

        let days = total_secs / 86_400;
        let hours = total_secs % 86_400 / 3_600;
        let minutes = total_secs % 3_600 / 60;
        let seconds = total_secs % 60;

        let mut parts = Vec::new();
        for (value, unit) in [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")] {
            if parts.is_empty() && value == 0 && unit != "s" {
                continue;
            }
            parts.push(format!("{value}{unit}"));
        }
        parts.join(" ")
    }
}

impl From<Duration> for Milliseconds {
    fn from(d: Duration) -> Self {
        Self(d.as_millis() as i64)
    }
}

impl std::fmt::Display for Milliseconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        let m = Milliseconds::from_secs(2);
        assert_eq!(m.as_millis(), 2000);
        assert_eq!(m.as_secs(), 2);
        assert_eq!(m.to_duration(), Duration::from_secs(2));

        let m = Milliseconds::from(Duration::from_millis(1500));
        assert_eq!(m.as_millis(), 1500);
        assert_eq!(m.as_secs(), 1);
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        let m = Milliseconds::from_millis(-1500);
        assert_eq!(m.to_duration(), Duration::ZERO);
        assert_eq!(m.format_compact(), "0s");
    }

    #[test]
    fn format_zero() {
        assert_eq!(Milliseconds::ZERO.format_compact(), "0s");
    }

    #[test]
    fn format_seconds_only() {
        assert_eq!(Milliseconds::from_millis(5000).format_compact(), "5s");
        // Sub-second remainders truncate.
        assert_eq!(Milliseconds::from_millis(5999).format_compact(), "5s");
    }

    #[test]
    fn format_minutes_and_seconds() {
        assert_eq!(Milliseconds::from_millis(65_000).format_compact(), "1m 5s");
    }

    #[test]
    fn format_keeps_inner_zero_units() {
        assert_eq!(Milliseconds::from_millis(3_600_000).format_compact(), "1h 0m 0s");
        assert_eq!(
            Milliseconds::from_millis(86_400_000 + 5_000).format_compact(),
            "1d 0h 0m 5s"
        );
    }

    #[test]
    fn format_full_breakdown() {
        // 1 day, 1 hour, 1 minute, 1 second
        let m = Milliseconds::from_millis(90_061_000);
        assert_eq!(m.format_compact(), "1d 1h 1m 1s");
    }

    #[test]
    fn formatted_magnitude_is_monotonic() {
        let samples = [0, 900, 1000, 59_999, 60_000, 61_000, 3_599_000, 3_600_000];
        let mut last_secs = -1;
        for millis in samples {
            let secs = Milliseconds::from_millis(millis).as_secs();
            assert!(secs >= last_secs);
            last_secs = secs;
        }
    }

    #[test]
    fn ordering() {
        assert!(Milliseconds::from_millis(100) < Milliseconds::from_millis(200));
        assert_eq!(Milliseconds::from_millis(100), Milliseconds::from_millis(100));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_transparent() {
        let m = Milliseconds::from_millis(1500);
        assert_eq!(serde_json::to_string(&m).unwrap(), "1500");
        let parsed: Milliseconds = serde_json::from_str("1500").unwrap();
        assert_eq!(parsed, m);
    }
}
