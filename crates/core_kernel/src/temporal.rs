//! Coverage windows
//!
//! A coverage window is the closed interval `[start, end]` during which a policy's
//! trigger can be satisfied by an observation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidPeriod { start: String, end: String },
}

/// A bounded coverage period with both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct CoverageWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Unchecked wire form, validated through `CoverageWindow::new`
#[derive(Deserialize)]
struct RawWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawWindow> for CoverageWindow {
    type Error = TemporalError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl CoverageWindow {
    /// Creates a new window, requiring `start < end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TemporalError> {
        if start >= end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Creates a window of the given length starting at `start`
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Result<Self, TemporalError> {
        Self::new(start, start + length)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns true if `timestamp` lies in `[start, end]`
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Returns true once the window has ended strictly before `at`
    pub fn has_lapsed(&self, at: DateTime<Utc>) -> bool {
        self.end < at
    }

    /// Returns true if the window opens strictly after `now`
    pub fn starts_after(&self, now: DateTime<Utc>) -> bool {
        self.start > now
    }

    /// Length of the window
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_creation() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

        let window = CoverageWindow::new(start, end).unwrap();
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + Duration::seconds(1)));
        assert_eq!(window.duration(), Duration::days(30));
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(CoverageWindow::new(t, t).is_err());
        assert!(CoverageWindow::new(t, t - Duration::days(1)).is_err());
    }

    #[test]
    fn test_window_lapse() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let window = CoverageWindow::starting_at(start, Duration::days(7)).unwrap();

        assert!(!window.has_lapsed(window.end()));
        assert!(window.has_lapsed(window.end() + Duration::seconds(1)));
    }
}
