//! Severity levels and the severity gate applied to preferences.
//!
//! Levels form a total order `critical > high > medium > low`. The gate
//! fails open: a missing or unrecognised level on either side never blocks
//! a notification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// A recognised severity level. Ordering follows [`Severity::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Numeric rank, `low = 1` up to `critical = 4`.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Case-insensitive lookup. Blank or unknown input yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            CoreError::Validation(format!(
                "Unknown severity: '{s}'. Valid levels: low, medium, high, critical"
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Decide whether an event of severity `actual` passes a preference whose
/// minimum is `min`.
///
/// Permits when either side is empty or unrecognised; otherwise permits iff
/// `rank(actual) >= rank(min)`.
pub fn should_notify(min: &str, actual: &str) -> bool {
    match (Severity::parse(min), Severity::parse(actual)) {
        (Some(min), Some(actual)) => actual.rank() >= min.rank(),
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [&str; 4] = ["low", "medium", "high", "critical"];

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Severity::parse("HIGH"), Some(Severity::High));
        assert_eq!(Severity::parse(" Critical "), Some(Severity::Critical));
        assert_eq!(Severity::parse("urgent"), None);
        assert_eq!(Severity::parse(""), None);
    }

    #[test]
    fn ranks_follow_total_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::Low.rank(), 1);
        assert_eq!(Severity::Critical.rank(), 4);
    }

    #[test]
    fn empty_or_unknown_side_fails_open() {
        for level in LEVELS {
            assert!(should_notify("", level));
            assert!(should_notify(level, ""));
            assert!(should_notify("bogus", level));
            assert!(should_notify(level, "bogus"));
        }
        assert!(should_notify("", ""));
    }

    #[test]
    fn gate_is_monotonic_in_actual_rank() {
        for (min_idx, min) in LEVELS.iter().enumerate() {
            for (actual_idx, actual) in LEVELS.iter().enumerate() {
                assert_eq!(
                    should_notify(min, actual),
                    actual_idx >= min_idx,
                    "min={min} actual={actual}"
                );
            }
        }
    }

    #[test]
    fn gate_ignores_case() {
        assert!(should_notify("HIGH", "critical"));
        assert!(!should_notify("High", "LOW"));
    }

    #[test]
    fn from_str_rejects_unknown_level() {
        assert!("medium".parse::<Severity>().is_ok());
        let err = "severe".parse::<Severity>().unwrap_err();
        assert!(err.to_string().contains("Unknown severity"));
    }
}
