//! Print Time Estimator
//!
//! Press run time is sections times a fixed per-section duration. Cleaning
//! and changeover cycles between jobs are not included.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintTime {
    pub total_seconds: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl PrintTime {
    pub fn for_sections(sections_needed: u64, seconds_per_section: u64) -> Self {
        Self::from_seconds(sections_needed.saturating_mul(seconds_per_section))
    }

    pub fn from_seconds(total_seconds: u64) -> Self {
        Self {
            total_seconds,
            hours: total_seconds / 3600,
            minutes: (total_seconds % 3600) / 60,
            seconds: total_seconds % 60,
        }
    }
}

impl fmt::Display for PrintTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(f, "{}h {:02}m {:02}s", self.hours, self.minutes, self.seconds)
        } else {
            write!(f, "{}m {:02}s", self.minutes, self.seconds)
        }
    }
}
