//! Calendar dates as printed by the simulator and climate records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Day/month/year of a storm event
///
/// Years are simulation years as written in the logs, not calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl EventDate {
    #[must_use]
    pub const fn new(day: u32, month: u32, year: i32) -> Self {
        Self { year, month, day }
    }
}

/// Formats as `M/D/Y`, the form used in `selected_dates`
impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.month, self.day, self.year)
    }
}
