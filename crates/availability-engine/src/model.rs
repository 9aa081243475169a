//! Schedule and booking records consumed by the calculator, and the windows it
//! produces.
//!
//! Field names serialize in camelCase so records round-trip with the JSON the
//! stores and the query boundary exchange (`userId`, `startTime`, `endTime`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Day ─────────────────────────────────────────────────────────────────────

/// A calendar weekday as used for schedule keys.
///
/// Variants are declared Sunday-first so that ordering and [`Day::from_index`]
/// agree with [`DAY_OF_WEEK`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

/// Sunday-indexed weekday table (index 0 = Sunday … 6 = Saturday).
pub const DAY_OF_WEEK: [Day; 7] = [
    Day::Sunday,
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
    Day::Friday,
    Day::Saturday,
];

impl Day {
    /// Look up a day by its Sunday-based index. Indices wrap modulo 7.
    pub fn from_index(index: u32) -> Self {
        DAY_OF_WEEK[(index % 7) as usize]
    }

    /// Converts from chrono's Weekday.
    pub fn from_chrono(weekday: chrono::Weekday) -> Self {
        Self::from_index(weekday.num_days_from_sunday())
    }

    /// The lowercase key used in stored schedules.
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Sunday => "sunday",
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Schedule ────────────────────────────────────────────────────────────────

/// A wall-clock working range within one day, `HH:MM` or `HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time: String,
    pub end_time: String,
}

impl TimeRange {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

/// A user's recurring working hours, keyed by weekday.
///
/// Ranges within a day may be unsorted and may overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySchedule {
    pub user_id: String,
    #[serde(default)]
    pub days: BTreeMap<Day, Vec<TimeRange>>,
}

impl WeeklySchedule {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            days: BTreeMap::new(),
        }
    }

    /// Builder-style helper: append a working range to `day`.
    pub fn with_range(
        mut self,
        day: Day,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        self.days
            .entry(day)
            .or_default()
            .push(TimeRange::new(start_time, end_time));
        self
    }

    /// The working ranges configured for `day`.
    ///
    /// Returns `None` when the day is absent or its set is empty; both mean
    /// the user does not work that day.
    pub fn ranges_for(&self, day: Day) -> Option<&[TimeRange]> {
        self.days
            .get(&day)
            .map(Vec::as_slice)
            .filter(|ranges| !ranges.is_empty())
    }
}

// ── Appointment ─────────────────────────────────────────────────────────────

/// A booked appointment. `start_time`/`end_time` are RFC 3339 timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub start_time: String,
    pub end_time: String,
}

impl Appointment {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

// ── Output ──────────────────────────────────────────────────────────────────

/// A free window, rendered as second-precision RFC 3339 in the requested zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub start_time: String,
    pub end_time: String,
}
