//! Half-open instant intervals and set subtraction.
//!
//! Every [`Interval`] is `[start, end)` over UTC instants. All comparisons
//! happen here, in instant space; conversion to a display zone is the
//! caller's job and happens only after subtraction.

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::error::{AvailabilityError, Result};

/// A half-open span `[start, end)` of absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Build an interval, rejecting `start > end`. `start == end` is allowed
    /// and yields an empty interval.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let interval = Self { start, end };
        interval.validate()?;
        Ok(interval)
    }

    /// Check that the interval is not inverted.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(AvailabilityError::InvalidInterval(format!(
                "start {} is after end {}",
                self.start.to_rfc3339(),
                self.end.to_rfc3339()
            )));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// True if the two intervals share at least one instant.
    ///
    /// Intervals that merely touch (`a.end == b.start`) do not overlap, and
    /// an empty interval overlaps nothing.
    pub fn overlaps(&self, other: &Interval) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// True if `other` lies entirely within `self`.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Shrink to whole-second bounds: the start rounds up, the end rounds
    /// down. Returns `None` if nothing of at least one second remains.
    pub fn to_whole_seconds(&self) -> Option<Interval> {
        let start = ceil_to_second(self.start);
        let end = floor_to_second(self.end);
        (start < end).then_some(Interval { start, end })
    }
}

fn floor_to_second(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.with_nanosecond(0).unwrap_or(instant)
}

fn ceil_to_second(instant: DateTime<Utc>) -> DateTime<Utc> {
    let floor = floor_to_second(instant);
    if floor < instant {
        floor + Duration::seconds(1)
    } else {
        floor
    }
}

/// Collapse a set of intervals into a sorted, non-overlapping union.
///
/// Intervals that overlap or touch at the same instant are coalesced; empty
/// intervals are dropped since they cover no instant.
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.iter().filter(|i| !i.is_empty()).copied().collect();
    sorted.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                if interval.end > last.end {
                    last.end = interval.end;
                }
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Subtract a sorted, non-overlapping union (as produced by
/// [`merge_intervals`]) from one interval.
///
/// Fragments come back in chronological order; zero-length fragments are
/// never emitted.
pub fn subtract_union(interval: &Interval, union: &[Interval]) -> Vec<Interval> {
    let mut fragments = Vec::new();
    let mut cursor = interval.start;

    for busy in union {
        if busy.end <= cursor {
            continue;
        }
        if busy.start >= interval.end {
            break;
        }
        if busy.start > cursor {
            fragments.push(Interval {
                start: cursor,
                end: busy.start,
            });
        }
        cursor = cursor.max(busy.end);
        if cursor >= interval.end {
            break;
        }
    }

    if cursor < interval.end {
        fragments.push(Interval {
            start: cursor,
            end: interval.end,
        });
    }
    fragments
}
