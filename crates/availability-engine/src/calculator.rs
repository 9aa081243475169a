//! Free-window computation: working hours minus bookings.
//!
//! Pure and synchronous. The booked set is merged into a sorted union once,
//! then subtracted from each working-hour interval in turn, so a gap closed
//! by one booking can never be reopened by another.

use chrono_tz::Tz;

use crate::error::Result;
use crate::interval::{merge_intervals, subtract_union, Interval};
use crate::model::AvailabilityWindow;
use crate::temporal::render_instant;

/// Subtract every booked interval from every working-hour interval.
///
/// Output follows the input order of `working_hours`; fragments of one
/// working interval are chronological. Overlapping working intervals are
/// processed independently and can yield overlapping fragments.
///
/// Inputs are assumed valid; use [`compute_availability`] to validate first.
pub fn subtract_bookings(working_hours: &[Interval], booked: &[Interval]) -> Vec<Interval> {
    let busy = merge_intervals(booked);
    working_hours
        .iter()
        .flat_map(|interval| subtract_union(interval, &busy))
        .collect()
}

/// Compute free windows and render them in `target_zone`.
///
/// Windows are shrunk to whole seconds before rendering (start up, end down)
/// so a second-precision window never reaches into a booking; a window with
/// less than a second left is dropped.
///
/// # Errors
///
/// Returns [`AvailabilityError::InvalidInterval`](crate::AvailabilityError::InvalidInterval)
/// if any input interval ends before it starts. Nothing is computed in that
/// case.
pub fn compute_availability(
    working_hours: &[Interval],
    booked: &[Interval],
    target_zone: &Tz,
) -> Result<Vec<AvailabilityWindow>> {
    for interval in working_hours.iter().chain(booked) {
        interval.validate()?;
    }

    Ok(subtract_bookings(working_hours, booked)
        .iter()
        .filter_map(Interval::to_whole_seconds)
        .map(|free| render_window(&free, target_zone))
        .collect())
}

/// Render one interval's bounds in `tz`.
pub fn render_window(interval: &Interval, tz: &Tz) -> AvailabilityWindow {
    AvailabilityWindow {
        start_time: render_instant(&interval.start, tz),
        end_time: render_instant(&interval.end, tz),
    }
}
