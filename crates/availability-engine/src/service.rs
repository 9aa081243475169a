//! Query entry point: look up a user's schedule and bookings for a date and
//! compute the free windows.
//!
//! The flow is schedule lookup, appointment lookup, then
//! [`compute_availability`]. Lookups are independent reads; store errors are
//! returned as-is and nothing is retried here.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calculator::compute_availability;
use crate::error::{AvailabilityError, Result};
use crate::model::{AvailabilityWindow, Day};
use crate::store::{AppointmentStore, ScheduleStore};
use crate::temporal::{
    anchor_time_range, appointment_interval, parse_date, parse_timezone, resolve_day,
};

/// Zone used to anchor schedule times when neither the options nor the
/// query name one.
pub const DEFAULT_SCHEDULE_TIMEZONE: &str = "UTC";

/// Options for [`get_availability_with_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityOptions {
    /// IANA zone in which schedule wall-clock times are interpreted.
    pub schedule_timezone: String,
}

impl Default for AvailabilityOptions {
    fn default() -> Self {
        Self {
            schedule_timezone: DEFAULT_SCHEDULE_TIMEZONE.to_string(),
        }
    }
}

/// A single availability request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub user_id: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// IANA zone for weekday resolution and output rendering.
    #[serde(alias = "tz")]
    pub timezone: String,
    /// Overrides [`AvailabilityOptions::schedule_timezone`] for this query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_timezone: Option<String>,
}

impl AvailabilityQuery {
    pub fn new(
        user_id: impl Into<String>,
        date: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            date: date.into(),
            timezone: timezone.into(),
            schedule_timezone: None,
        }
    }

    pub fn with_schedule_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.schedule_timezone = Some(timezone.into());
        self
    }
}

/// Outcome of a query for one day.
///
/// `Open` with no windows means the day is fully booked; `NotConfigured`
/// means the user does not work that day at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DayAvailability {
    Open {
        day: Day,
        windows: Vec<AvailabilityWindow>,
    },
    NotConfigured {
        day: Day,
    },
}

impl DayAvailability {
    pub fn day(&self) -> Day {
        match self {
            DayAvailability::Open { day, .. } | DayAvailability::NotConfigured { day } => *day,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, DayAvailability::Open { .. })
    }

    /// The free windows, empty for an unconfigured day.
    pub fn windows(&self) -> &[AvailabilityWindow] {
        match self {
            DayAvailability::Open { windows, .. } => windows,
            DayAvailability::NotConfigured { .. } => &[],
        }
    }

    /// The free windows, treating an unconfigured day as an error.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::NoScheduleForDay`] for `NotConfigured`.
    pub fn into_windows(self) -> Result<Vec<AvailabilityWindow>> {
        match self {
            DayAvailability::Open { windows, .. } => Ok(windows),
            DayAvailability::NotConfigured { day } => Err(AvailabilityError::NoScheduleForDay(day)),
        }
    }
}

/// Compute availability with default options.
///
/// # Examples
///
/// ```
/// use availability_engine::{
///     get_availability, AvailabilityQuery, Day, InMemoryAppointmentStore,
///     InMemoryScheduleStore, WeeklySchedule,
/// };
///
/// let schedules: InMemoryScheduleStore =
///     [WeeklySchedule::new("u1").with_range(Day::Monday, "09:00", "12:00")]
///         .into_iter()
///         .collect();
/// let appointments = InMemoryAppointmentStore::new();
///
/// let query = AvailabilityQuery::new("u1", "2024-03-11", "UTC");
/// let result = get_availability(&schedules, &appointments, &query).unwrap();
/// assert_eq!(result.windows()[0].start_time, "2024-03-11T09:00:00Z");
/// ```
pub fn get_availability<S, A>(
    schedules: &S,
    appointments: &A,
    query: &AvailabilityQuery,
) -> Result<DayAvailability>
where
    S: ScheduleStore + ?Sized,
    A: AppointmentStore + ?Sized,
{
    get_availability_with_options(schedules, appointments, query, &AvailabilityOptions::default())
}

/// Compute availability for one user and date.
///
/// # Errors
///
/// - [`AvailabilityError::InvalidDate`] / [`AvailabilityError::InvalidTimezone`]
///   for a malformed query, before any lookup runs.
/// - [`AvailabilityError::NotFound`] if the user has no schedule.
/// - [`AvailabilityError::InvalidInterval`] if a schedule range or stored
///   appointment cannot be turned into a valid interval.
/// - Whatever the stores return for failed lookups.
pub fn get_availability_with_options<S, A>(
    schedules: &S,
    appointments: &A,
    query: &AvailabilityQuery,
    options: &AvailabilityOptions,
) -> Result<DayAvailability>
where
    S: ScheduleStore + ?Sized,
    A: AppointmentStore + ?Sized,
{
    let date = parse_date(&query.date)?;
    let target_zone = parse_timezone(&query.timezone)?;
    let schedule_zone = parse_timezone(
        query
            .schedule_timezone
            .as_deref()
            .unwrap_or(&options.schedule_timezone),
    )?;

    let schedule = schedules
        .get_schedule(&query.user_id)?
        .ok_or_else(|| AvailabilityError::NotFound(query.user_id.clone()))?;
    let booked = appointments.get_appointments(&query.user_id, &query.date)?;

    let day = resolve_day(date, &target_zone);
    debug!(
        user_id = %query.user_id,
        date = %date,
        %day,
        appointments = booked.len(),
        "resolved schedule day"
    );

    let Some(ranges) = schedule.ranges_for(day) else {
        info!(user_id = %query.user_id, %day, "no working hours configured for day");
        return Ok(DayAvailability::NotConfigured { day });
    };

    let working_hours = ranges
        .iter()
        .map(|range| anchor_time_range(date, range, &schedule_zone))
        .collect::<Result<Vec<_>>>()?;
    let booked = booked
        .iter()
        .map(appointment_interval)
        .collect::<Result<Vec<_>>>()?;

    let windows = compute_availability(&working_hours, &booked, &target_zone)?;
    debug!(
        user_id = %query.user_id,
        working_ranges = working_hours.len(),
        windows = windows.len(),
        "computed availability"
    );

    Ok(DayAvailability::Open { day, windows })
}
