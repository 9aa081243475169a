//! Timezone normalization for availability queries.
//!
//! Turns the query's calendar date, the schedule's wall-clock ranges and the
//! stored appointment timestamps into absolute [`Interval`]s, and renders
//! instants back into a caller's zone. Nothing here reads the system clock or
//! the host locale: the weekday comes from a fixed Sunday-indexed table and
//! every wall-clock value is anchored in an explicit IANA zone.
//!
//! # DST handling
//!
//! Local times are resolved against the zone's rules for that date:
//!
//! - ambiguous (fall-back) times take the **earlier** instant;
//! - nonexistent (spring-forward) times are shifted forward by the gap, i.e.
//!   read with the offset in effect just before the transition, so `02:30`
//!   on a New York spring-forward day becomes `03:30 EDT`.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    SecondsFormat, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{AvailabilityError, Result};
use crate::interval::Interval;
use crate::model::{Appointment, Day, TimeRange};

/// Zone names whose rendering uses the `Z` designator rather than `+00:00`.
const UTC_ZONE_NAMES: &[&str] = &["UTC", "GMT"];

// ── Parsing ─────────────────────────────────────────────────────────────────

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| AvailabilityError::InvalidTimezone(format!("'{}'", s)))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| AvailabilityError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse an RFC 3339 timestamp into a UTC instant.
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AvailabilityError::InvalidInterval(format!("'{}': {}", s, e)))
}

/// A parsed wall-clock time. `24:00` is kept distinct from `00:00` because it
/// refers to the end of the day, not its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WallClock {
    Time(NaiveTime),
    EndOfDay,
}

/// Parse a 24-hour `HH:MM` or `HH:MM:SS` wall-clock time.
fn parse_wall_clock(s: &str) -> Result<WallClock> {
    let s = s.trim();
    if matches!(s, "24:00" | "24:00:00") {
        return Ok(WallClock::EndOfDay);
    }
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map(WallClock::Time)
        .map_err(|_| AvailabilityError::InvalidInterval(format!("invalid time of day '{}'", s)))
}

// ── Local → absolute ────────────────────────────────────────────────────────

/// Resolve a naive local datetime in `tz` to a single instant.
fn resolve_local(tz: &Tz, naive: &NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // Inside a gap: use the offset that applied a day earlier.
            let before = tz
                .offset_from_utc_datetime(&(*naive - Duration::days(1)))
                .fix();
            let utc = *naive - Duration::seconds(i64::from(before.local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Start of `date` in `tz`.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    resolve_local(tz, &date.and_time(NaiveTime::MIN))
}

/// Resolve which schedule day a calendar date falls on.
///
/// The date is taken as the start of that day in `tz`, then mapped through
/// the Sunday-indexed weekday table.
pub fn resolve_day(date: NaiveDate, tz: &Tz) -> Day {
    Day::from_chrono(start_of_day(date, tz).weekday())
}

/// Anchor a wall-clock value to `date` in `tz`.
fn anchor(date: NaiveDate, clock: WallClock, tz: &Tz) -> Result<DateTime<Utc>> {
    let local = match clock {
        WallClock::Time(time) => resolve_local(tz, &date.and_time(time)),
        WallClock::EndOfDay => {
            let next = date.succ_opt().ok_or_else(|| {
                AvailabilityError::InvalidDate(format!("no day after {}", date))
            })?;
            start_of_day(next, tz)
        }
    };
    Ok(local.with_timezone(&Utc))
}

/// Convert one schedule range into an absolute interval on `date`.
///
/// # Errors
///
/// Returns [`AvailabilityError::InvalidInterval`] when either time is
/// malformed or the range ends before it starts.
pub fn anchor_time_range(date: NaiveDate, range: &TimeRange, tz: &Tz) -> Result<Interval> {
    let start = anchor(date, parse_wall_clock(&range.start_time)?, tz)?;
    let end = anchor(date, parse_wall_clock(&range.end_time)?, tz)?;
    Interval::new(start, end).map_err(|_| {
        AvailabilityError::InvalidInterval(format!(
            "working range {}-{} on {} ends before it starts",
            range.start_time, range.end_time, date
        ))
    })
}

/// Convert a stored appointment into an absolute interval.
pub fn appointment_interval(appointment: &Appointment) -> Result<Interval> {
    let in_appointment = |e: AvailabilityError| match e {
        AvailabilityError::InvalidInterval(msg) => AvailabilityError::InvalidInterval(format!(
            "appointment '{}': {}",
            appointment.id, msg
        )),
        other => other,
    };
    let start = parse_rfc3339(&appointment.start_time).map_err(in_appointment)?;
    let end = parse_rfc3339(&appointment.end_time).map_err(in_appointment)?;
    Interval::new(start, end).map_err(in_appointment)
}

// ── Rendering ───────────────────────────────────────────────────────────────

/// Render an instant in `tz` as second-precision RFC 3339.
///
/// Fractional seconds are dropped. Only the fixed zones `UTC` and `GMT` render
/// with `Z`; every IANA zone, including aliases such as `Etc/UTC` and zones
/// currently at offset zero, renders its numeric offset.
pub fn render_instant(instant: &DateTime<Utc>, tz: &Tz) -> String {
    let use_z = UTC_ZONE_NAMES.contains(&tz.name());
    instant
        .with_timezone(tz)
        .to_rfc3339_opts(SecondsFormat::Secs, use_z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tz(name: &str) -> Tz {
        parse_timezone(name).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    // ── parsing ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_timezone_invalid() {
        let err = parse_timezone("Mars/Olympus").unwrap_err().to_string();
        assert!(err.contains("Invalid timezone"), "got: {err}");
    }

    #[test]
    fn test_parse_date_invalid() {
        let err = parse_date("2024-13-40").unwrap_err().to_string();
        assert!(err.contains("Invalid date"), "got: {err}");
        assert!(parse_date("10/03/2024").is_err());
    }

    #[test]
    fn test_parse_wall_clock_forms() {
        assert_eq!(
            parse_wall_clock("09:30").unwrap(),
            WallClock::Time(NaiveTime::from_hms_opt(9, 30, 0).unwrap())
        );
        assert_eq!(
            parse_wall_clock("17:45:15").unwrap(),
            WallClock::Time(NaiveTime::from_hms_opt(17, 45, 15).unwrap())
        );
        assert_eq!(parse_wall_clock("24:00").unwrap(), WallClock::EndOfDay);
        assert!(parse_wall_clock("9am").is_err());
        assert!(parse_wall_clock("25:00").is_err());
    }

    // ── resolve_day ─────────────────────────────────────────────────────

    #[test]
    fn test_resolve_day_sunday_utc() {
        assert_eq!(resolve_day(date("2024-03-10"), &tz("UTC")), Day::Sunday);
    }

    #[test]
    fn test_resolve_day_is_calendar_day_in_zone() {
        // The weekday belongs to the date itself, whichever zone reads it.
        assert_eq!(resolve_day(date("2024-03-11"), &tz("Pacific/Kiritimati")), Day::Monday);
        assert_eq!(resolve_day(date("2024-03-11"), &tz("Pacific/Pago_Pago")), Day::Monday);
    }

    #[test]
    fn test_resolve_day_when_midnight_is_skipped() {
        // Santiago springs forward at 00:00 -> 01:00 on 2024-09-08 (a Sunday).
        assert_eq!(resolve_day(date("2024-09-08"), &tz("America/Santiago")), Day::Sunday);
    }

    // ── anchor_time_range ───────────────────────────────────────────────

    #[test]
    fn test_anchor_in_utc() {
        let range = TimeRange::new("09:00", "12:00");
        let interval = anchor_time_range(date("2024-03-11"), &range, &tz("UTC")).unwrap();
        assert_eq!(interval.start.to_rfc3339(), "2024-03-11T09:00:00+00:00");
        assert_eq!(interval.end.to_rfc3339(), "2024-03-11T12:00:00+00:00");
    }

    #[test]
    fn test_anchor_in_zone_applies_offset() {
        let range = TimeRange::new("09:00", "17:00");
        let interval =
            anchor_time_range(date("2024-07-01"), &range, &tz("America/New_York")).unwrap();
        // July is EDT (UTC-4).
        assert_eq!(interval.start.to_rfc3339(), "2024-07-01T13:00:00+00:00");
        assert_eq!(interval.end.to_rfc3339(), "2024-07-01T21:00:00+00:00");
    }

    #[test]
    fn test_anchor_across_spring_forward_is_shorter() {
        // 2024-03-10: New York clocks jump 02:00 -> 03:00.
        let range = TimeRange::new("00:00", "06:00");
        let interval =
            anchor_time_range(date("2024-03-10"), &range, &tz("America/New_York")).unwrap();
        assert_eq!(interval.duration(), Duration::hours(5));
    }

    #[test]
    fn test_anchor_nonexistent_time_shifts_forward() {
        let range = TimeRange::new("02:30", "04:00");
        let interval =
            anchor_time_range(date("2024-03-10"), &range, &tz("America/New_York")).unwrap();
        // 02:30 EST == 07:30Z == 03:30 EDT
        assert_eq!(interval.start.to_rfc3339(), "2024-03-10T07:30:00+00:00");
        assert_eq!(interval.end.to_rfc3339(), "2024-03-10T08:00:00+00:00");
    }

    #[test]
    fn test_anchor_ambiguous_time_takes_earliest() {
        // 2024-11-03: New York falls back 02:00 -> 01:00, so 01:30 happens twice.
        let range = TimeRange::new("01:30", "03:00");
        let interval =
            anchor_time_range(date("2024-11-03"), &range, &tz("America/New_York")).unwrap();
        // First 01:30 is EDT (UTC-4).
        assert_eq!(interval.start.to_rfc3339(), "2024-11-03T05:30:00+00:00");
        assert_eq!(interval.duration(), Duration::minutes(150));
    }

    #[test]
    fn test_anchor_end_of_day() {
        let range = TimeRange::new("18:00", "24:00");
        let interval = anchor_time_range(date("2024-03-11"), &range, &tz("UTC")).unwrap();
        assert_eq!(interval.end.to_rfc3339(), "2024-03-12T00:00:00+00:00");
    }

    #[test]
    fn test_anchor_inverted_range_rejected() {
        let range = TimeRange::new("17:00", "09:00");
        let err = anchor_time_range(date("2024-03-11"), &range, &tz("UTC")).unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidInterval(_)));
    }

    #[test]
    fn test_anchor_garbage_time_rejected() {
        let range = TimeRange::new("nine", "17:00");
        let err = anchor_time_range(date("2024-03-11"), &range, &tz("UTC")).unwrap_err();
        assert!(err.to_string().contains("nine"), "got: {err}");
    }

    // ── appointment_interval ────────────────────────────────────────────

    #[test]
    fn test_appointment_interval_with_offsets() {
        let appt = Appointment::new(
            "a1",
            "u1",
            "2024-03-11T10:00:00+11:00",
            "2024-03-11T10:30:00+11:00",
        );
        let interval = appointment_interval(&appt).unwrap();
        assert_eq!(interval.start.to_rfc3339(), "2024-03-10T23:00:00+00:00");
        assert_eq!(interval.duration(), Duration::minutes(30));
    }

    #[test]
    fn test_appointment_interval_unparseable() {
        let appt = Appointment::new("a1", "u1", "tomorrow", "2024-03-11T10:30:00Z");
        let err = appointment_interval(&appt).unwrap_err().to_string();
        assert!(err.contains("appointment 'a1'"), "got: {err}");
    }

    #[test]
    fn test_appointment_interval_inverted() {
        let appt = Appointment::new("a2", "u1", "2024-03-11T11:00:00Z", "2024-03-11T10:00:00Z");
        let err = appointment_interval(&appt).unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidInterval(_)));
    }

    // ── render_instant ──────────────────────────────────────────────────

    #[test]
    fn test_render_utc_uses_z() {
        let instant = parse_rfc3339("2024-03-11T09:00:00.750Z").unwrap();
        assert_eq!(render_instant(&instant, &tz("UTC")), "2024-03-11T09:00:00Z");
    }

    #[test]
    fn test_render_gmt_uses_z_but_etc_alias_does_not() {
        let instant = parse_rfc3339("2024-03-11T09:00:00Z").unwrap();
        assert_eq!(render_instant(&instant, &tz("GMT")), "2024-03-11T09:00:00Z");
        assert_eq!(
            render_instant(&instant, &tz("Etc/UTC")),
            "2024-03-11T09:00:00+00:00"
        );
    }

    #[test]
    fn test_render_zero_offset_zone_uses_numeric_offset() {
        let instant = parse_rfc3339("2024-01-15T09:00:00Z").unwrap();
        assert_eq!(
            render_instant(&instant, &tz("Europe/London")),
            "2024-01-15T09:00:00+00:00"
        );
    }

    #[test]
    fn test_render_across_dst() {
        let winter = parse_rfc3339("2024-03-09T15:00:00Z").unwrap();
        let summer = parse_rfc3339("2024-03-11T15:00:00Z").unwrap();
        let ny = tz("America/New_York");
        assert_eq!(render_instant(&winter, &ny), "2024-03-09T10:00:00-05:00");
        assert_eq!(render_instant(&summer, &ny), "2024-03-11T11:00:00-04:00");
    }
}
