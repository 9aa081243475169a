//! # availability-engine
//!
//! Deterministic appointment availability.
//!
//! Given a user's recurring weekly working hours and the appointments already
//! booked on a date, computes the free windows for that date and renders them
//! in the caller's timezone. All interval arithmetic happens on absolute
//! instants; zones only matter when wall-clock schedule times are anchored and
//! when results are rendered.
//!
//! ## Modules
//!
//! - [`model`] — Schedules, appointments, output windows, the weekday table
//! - [`interval`] — Half-open instant intervals, union and subtraction
//! - [`temporal`] — Date/zone parsing, weekday resolution, anchoring, rendering
//! - [`calculator`] — Working hours minus bookings
//! - [`store`] — Lookup traits and in-memory stores
//! - [`service`] — Query entry point tying lookups to the calculator
//! - [`error`] — Error types

pub mod calculator;
pub mod error;
pub mod interval;
pub mod model;
pub mod service;
pub mod store;
pub mod temporal;

pub use calculator::{compute_availability, subtract_bookings};
pub use error::{AvailabilityError, Result};
pub use interval::Interval;
pub use model::{Appointment, AvailabilityWindow, Day, TimeRange, WeeklySchedule, DAY_OF_WEEK};
pub use service::{
    get_availability, get_availability_with_options, AvailabilityOptions, AvailabilityQuery,
    DayAvailability,
};
pub use store::{AppointmentStore, InMemoryAppointmentStore, InMemoryScheduleStore, ScheduleStore};
pub use temporal::{anchor_time_range, appointment_interval, resolve_day};
