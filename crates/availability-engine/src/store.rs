//! Lookup seams for schedules and bookings.
//!
//! Real deployments back these with a database; the in-memory stores here
//! serve tests, the CLI, and anything that already holds the records.

use std::collections::{BTreeMap, HashMap};

use crate::error::{AvailabilityError, Result};
use crate::model::{Appointment, WeeklySchedule};

/// Source of weekly schedules, keyed by user.
pub trait ScheduleStore: Send + Sync {
    /// Fetch the schedule for `user_id`, or `None` if the user has none.
    fn get_schedule(&self, user_id: &str) -> Result<Option<WeeklySchedule>>;
}

/// Source of booked appointments.
pub trait AppointmentStore: Send + Sync {
    /// Fetch `user_id`'s appointments whose `start_time` begins with
    /// `date_prefix` (typically `YYYY-MM-DD`). May be empty.
    fn get_appointments(&self, user_id: &str, date_prefix: &str) -> Result<Vec<Appointment>>;
}

// ── InMemoryScheduleStore ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleStore {
    schedules: HashMap<String, WeeklySchedule>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a schedule, replacing any existing one for the same user.
    pub fn insert(&mut self, schedule: WeeklySchedule) -> Option<WeeklySchedule> {
        self.schedules.insert(schedule.user_id.clone(), schedule)
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

impl FromIterator<WeeklySchedule> for InMemoryScheduleStore {
    fn from_iter<I: IntoIterator<Item = WeeklySchedule>>(iter: I) -> Self {
        let mut store = Self::new();
        for schedule in iter {
            store.insert(schedule);
        }
        store
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn get_schedule(&self, user_id: &str) -> Result<Option<WeeklySchedule>> {
        Ok(self.schedules.get(user_id).cloned())
    }
}

// ── InMemoryAppointmentStore ────────────────────────────────────────────────

/// Appointments keyed by `(user_id, start_time)`, the same identity the
/// booking table uses.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAppointmentStore {
    appointments: BTreeMap<(String, String), Appointment>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an appointment.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvalidInterval`] if the user already has
    /// an appointment starting at the same timestamp.
    pub fn insert(&mut self, appointment: Appointment) -> Result<()> {
        let key = (appointment.user_id.clone(), appointment.start_time.clone());
        if self.appointments.contains_key(&key) {
            return Err(AvailabilityError::InvalidInterval(format!(
                "user '{}' already has an appointment starting at {}",
                key.0, key.1
            )));
        }
        self.appointments.insert(key, appointment);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// Build a store from a list, rejecting duplicate `(user_id, start_time)`.
    pub fn from_appointments(
        appointments: impl IntoIterator<Item = Appointment>,
    ) -> Result<Self> {
        let mut store = Self::new();
        for appointment in appointments {
            store.insert(appointment)?;
        }
        Ok(store)
    }
}

impl AppointmentStore for InMemoryAppointmentStore {
    fn get_appointments(&self, user_id: &str, date_prefix: &str) -> Result<Vec<Appointment>> {
        Ok(self
            .appointments
            .range((user_id.to_string(), date_prefix.to_string())..)
            .take_while(|((user, _), _)| user == user_id)
            .filter(|((_, start), _)| start.starts_with(date_prefix))
            .map(|(_, appointment)| appointment.clone())
            .collect())
    }
}
