use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use availability_engine::{
    get_availability_with_options, Appointment, AvailabilityOptions, AvailabilityQuery,
    InMemoryAppointmentStore, InMemoryScheduleStore, WeeklySchedule,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Compute free appointment windows for a user on a given date
#[derive(Parser, Debug)]
#[command(name = "availability", version, about)]
struct Cli {
    /// Schedule JSON file: one schedule object or an array of them
    #[arg(long)]
    schedule: PathBuf,

    /// Appointments JSON file: an array of appointments
    #[arg(long)]
    appointments: Option<PathBuf>,

    /// User whose availability to compute
    #[arg(long)]
    user: String,

    /// Calendar date (YYYY-MM-DD)
    #[arg(long)]
    date: String,

    /// IANA timezone for the weekday and the output
    #[arg(long, default_value = "UTC")]
    tz: String,

    /// IANA timezone in which schedule times are interpreted
    #[arg(long)]
    schedule_tz: Option<String>,

    /// Fail when the user has no working hours on that day
    #[arg(long)]
    strict: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Log lookups and computation to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_schedules(path: &Path) -> Result<InMemoryScheduleStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schedule file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let parsed: serde_json::Result<Vec<WeeklySchedule>> = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|s| vec![s])
    };
    let schedules = parsed.with_context(|| format!("Invalid schedule in {}", path.display()))?;
    Ok(schedules.into_iter().collect())
}

fn read_appointments(path: Option<&Path>) -> Result<InMemoryAppointmentStore> {
    let Some(path) = path else {
        return Ok(InMemoryAppointmentStore::new());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read appointments file: {}", path.display()))?;
    let appointments: Vec<Appointment> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid appointments in {}", path.display()))?;
    Ok(InMemoryAppointmentStore::from_appointments(appointments)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let schedules = read_schedules(&cli.schedule)?;
    let appointments = read_appointments(cli.appointments.as_deref())?;
    tracing::debug!(
        schedules = schedules.len(),
        appointments = appointments.len(),
        "loaded stores"
    );

    let mut query = AvailabilityQuery::new(&cli.user, &cli.date, &cli.tz);
    if let Some(zone) = &cli.schedule_tz {
        query = query.with_schedule_timezone(zone);
    }

    let outcome = get_availability_with_options(
        &schedules,
        &appointments,
        &query,
        &AvailabilityOptions::default(),
    )?;

    let windows = if cli.strict {
        outcome.into_windows()?
    } else {
        if !outcome.is_configured() {
            tracing::warn!(day = %outcome.day(), "no working hours configured for day");
        }
        outcome.windows().to_vec()
    };

    let output = if cli.pretty {
        serde_json::to_string_pretty(&windows)?
    } else {
        serde_json::to_string(&windows)?
    };
    println!("{output}");
    Ok(())
}
