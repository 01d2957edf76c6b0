//! `roster` CLI — preview class schedules, re-check them before commit, and
//! list open windows, from JSON snapshots on disk.
//!
//! ## Usage
//!
//! ```sh
//! # Preview a booking request against a committed snapshot (stdin → stdout)
//! roster preview < booking.json
//!
//! # Preview from file to file, with strict availability
//! roster preview -i booking.json -o report.json --strict
//!
//! # Re-check previewed rows against the latest committed snapshot
//! roster recheck -i recheck.json
//!
//! # List open windows for a room on one date
//! roster openings -i snapshot.json --date 2024-03-01 --room r-5
//!
//! # List open windows for a teacher, at least an hour long
//! roster openings -i snapshot.json --date 2024-03-04 --teacher t-1 --min-minutes 60
//! ```

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};

use roster_engine::{
    assemble, recheck, room_openings, teacher_openings, Assignment, AvailabilityPolicy,
    BookingSnapshot, CapacityShortfall, ClassOption, ConflictDetail, OpenWindow, ScheduleRow,
    StaleConflict, TeacherCalendar,
};

#[derive(Parser)]
#[command(
    name = "roster",
    version,
    about = "Class schedule preview and conflict checking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a booking request and annotate every conflict
    Preview {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Treat teachers with no configured hours as unavailable
        #[arg(long)]
        strict: bool,
    },
    /// Re-validate previewed rows against the latest committed snapshot
    Recheck {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List open windows for a room or teacher on one date
    Openings {
        /// Input snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// The date to inspect, e.g. 2024-03-01
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// Room id to inspect (exactly one of --room/--teacher)
        #[arg(long)]
        room: Option<String>,
        /// Teacher id to inspect (exactly one of --room/--teacher)
        #[arg(long)]
        teacher: Option<String>,
        /// Start of the query window
        #[arg(long, value_parser = parse_time, default_value = "08:00")]
        from: NaiveTime,
        /// End of the query window
        #[arg(long, value_parser = parse_time, default_value = "20:00")]
        to: NaiveTime,
        /// Only report windows at least this long
        #[arg(long, default_value_t = 0)]
        min_minutes: i64,
        /// Treat teachers with no configured hours as unavailable
        #[arg(long)]
        strict: bool,
    },
}

/// A booking request: the purchased option, the resource assignment, and the
/// committed state it should be checked against.
#[derive(Deserialize)]
struct PreviewRequest {
    option: ClassOption,
    assignment: Assignment,
    #[serde(default)]
    committed: Vec<ScheduleRow>,
    #[serde(default)]
    teacher_calendar: Option<TeacherCalendar>,
}

#[derive(Serialize)]
struct PreviewReport {
    rows: Vec<ScheduleRow>,
    conflicts: Vec<ConflictDetail>,
    shortfall: Option<CapacityShortfall>,
}

/// Rows to persist plus the snapshots they were previewed against and the
/// freshest committed state.
#[derive(Deserialize)]
struct RecheckRequest {
    rows: Vec<ScheduleRow>,
    #[serde(default)]
    previewed: Vec<ScheduleRow>,
    latest: Vec<ScheduleRow>,
}

#[derive(Serialize)]
struct RecheckReport {
    accepted: Vec<ScheduleRow>,
    stale: Vec<StaleConflict>,
}

#[derive(Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    committed: Vec<ScheduleRow>,
    #[serde(default)]
    teacher_calendar: Option<TeacherCalendar>,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Preview {
            input,
            output,
            strict,
        } => run_preview(input.as_deref(), output.as_deref(), policy(strict)),
        Commands::Recheck { input, output } => run_recheck(input.as_deref(), output.as_deref()),
        Commands::Openings {
            input,
            output,
            date,
            room,
            teacher,
            from,
            to,
            min_minutes,
            strict,
        } => run_openings(
            input.as_deref(),
            output.as_deref(),
            date,
            room,
            teacher,
            from,
            to,
            min_minutes,
            policy(strict),
        ),
    }
}

fn run_preview(input: Option<&str>, output: Option<&str>, policy: AvailabilityPolicy) -> Result<()> {
    let raw = read_input(input)?;
    let request: PreviewRequest =
        serde_json::from_str(&raw).context("Failed to parse booking request JSON")?;

    info!(
        "previewing '{}' for student {} in room {}",
        request.option.class_mode, request.assignment.student_id, request.assignment.room_id
    );

    let snapshot = BookingSnapshot::new(request.committed);
    let calendar = request
        .teacher_calendar
        .unwrap_or_else(|| TeacherCalendar::empty(request.assignment.teacher_id.clone()));

    let schedule = assemble(&request.option, &request.assignment, &snapshot, &calendar, policy)
        .context("Failed to assemble schedule")?;

    debug!(
        "assembled {} rows with {} conflicts",
        schedule.rows.len(),
        schedule.conflicts.len()
    );
    if let Some(shortfall) = &schedule.shortfall {
        warn!(
            "capacity shortfall: {} of {} sessions fit the effective range",
            shortfall.produced, shortfall.requested
        );
    }

    let report = PreviewReport {
        rows: schedule.rows,
        conflicts: schedule.conflicts,
        shortfall: schedule.shortfall,
    };
    write_output(output, &serde_json::to_string_pretty(&report)?)
}

fn run_recheck(input: Option<&str>, output: Option<&str>) -> Result<()> {
    let raw = read_input(input)?;
    let request: RecheckRequest =
        serde_json::from_str(&raw).context("Failed to parse recheck request JSON")?;

    let previewed = BookingSnapshot::new(request.previewed);
    let latest = BookingSnapshot::new(request.latest);

    let mut accepted = Vec::new();
    let mut stale = Vec::new();
    for outcome in recheck(request.rows, &previewed, &latest) {
        match outcome {
            Ok(row) => accepted.push(row),
            Err(conflict) => stale.push(conflict),
        }
    }

    info!(
        "recheck: {} row(s) accepted, {} stale",
        accepted.len(),
        stale.len()
    );

    let report = RecheckReport { accepted, stale };
    write_output(output, &serde_json::to_string_pretty(&report)?)
}

#[allow(clippy::too_many_arguments)]
fn run_openings(
    input: Option<&str>,
    output: Option<&str>,
    date: NaiveDate,
    room: Option<String>,
    teacher: Option<String>,
    from: NaiveTime,
    to: NaiveTime,
    min_minutes: i64,
    policy: AvailabilityPolicy,
) -> Result<()> {
    let raw = read_input(input)?;
    let file: SnapshotFile =
        serde_json::from_str(&raw).context("Failed to parse snapshot JSON")?;
    let snapshot = BookingSnapshot::new(file.committed);

    let mut openings: Vec<OpenWindow> = match (room, teacher) {
        (Some(room_id), None) => room_openings(&snapshot, &room_id, date, from, to),
        (None, Some(teacher_id)) => {
            let calendar = file
                .teacher_calendar
                .filter(|c| c.teacher_id == teacher_id)
                .unwrap_or_else(|| TeacherCalendar::empty(teacher_id));
            teacher_openings(&snapshot, &calendar, date, from, to, policy)
        }
        _ => bail!("pass exactly one of --room or --teacher"),
    };
    openings.retain(|w| w.minutes >= min_minutes);

    write_output(output, &serde_json::to_string_pretty(&openings)?)
}

fn policy(strict: bool) -> AvailabilityPolicy {
    if strict {
        AvailabilityPolicy::Strict
    } else {
        AvailabilityPolicy::Permissive
    }
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{}': {}", s, e))
}

fn parse_time(s: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| format!("invalid time '{}': {}", s, e))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
