//! Recurrence expansion — turns a class option's recurrence into dated
//! candidate slots.
//!
//! Weekly (`fixed`) classes are expanded through the `rrule` crate by
//! assembling an RFC 5545 rule text; `camp` and `check` date lists are
//! validated and ordered directly. Expansion is deterministic and
//! side-effect-free: identical input always yields the identical ordered
//! sequence.

use chrono::{NaiveDate, NaiveTime, Weekday};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// The date range a recurrence may produce sessions in. `end: None` leaves
/// the option open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateScope {
    pub start: NaiveDate,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

/// How a class option turns into concrete session dates.
///
/// Adding a mode means teaching the expander and the conflict pipeline about
/// it together; exhaustive matches enforce that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Recurrence {
    /// Weekly on a fixed set of weekdays until the class limit is reached.
    Fixed {
        weekdays: Vec<Weekday>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
    /// An explicit, caller-supplied list of dates sharing one time window,
    /// e.g. a holiday intensive.
    Camp {
        dates: Vec<NaiveDate>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
    /// Ad-hoc single sessions booked one date at a time against a shared
    /// time window.
    Check {
        dates: Vec<NaiveDate>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
}

/// A purchasable class definition. Never mutated once a schedule references
/// it — fee or limit changes are modeled as a superseding option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassOption {
    /// Display label for the mode, e.g. "Twice weekly".
    pub class_mode: String,
    /// Total sessions a `fixed` run may produce.
    pub class_limit: u32,
    pub tuition_fee: String,
    pub effective_start: NaiveDate,
    #[serde(default)]
    pub effective_end: Option<NaiveDate>,
    pub recurrence: Recurrence,
}

impl ClassOption {
    /// The effective range sessions must fall into.
    pub fn scope(&self) -> DateScope {
        DateScope {
            start: self.effective_start,
            end: self.effective_end,
        }
    }
}

/// One dated slot produced by expansion. A pure value with no identity;
/// resources are attached later by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// A weekly class ran out of calendar before reaching its session count.
/// Whether a partial schedule is acceptable is the caller's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityShortfall {
    pub requested: u32,
    pub produced: u32,
}

/// Expansion result: slots in ascending date order, plus the shortfall
/// marker when a `fixed` run was cut off by its effective end date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    pub slots: Vec<CandidateSlot>,
    #[serde(default)]
    pub shortfall: Option<CapacityShortfall>,
}

/// Expand a recurrence into candidate slots within `scope`.
///
/// - `Fixed` recurs weekly on the weekday set from `scope.start`, stopping at
///   `class_limit` slots or `scope.end`, whichever comes first. Falling short
///   of the limit is reported via [`Expansion::shortfall`], not an error.
/// - `Camp` dates are sorted and de-duplicated; dates outside the scope are
///   a [`ValidationError::DateOutOfRange`], never silently dropped.
/// - `Check` emits one slot per supplied date, sorted, duplicates kept —
///   two ad-hoc bookings on the same date are distinct sessions and the
///   sibling conflict pass will surface their collision.
pub fn expand(recurrence: &Recurrence, scope: &DateScope, class_limit: u32) -> Result<Expansion> {
    if class_limit == 0 {
        return Err(ValidationError::ZeroClassLimit);
    }
    if let Some(end) = scope.end {
        if end < scope.start {
            return Err(ValidationError::InvertedScope {
                start: scope.start,
                end,
            });
        }
    }

    match recurrence {
        Recurrence::Fixed {
            weekdays,
            start_time,
            end_time,
        } => expand_fixed(weekdays, *start_time, *end_time, scope, class_limit),
        Recurrence::Camp {
            dates,
            start_time,
            end_time,
        } => expand_camp(dates, *start_time, *end_time, scope),
        Recurrence::Check {
            dates,
            start_time,
            end_time,
        } => expand_check(dates, *start_time, *end_time, scope),
    }
}

/// Expand a whole class option (recurrence + effective range + limit).
pub fn expand_option(option: &ClassOption) -> Result<Expansion> {
    expand(&option.recurrence, &option.scope(), option.class_limit)
}

fn expand_fixed(
    weekdays: &[Weekday],
    start_time: NaiveTime,
    end_time: NaiveTime,
    scope: &DateScope,
    class_limit: u32,
) -> Result<Expansion> {
    check_window(start_time, end_time)?;
    if weekdays.is_empty() {
        return Err(ValidationError::NoWeekdays);
    }

    let mut days: Vec<Weekday> = weekdays.to_vec();
    days.sort_by_key(|d| d.num_days_from_monday());
    days.dedup();
    let byday: Vec<&str> = days.iter().map(byday_code).collect();

    // RFC 5545 forbids combining COUNT with UNTIL, so the rule carries only
    // COUNT and the effective end date is applied as a post-filter below.
    // Dates are wall-clock; pinning the rule to UTC keeps the arithmetic
    // offset-free.
    let rrule_text = format!(
        "DTSTART;TZID=UTC:{}T{}\nRRULE:FREQ=WEEKLY;BYDAY={};COUNT={}",
        scope.start.format("%Y%m%d"),
        start_time.format("%H%M%S"),
        byday.join(","),
        class_limit
    );

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| ValidationError::Expansion(format!("{}", e)))?;

    let cap = u16::try_from(class_limit).unwrap_or(u16::MAX);
    let instances = rrule_set.all(cap);

    let slots: Vec<CandidateSlot> = instances
        .dates
        .into_iter()
        .map(|dt| dt.date_naive())
        .filter(|date| scope.end.is_none_or(|end| *date <= end))
        .map(|date| CandidateSlot {
            date,
            start_time,
            end_time,
        })
        .collect();

    let shortfall = (slots.len() < class_limit as usize).then(|| CapacityShortfall {
        requested: class_limit,
        produced: slots.len() as u32,
    });

    Ok(Expansion { slots, shortfall })
}

fn expand_camp(
    dates: &[NaiveDate],
    start_time: NaiveTime,
    end_time: NaiveTime,
    scope: &DateScope,
) -> Result<Expansion> {
    check_window(start_time, end_time)?;
    if dates.is_empty() {
        return Err(ValidationError::NoDates);
    }

    let mut sorted = dates.to_vec();
    sorted.sort();
    sorted.dedup();
    for &date in &sorted {
        check_in_scope(date, scope)?;
    }

    Ok(Expansion {
        slots: sorted
            .into_iter()
            .map(|date| CandidateSlot {
                date,
                start_time,
                end_time,
            })
            .collect(),
        shortfall: None,
    })
}

fn expand_check(
    dates: &[NaiveDate],
    start_time: NaiveTime,
    end_time: NaiveTime,
    scope: &DateScope,
) -> Result<Expansion> {
    check_window(start_time, end_time)?;
    if dates.is_empty() {
        return Err(ValidationError::NoDates);
    }

    // One slot per supplied entry; duplicates stay so the sibling conflict
    // pass can report them.
    let mut sorted = dates.to_vec();
    sorted.sort();
    for &date in &sorted {
        check_in_scope(date, scope)?;
    }

    Ok(Expansion {
        slots: sorted
            .into_iter()
            .map(|date| CandidateSlot {
                date,
                start_time,
                end_time,
            })
            .collect(),
        shortfall: None,
    })
}

fn check_window(start: NaiveTime, end: NaiveTime) -> Result<()> {
    if start >= end {
        return Err(ValidationError::EmptyTimeWindow { start, end });
    }
    Ok(())
}

fn check_in_scope(date: NaiveDate, scope: &DateScope) -> Result<()> {
    let past_end = scope.end.is_some_and(|end| date > end);
    if date < scope.start || past_end {
        return Err(ValidationError::DateOutOfRange {
            date,
            scope_start: scope.start,
            scope_end: scope.end,
        });
    }
    Ok(())
}

fn byday_code(day: &Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
