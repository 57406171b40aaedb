//! Timestamp construction and cycle labelling.

use anyhow::{Result, anyhow, bail};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// Format of cycle labels used in archive file names and stats paths.
pub const CYCLE_FORMAT: &str = "%Y%m%dT%H%MZ";

/// Builds a timestamp from positional `[year, month, day, hour, minute, second]`
/// fields as they come out of an observation database.
///
/// Fractional parts are truncated. Minute and second are clamped to zero
/// because missing values are reported as negative sentinels.
///
/// Values that are not finite or do not fit the calendar are errors.
pub fn from_fields(fields: [f64; 6]) -> Result<NaiveDateTime> {
    if let Some(bad) = fields.iter().find(|v| !v.is_finite()) {
        bail!("non-finite timestamp field {bad}");
    }
    // saturating float casts, range checked below
    let [year, month, day, hour, minute, second] = fields.map(|v| v.trunc() as i64);
    let minute = minute.max(0);
    let second = second.max(0);

    let date = NaiveDate::from_ymd_opt(i32::try_from(year)?, u32::try_from(month)?, u32::try_from(day)?)
        .ok_or_else(|| anyhow!("invalid date {year}-{month}-{day}"))?;
    date.and_hms_opt(u32::try_from(hour)?, u32::try_from(minute)?, u32::try_from(second)?)
        .ok_or_else(|| anyhow!("invalid time {hour}:{minute}:{second} on {date}"))
}

/// Formats a cycle time as `YYYYMMDDTHHMMZ`.
pub fn cycle_label(cycle: NaiveDateTime) -> String {
    cycle.format(CYCLE_FORMAT).to_string()
}

/// Parses a `YYYYMMDDTHHMMZ` cycle label.
pub fn parse_cycle_label(label: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(label, CYCLE_FORMAT)
        .map_err(|e| anyhow!("invalid cycle label '{label}': {e}"))
}

/// Every cycle from `start` to `end` inclusive, `step_hours` apart.
pub fn cycle_range(start: NaiveDateTime, end: NaiveDateTime, step_hours: i64) -> Vec<NaiveDateTime> {
    if step_hours <= 0 {
        return Vec::new();
    }

    let step = TimeDelta::hours(step_hours);
    let mut cycles = Vec::new();
    let mut cycle = start;
    while cycle <= end {
        cycles.push(cycle);
        cycle += step;
    }
    cycles
}
