//! Assimilation cutoff classifier.
//!
//! Decides whether an observation arrived early enough to be used by the
//! assimilation cycle whose boundary is nearest to its observation time.

use chrono::{NaiveDateTime, SubsecRound, TimeDelta, Timelike};

use crate::error::CutoffError;

/// Result of classifying one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Cycle boundary nearest to the observation time.
    pub window_reference: NaiveDateTime,
    /// Latest receipt time still admitted to the cycle.
    pub deadline: NaiveDateTime,
    pub admitted: bool,
}

/// Converts hours to the seconds expected by [`classify`].
pub fn hours(n: i64) -> i64 {
    n * 60 * 60
}

/// Converts minutes to the seconds expected by [`classify`].
pub fn minutes(n: i64) -> i64 {
    n * 60
}

/// Classifies an observation against the cycle boundary nearest to `ob_time`.
///
/// `cycle_length` and `cut_off` are in seconds. The observation time is
/// snapped to the nearest multiple of `cycle_length` since midnight, rounding
/// half up, so 03:00 with a 6 hour cycle belongs to 06:00. The observation is
/// admitted when `rcpt_time` is at or before that boundary plus `cut_off`.
///
/// Times that would fall outside the representable range saturate at
/// [`NaiveDateTime::MAX`] or [`NaiveDateTime::MIN`]. A deadline beyond the
/// latest representable time admits everything, one before the earliest
/// admits nothing.
///
/// # Errors
///
/// Returns [`CutoffError::InvalidConfiguration`] if `cycle_length <= 0`.
pub fn classify(
    ob_time: NaiveDateTime,
    rcpt_time: NaiveDateTime,
    cycle_length: i64,
    cut_off: i64,
) -> Result<Classification, CutoffError> {
    if cycle_length <= 0 {
        return Err(CutoffError::InvalidConfiguration { cycle_length });
    }

    let seconds = i64::from(ob_time.num_seconds_from_midnight());
    let rounded = (seconds + cycle_length / 2).div_euclid(cycle_length) * cycle_length;

    let window_reference = shifted(ob_time.trunc_subsecs(0), rounded - seconds);
    let (deadline, admitted) = match checked_shift(window_reference, cut_off) {
        Some(deadline) => (deadline, rcpt_time <= deadline),
        None if cut_off >= 0 => (NaiveDateTime::MAX, true),
        None => (NaiveDateTime::MIN, false),
    };

    Ok(Classification {
        window_reference,
        deadline,
        admitted,
    })
}

fn checked_shift(t: NaiveDateTime, seconds: i64) -> Option<NaiveDateTime> {
    TimeDelta::try_seconds(seconds).and_then(|d| t.checked_add_signed(d))
}

fn shifted(t: NaiveDateTime, seconds: i64) -> NaiveDateTime {
    checked_shift(t, seconds).unwrap_or(if seconds >= 0 {
        NaiveDateTime::MAX
    } else {
        NaiveDateTime::MIN
    })
}
