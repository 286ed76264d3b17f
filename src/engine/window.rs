//! Lookback windows over a user's measurement timeline
//!
//! Windowed rules (Skip, Only_This) look back a bucketed number of days from
//! today. Any rules read the whole timeline.

use chrono::{Days, NaiveDate};

use crate::domain::EcoMeasurement;

/// Lookback bucket ladder: (upper bound on `time`, offset in days)
const LADDER: [(u32, u32); 4] = [(7, 7), (14, 14), (30, 30), (60, 60)];

/// Lookback length in days for a rule requiring `time` qualifying days.
///
/// Rungs above 60 days fall back to `time` itself, so the offset is never
/// shorter than the requirement and grows monotonically with it.
pub fn lookback_days(time: u32) -> u32 {
    let rung = LADDER
        .iter()
        .find(|(upper, _)| time <= *upper)
        .map(|(_, offset)| *offset)
        .unwrap_or(time);
    rung.max(time)
}

/// The slice of a timeline a windowed rule is evaluated against
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Window<'a> {
    /// At least `time` measurements fall inside the lookback
    Full(&'a [EcoMeasurement]),
    /// Not enough measurements yet; the rule cannot be judged this pass
    NotFull { available: usize, required: u32 },
}

/// Select the lookback window for a windowed rule.
///
/// `timeline` must be sorted ascending by date. Measurements dated on or after
/// `today - lookback_days(time)` are in the window.
pub fn select_window(timeline: &[EcoMeasurement], time: u32, today: NaiveDate) -> Window<'_> {
    let offset = lookback_days(time);
    let cutoff = today
        .checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(NaiveDate::MIN);

    let start = timeline.partition_point(|m| m.date_taken < cutoff);
    let window = &timeline[start..];

    if window.len() >= time as usize {
        Window::Full(window)
    } else {
        Window::NotFull {
            available: window.len(),
            required: time,
        }
    }
}
