//! Turning a user-supplied day of month into a calendar date.
//!
//! Providers only publish schedules a few days ahead, so a bare day number is
//! enough to pick a date: it is either in the current month or, if it is
//! smaller than today's day, in the next one.
//!
//! Known limitation: the look-ahead check compares day-of-month numbers only.
//! With a window longer than the shortest month a day number can match a date
//! in a different month than the one it resolves to.

use crate::error::{Result, ShowtimeError};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of days, starting today, for which a provider publishes schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub available_days: u32,
}

impl DateWindow {
    pub const DEFAULT_AVAILABLE_DAYS: u32 = 6;

    pub fn new(available_days: u32) -> Self {
        Self { available_days }
    }

    /// Two-digit day-of-month strings for `today + k`, `k` in `0..available_days`
    pub fn reachable_days(&self, today: NaiveDate) -> Vec<String> {
        today
            .iter_days()
            .take(self.available_days as usize)
            .map(|d| format!("{:02}", d.day()))
            .collect()
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_AVAILABLE_DAYS)
    }
}

/// Reject day numbers that cannot be a day of any month.
///
/// This check does not depend on a provider's window, so a failure here
/// fails a request outright.
pub fn check_day(day_of_month: i32) -> Result<u32> {
    if !(1..=31).contains(&day_of_month) {
        return Err(ShowtimeError::validation("invalid date"));
    }
    Ok(day_of_month as u32)
}

/// Resolve `day_of_month` against `today`.
///
/// - `None` means "today"
/// - the day must be in `1..=31` and inside the window
/// - a day smaller than today's rolls over into the next month
pub fn resolve(day_of_month: Option<i32>, today: NaiveDate, window: DateWindow) -> Result<NaiveDate> {
    let Some(day) = day_of_month else {
        return Ok(today);
    };

    let day = check_day(day)?;

    let requested = format!("{:02}", day);
    if !window.reachable_days(today).contains(&requested) {
        return Err(ShowtimeError::validation("date not available"));
    }

    let first_of_month = today.with_day(1).unwrap_or(today);
    let month = if today.day() > day {
        first_of_month
            .checked_add_months(Months::new(1))
            .ok_or_else(|| ShowtimeError::validation("date not available"))?
    } else {
        first_of_month
    };

    month
        .with_day(day)
        .ok_or_else(|| ShowtimeError::validation("date not available"))
}
