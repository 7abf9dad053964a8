//! Temporal normalization
//!
//! Rewrites `YYYY-MM-DD` tokens into the decimal string of their epoch
//! millisecond value at UTC midnight, so the byte scan and the analysis
//! module only ever see numbers.
//!
//! Digits and word boundaries are ASCII only. Only the shape is checked:
//! a token such as `2023-13-40` is still rewritten, with out-of-range
//! months and days rolling over into the following month or year.

use std::borrow::Cow;

use chrono::{Days, Months, NaiveDate};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref DATE_TOKEN: Regex =
        Regex::new(r"(?-u:\b)([0-9]{4})-([0-9]{2})-([0-9]{2})(?-u:\b)").unwrap();
}

/// Replace every date-shaped token with its epoch milliseconds
///
/// Returns the input unchanged (borrowed) when it holds no date tokens,
/// which makes the pass idempotent.
pub fn normalize_dates(text: &str) -> Cow<'_, str> {
    DATE_TOKEN.replace_all(text, |caps: &Captures| {
        let year = caps[1].parse::<i32>().ok();
        let month = caps[2].parse::<u32>().ok();
        let day = caps[3].parse::<u32>().ok();

        match (year, month, day) {
            (Some(y), Some(m), Some(d)) => match epoch_millis(y, m, d) {
                Some(ms) => ms.to_string(),
                None => caps[0].to_string(),
            },
            _ => caps[0].to_string(),
        }
    })
}

/// Check whether any date-shaped token remains
pub fn has_date_tokens(text: &str) -> bool {
    DATE_TOKEN.is_match(text)
}

/// Epoch milliseconds of a calendar date at UTC midnight
///
/// Month and day are applied as offsets from January 1st, so month `0`
/// lands in December of the previous year and day `0` on the last day of
/// the previous month.
pub fn epoch_millis(year: i32, month: u32, day: u32) -> Option<i64> {
    let base = NaiveDate::from_ymd_opt(year, 1, 1)?;

    let month_start = if month == 0 {
        base.checked_sub_months(Months::new(1))?
    } else {
        base.checked_add_months(Months::new(month - 1))?
    };

    let date = if day == 0 {
        month_start.pred_opt()?
    } else {
        month_start.checked_add_days(Days::new(u64::from(day - 1)))?
    };

    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}
