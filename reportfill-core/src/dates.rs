//! Term and week date arithmetic.
//!
//! Week dates are written as the Monday each week commences on.

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;

pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Error)]
pub enum DateError {
    #[error("cannot parse date {text:?} with format {format:?}: {source}")]
    Parse {
        text: String,
        format: String,
        source: chrono::ParseError,
    },
    #[error("invalid date format {0:?}")]
    BadFormat(String),
    #[error("date out of range")]
    OutOfRange,
}

/// Reject strftime patterns chrono cannot render.
pub fn check_format(format: &str) -> Result<(), DateError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(DateError::BadFormat(format.to_owned()));
    }
    Ok(())
}

pub fn parse_date(text: &str, format: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(text.trim(), format).map_err(|source| DateError::Parse {
        text: text.to_owned(),
        format: format.to_owned(),
        source,
    })
}

/// The Monday on or before `date`.
pub fn week_commencing(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

pub fn week_dates(term_start: NaiveDate, weeks: usize) -> Result<Vec<NaiveDate>, DateError> {
    let monday = week_commencing(term_start);
    (0..weeks as u64)
        .map(|week| {
            monday
                .checked_add_days(Days::new(week * 7))
                .ok_or(DateError::OutOfRange)
        })
        .collect()
}

/// Friday of the last week of a term of `weeks` weeks.
pub fn term_end(term_start: NaiveDate, weeks: usize) -> Result<NaiveDate, DateError> {
    let offset = (weeks.max(1) as u64 - 1) * 7 + 4;
    week_commencing(term_start)
        .checked_add_days(Days::new(offset))
        .ok_or(DateError::OutOfRange)
}

pub fn format_dates(dates: &[NaiveDate], format: &str) -> Vec<String> {
    dates.iter().map(|d| d.format(format).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weeks_start_on_the_monday_of_the_start_week() {
        // 2024-01-03 is a Wednesday.
        let dates = week_dates(ymd(2024, 1, 3), 10).unwrap();
        assert_eq!(dates.len(), 10);
        assert_eq!(dates[0], ymd(2024, 1, 1));
        assert_eq!(dates[1], ymd(2024, 1, 8));
        assert_eq!(dates[9], ymd(2024, 3, 4));
    }

    #[test]
    fn monday_is_its_own_week_commencing() {
        assert_eq!(week_commencing(ymd(2024, 1, 8)), ymd(2024, 1, 8));
        assert_eq!(week_commencing(ymd(2024, 1, 14)), ymd(2024, 1, 8));
    }

    #[test]
    fn term_end_is_friday_of_last_week() {
        assert_eq!(term_end(ymd(2024, 1, 3), 10).unwrap(), ymd(2024, 3, 8));
        assert_eq!(term_end(ymd(2024, 1, 1), 1).unwrap(), ymd(2024, 1, 5));
    }

    #[test]
    fn default_format_is_day_first() {
        let d = parse_date(" 05/02/2024 ", DEFAULT_DATE_FORMAT).unwrap();
        assert_eq!(d, ymd(2024, 2, 5));
        assert_eq!(format_dates(&[d], DEFAULT_DATE_FORMAT), ["05/02/2024"]);
        assert!(parse_date("2024-02-05", DEFAULT_DATE_FORMAT).is_err());
    }

    #[test]
    fn broken_format_is_rejected() {
        assert!(check_format("%d/%m/%Y").is_ok());
        assert!(matches!(check_format("%Q"), Err(DateError::BadFormat(_))));
    }
}
