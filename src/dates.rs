use time::{format_description::FormatItem, macros::format_description, Date, Duration, OffsetDateTime};

use crate::error::{AppError, AppResult};

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

// JSON (de)serialization of dates as "YYYY-MM-DD".
time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// The only place the clock is read. Handlers pass the result down.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn parse_date(s: &str) -> AppResult<Date> {
    Date::parse(s.trim(), ISO_DATE)
        .map_err(|_| AppError::invalid(format!("invalid date '{s}', expected YYYY-MM-DD")))
}

pub fn format_date(d: Date) -> String {
    d.format(ISO_DATE).unwrap_or_else(|_| d.to_string())
}

/// Monday on or before `date`.
pub fn week_start(date: Date) -> AppResult<Date> {
    let back = i64::from(date.weekday().number_days_from_monday());
    add_days(date, -back)
}

pub fn add_days(date: Date, days: i64) -> AppResult<Date> {
    date.checked_add(Duration::days(days))
        .ok_or_else(|| AppError::invalid("date out of range"))
}
