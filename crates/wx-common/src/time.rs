//! Forecast time handling.
//!
//! The dashboard collects a calendar date and a free-text UTC time of day.
//! Times are parsed with a fixed `HH:MM` format and combined into a UTC
//! timestamp for patch retrieval.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{WxError, WxResult};

/// Format accepted for the forecast time field.
pub const TIME_FORMAT: &str = "%H:%M";

/// Default forecast time of day shown in the dashboard.
pub const DEFAULT_TIME: &str = "18:00";

/// Default forecast date shown for custom-time forecasts.
pub fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 9, 30).expect("2022-09-30 is a valid date")
}

/// Parse a `HH:MM` time of day.
///
/// Surrounding whitespace is ignored; anything else that does not match the
/// format is an `InvalidTime` error.
pub fn parse_forecast_time(s: &str) -> WxResult<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(|_| WxError::InvalidTime(s.to_string()))
}

/// Combine a date with a `HH:MM` time string into a UTC timestamp.
pub fn forecast_datetime(date: NaiveDate, time: &str) -> WxResult<DateTime<Utc>> {
    let time = parse_forecast_time(time)?;
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}
