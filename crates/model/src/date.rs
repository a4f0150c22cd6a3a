use chrono::NaiveDate;

use crate::errors::RecordError;

/// Parses a record date.
///
/// Slash dates are read as `DD/MM/YYYY` first and retried as `MM/DD/YYYY`
/// when the day/month reading is not a calendar date, so `03/04/2024` is
/// always the 3rd of April. A trailing time (`DD/MM/YYYY HH:mm`) is ignored.
/// The year must have four digits: `03/04/24` is rejected rather than read
/// as year 24.
/// Anything else is read as an ISO date or date-time.
pub fn parse_record_date(value: &str) -> Result<NaiveDate, RecordError> {
    let trimmed = value.trim();
    let date_part = trimmed
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .unwrap_or_default();

    if date_part.contains('/') {
        return parse_slash_date(date_part).ok_or_else(|| RecordError::InvalidDate(value.to_owned()));
    }

    trimmed
        .get(..10)
        .and_then(|iso| NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok())
        .ok_or_else(|| RecordError::InvalidDate(value.to_owned()))
}

fn parse_slash_date(value: &str) -> Option<NaiveDate> {
    let mut parts = value.split('/');
    let first = parts.next()?.trim().parse::<u32>().ok()?;
    let second = parts.next()?.trim().parse::<u32>().ok()?;
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    if parts.next().is_some() || year < 100 {
        return None;
    }

    NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}
