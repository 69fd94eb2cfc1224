//! Date resolution for published dates and reference dates.
//!
//! Published dates arrive day-first as `DD-MM-YYYY`. Reference dates come
//! from configuration as ISO `YYYY-MM-DD`. Both resolve to a date-only
//! [`NaiveDate`], so comparisons never involve a time of day.
//!
//! Malformed input is rejected with a [`DateParseError`] rather than
//! rolled over into a neighbouring date: `31-02-2018` is an error, not
//! `03-03-2018`.

use chrono::NaiveDate;

use crate::error::DateParseError;

/// Parse a `DD-MM-YYYY` published date.
///
/// The string is split on `-` into exactly three numeric components, read
/// as day, month, year.
pub fn parse_published_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let [day, month, year] = split_numeric(raw)?;
    build_date(raw, year, month, day)
}

/// Parse an ISO `YYYY-MM-DD` reference date.
pub fn parse_reference_date(iso: &str) -> Result<NaiveDate, DateParseError> {
    let [year, month, day] = split_numeric(iso)?;
    build_date(iso, year, month, day)
}

fn split_numeric(raw: &str) -> Result<[u32; 3], DateParseError> {
    let parts: Vec<&str> = raw.trim().split('-').collect();
    if parts.len() != 3 {
        return Err(DateParseError::new(raw));
    }

    let mut out = [0u32; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateParseError::new(raw));
        }
        *slot = part.parse().map_err(|_| DateParseError::new(raw))?;
    }
    Ok(out)
}

fn build_date(raw: &str, year: u32, month: u32, day: u32) -> Result<NaiveDate, DateParseError> {
    let year = i32::try_from(year).map_err(|_| DateParseError::new(raw))?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DateParseError::new(raw))
}
