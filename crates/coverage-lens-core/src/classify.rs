//! Pre/Post classification and record building.
//!
//! [`classify`] is the single comparison rule: a record published on or
//! before the reference date is `Pre`, anything later is `Post`. Coverage
//! published on release day counts as anticipatory.
//!
//! [`classify_rows`] turns ingested rows into [`ArchiveRecord`]s. Rows whose
//! published date cannot be resolved are never given a phase; they are set
//! aside as [`UnclassifiedRecord`]s.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::date::parse_published_date;
use crate::error::DateParseError;
use crate::models::{columns, ArchiveRecord, Phase, RawRow};

/// Assign a phase to a published date relative to the reference date.
pub fn classify(published: NaiveDate, reference: NaiveDate) -> Phase {
    if published <= reference {
        Phase::Pre
    } else {
        Phase::Post
    }
}

/// A row that could not be classified because its date is unresolvable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnclassifiedRecord {
    pub row: usize,
    pub title: String,
    pub source: String,
    pub error: DateParseError,
}

/// Output of [`classify_rows`].
#[derive(Debug, Clone, Default)]
pub struct Classified {
    /// Classified records, in input order.
    pub records: Vec<ArchiveRecord>,
    pub unclassified: Vec<UnclassifiedRecord>,
}

/// Build classified records from ingested rows.
///
/// Rows without a `Title` are skipped. Scores that are missing or not
/// numeric read as 0.
pub fn classify_rows<I>(rows: I, reference: NaiveDate) -> Classified
where
    I: IntoIterator<Item = RawRow>,
{
    let mut out = Classified::default();

    for row in rows {
        let Some(title) = row.get(columns::TITLE) else {
            debug!(row = row.row, "skipping row without title");
            continue;
        };
        let title = title.to_string();
        let source = row.get(columns::SOURCE).unwrap_or_default().to_string();
        let raw_date = row.get(columns::PUBLISHED_DATE).unwrap_or_default();

        let published_date = match parse_published_date(raw_date) {
            Ok(d) => d,
            Err(e) => {
                let error = e.at_row(row.row);
                warn!(row = row.row, title = %title, "{}", error);
                out.unclassified.push(UnclassifiedRecord {
                    row: row.row,
                    title,
                    source,
                    error,
                });
                continue;
            }
        };

        out.records.push(ArchiveRecord {
            row: row.row,
            url: row.get(columns::URL).unwrap_or_default().to_string(),
            published_date_raw: raw_date.to_string(),
            published_date,
            protest_score: coerce_score(row.get(columns::PROTEST_SCORE)),
            institution_score: coerce_score(row.get(columns::INSTITUTION_SCORE)),
            phase: classify(published_date, reference),
            title,
            source,
        });
    }

    out
}

/// Read a score cell as a non-negative integer.
///
/// Floats (`"4.0"`, `"4.9"`) truncate. Negatives, blanks, anything
/// non-numeric, and floats beyond the `u64` range (`"1e30"`) become 0.
pub fn coerce_score(raw: Option<&str>) -> u64 {
    let Some(s) = raw.map(str::trim) else {
        return 0;
    };
    if let Ok(v) = s.parse::<u64>() {
        return v;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v < u64::MAX as f64 => v.trunc() as u64,
        _ => 0,
    }
}
