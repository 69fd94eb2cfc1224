//! Core data models used throughout Coverage Lens.
//!
//! These types represent the classified coverage records and the per-query
//! view state that flow through the filter and aggregation pipeline.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// One untyped row (`header → cell`) produced by an ingestion source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based data-row number within the source file (header excluded).
    pub row: usize,
    pub fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(row: usize, fields: HashMap<String, String>) -> Self {
        Self { row, fields }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<'a>(row: usize, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            row,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Trimmed cell value; empty cells read as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Column names expected in the input CSV.
pub mod columns {
    pub const TITLE: &str = "Title";
    pub const SOURCE: &str = "Source";
    pub const URL: &str = "URL";
    pub const PUBLISHED_DATE: &str = "Published Date";
    pub const PROTEST_SCORE: &str = "Protest_Score";
    pub const INSTITUTION_SCORE: &str = "Institution_Score";
}

/// Whether an article was published at-or-before (`Pre`) or strictly after
/// (`Post`) the dataset's reference date.
///
/// Serializes lowercase, matching [`PhaseFilter`]; `Display` keeps the
/// capitalized form for text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pre,
    Post,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Pre => f.write_str("Pre"),
            Phase::Post => f.write_str("Post"),
        }
    }
}

/// One classified coverage article.
///
/// `published_date` and `phase` are derived once when the record is built
/// and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveRecord {
    /// 1-based data-row number within the source file.
    pub row: usize,
    pub title: String,
    pub source: String,
    pub url: String,
    /// Date exactly as ingested (`DD-MM-YYYY`), used for display labels.
    pub published_date_raw: String,
    pub published_date: NaiveDate,
    pub protest_score: u64,
    pub institution_score: u64,
    pub phase: Phase,
}

/// Phase selection applied by the filter engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseFilter {
    #[default]
    All,
    Pre,
    Post,
}

impl PhaseFilter {
    pub fn matches(self, phase: Phase) -> bool {
        match self {
            PhaseFilter::All => true,
            PhaseFilter::Pre => phase == Phase::Pre,
            PhaseFilter::Post => phase == Phase::Post,
        }
    }
}

impl FromStr for PhaseFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "" => Ok(PhaseFilter::All),
            "pre" => Ok(PhaseFilter::Pre),
            "post" => Ok(PhaseFilter::Post),
            _ => Err(CoreError::InvalidViewParam {
                param: "phase",
                value: s.to_string(),
            }),
        }
    }
}

/// How the presenter lays out the filtered records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Table,
    Timeline,
}

impl FromStr for DisplayMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" | "" => Ok(DisplayMode::Table),
            "timeline" => Ok(DisplayMode::Timeline),
            _ => Err(CoreError::InvalidViewParam {
                param: "mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Per-query view selections, owned by the caller and passed into every
/// filter/aggregate call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub phase: PhaseFilter,
    pub query: String,
    pub mode: DisplayMode,
}

impl ViewState {
    pub fn new(phase: PhaseFilter, query: impl Into<String>, mode: DisplayMode) -> Self {
        Self {
            phase,
            query: query.into(),
            mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_get_treats_blank_as_absent() {
        let row = RawRow::from_pairs(1, [("Title", "  A  "), ("Source", "   ")]);
        assert_eq!(row.get("Title"), Some("A"));
        assert_eq!(row.get("Source"), None);
        assert_eq!(row.get("URL"), None);
    }

    #[test]
    fn test_phase_filter_parse() {
        assert_eq!("all".parse::<PhaseFilter>().unwrap(), PhaseFilter::All);
        assert_eq!("Pre".parse::<PhaseFilter>().unwrap(), PhaseFilter::Pre);
        assert_eq!("POST".parse::<PhaseFilter>().unwrap(), PhaseFilter::Post);
        assert_eq!("".parse::<PhaseFilter>().unwrap(), PhaseFilter::All);
        assert!("during".parse::<PhaseFilter>().is_err());
    }

    #[test]
    fn test_display_mode_parse() {
        assert_eq!("table".parse::<DisplayMode>().unwrap(), DisplayMode::Table);
        assert_eq!(
            "Timeline".parse::<DisplayMode>().unwrap(),
            DisplayMode::Timeline
        );
        let err = "chart".parse::<DisplayMode>().unwrap_err();
        assert_eq!(err.to_string(), "invalid mode: 'chart'");
    }

    #[test]
    fn test_phase_filter_matches() {
        assert!(PhaseFilter::All.matches(Phase::Pre));
        assert!(PhaseFilter::All.matches(Phase::Post));
        assert!(PhaseFilter::Pre.matches(Phase::Pre));
        assert!(!PhaseFilter::Pre.matches(Phase::Post));
        assert!(!PhaseFilter::Post.matches(Phase::Pre));
    }

    #[test]
    fn test_phase_and_filter_share_json_casing() {
        assert_eq!(serde_json::to_value(Phase::Pre).unwrap(), "pre");
        assert_eq!(serde_json::to_value(Phase::Post).unwrap(), "post");
        assert_eq!(serde_json::to_value(PhaseFilter::Post).unwrap(), "post");
        assert_eq!(Phase::Post.to_string(), "Post");
    }

    #[test]
    fn test_default_view_state() {
        let view = ViewState::default();
        assert_eq!(view.phase, PhaseFilter::All);
        assert!(view.query.is_empty());
        assert_eq!(view.mode, DisplayMode::Table);
    }
}
