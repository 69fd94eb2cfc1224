//! Phase and free-text filtering over a record snapshot.
//!
//! Filters never copy or mutate records: they return a new ordered sequence
//! of references into the input. The phase predicate is applied before the
//! search predicate; a record survives only if it passes both.

use crate::models::{ArchiveRecord, PhaseFilter, ViewState};
use crate::store::Snapshot;

/// Filter records by phase, then by a case-insensitive substring match on
/// title or source.
///
/// An empty `query` matches everything. The query is not trimmed.
pub fn filter_records<'a, I>(records: I, phase: PhaseFilter, query: &str) -> Vec<&'a ArchiveRecord>
where
    I: IntoIterator<Item = &'a ArchiveRecord>,
{
    let needle = query.to_lowercase();

    records
        .into_iter()
        .filter(|r| phase.matches(r.phase))
        .filter(|r| needle.is_empty() || matches_text(r, &needle))
        .collect()
}

/// Filter a snapshot's records using the selections in a [`ViewState`].
pub fn filter_view<'a>(snapshot: &'a Snapshot, view: &ViewState) -> Vec<&'a ArchiveRecord> {
    filter_records(&snapshot.records, view.phase, &view.query)
}

fn matches_text(record: &ArchiveRecord, needle: &str) -> bool {
    record.title.to_lowercase().contains(needle) || record.source.to_lowercase().contains(needle)
}
