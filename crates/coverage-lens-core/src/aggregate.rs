//! Derived views over a filtered record sequence.
//!
//! Everything here is a pure function of its inputs. The chronological sort
//! is stable: records sharing a published date keep their relative order
//! from the filtered sequence, which keeps divider placement and the
//! time series deterministic.
//!
//! # Outputs
//!
//! | Function | Output |
//! |----------|--------|
//! | [`chronological`] | Records sorted ascending by published date |
//! | [`divider_index`] | Index of the first `Post` record, if any |
//! | [`score_totals`] | `(Σ protest, Σ institution)` |
//! | [`phase_counts`] | Number of `Pre` and `Post` records |
//! | [`time_series`] | Parallel label/score arrays for charting |
//! | [`build_view`] | All of the above for one [`ViewState`] |

use chrono::NaiveDate;
use serde::Serialize;

use crate::classify::UnclassifiedRecord;
use crate::filter::filter_view;
use crate::models::{ArchiveRecord, Phase, ViewState};
use crate::store::Snapshot;

/// Summed scores over a record sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreTotals {
    pub protest: u64,
    pub institution: u64,
}

/// Record counts per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseCounts {
    pub pre: usize,
    pub post: usize,
}

/// Chart-ready series: one entry per record in chronological order.
///
/// Labels are the raw `DD-MM-YYYY` strings, not the canonical date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeSeries<'a> {
    pub labels: Vec<&'a str>,
    pub protest: Vec<u64>,
    pub institution: Vec<u64>,
}

impl TimeSeries<'_> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Everything a presenter needs to render one query over a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveView<'a> {
    pub dataset: &'a str,
    pub reference_date: NaiveDate,
    pub generation: u64,
    pub view: &'a ViewState,
    /// Size of the whole snapshot, before filtering.
    pub total_records: usize,
    /// Rows set aside because their date could not be resolved.
    pub unclassified: usize,
    /// The set-aside rows themselves, with the offending raw date. Not
    /// affected by the view's filters.
    pub unclassified_rows: &'a [UnclassifiedRecord],
    /// Filtered records in chronological order.
    pub records: Vec<&'a ArchiveRecord>,
    pub divider: Option<usize>,
    pub totals: ScoreTotals,
    pub counts: PhaseCounts,
    pub series: TimeSeries<'a>,
}

/// Stable ascending sort by published date.
pub fn chronological<'a>(records: &[&'a ArchiveRecord]) -> Vec<&'a ArchiveRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.published_date);
    sorted
}

/// Position of the release divider: the first `Post` record in a
/// chronologically sorted sequence.
pub fn divider_index(chronological: &[&ArchiveRecord]) -> Option<usize> {
    chronological.iter().position(|r| r.phase == Phase::Post)
}

/// Summed scores. Totals saturate at `u64::MAX` instead of overflowing.
pub fn score_totals<'a, I>(records: I) -> ScoreTotals
where
    I: IntoIterator<Item = &'a ArchiveRecord>,
{
    records
        .into_iter()
        .fold(ScoreTotals::default(), |acc, r| ScoreTotals {
            protest: acc.protest.saturating_add(r.protest_score),
            institution: acc.institution.saturating_add(r.institution_score),
        })
}

pub fn phase_counts<'a, I>(records: I) -> PhaseCounts
where
    I: IntoIterator<Item = &'a ArchiveRecord>,
{
    let mut counts = PhaseCounts::default();
    for r in records {
        match r.phase {
            Phase::Pre => counts.pre += 1,
            Phase::Post => counts.post += 1,
        }
    }
    counts
}

/// Project a chronologically sorted sequence to parallel arrays.
pub fn time_series<'a>(chronological: &[&'a ArchiveRecord]) -> TimeSeries<'a> {
    TimeSeries {
        labels: chronological
            .iter()
            .map(|r| r.published_date_raw.as_str())
            .collect(),
        protest: chronological.iter().map(|r| r.protest_score).collect(),
        institution: chronological.iter().map(|r| r.institution_score).collect(),
    }
}

/// Filter a snapshot with `view` and derive every presenter output.
pub fn build_view<'a>(snapshot: &'a Snapshot, view: &'a ViewState) -> ArchiveView<'a> {
    let filtered = filter_view(snapshot, view);
    let records = chronological(&filtered);

    ArchiveView {
        dataset: &snapshot.dataset,
        reference_date: snapshot.reference_date,
        generation: snapshot.generation,
        view,
        total_records: snapshot.records.len(),
        unclassified: snapshot.unclassified.len(),
        unclassified_rows: &snapshot.unclassified,
        divider: divider_index(&records),
        totals: score_totals(records.iter().copied()),
        counts: phase_counts(records.iter().copied()),
        series: time_series(&records),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_rows, Classified};
    use crate::models::{DisplayMode, PhaseFilter, RawRow};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(title: &str, date: &str, scores: (u64, u64), reference: NaiveDate) -> ArchiveRecord {
        let row = RawRow::from_pairs(
            0,
            [
                ("Title", title),
                ("Source", "Desk"),
                ("Published Date", date),
            ],
        );
        let mut r = classify_rows(vec![row], reference).records.remove(0);
        r.protest_score = scores.0;
        r.institution_score = scores.1;
        r
    }

    fn titles(records: &[&ArchiveRecord]) -> Vec<String> {
        records.iter().map(|r| r.title.clone()).collect()
    }

    fn snapshot(records: Vec<ArchiveRecord>, reference: NaiveDate) -> Snapshot {
        Snapshot::new(
            "Padmaavat_Cleaned.csv",
            reference,
            1,
            Classified {
                records,
                unclassified: Vec::new(),
            },
        )
    }

    #[test]
    fn test_example_scenario() {
        let reference = ymd(2018, 1, 25);
        let r3 = rec("C", "26-01-2018", (0, 0), reference);
        let r1 = rec("A", "24-01-2018", (3, 1), reference);
        let r2 = rec("B", "25-01-2018", (2, 4), reference);
        let input = vec![&r3, &r1, &r2];

        let sorted = chronological(&input);
        assert_eq!(titles(&sorted), vec!["A", "B", "C"]);
        assert_eq!(divider_index(&sorted), Some(2));
        assert_eq!(
            score_totals([&r1, &r2]),
            ScoreTotals {
                protest: 5,
                institution: 5
            }
        );
    }

    #[test]
    fn test_totals_of_empty_is_zero() {
        let empty: Vec<&ArchiveRecord> = Vec::new();
        assert_eq!(score_totals(empty), ScoreTotals::default());
    }

    #[test]
    fn test_totals_saturate_on_huge_scores() {
        let reference = ymd(2018, 1, 25);
        let huge = rec("huge", "24-01-2018", (u64::MAX, 1), reference);
        let small = rec("small", "24-01-2018", (5, 2), reference);
        assert_eq!(
            score_totals([&huge, &small]),
            ScoreTotals {
                protest: u64::MAX,
                institution: 3
            }
        );
    }

    #[test]
    fn test_chronological_is_stable_for_equal_dates() {
        let reference = ymd(2018, 1, 25);
        let a = rec("A", "20-01-2018", (0, 0), reference);
        let b = rec("B", "20-01-2018", (0, 0), reference);
        let early = rec("early", "01-01-2018", (0, 0), reference);
        let c = rec("C", "20-01-2018", (0, 0), reference);

        let sorted = chronological(&[&a, &b, &early, &c]);
        assert_eq!(titles(&sorted), vec!["early", "A", "B", "C"]);

        let sorted = chronological(&[&c, &b, &a]);
        assert_eq!(titles(&sorted), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_chronological_compares_dates_not_raw_strings() {
        let reference = ymd(2018, 1, 25);
        // Lexically "02-02-2018" < "10-01-2018", chronologically it is later.
        let feb = rec("feb", "02-02-2018", (0, 0), reference);
        let jan = rec("jan", "10-01-2018", (0, 0), reference);
        let sorted = chronological(&[&feb, &jan]);
        assert_eq!(titles(&sorted), vec!["jan", "feb"]);
    }

    #[test]
    fn test_divider_absent_without_post() {
        let reference = ymd(2018, 1, 25);
        let a = rec("A", "20-01-2018", (0, 0), reference);
        let b = rec("B", "25-01-2018", (0, 0), reference);
        assert_eq!(divider_index(&chronological(&[&a, &b])), None);
        assert_eq!(divider_index(&[]), None);
    }

    #[test]
    fn test_divider_at_zero_when_all_post() {
        let reference = ymd(2018, 1, 25);
        let a = rec("A", "26-01-2018", (0, 0), reference);
        assert_eq!(divider_index(&[&a]), Some(0));
    }

    #[test]
    fn test_time_series_uses_raw_labels_in_chronological_order() {
        let reference = ymd(2018, 1, 25);
        let late = rec("late", "3-02-2018", (5, 6), reference);
        let early = rec("early", "24-01-2018", (1, 2), reference);
        let sorted = chronological(&[&late, &early]);
        let series = time_series(&sorted);
        assert_eq!(series.labels, vec!["24-01-2018", "3-02-2018"]);
        assert_eq!(series.protest, vec![1, 5]);
        assert_eq!(series.institution, vec![2, 6]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_phase_counts() {
        let reference = ymd(2018, 1, 25);
        let a = rec("A", "24-01-2018", (0, 0), reference);
        let b = rec("B", "25-01-2018", (0, 0), reference);
        let c = rec("C", "26-01-2018", (0, 0), reference);
        assert_eq!(phase_counts([&a, &b, &c]), PhaseCounts { pre: 2, post: 1 });
    }

    #[test]
    fn test_build_view_composes_filter_and_aggregates() {
        let reference = ymd(2018, 1, 25);
        let snap = snapshot(
            vec![
                rec("Protest march", "26-01-2018", (4, 0), reference),
                rec("Trailer launch", "10-01-2018", (0, 3), reference),
                rec("Protest ban upheld", "20-01-2018", (2, 5), reference),
            ],
            reference,
        );

        let all = ViewState::default();
        let view = build_view(&snap, &all);
        assert_eq!(
            titles(&view.records),
            vec!["Trailer launch", "Protest ban upheld", "Protest march"]
        );
        assert_eq!(view.divider, Some(2));
        assert_eq!(view.total_records, 3);
        assert_eq!(view.totals, ScoreTotals { protest: 6, institution: 8 });
        assert_eq!(view.counts, PhaseCounts { pre: 2, post: 1 });
        assert_eq!(view.series.labels, vec!["10-01-2018", "20-01-2018", "26-01-2018"]);

        let pre_protest = ViewState::new(PhaseFilter::Pre, "protest", DisplayMode::Timeline);
        let view = build_view(&snap, &pre_protest);
        assert_eq!(titles(&view.records), vec!["Protest ban upheld"]);
        assert_eq!(view.divider, None);
        assert_eq!(view.totals, ScoreTotals { protest: 2, institution: 5 });
        assert_eq!(view.total_records, 3);
    }

    #[test]
    fn test_view_lists_unclassified_rows() {
        let reference = ymd(2018, 1, 25);
        let rows = vec![
            RawRow::from_pairs(1, [("Title", "Dated"), ("Published Date", "26-01-2018")]),
            RawRow::from_pairs(
                2,
                [
                    ("Title", "Undated"),
                    ("Source", "Wire"),
                    ("Published Date", "Jan 2018"),
                ],
            ),
        ];
        let snap = Snapshot::new("Padmaavat_Cleaned.csv", reference, 1, classify_rows(rows, reference));

        let state = ViewState::new(PhaseFilter::Post, "dated", DisplayMode::Table);
        let view = build_view(&snap, &state);
        assert_eq!(view.unclassified, 1);
        assert_eq!(view.unclassified_rows.len(), 1);
        assert_eq!(view.unclassified_rows[0].title, "Undated");

        let json = serde_json::to_value(&view).unwrap();
        let row = &json["unclassified_rows"][0];
        assert_eq!(row["row"], 2);
        assert_eq!(row["source"], "Wire");
        assert_eq!(row["error"]["raw"], "Jan 2018");
        assert_eq!(row["error"]["row"], 2);
    }

    #[test]
    fn test_archive_view_serializes() {
        let reference = ymd(2018, 1, 25);
        let snap = snapshot(vec![rec("A", "26-01-2018", (1, 2), reference)], reference);
        let state = ViewState::new(PhaseFilter::Post, "", DisplayMode::Table);
        let json = serde_json::to_value(build_view(&snap, &state)).unwrap();
        assert_eq!(json["dataset"], "Padmaavat_Cleaned.csv");
        assert_eq!(json["reference_date"], "2018-01-25");
        assert_eq!(json["view"]["phase"], "post");
        assert_eq!(json["records"][0]["phase"], "post");
        assert_eq!(json["records"][0]["published_date"], "2018-01-26");
        assert_eq!(json["divider"], 0);
        assert_eq!(json["totals"]["institution"], 2);
        assert_eq!(json["series"]["labels"][0], "26-01-2018");
    }
}
