//! Dataset loading: reference date → rows → classification → store.
//!
//! Coordinates one load into a [`RecordStore`]:
//!
//! 1. Resolve the dataset's reference date. Unknown datasets fail here,
//!    before a load generation is issued or any row is fetched.
//! 2. Issue a load ticket (this supersedes any load still in flight).
//! 3. Fetch rows from the [`RowSource`].
//! 4. Classify rows into records; unparseable dates are set aside.
//! 5. Commit. A superseded load is discarded and reported as not applied.
//!
//! A fetch failure never commits, so the previous snapshot stays visible.

use anyhow::{Context, Result};
use coverage_lens_core::{classify_rows, RecordStore, Snapshot};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::ingest::{row_source, RowSource};

/// Outcome of a single load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub dataset: String,
    pub generation: u64,
    /// `false` when a newer load superseded this one before it committed.
    pub applied: bool,
    pub rows: usize,
    pub records: usize,
    pub unclassified: usize,
}

pub async fn load_dataset(
    config: &Config,
    store: &RecordStore,
    source: &dyn RowSource,
    dataset: &str,
) -> Result<LoadReport> {
    let reference = config.reference_date(dataset)?;

    let ticket = store.begin_load();
    let generation = ticket.generation();
    info!(dataset, generation, source = %source.describe(), "loading dataset");

    let rows = source
        .fetch_rows(dataset)
        .await
        .with_context(|| format!("Failed to load dataset '{}'", dataset))?;
    let row_count = rows.len();

    let classified = classify_rows(rows, reference);
    let records = classified.records.len();
    let unclassified = classified.unclassified.len();
    if unclassified > 0 {
        warn!(dataset, unclassified, "rows with unresolvable dates were set aside");
    }

    let applied = store.commit(ticket, dataset, reference, classified);
    if !applied {
        info!(dataset, generation, "load superseded by a newer request");
    }

    Ok(LoadReport {
        dataset: dataset.to_string(),
        generation,
        applied,
        rows: row_count,
        records,
        unclassified,
    })
}

/// One-shot load for CLI commands: fetch `dataset` with the configured row
/// source into a fresh store and return its snapshot.
pub async fn load_snapshot(config: &Config, dataset: &str) -> Result<Arc<Snapshot>> {
    let store = RecordStore::new();
    let source = row_source(config)?;
    load_dataset(config, &store, source.as_ref(), dataset).await?;
    store
        .snapshot()
        .with_context(|| format!("Dataset '{}' produced no snapshot", dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coverage_lens_core::{CoreError, Phase, RawRow};
    use std::collections::HashMap;
    use std::time::Duration;

    /// Serves fixed rows per dataset, optionally after a delay.
    struct InMemorySource {
        datasets: HashMap<String, (Vec<RawRow>, Duration)>,
    }

    impl InMemorySource {
        fn new() -> Self {
            Self {
                datasets: HashMap::new(),
            }
        }

        fn with(mut self, dataset: &str, dates: &[&str], delay: Duration) -> Self {
            let rows = dates
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    RawRow::from_pairs(
                        i + 1,
                        [
                            ("Title", "Article"),
                            ("Source", dataset),
                            ("Published Date", *d),
                        ],
                    )
                })
                .collect();
            self.datasets.insert(dataset.to_string(), (rows, delay));
            self
        }
    }

    #[async_trait]
    impl RowSource for InMemorySource {
        fn describe(&self) -> String {
            "memory".to_string()
        }

        async fn fetch_rows(&self, dataset: &str) -> Result<Vec<RawRow>> {
            let (rows, delay) = self
                .datasets
                .get(dataset)
                .with_context(|| format!("no rows for {}", dataset))?;
            tokio::time::sleep(*delay).await;
            Ok(rows.clone())
        }
    }

    fn config() -> Config {
        crate::config::parse_config(
            r#"
[datasets]
"Padmaavat_Cleaned.csv" = "2018-01-25"
"Animal_Cleaned.csv" = "2023-12-01"
"Missing_Cleaned.csv" = "2020-01-01"
"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_classifies_and_commits() {
        let cfg = config();
        let store = RecordStore::new();
        let source = InMemorySource::new().with(
            "Padmaavat_Cleaned.csv",
            &["24-01-2018", "25-01-2018", "26-01-2018", "bad"],
            Duration::ZERO,
        );

        let report = load_dataset(&cfg, &store, &source, "Padmaavat_Cleaned.csv")
            .await
            .unwrap();
        assert!(report.applied);
        assert_eq!(report.generation, 1);
        assert_eq!(report.rows, 4);
        assert_eq!(report.records, 3);
        assert_eq!(report.unclassified, 1);

        let snap = store.snapshot().unwrap();
        let phases: Vec<Phase> = snap.records.iter().map(|r| r.phase).collect();
        assert_eq!(phases, vec![Phase::Pre, Phase::Pre, Phase::Post]);
        assert_eq!(snap.unclassified[0].row, 4);
    }

    #[tokio::test]
    async fn test_unknown_dataset_fails_before_ingestion() {
        let cfg = config();
        let store = RecordStore::new();
        let source = InMemorySource::new();

        let err = load_dataset(&cfg, &store, &source, "Nope.csv")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::UnknownDataset(_))
        ));
        assert_eq!(store.generation(), 0);
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_snapshot() {
        let cfg = config();
        let store = RecordStore::new();
        let source = InMemorySource::new().with(
            "Animal_Cleaned.csv",
            &["01-12-2023"],
            Duration::ZERO,
        );

        load_dataset(&cfg, &store, &source, "Animal_Cleaned.csv")
            .await
            .unwrap();
        let err = load_dataset(&cfg, &store, &source, "Missing_Cleaned.csv").await;
        assert!(err.is_err());

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.dataset, "Animal_Cleaned.csv");
    }

    #[tokio::test]
    async fn test_slow_superseded_load_is_discarded() {
        let cfg = config();
        let store = RecordStore::new();
        let source = InMemorySource::new()
            .with(
                "Padmaavat_Cleaned.csv",
                &["24-01-2018"],
                Duration::from_millis(200),
            )
            .with("Animal_Cleaned.csv", &["01-12-2023"], Duration::ZERO);

        let (slow, fast) = tokio::join!(
            load_dataset(&cfg, &store, &source, "Padmaavat_Cleaned.csv"),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                load_dataset(&cfg, &store, &source, "Animal_Cleaned.csv").await
            }
        );
        let slow = slow.unwrap();
        let fast = fast.unwrap();

        assert_eq!(slow.generation, 1);
        assert!(!slow.applied);
        assert_eq!(fast.generation, 2);
        assert!(fast.applied);
        assert_eq!(store.snapshot().unwrap().dataset, "Animal_Cleaned.csv");
    }
}
