//! Row ingestion: fetch a dataset's CSV and hand untyped rows to the core.
//!
//! A [`RowSource`] turns a dataset identifier into a list of [`RawRow`]s.
//! Two sources are built in:
//!
//! | Source | Data root | Fetch |
//! |--------|-----------|-------|
//! | [`FileRowSource`] | local directory | `<root>/<dataset>` read on a blocking thread |
//! | [`HttpRowSource`] | `http(s)://` base URL | `GET <root>/<dataset>` |
//!
//! Both share [`parse_csv`]: header row required, cells trimmed, empty
//! lines skipped, ragged rows tolerated, and rows without a `Title`
//! dropped before they reach the core.

use anyhow::{Context, Result};
use async_trait::async_trait;
use coverage_lens_core::models::columns;
use coverage_lens_core::RawRow;
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::config::{Config, DataRoot};

/// A source of raw dataset rows.
///
/// Implement this to feed the loader from somewhere other than the
/// built-in filesystem and HTTP sources (tests use an in-memory one).
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Short description for logs, e.g. `file:./data`.
    fn describe(&self) -> String;

    /// Fetch and parse every row of `dataset`.
    async fn fetch_rows(&self, dataset: &str) -> Result<Vec<RawRow>>;
}

/// Reads `<root>/<dataset>` from the local filesystem.
pub struct FileRowSource {
    root: PathBuf,
}

impl FileRowSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, dataset: &str) -> PathBuf {
        self.root.join(dataset)
    }
}

#[async_trait]
impl RowSource for FileRowSource {
    fn describe(&self) -> String {
        format!("file:{}", self.root.display())
    }

    async fn fetch_rows(&self, dataset: &str) -> Result<Vec<RawRow>> {
        let path = self.path_for(dataset);
        tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&path)
                .with_context(|| format!("Failed to open dataset file: {}", path.display()))?;
            parse_csv(std::io::BufReader::new(file))
                .with_context(|| format!("Failed to parse dataset file: {}", path.display()))
        })
        .await?
    }
}

/// Downloads `<base>/<dataset>` over HTTP.
pub struct HttpRowSource {
    base: String,
    client: reqwest::Client,
}

impl HttpRowSource {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base: base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url_for(&self, dataset: &str) -> String {
        format!("{}/{}", self.base, dataset)
    }
}

#[async_trait]
impl RowSource for HttpRowSource {
    fn describe(&self) -> String {
        self.base.clone()
    }

    async fn fetch_rows(&self, dataset: &str) -> Result<Vec<RawRow>> {
        let url = self.url_for(dataset);
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Failed to fetch {}", url))?
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        parse_csv(body.as_bytes()).with_context(|| format!("Failed to parse {}", url))
    }
}

/// Build the row source matching the configured data root.
pub fn row_source(config: &Config) -> Result<Box<dyn RowSource>> {
    Ok(match config.data_root() {
        DataRoot::Local(root) => Box::new(FileRowSource::new(root)),
        DataRoot::Remote(base) => Box::new(HttpRowSource::new(
            base,
            Duration::from_secs(config.data.timeout_secs),
        )?),
    })
}

/// Parse CSV text with a header row into numbered rows.
///
/// Row numbers count data rows from 1 in file order, so they stay stable
/// even when untitled rows are dropped.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV at data row {}", i + 1))?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let fields: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        let row = RawRow::new(i + 1, fields);

        if row.get(columns::TITLE).is_none() {
            dropped += 1;
            continue;
        }
        rows.push(row);
    }

    debug!(rows = rows.len(), dropped, "parsed CSV");
    Ok(rows)
}
