//! Export a filtered view as JSON.
//!
//! Writes the full [`ArchiveView`](coverage_lens_core::ArchiveView)
//! (chronological records, divider, totals, and time series) for use by
//! external charting or notebook tooling.

use anyhow::{Context, Result};
use coverage_lens_core::{build_view, ViewState};
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::loader::load_snapshot;

/// Export a dataset view as pretty-printed JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(
    config: &Config,
    dataset: &str,
    view: &ViewState,
    output: Option<&Path>,
) -> Result<()> {
    let snapshot = load_snapshot(config, dataset).await?;
    let archive = build_view(&snapshot, view);
    let json = serde_json::to_string_pretty(&archive)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                records = archive.records.len(),
                path = %path.display(),
                "exported view"
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
