//! Dataset listing and availability.
//!
//! Reports every configured dataset with its reference date and whether
//! its data file is reachable. Used by the `covlens datasets` command and
//! the `GET /datasets` HTTP endpoint.
//!
//! | Data root | Available when |
//! |-----------|----------------|
//! | local directory | `<root>/<dataset>` is a file |
//! | `http(s)://` | always reported as `remote` (checked at load time) |

use anyhow::Result;
use serde::Serialize;

use crate::config::{display_title, Config, DataRoot};

/// Configuration and availability of one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatus {
    /// Dataset identifier (CSV file name).
    pub id: String,
    pub title: String,
    /// ISO reference date.
    pub reference_date: String,
    /// `present`, `missing`, or `remote`.
    pub availability: String,
}

pub fn get_datasets(config: &Config) -> Vec<DatasetStatus> {
    let root = config.data_root();
    config
        .datasets
        .iter()
        .map(|(id, date)| {
            let availability = match &root {
                DataRoot::Local(dir) if dir.join(id).is_file() => "present",
                DataRoot::Local(_) => "missing",
                DataRoot::Remote(_) => "remote",
            };
            DatasetStatus {
                id: id.clone(),
                title: display_title(id).to_string(),
                reference_date: date.clone(),
                availability: availability.to_string(),
            }
        })
        .collect()
}

pub fn list_datasets(config: &Config) -> Result<()> {
    let datasets = get_datasets(config);

    println!(
        "{:<32} {:<20} {:<12} DATA",
        "DATASET", "TITLE", "REFERENCE"
    );
    for d in &datasets {
        println!(
            "{:<32} {:<20} {:<12} {}",
            d.id, d.title, d.reference_date, d.availability
        );
    }

    Ok(())
}
