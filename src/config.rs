//! TOML configuration parsing and validation.
//!
//! ```toml
//! [data]
//! root = "./data"          # local directory or http(s) base URL
//! timeout_secs = 30
//!
//! [server]
//! bind = "127.0.0.1:7341"
//!
//! [datasets]
//! "Padmaavat_Cleaned.csv" = "2018-01-25"
//! ```
//!
//! The `[datasets]` table maps each dataset identifier (its CSV file name)
//! to the ISO reference date its records are classified against. When no
//! config file exists, [`Config::builtin`] supplies the five bundled films.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use coverage_lens_core::date::parse_reference_date;
use coverage_lens_core::CoreError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Dataset identifier → ISO reference date.
    #[serde(default)]
    pub datasets: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_root() -> String {
    "./data".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

const BUILTIN_DATASETS: &[(&str, &str)] = &[
    ("Lipstick_Cleaned.csv", "2017-07-21"),
    ("Padmaavat_Cleaned.csv", "2018-01-25"),
    ("VeereDiWedding_Cleaned.csv", "2018-06-01"),
    ("TheKeralaStory_Cleaned.csv", "2023-05-05"),
    ("Animal_Cleaned.csv", "2023-12-01"),
];

/// Where dataset files are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRoot {
    Local(PathBuf),
    Remote(String),
}

impl Config {
    /// Built-in configuration: the bundled film datasets under `./data`.
    pub fn builtin() -> Self {
        Self {
            data: DataConfig::default(),
            server: ServerConfig::default(),
            datasets: BUILTIN_DATASETS
                .iter()
                .map(|(id, date)| (id.to_string(), date.to_string()))
                .collect(),
        }
    }

    /// Resolve a dataset's reference date.
    ///
    /// Fails with [`CoreError::UnknownDataset`] for identifiers missing from
    /// the `[datasets]` table.
    pub fn reference_date(&self, dataset: &str) -> Result<NaiveDate, CoreError> {
        let iso = self
            .datasets
            .get(dataset)
            .ok_or_else(|| CoreError::UnknownDataset(dataset.to_string()))?;
        Ok(parse_reference_date(iso)?)
    }

    pub fn data_root(&self) -> DataRoot {
        let root = self.data.root.trim();
        if root.starts_with("http://") || root.starts_with("https://") {
            DataRoot::Remote(root.trim_end_matches('/').to_string())
        } else {
            DataRoot::Local(PathBuf::from(root))
        }
    }

    fn validate(self) -> Result<Self> {
        if self.datasets.is_empty() {
            bail!("[datasets] must define at least one dataset");
        }
        for (id, iso) in &self.datasets {
            if id.trim().is_empty() {
                bail!("dataset identifiers must not be empty");
            }
            parse_reference_date(iso)
                .with_context(|| format!("datasets.\"{}\": reference date must be YYYY-MM-DD", id))?;
        }
        if self.data.root.trim().is_empty() {
            bail!("data.root must not be empty");
        }
        if self.data.timeout_secs == 0 {
            bail!("data.timeout_secs must be > 0");
        }
        if self.server.bind.trim().is_empty() {
            bail!("server.bind must not be empty");
        }
        Ok(self)
    }
}

/// Human-readable dataset title: `Padmaavat_Cleaned.csv` → `Padmaavat`.
pub fn display_title(dataset: &str) -> &str {
    dataset
        .strip_suffix("_Cleaned.csv")
        .or_else(|| dataset.strip_suffix(".csv"))
        .unwrap_or(dataset)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Load `path` if it exists, otherwise fall back to [`Config::builtin`].
pub fn load_or_builtin(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        debug!(path = %path.display(), "config file not found, using built-in datasets");
        Config::builtin().validate()
    }
}
