//! Configuration for the Olist loader.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment.
//! The loader never reads this implicitly; callers resolve a config and pass the
//! directory to [`crate::data::Olist`].

use crate::error::{OlistError, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OlistConfig {
    /// Raw CSV discovery settings.
    #[serde(default)]
    pub data: DataConfig,
}

/// Where the raw CSV files live and how their names map to tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory containing the `*.csv` files.
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,
    /// Prefix stripped from file names (`olist_customers_dataset.csv`).
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Suffix stripped from file stems before the `.csv` extension.
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_dir: default_csv_dir(),
            file_prefix: default_file_prefix(),
            file_suffix: default_file_suffix(),
        }
    }
}

fn default_csv_dir() -> PathBuf {
    let relative = Path::new(".workintech").join("olist").join("data").join("csv");
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(relative),
        None => relative,
    }
}

fn default_file_prefix() -> String {
    "olist_".to_string()
}

fn default_file_suffix() -> String {
    "_dataset".to_string()
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `OLIST_`, e.g. `OLIST_DATA__CSV_DIR`)
/// 2. The TOML file at `config_file`, when given and present
/// 3. Built-in defaults
pub fn load_config(config_file: Option<&Path>) -> Result<OlistConfig> {
    let mut figment = Figment::from(Serialized::defaults(OlistConfig::default()));

    if let Some(path) = config_file {
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        } else {
            tracing::debug!(path = %path.display(), "Config file absent, using defaults");
        }
    }

    figment = figment.merge(Env::prefixed("OLIST_").split("__"));

    figment
        .extract()
        .map_err(|e| OlistError::Config(Box::new(e)))
}
