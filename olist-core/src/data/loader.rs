//! Directory loader for the Olist CSV tables.

use crate::config::{DataConfig, OlistConfig};
use crate::data::source::{CsvSource, DataBatch, DataSource};
use crate::data::transform::{TransformPipeline, TransformStep};
use crate::error::{OlistError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Logical table names. Declaration order is the canonical key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Customers,
    Geolocation,
    OrderItems,
    OrderPayments,
    OrderReviews,
    Orders,
    ProductCategoryNameTranslation,
    Products,
    Sellers,
}

impl TableName {
    /// Every table, in canonical order.
    pub const ALL: [TableName; 9] = [
        TableName::Customers,
        TableName::Geolocation,
        TableName::OrderItems,
        TableName::OrderPayments,
        TableName::OrderReviews,
        TableName::Orders,
        TableName::ProductCategoryNameTranslation,
        TableName::Products,
        TableName::Sellers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Geolocation => "geolocation",
            Self::OrderItems => "order_items",
            Self::OrderPayments => "order_payments",
            Self::OrderReviews => "order_reviews",
            Self::Orders => "orders",
            Self::ProductCategoryNameTranslation => "product_category_name_translation",
            Self::Products => "products",
            Self::Sellers => "sellers",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = OlistError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| OlistError::invalid_input(format!("Unknown table: {s}")))
    }
}

/// Canonical column order of the `sellers` table.
pub const SELLER_COLUMNS: [&str; 4] = [
    "seller_city",
    "seller_id",
    "seller_state",
    "seller_zip_code_prefix",
];

/// The nine raw tables, keyed in canonical order.
#[derive(Debug, Clone)]
pub struct OlistData {
    tables: BTreeMap<TableName, DataBatch>,
}

impl OlistData {
    /// Build from loaded tables, failing if any canonical table is absent.
    pub fn from_tables(mut loaded: BTreeMap<TableName, DataBatch>) -> Result<Self> {
        let mut tables = BTreeMap::new();
        for name in TableName::ALL {
            let batch = loaded
                .remove(&name)
                .ok_or_else(|| OlistError::missing_table(name.as_str()))?;
            tables.insert(name, batch);
        }
        Ok(Self { tables })
    }

    pub fn table(&self, name: TableName) -> &DataBatch {
        // from_tables guarantees every name is present
        &self.tables[&name]
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.tables.keys().map(|t| t.as_str()).collect()
    }
}

/// Loader for a directory of Olist CSV files.
#[derive(Debug, Clone)]
pub struct Olist {
    csv_dir: PathBuf,
    file_prefix: String,
    file_suffix: String,
}

impl Olist {
    /// Loader for `csv_dir` with the default `olist_` / `_dataset` naming.
    pub fn new(csv_dir: impl Into<PathBuf>) -> Self {
        let defaults = DataConfig::default();
        Self {
            csv_dir: csv_dir.into(),
            file_prefix: defaults.file_prefix,
            file_suffix: defaults.file_suffix,
        }
    }

    pub fn from_config(config: &OlistConfig) -> Self {
        Self {
            csv_dir: config.data.csv_dir.clone(),
            file_prefix: config.data.file_prefix.clone(),
            file_suffix: config.data.file_suffix.clone(),
        }
    }

    pub fn ping(&self) -> &'static str {
        "pong"
    }

    /// Logical table name for a CSV file name.
    pub fn clean_key(&self, file_name: &str) -> String {
        file_name
            .replace(&self.file_prefix, "")
            .replace(&format!("{}.csv", self.file_suffix), "")
            .replace(".csv", "")
    }

    /// The `*.csv` files of the directory, sorted by file name.
    pub fn csv_files(&self) -> Result<Vec<PathBuf>> {
        if !self.csv_dir.is_dir() {
            return Err(OlistError::DirectoryNotFound {
                path: self.csv_dir.clone(),
            });
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.csv_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Load every table into canonical order.
    pub fn get_data(&self) -> Result<OlistData> {
        let mut loaded = BTreeMap::new();

        for path in self.csv_files()? {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let key = self.clean_key(file_name);
            let Ok(name) = key.parse::<TableName>() else {
                tracing::debug!(file = %file_name, key = %key, "Skipping unrecognised CSV");
                continue;
            };
            let batch = CsvSource::new(&path).load(None)?;
            tracing::debug!(
                table = %name,
                rows = batch.row_count(),
                columns = batch.column_count(),
                "Loaded table"
            );
            loaded.insert(name, batch);
        }

        if let Some(sellers) = loaded.remove(&TableName::Sellers) {
            let reorder = TransformPipeline::new().add_step(TransformStep::SelectColumns {
                columns: SELLER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            });
            loaded.insert(TableName::Sellers, reorder.apply(sellers)?);
        }

        let data = OlistData::from_tables(loaded)?;
        tracing::info!(dir = %self.csv_dir.display(), tables = TableName::ALL.len(), "Olist data loaded");
        Ok(data)
    }
}
