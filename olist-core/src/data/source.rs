//! Data source abstraction and the in-memory table it produces.

use crate::data::schema::{
    ColumnType, SchemaDefinition, infer_schema, infer_text_column_type, parse_field,
};
use crate::error::{OlistError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// A table: an ordered list of rows sharing one column list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub total_rows: usize,
}

impl DataBatch {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            total_rows: 0,
        }
    }

    /// Build a batch, checking every row has one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(OlistError::dataset(format!(
                "Row {i} has {} cells, expected {}",
                row.len(),
                columns.len()
            )));
        }
        let total_rows = rows.len();
        Ok(Self {
            columns,
            rows,
            total_rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn schema(&self) -> SchemaDefinition {
        infer_schema(&self.columns, &self.rows)
    }
}

/// Trait for loading a table from a source.
pub trait DataSource: Send + Sync {
    /// Load data from this source, optionally limiting the number of rows.
    fn load(&self, limit: Option<usize>) -> Result<DataBatch>;

    /// Infer the schema of this data source.
    fn schema(&self) -> Result<SchemaDefinition> {
        Ok(self.load(None)?.schema())
    }
}

// ---------------------------------------------------------------------------
// CsvSource
// ---------------------------------------------------------------------------

/// CSV file data source with a header row.
///
/// Column types are inferred over the whole file: a column whose non-empty
/// fields all parse as integers loads as integers, then floats, otherwise
/// text. Empty fields load as missing.
pub struct CsvSource {
    pub path: PathBuf,
    pub delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }
}

impl DataSource for CsvSource {
    fn load(&self, limit: Option<usize>) -> Result<DataBatch> {
        if !self.path.is_file() {
            return Err(OlistError::FileNotFound {
                path: self.path.clone(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(&self.path)?;

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            if limit.is_some_and(|max| records.len() >= max) {
                break;
            }
            let record = result?;
            if record.len() == 1 && record.get(0).is_some_and(|f| f.trim().is_empty()) {
                continue;
            }
            records.push(record);
        }

        let dtypes: Vec<ColumnType> = (0..columns.len())
            .map(|i| infer_text_column_type(records.iter().map(|r| r.get(i).unwrap_or(""))))
            .collect();

        let rows: Vec<Vec<Value>> = records
            .iter()
            .map(|record| {
                dtypes
                    .iter()
                    .enumerate()
                    .map(|(i, dtype)| parse_field(record.get(i).unwrap_or(""), *dtype))
                    .collect()
            })
            .collect();

        tracing::debug!(
            path = %self.path.display(),
            rows = rows.len(),
            columns = columns.len(),
            "Loaded CSV"
        );

        DataBatch::new(columns, rows)
    }
}
