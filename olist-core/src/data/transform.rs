//! Declarative column transforms.

use crate::data::source::DataBatch;
use crate::data::value;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A transformation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformStep {
    DropColumn {
        column: String,
    },
    /// No-op when `from` is absent.
    RenameColumn {
        from: String,
        to: String,
    },
    FillNull {
        column: String,
        value: serde_json::Value,
    },
    SelectColumns {
        columns: Vec<String>,
    },
    /// Parse numeric text; anything unparseable becomes missing.
    CoerceNumeric {
        column: String,
    },
    DropNulls {
        columns: Option<Vec<String>>,
    },
    Deduplicate {
        columns: Option<Vec<String>>,
    },
    SortBy {
        column: String,
        ascending: bool,
    },
}

/// A pipeline of transformation steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformPipeline {
    pub steps: Vec<TransformStep>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(mut self, step: TransformStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Apply the pipeline to a table.
    pub fn apply(&self, mut batch: DataBatch) -> Result<DataBatch> {
        for step in &self.steps {
            batch = apply_step(batch, step)?;
        }
        Ok(batch)
    }
}

fn as_strs(columns: &[String]) -> Vec<&str> {
    columns.iter().map(String::as_str).collect()
}

fn apply_step(batch: DataBatch, step: &TransformStep) -> Result<DataBatch> {
    match step {
        TransformStep::DropColumn { column } => Ok(batch.drop_column(column)),
        TransformStep::RenameColumn { from, to } => Ok(batch.rename_column(from, to)),
        TransformStep::FillNull { column, value } => batch.map_column(column, |cell| {
            if cell.is_null() {
                value.clone()
            } else {
                cell.clone()
            }
        }),
        TransformStep::SelectColumns { columns } => batch.select(&as_strs(columns)),
        TransformStep::CoerceNumeric { column } => batch.map_column(column, value::coerce_numeric),
        TransformStep::DropNulls { columns } => {
            let subset = columns.as_deref().map(as_strs);
            batch.drop_nulls(subset.as_deref())
        }
        TransformStep::Deduplicate { columns } => match columns {
            Some(cols) => batch.distinct(&as_strs(cols)),
            None => Ok(batch.dedup_rows()),
        },
        TransformStep::SortBy { column, ascending } => batch.sort_by_column(column, *ascending),
    }
}
