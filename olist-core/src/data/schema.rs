//! Schema definition and type inference for tables.

use crate::data::value;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
    DateTime,
    Json,
    Null,
    Unknown,
}

impl ColumnType {
    /// Numeric columns take part in numeric aggregation. A column holding only
    /// missing values counts as numeric.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Null)
    }
}

/// Schema definition for a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub columns: Vec<ColumnSchema>,
}

impl SchemaDefinition {
    /// Names of the numeric columns, in table order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.dtype.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Schema for a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: ColumnType,
    pub nullable: bool,
}

/// Infer column type from its cells.
pub fn infer_column_type(values: &[&Value]) -> ColumnType {
    let non_null: Vec<_> = values.iter().filter(|v| !v.is_null()).collect();
    if non_null.is_empty() {
        return ColumnType::Null;
    }

    let mut has_int = false;
    let mut has_float = false;
    let mut has_bool = false;
    let mut has_string = false;
    let mut has_json = false;

    for v in &non_null {
        match v {
            Value::Number(n) => {
                if n.is_f64() {
                    has_float = true;
                } else {
                    has_int = true;
                }
            }
            Value::Bool(_) => has_bool = true,
            Value::String(_) => has_string = true,
            _ => has_json = true,
        }
    }

    if has_string {
        return ColumnType::String;
    }
    if has_json {
        return ColumnType::Json;
    }
    if has_bool && (has_int || has_float) {
        return ColumnType::Unknown;
    }
    if has_float {
        return ColumnType::Float;
    }
    if has_int {
        return ColumnType::Integer;
    }
    ColumnType::Boolean
}

/// Infer the type of a raw text column. Empty fields are missing and do not
/// vote.
pub fn infer_text_column_type<'a>(fields: impl IntoIterator<Item = &'a str>) -> ColumnType {
    let mut seen = false;
    let mut all_int = true;
    let mut all_float = true;

    for field in fields {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        seen = true;
        if all_int && field.parse::<i64>().is_err() {
            all_int = false;
        }
        if !all_int && !field.parse::<f64>().is_ok_and(f64::is_finite) {
            all_float = false;
            break;
        }
    }

    match (seen, all_int, all_float) {
        (false, _, _) => ColumnType::Null,
        (true, true, _) => ColumnType::Integer,
        (true, false, true) => ColumnType::Float,
        _ => ColumnType::String,
    }
}

/// Convert one raw field into a cell of the inferred column type.
pub fn parse_field(field: &str, dtype: ColumnType) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match dtype {
        ColumnType::Integer => trimmed
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::Null),
        ColumnType::Float => trimmed
            .parse::<f64>()
            .map(value::float)
            .unwrap_or(Value::Null),
        _ => Value::String(field.to_string()),
    }
}

/// Infer schema from a table's rows.
pub fn infer_schema(columns: &[String], rows: &[Vec<Value>]) -> SchemaDefinition {
    let mut schema_columns = Vec::new();

    for (i, col_name) in columns.iter().enumerate() {
        let values: Vec<&Value> = rows.iter().filter_map(|row| row.get(i)).collect();

        let dtype = infer_column_type(&values);
        let nullable = values.iter().any(|v| v.is_null());

        schema_columns.push(ColumnSchema {
            name: col_name.clone(),
            dtype,
            nullable,
        });
    }

    SchemaDefinition {
        columns: schema_columns,
    }
}
