//! Relational operations over [`DataBatch`]: projection, joins, and group-by
//! aggregation.

use crate::data::source::DataBatch;
use crate::data::value;
use crate::error::{OlistError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    /// Keep every left row; unmatched rows get missing right cells.
    Left,
    /// Keep only left rows with at least one match.
    Inner,
}

impl DataBatch {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| OlistError::column_not_found(name, &self.columns))
    }

    /// All cells of one column, in row order.
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Cell at `row` in column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Project onto `columns`, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<DataBatch> {
        let indices = columns
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        DataBatch::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    /// Append a column, or replace it if the name already exists.
    pub fn with_column(mut self, name: &str, values: Vec<Value>) -> Result<DataBatch> {
        if values.len() != self.rows.len() {
            return Err(OlistError::dataset(format!(
                "Column '{name}' has {} values for {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        Ok(self)
    }

    /// Rewrite every cell of one column.
    pub fn map_column(mut self, name: &str, f: impl Fn(&Value) -> Value) -> Result<DataBatch> {
        let idx = self.require_column(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        Ok(self)
    }

    pub fn rename_column(mut self, from: &str, to: &str) -> DataBatch {
        if let Some(col) = self.columns.iter_mut().find(|c| c.as_str() == from) {
            *col = to.to_string();
        }
        self
    }

    pub fn drop_column(mut self, name: &str) -> DataBatch {
        if let Some(idx) = self.column_index(name) {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
        self
    }

    /// Keep rows for which `keep` returns true.
    pub fn filter(mut self, mut keep: impl FnMut(&[Value]) -> bool) -> DataBatch {
        self.rows.retain(|row| keep(row.as_slice()));
        self.total_rows = self.rows.len();
        self
    }

    /// Drop rows with a missing cell in any of `subset` (all columns when `None`).
    pub fn drop_nulls(self, subset: Option<&[&str]>) -> Result<DataBatch> {
        let indices: Vec<usize> = match subset {
            Some(cols) => cols
                .iter()
                .map(|c| self.require_column(c))
                .collect::<Result<_>>()?,
            None => (0..self.columns.len()).collect(),
        };
        Ok(self.filter(|row| indices.iter().all(|&i| !row[i].is_null())))
    }

    /// Distinct projections onto `columns`, first occurrence order.
    pub fn distinct(&self, columns: &[&str]) -> Result<DataBatch> {
        let projected = self.select(columns)?;
        Ok(projected.dedup_rows())
    }

    /// Remove repeated rows, keeping the first occurrence.
    pub fn dedup_rows(mut self) -> DataBatch {
        let mut seen = HashSet::new();
        self.rows.retain(|row| {
            let key: Vec<Option<String>> = row.iter().map(value::key_of).collect();
            seen.insert(key)
        });
        self.total_rows = self.rows.len();
        self
    }

    /// Stable sort by one column using [`value::compare`].
    pub fn sort_by_column(mut self, name: &str, ascending: bool) -> Result<DataBatch> {
        let idx = self.require_column(name)?;
        self.rows.sort_by(|a, b| {
            let ord = value::compare(&a[idx], &b[idx]);
            if ascending { ord } else { ord.reverse() }
        });
        Ok(self)
    }

    /// Narrow a whole column to integers if every cell allows it; otherwise
    /// the column is returned unchanged. The flag reports whether the cast
    /// happened.
    pub fn try_cast_integer(self, name: &str) -> Result<(DataBatch, bool)> {
        let idx = self.require_column(name)?;
        let castable = self
            .rows
            .iter()
            .all(|row| value::to_integer(&row[idx]).is_some());
        if !castable {
            return Ok((self, false));
        }
        let cast = self.map_column(name, |cell| {
            value::to_integer(cell).map(Value::from).unwrap_or(Value::Null)
        })?;
        Ok((cast, true))
    }

    pub fn left_join(&self, right: &DataBatch, on: &[&str]) -> Result<DataBatch> {
        self.join(right, on, JoinKind::Left)
    }

    pub fn inner_join(&self, right: &DataBatch, on: &[&str]) -> Result<DataBatch> {
        self.join(right, on, JoinKind::Inner)
    }

    /// Equi-join on `on`. One left row yields one output row per matching
    /// right row. Right key columns are not repeated in the output, and
    /// missing keys never match.
    pub fn join(&self, right: &DataBatch, on: &[&str], kind: JoinKind) -> Result<DataBatch> {
        let left_keys = on
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<Vec<_>>>()?;
        let right_keys = on
            .iter()
            .map(|c| right.require_column(c))
            .collect::<Result<Vec<_>>>()?;

        let right_payload: Vec<usize> = (0..right.columns.len())
            .filter(|i| !right_keys.contains(i))
            .collect();
        if let Some(&clash) = right_payload
            .iter()
            .find(|&&i| self.has_column(&right.columns[i]))
        {
            return Err(OlistError::invalid_input(format!(
                "Join would duplicate column '{}'",
                right.columns[clash]
            )));
        }

        let mut index: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        for (row_idx, row) in right.rows.iter().enumerate() {
            if let Some(key) = composite_key(row, &right_keys) {
                index.entry(key).or_default().push(row_idx);
            }
        }

        let mut columns = self.columns.clone();
        columns.extend(right_payload.iter().map(|&i| right.columns[i].clone()));

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let matches = composite_key(row, &left_keys).and_then(|k| index.get(&k));
            match matches {
                Some(hits) => {
                    for &hit in hits {
                        let mut out = row.clone();
                        out.extend(right_payload.iter().map(|&i| right.rows[hit][i].clone()));
                        rows.push(out);
                    }
                }
                None if kind == JoinKind::Left => {
                    let mut out = row.clone();
                    out.extend(std::iter::repeat_n(Value::Null, right_payload.len()));
                    rows.push(out);
                }
                None => {}
            }
        }

        DataBatch::new(columns, rows)
    }

    /// Group rows by `keys`. Rows with a missing key are left out.
    pub fn group_by(&self, keys: &[&str]) -> Result<GroupBy<'_>> {
        let key_indices = keys
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<Vec<_>>>()?;

        let mut slots: HashMap<Vec<String>, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();
        for (row_idx, row) in self.rows.iter().enumerate() {
            let Some(key) = composite_key(row, &key_indices) else {
                continue;
            };
            let slot = *slots.entry(key).or_insert_with(|| {
                groups.push(Group {
                    key: key_indices.iter().map(|&i| row[i].clone()).collect(),
                    rows: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].rows.push(row_idx);
        }

        groups.sort_by(|a, b| {
            a.key
                .iter()
                .zip(&b.key)
                .map(|(x, y)| value::compare(x, y))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(GroupBy {
            batch: self,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            groups,
        })
    }
}

fn composite_key(row: &[Value], indices: &[usize]) -> Option<Vec<String>> {
    indices.iter().map(|&i| value::key_of(&row[i])).collect()
}

#[derive(Debug)]
struct Group {
    key: Vec<Value>,
    rows: Vec<usize>,
}

/// Rows of a batch partitioned by key, sorted by key.
#[derive(Debug)]
pub struct GroupBy<'a> {
    batch: &'a DataBatch,
    keys: Vec<String>,
    groups: Vec<Group>,
}

impl GroupBy<'_> {
    /// Aggregate each group into one row: key columns first, then one column
    /// per aggregation, named by its alias.
    pub fn agg(&self, aggs: &[Agg]) -> Result<DataBatch> {
        let sources = aggs
            .iter()
            .map(|a| self.batch.require_column(&a.column))
            .collect::<Result<Vec<_>>>()?;

        let mut columns = self.keys.clone();
        columns.extend(aggs.iter().map(|a| a.alias.clone()));

        let rows = self
            .groups
            .iter()
            .map(|group| {
                let mut out = group.key.clone();
                for (agg, &src) in aggs.iter().zip(&sources) {
                    let cells: Vec<&Value> =
                        group.rows.iter().map(|&r| &self.batch.rows[r][src]).collect();
                    out.push(agg.func.apply(&cells));
                }
                out
            })
            .collect();

        DataBatch::new(columns, rows)
    }
}

/// Aggregation function applied to the cells of one column within a group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AggFunc {
    /// Mean of the numeric cells; missing when there are none.
    Mean,
    Median,
    /// Sum of the numeric cells; 0 when there are none.
    Sum,
    Min,
    Max,
    /// Number of non-missing cells.
    Count,
    /// Number of rows, missing or not.
    Size,
    /// Number of distinct non-missing cells.
    NUnique,
    /// 1 if any cell equals the number, else 0.
    AnyEq(f64),
    /// Most frequent non-missing cell; ties go to the smallest value.
    Mode,
}

impl AggFunc {
    pub fn apply(self, cells: &[&Value]) -> Value {
        match self {
            Self::Mean => {
                let nums = numbers(cells);
                if nums.is_empty() {
                    Value::Null
                } else {
                    value::float(nums.iter().sum::<f64>() / nums.len() as f64)
                }
            }
            Self::Median => {
                let mut nums = numbers(cells);
                if nums.is_empty() {
                    return Value::Null;
                }
                nums.sort_by(f64::total_cmp);
                let mid = nums.len() / 2;
                if nums.len() % 2 == 0 {
                    value::float((nums[mid - 1] + nums[mid]) / 2.0)
                } else {
                    value::float(nums[mid])
                }
            }
            Self::Sum => {
                let all_int = cells
                    .iter()
                    .filter(|v| !v.is_null())
                    .all(|v| v.as_i64().is_some());
                let int_sum = all_int
                    .then(|| {
                        cells
                            .iter()
                            .filter_map(|v| v.as_i64())
                            .try_fold(0i64, i64::checked_add)
                    })
                    .flatten();
                match int_sum {
                    Some(total) => Value::from(total),
                    // floats, or integers that overflow i64
                    None => value::float(numbers(cells).iter().sum()),
                }
            }
            Self::Min => extreme(cells, std::cmp::Ordering::Less),
            Self::Max => extreme(cells, std::cmp::Ordering::Greater),
            Self::Count => Value::from(cells.iter().filter(|v| !v.is_null()).count()),
            Self::Size => Value::from(cells.len()),
            Self::NUnique => {
                let distinct: HashSet<String> =
                    cells.iter().filter_map(|v| value::key_of(v)).collect();
                Value::from(distinct.len())
            }
            Self::AnyEq(target) => {
                let hit = cells.iter().any(|v| value::as_f64(v) == Some(target));
                Value::from(i64::from(hit))
            }
            Self::Mode => mode(cells),
        }
    }
}

fn numbers(cells: &[&Value]) -> Vec<f64> {
    cells.iter().filter_map(|v| value::as_f64(v)).collect()
}

fn extreme(cells: &[&Value], wanted: std::cmp::Ordering) -> Value {
    cells
        .iter()
        .copied()
        .filter(|v| v.is_number())
        .fold(None::<&Value>, |best, v| match best {
            Some(b) if value::compare(v, b) != wanted => Some(b),
            _ => Some(v),
        })
        .cloned()
        .unwrap_or(Value::Null)
}

fn mode(cells: &[&Value]) -> Value {
    let mut counts: HashMap<String, (usize, &Value)> = HashMap::new();
    for &v in cells {
        if let Some(key) = value::key_of(v) {
            counts.entry(key).or_insert((0, v)).0 += 1;
        }
    }
    let Some(top) = counts.values().map(|(n, _)| *n).max() else {
        return Value::Null;
    };
    counts
        .into_values()
        .filter(|(n, _)| *n == top)
        .map(|(_, v)| v)
        .min_by(|a, b| value::compare(a, b))
        .cloned()
        .unwrap_or(Value::Null)
}

/// One aggregation: `func` over `column`, output as `alias`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agg {
    pub column: String,
    pub func: AggFunc,
    pub alias: String,
}

impl Agg {
    pub fn new(column: &str, func: AggFunc, alias: &str) -> Self {
        Self {
            column: column.to_string(),
            func,
            alias: alias.to_string(),
        }
    }

    /// Aggregate `column` keeping its name.
    pub fn same(column: &str, func: AggFunc) -> Self {
        Self::new(column, func, column)
    }
}
