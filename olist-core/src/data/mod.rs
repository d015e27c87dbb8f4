//! Table model and ingestion: loading, schema inference, transforms, and
//! relational operations.

pub mod frame;
pub mod loader;
pub mod schema;
pub mod source;
pub mod transform;
pub mod value;

pub use frame::{Agg, AggFunc, GroupBy, JoinKind};
pub use loader::{Olist, OlistData, SELLER_COLUMNS, TableName};
pub use schema::{ColumnSchema, ColumnType, SchemaDefinition};
pub use source::{CsvSource, DataBatch, DataSource};
pub use transform::{TransformPipeline, TransformStep};
