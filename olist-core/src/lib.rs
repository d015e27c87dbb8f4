//! # olist-core
//!
//! Loading and table plumbing for the Olist e-commerce dataset: a small
//! in-memory table type ([`DataBatch`]), CSV ingestion with type inference,
//! joins and group-by aggregation, plus the error, configuration, and logging
//! setup shared with `olist-features`.

pub mod config;
pub mod data;
pub mod error;
pub mod logging;

pub use config::{DataConfig, OlistConfig, load_config};
pub use data::{DataBatch, Olist, OlistData, TableName};
pub use error::{OlistError, Result};
