//! # olist-features
//!
//! Derived feature tables over the raw Olist tables loaded by `olist-core`:
//!
//! - [`OrderFeatures`]: wait times, review aggregates, item/seller counts,
//!   price and freight, seller-customer distance, and the order training table
//! - [`ProductFeatures`]: per-product summaries and the per-category rollup
//! - [`ReviewFeatures`]: comment length and dominant category per review
//! - [`geo`]: Haversine distance
//!
//! All builders share one immutable [`OlistData`](olist_core::OlistData)
//! through an `Arc` and recompute their tables on every call.

pub mod geo;
pub mod order;
pub mod product;
pub mod review;

pub use geo::haversine_distance;
pub use order::{ORDER_TRAINING_COLUMNS, OrderFeatures, TrainingOptions};
pub use product::{CategoryAgg, ProductFeatures};
pub use review::ReviewFeatures;
