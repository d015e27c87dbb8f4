//! Per-order features.
//!
//! Every table here has one row per `order_id` and is recomputed from the raw
//! tables on each call.

use crate::geo::haversine_distance;
use chrono::{NaiveDate, NaiveDateTime};
use olist_core::data::value;
use olist_core::data::{Agg, AggFunc, DataBatch, TransformPipeline, TransformStep};
use olist_core::{Olist, OlistData, Result, TableName};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Column order of [`OrderFeatures::get_training_data`].
pub const ORDER_TRAINING_COLUMNS: [&str; 13] = [
    "order_id",
    "wait_time",
    "expected_wait_time",
    "delay_vs_expected",
    "order_status",
    "dim_is_five_star",
    "dim_is_one_star",
    "review_score",
    "number_of_items",
    "number_of_sellers",
    "price",
    "freight_value",
    "distance_seller_customer",
];

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Options for [`OrderFeatures::get_training_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingOptions {
    /// Keep only delivered orders with both wait times present.
    pub is_delivered: bool,
    /// Compute `distance_seller_customer` instead of leaving it missing.
    pub with_distance_seller_customer: bool,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            is_delivered: true,
            with_distance_seller_customer: false,
        }
    }
}

/// Order-level feature builder.
#[derive(Debug, Clone)]
pub struct OrderFeatures {
    data: Arc<OlistData>,
}

impl OrderFeatures {
    pub fn new(data: Arc<OlistData>) -> Self {
        Self { data }
    }

    /// Load the raw tables through `olist` and wrap them.
    pub fn load(olist: &Olist) -> Result<Self> {
        Ok(Self::new(Arc::new(olist.get_data()?)))
    }

    /// `order_id, wait_time, expected_wait_time, delay_vs_expected, order_status`,
    /// durations in fractional days.
    pub fn get_wait_time(&self, is_delivered: bool) -> Result<DataBatch> {
        let orders = self.data.table(TableName::Orders);
        let id = orders.require_column("order_id")?;
        let purchase = orders.require_column("order_purchase_timestamp")?;
        let delivered = orders.require_column("order_delivered_customer_date")?;
        let estimated = orders.require_column("order_estimated_delivery_date")?;
        let status = orders.require_column("order_status")?;

        let rows = orders
            .rows
            .iter()
            .map(|row| {
                let bought = parse_timestamp(&row[purchase]);
                let wait_time = elapsed_days(bought, parse_timestamp(&row[delivered]));
                let expected_wait_time = elapsed_days(bought, parse_timestamp(&row[estimated]));
                let delay = wait_time.zip(expected_wait_time).map(|(w, e)| w - e);
                vec![
                    row[id].clone(),
                    value::opt_float(wait_time),
                    value::opt_float(expected_wait_time),
                    value::opt_float(delay),
                    row[status].clone(),
                ]
            })
            .collect();

        let mut out = DataBatch::new(
            ["order_id", "wait_time", "expected_wait_time", "delay_vs_expected", "order_status"]
                .map(String::from)
                .to_vec(),
            rows,
        )?;

        if is_delivered {
            out = out.filter(|row| {
                row[4].as_str() == Some("delivered") && !row[1].is_null() && !row[2].is_null()
            });
        }

        tracing::debug!(rows = out.row_count(), is_delivered, "Computed order wait times");
        Ok(out)
    }

    /// `order_id, dim_is_five_star, dim_is_one_star, review_score`.
    ///
    /// An order may carry several reviews: the score is their mean and each
    /// flag is set when any review has that score.
    pub fn get_review_score(&self) -> Result<DataBatch> {
        let reviews = TransformPipeline::new()
            .add_step(TransformStep::CoerceNumeric {
                column: "review_score".into(),
            })
            .apply(self.data.table(TableName::OrderReviews).clone())?;

        reviews
            .group_by(&["order_id"])?
            .agg(&[
                Agg::new("review_score", AggFunc::AnyEq(5.0), "dim_is_five_star"),
                Agg::new("review_score", AggFunc::AnyEq(1.0), "dim_is_one_star"),
                Agg::same("review_score", AggFunc::Mean),
            ])
    }

    /// `order_id, number_of_items`: line items per order.
    pub fn get_number_items(&self) -> Result<DataBatch> {
        self.data
            .table(TableName::OrderItems)
            .group_by(&["order_id"])?
            .agg(&[Agg::new("order_id", AggFunc::Size, "number_of_items")])
    }

    /// `order_id, number_of_sellers`: distinct sellers per order.
    pub fn get_number_sellers(&self) -> Result<DataBatch> {
        self.data
            .table(TableName::OrderItems)
            .group_by(&["order_id"])?
            .agg(&[Agg::new("seller_id", AggFunc::NUnique, "number_of_sellers")])
    }

    /// `order_id, price, freight_value`: per-order sums, unparseable values
    /// left out.
    pub fn get_price_and_freight(&self) -> Result<DataBatch> {
        let items = TransformPipeline::new()
            .add_step(TransformStep::CoerceNumeric {
                column: "price".into(),
            })
            .add_step(TransformStep::CoerceNumeric {
                column: "freight_value".into(),
            })
            .apply(self.data.table(TableName::OrderItems).clone())?;

        items.group_by(&["order_id"])?.agg(&[
            Agg::same("price", AggFunc::Sum),
            Agg::same("freight_value", AggFunc::Sum),
        ])
    }

    /// `order_id, distance_seller_customer` in kilometres, averaged over the
    /// order's sellers. Orders without items are absent; a seller or customer
    /// whose zip prefix has no coordinates contributes nothing.
    pub fn get_distance_seller_customer(&self) -> Result<DataBatch> {
        let geo = self.geolocation_by_zip()?;

        let orders = self
            .data
            .table(TableName::Orders)
            .select(&["order_id", "customer_id"])?;
        let customers = self
            .data
            .table(TableName::Customers)
            .select(&["customer_id", "customer_zip_code_prefix"])?;
        let customer_geo = geo_for(&geo, "customer");
        let customer_coords = orders
            .left_join(&customers, &["customer_id"])?
            .left_join(&customer_geo, &["customer_zip_code_prefix"])?
            .select(&["order_id", "customer_lat", "customer_lng"])?;

        let sellers = self
            .data
            .table(TableName::Sellers)
            .select(&["seller_id", "seller_zip_code_prefix"])?;
        let seller_geo = geo_for(&geo, "seller");
        let pairs = self
            .data
            .table(TableName::OrderItems)
            .distinct(&["order_id", "seller_id"])?
            .left_join(&sellers, &["seller_id"])?
            .left_join(&seller_geo, &["seller_zip_code_prefix"])?
            .left_join(&customer_coords, &["order_id"])?;

        let coords = [
            pairs.require_column("seller_lat")?,
            pairs.require_column("seller_lng")?,
            pairs.require_column("customer_lat")?,
            pairs.require_column("customer_lng")?,
        ];
        let distances = pairs
            .rows
            .iter()
            .map(|row| {
                let [s_lat, s_lng, c_lat, c_lng] = coords.map(|i| value::as_f64(&row[i]));
                match (s_lat, s_lng, c_lat, c_lng) {
                    (Some(s_lat), Some(s_lng), Some(c_lat), Some(c_lng)) => {
                        value::float(haversine_distance(s_lng, s_lat, c_lng, c_lat))
                    }
                    _ => Value::Null,
                }
            })
            .collect();

        pairs
            .with_column("distance_seller_customer", distances)?
            .group_by(&["order_id"])?
            .agg(&[Agg::same("distance_seller_customer", AggFunc::Mean)])
    }

    /// One row per order with the 13 [`ORDER_TRAINING_COLUMNS`], with no
    /// missing values.
    ///
    /// Rows with any missing feature are dropped. Without the distance
    /// feature the column is filled with missing values, so every row is
    /// dropped and the result is empty.
    pub fn get_training_data(&self, options: TrainingOptions) -> Result<DataBatch> {
        let mut df = self
            .get_wait_time(options.is_delivered)?
            .left_join(&self.get_review_score()?, &["order_id"])?
            .left_join(&self.get_number_items()?, &["order_id"])?
            .left_join(&self.get_number_sellers()?, &["order_id"])?
            .left_join(&self.get_price_and_freight()?, &["order_id"])?;

        if options.with_distance_seller_customer {
            df = df.left_join(&self.get_distance_seller_customer()?, &["order_id"])?;
        } else {
            let missing = vec![Value::Null; df.row_count()];
            df = df.with_column("distance_seller_customer", missing)?;
        }

        let df = df.select(&ORDER_TRAINING_COLUMNS)?.drop_nulls(None)?;

        tracing::debug!(
            rows = df.row_count(),
            with_distance = options.with_distance_seller_customer,
            "Assembled order training data"
        );
        Ok(df)
    }

    /// Mean latitude/longitude per zip code prefix.
    fn geolocation_by_zip(&self) -> Result<DataBatch> {
        let geo = TransformPipeline::new()
            .add_step(TransformStep::CoerceNumeric {
                column: "geolocation_lat".into(),
            })
            .add_step(TransformStep::CoerceNumeric {
                column: "geolocation_lng".into(),
            })
            .apply(self.data.table(TableName::Geolocation).clone())?;

        geo.group_by(&["geolocation_zip_code_prefix"])?.agg(&[
            Agg::same("geolocation_lat", AggFunc::Mean),
            Agg::same("geolocation_lng", AggFunc::Mean),
        ])
    }
}

/// Rename the per-zip geolocation table for the `customer` or `seller` side.
fn geo_for(geo: &DataBatch, side: &str) -> DataBatch {
    geo.clone()
        .rename_column(
            "geolocation_zip_code_prefix",
            &format!("{side}_zip_code_prefix"),
        )
        .rename_column("geolocation_lat", &format!("{side}_lat"))
        .rename_column("geolocation_lng", &format!("{side}_lng"))
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Lenient timestamp parsing; anything unrecognised is missing.
fn parse_timestamp(cell: &Value) -> Option<NaiveDateTime> {
    let text = cell.as_str()?.trim();
    let text = text.strip_suffix('Z').unwrap_or(text);
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn elapsed_days(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Option<f64> {
    let delta = to? - from?;
    let seconds = delta.num_milliseconds() as f64 / 1000.0;
    Some(seconds / SECONDS_PER_DAY)
}
