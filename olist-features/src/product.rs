//! Per-product features and the per-category rollup.

use crate::order::OrderFeatures;
use olist_core::data::{Agg, AggFunc, DataBatch, TransformPipeline, TransformStep};
use olist_core::{Olist, OlistData, OlistError, Result, TableName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Upstream column names with a `lenght` typo, and their fixed names.
const LENGTH_TYPOS: [(&str, &str); 2] = [
    ("product_name_lenght", "product_name_length"),
    ("product_description_lenght", "product_description_length"),
];

/// Aggregator for [`ProductFeatures::get_product_cat`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryAgg {
    #[default]
    Mean,
    Median,
    Sum,
    Min,
    Max,
}

impl CategoryAgg {
    pub fn func(self) -> AggFunc {
        match self {
            Self::Mean => AggFunc::Mean,
            Self::Median => AggFunc::Median,
            Self::Sum => AggFunc::Sum,
            Self::Min => AggFunc::Min,
            Self::Max => AggFunc::Max,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for CategoryAgg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryAgg {
    type Err = OlistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "sum" => Ok(Self::Sum),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(OlistError::invalid_input(format!(
                "Unknown aggregator '{other}' (expected mean, median, sum, min, max)"
            ))),
        }
    }
}

/// Product-level feature builder.
#[derive(Debug, Clone)]
pub struct ProductFeatures {
    data: Arc<OlistData>,
    order: OrderFeatures,
}

impl ProductFeatures {
    pub fn new(data: Arc<OlistData>) -> Self {
        let order = OrderFeatures::new(Arc::clone(&data));
        Self { data, order }
    }

    pub fn load(olist: &Olist) -> Result<Self> {
        Ok(Self::new(Arc::new(olist.get_data()?)))
    }

    /// Products with the English category as `category` and the length
    /// typos fixed.
    pub fn get_product_features(&self) -> Result<DataBatch> {
        let products = self.data.table(TableName::Products);
        let translation = self.data.table(TableName::ProductCategoryNameTranslation);
        let joined = products.left_join(translation, &["product_category_name"])?;

        let mut pipeline = TransformPipeline::new()
            .add_step(TransformStep::DropColumn {
                column: "product_category_name".into(),
            })
            .add_step(TransformStep::RenameColumn {
                from: "product_category_name_english".into(),
                to: "category".into(),
            });
        for (typo, fixed) in LENGTH_TYPOS {
            if joined.has_column(typo) {
                pipeline = pipeline.add_step(TransformStep::RenameColumn {
                    from: typo.into(),
                    to: fixed.into(),
                });
            }
        }
        pipeline.apply(joined)
    }

    /// `product_id, price`: mean price over the product's line items.
    pub fn get_price(&self) -> Result<DataBatch> {
        self.numeric_items()?
            .group_by(&["product_id"])?
            .agg(&[Agg::same("price", AggFunc::Mean)])
    }

    /// `product_id, wait_time`: mean delivered wait time over the orders
    /// containing the product.
    pub fn get_wait_time(&self) -> Result<DataBatch> {
        let wait_time = self
            .order
            .get_wait_time(true)?
            .select(&["order_id", "wait_time"])?;

        self.order_products()?
            .inner_join(&wait_time, &["order_id"])?
            .group_by(&["product_id"])?
            .agg(&[Agg::same("wait_time", AggFunc::Mean)])
    }

    /// `product_id, share_of_one_stars, share_of_five_stars, review_score`
    /// averaged over the orders containing the product.
    pub fn get_review_score(&self) -> Result<DataBatch> {
        self.order_products()?
            .inner_join(&self.order.get_review_score()?, &["order_id"])?
            .group_by(&["product_id"])?
            .agg(&[
                Agg::new("dim_is_one_star", AggFunc::Mean, "share_of_one_stars"),
                Agg::new("dim_is_five_star", AggFunc::Mean, "share_of_five_stars"),
                Agg::same("review_score", AggFunc::Mean),
            ])
    }

    /// `product_id, n_orders, quantity`: distinct orders and line items.
    pub fn get_quantity(&self) -> Result<DataBatch> {
        self.data
            .table(TableName::OrderItems)
            .group_by(&["product_id"])?
            .agg(&[
                Agg::new("order_id", AggFunc::NUnique, "n_orders"),
                Agg::new("order_id", AggFunc::Count, "quantity"),
            ])
    }

    /// `product_id, sales`: total price over the product's line items.
    pub fn get_sales(&self) -> Result<DataBatch> {
        self.numeric_items()?
            .group_by(&["product_id"])?
            .agg(&[Agg::new("price", AggFunc::Sum, "sales")])
    }

    /// One row per product; missing values are kept.
    pub fn get_training_data(&self) -> Result<DataBatch> {
        let on = ["product_id"];
        let training = self
            .get_product_features()?
            .left_join(&self.get_wait_time()?, &on)?
            .left_join(&self.get_price()?, &on)?
            .left_join(&self.get_review_score()?, &on)?
            .left_join(&self.get_quantity()?, &on)?
            .left_join(&self.get_sales()?, &on)?;

        tracing::debug!(rows = training.row_count(), "Assembled product training data");
        Ok(training)
    }

    /// One row per category. Numeric columns are aggregated with `agg`,
    /// except `quantity` which is always summed.
    pub fn get_product_cat(&self, agg: CategoryAgg) -> Result<DataBatch> {
        let products = self.get_training_data()?;

        let aggs: Vec<Agg> = products
            .schema()
            .numeric_columns()
            .iter()
            .filter(|c| !matches!(c.as_str(), "product_id" | "category"))
            .map(|c| {
                let func = if c == "quantity" {
                    AggFunc::Sum
                } else {
                    agg.func()
                };
                Agg::same(c, func)
            })
            .collect();

        products.group_by(&["category"])?.agg(&aggs)
    }

    fn numeric_items(&self) -> Result<DataBatch> {
        TransformPipeline::new()
            .add_step(TransformStep::CoerceNumeric {
                column: "price".into(),
            })
            .apply(
                self.data
                    .table(TableName::OrderItems)
                    .select(&["product_id", "price"])?,
            )
    }

    /// Distinct (order_id, product_id) pairs.
    fn order_products(&self) -> Result<DataBatch> {
        self.data
            .table(TableName::OrderItems)
            .distinct(&["order_id", "product_id"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_agg_parse() {
        assert_eq!("mean".parse::<CategoryAgg>().unwrap(), CategoryAgg::Mean);
        assert_eq!(" Median ".parse::<CategoryAgg>().unwrap(), CategoryAgg::Median);
        assert!(matches!(
            "mode".parse::<CategoryAgg>(),
            Err(OlistError::InvalidInput(_))
        ));
        assert_eq!(CategoryAgg::default(), CategoryAgg::Mean);
        assert_eq!(CategoryAgg::Max.to_string(), "max");
    }
}
