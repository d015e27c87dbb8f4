//! Per-review features.

use olist_core::data::value;
use olist_core::data::{Agg, AggFunc, DataBatch, TransformPipeline, TransformStep};
use olist_core::{Olist, OlistData, Result, TableName};
use serde_json::Value;
use std::sync::Arc;

/// Review-level feature builder.
#[derive(Debug, Clone)]
pub struct ReviewFeatures {
    data: Arc<OlistData>,
}

impl ReviewFeatures {
    pub fn new(data: Arc<OlistData>) -> Self {
        Self { data }
    }

    pub fn load(olist: &Olist) -> Result<Self> {
        Ok(Self::new(Arc::new(olist.get_data()?)))
    }

    /// `review_id, length_review, review_score`. A missing comment has length 0.
    pub fn get_review_length(&self) -> Result<DataBatch> {
        let reviews = TransformPipeline::new()
            .add_step(TransformStep::FillNull {
                column: "review_comment_message".into(),
                value: Value::String(String::new()),
            })
            .apply(self.data.table(TableName::OrderReviews).clone())?;

        let lengths = reviews
            .column_values("review_comment_message")?
            .into_iter()
            .map(|cell| Value::from(value::to_text(cell).chars().count()))
            .collect();

        reviews
            .with_column("length_review", lengths)?
            .select(&["review_id", "length_review", "review_score"])
    }

    /// `review_id, order_id, product_category_name`: the most frequent
    /// category among the order's line items, ties going to the
    /// alphabetically first name.
    pub fn get_main_product_category(&self) -> Result<DataBatch> {
        let items = self
            .data
            .table(TableName::OrderItems)
            .select(&["order_id", "product_id"])?;
        let products = self
            .data
            .table(TableName::Products)
            .select(&["product_id", "product_category_name"])?;

        self.data
            .table(TableName::OrderReviews)
            .distinct(&["review_id", "order_id"])?
            .left_join(&items, &["order_id"])?
            .left_join(&products, &["product_id"])?
            .group_by(&["review_id", "order_id"])?
            .agg(&[Agg::same("product_category_name", AggFunc::Mode)])
    }

    /// `review_id, order_id, product_category_name, length_review,
    /// review_score`, without rows lacking a score or a category.
    pub fn get_training_data(&self) -> Result<DataBatch> {
        let df = self
            .get_main_product_category()?
            .left_join(&self.get_review_length()?, &["review_id"])?
            .drop_nulls(Some(&["review_score", "product_category_name"][..]))?;

        let (df, _) = df.try_cast_integer("review_score")?;
        let df = TransformPipeline::new()
            .add_step(TransformStep::FillNull {
                column: "length_review".into(),
                value: Value::from(0),
            })
            .apply(df)?;
        let (df, _) = df.try_cast_integer("length_review")?;

        tracing::debug!(rows = df.row_count(), "Assembled review training data");
        Ok(df)
    }
}
