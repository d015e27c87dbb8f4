//! Product feature tables over the synthetic fixture.

mod common;

use common::fixture;
use olist_core::data::value::as_f64;
use olist_features::{CategoryAgg, ProductFeatures};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn row_of<'a>(batch: &'a olist_core::DataBatch, key: &str, id: &str) -> &'a [Value] {
    let idx = batch.require_column(key).unwrap();
    batch
        .rows
        .iter()
        .find(|row| row[idx].as_str() == Some(id))
        .map(Vec::as_slice)
        .unwrap_or_else(|| panic!("no row {id}"))
}

fn cell(batch: &olist_core::DataBatch, key: &str, id: &str, column: &str) -> Value {
    let idx = batch.require_column(column).unwrap();
    row_of(batch, key, id)[idx].clone()
}

#[test]
fn test_product_features_translate_and_fix_typos() {
    let (_dir, data) = fixture();
    let features = ProductFeatures::new(data).get_product_features().unwrap();

    assert_eq!(
        features.columns,
        vec![
            "product_id",
            "product_name_length",
            "product_description_length",
            "product_photos_qty",
            "product_weight_g",
            "product_length_cm",
            "product_height_cm",
            "product_width_cm",
            "category",
        ]
    );
    assert_eq!(cell(&features, "product_id", "p1", "category"), json!("health_beauty"));
    assert_eq!(cell(&features, "product_id", "p2", "category"), json!("sports_leisure"));
    assert_eq!(cell(&features, "product_id", "p4", "category"), Value::Null);
}

#[test]
fn test_price_sales_quantity() {
    let (_dir, data) = fixture();
    let products = ProductFeatures::new(data);

    let price = products.get_price().unwrap();
    assert_eq!(price.columns, vec!["product_id", "price"]);
    assert_eq!(price.rows, vec![vec![json!("p1"), json!(50.0)], vec![json!("p2"), json!(27.5)]]);

    let sales = products.get_sales().unwrap();
    assert_eq!(sales.columns, vec!["product_id", "sales"]);
    assert_eq!(sales.rows, vec![vec![json!("p1"), json!(100.0)], vec![json!("p2"), json!(55.0)]]);

    let quantity = products.get_quantity().unwrap();
    assert_eq!(quantity.columns, vec!["product_id", "n_orders", "quantity"]);
    assert_eq!(
        quantity.rows,
        vec![
            vec![json!("p1"), json!(1), json!(2)],
            vec![json!("p2"), json!(2), json!(2)],
        ]
    );
}

#[test]
fn test_wait_time_uses_delivered_orders_once() {
    let (_dir, data) = fixture();
    let wt = ProductFeatures::new(data).get_wait_time().unwrap();
    assert_eq!(wt.columns, vec!["product_id", "wait_time"]);
    // p1 is in o1 twice; p2 is in o1 and the undelivered o2
    assert_eq!(wt.rows, vec![vec![json!("p1"), json!(4.5)], vec![json!("p2"), json!(4.5)]]);
}

#[test]
fn test_review_shares() {
    let (_dir, data) = fixture();
    let reviews = ProductFeatures::new(data).get_review_score().unwrap();
    assert_eq!(
        reviews.columns,
        vec!["product_id", "share_of_one_stars", "share_of_five_stars", "review_score"]
    );
    assert_eq!(
        reviews.rows,
        vec![
            vec![json!("p1"), json!(0.0), json!(1.0), json!(5.0)],
            vec![json!("p2"), json!(0.5), json!(0.5), json!(3.0)],
        ]
    );
}

#[test]
fn test_training_data_keeps_products_without_sales() {
    let (_dir, data) = fixture();
    let training = ProductFeatures::new(data).get_training_data().unwrap();

    assert_eq!(training.row_count(), 4);
    assert_eq!(
        &training.columns[8..],
        &[
            "category",
            "wait_time",
            "price",
            "share_of_one_stars",
            "share_of_five_stars",
            "review_score",
            "n_orders",
            "quantity",
            "sales",
        ]
    );
    assert_eq!(cell(&training, "product_id", "p3", "quantity"), Value::Null);
    assert_eq!(cell(&training, "product_id", "p3", "price"), Value::Null);
    assert_eq!(cell(&training, "product_id", "p2", "sales"), json!(55.0));
}

#[test]
fn test_product_cat_mean_sums_quantity() {
    let (_dir, data) = fixture();
    let cat = ProductFeatures::new(data)
        .get_product_cat(CategoryAgg::Mean)
        .unwrap();

    assert_eq!(cat.columns[0], "category");
    assert!(!cat.has_column("product_id"));
    // p4 has no category and is left out
    assert_eq!(cat.row_count(), 2);
    assert_eq!(cat.get(0, "category"), Some(&json!("health_beauty")));
    assert_eq!(cat.get(1, "category"), Some(&json!("sports_leisure")));

    // health_beauty = p1 (sold twice) + p3 (never sold)
    assert_eq!(cat.get(0, "quantity"), Some(&json!(2)));
    assert_eq!(cat.get(0, "product_weight_g").and_then(as_f64), Some(400.0));
    assert_eq!(cat.get(0, "price").and_then(as_f64), Some(50.0));
    assert_eq!(cat.get(1, "quantity"), Some(&json!(2)));
}

#[test]
fn test_product_cat_other_aggregators() {
    let (_dir, data) = fixture();
    let products = ProductFeatures::new(data);

    let max = products.get_product_cat("max".parse().unwrap()).unwrap();
    assert_eq!(max.get(0, "product_weight_g"), Some(&json!(500)));
    assert_eq!(max.get(0, "quantity"), Some(&json!(2)));

    let sum = products.get_product_cat(CategoryAgg::Sum).unwrap();
    assert_eq!(sum.get(0, "product_weight_g"), Some(&json!(800)));
}
