//! Review feature tables over the synthetic fixture.

mod common;

use common::{append_rows, fixture, fixture_files, load};
use olist_features::ReviewFeatures;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[test]
fn test_review_length_counts_characters() {
    let (_dir, data) = fixture();
    let lengths = ReviewFeatures::new(data).get_review_length().unwrap();

    assert_eq!(lengths.columns, vec!["review_id", "length_review", "review_score"]);
    assert_eq!(
        lengths.rows,
        vec![
            vec![json!("r1"), json!(20), json!(5)],
            vec![json!("r2"), json!(0), json!(1)],
        ]
    );
}

#[test]
fn test_main_category_majority() {
    let (_dir, data) = fixture();
    let cats = ReviewFeatures::new(data).get_main_product_category().unwrap();

    assert_eq!(cats.columns, vec!["review_id", "order_id", "product_category_name"]);
    // o1 holds beleza_saude twice and esporte_lazer once
    assert_eq!(
        cats.rows,
        vec![
            vec![json!("r1"), json!("o1"), json!("beleza_saude")],
            vec![json!("r2"), json!("o2"), json!("esporte_lazer")],
        ]
    );
}

fn with_tied_order() -> common::Files {
    let mut files = fixture_files();
    append_rows(
        &mut files,
        "olist_orders_dataset.csv",
        "o3,c1,canceled,2018-03-01 00:00:00,,,,2018-03-10 00:00:00\n",
    );
    append_rows(
        &mut files,
        "olist_order_items_dataset.csv",
        "o3,1,p2,s2,2018-03-02 00:00:00,30.0,5.5\n\
         o3,2,p1,s1,2018-03-02 00:00:00,50.0,10.0\n",
    );
    append_rows(
        &mut files,
        "olist_order_reviews_dataset.csv",
        "r3,o3,2,,ok,2018-03-05 00:00:00,2018-03-06 00:00:00\n\
         r4,o4,3,,never shipped,2018-03-05 00:00:00,2018-03-06 00:00:00\n",
    );
    files
}

#[test]
fn test_main_category_tie_goes_alphabetical() {
    let (_dir, data) = load(&with_tied_order());
    let cats = ReviewFeatures::new(data).get_main_product_category().unwrap();

    let r3 = cats.rows.iter().find(|r| r[0] == json!("r3")).unwrap();
    assert_eq!(r3[2], json!("beleza_saude"));

    // o4 has no line items
    let r4 = cats.rows.iter().find(|r| r[0] == json!("r4")).unwrap();
    assert_eq!(r4[2], Value::Null);
}

#[test]
fn test_training_data_drops_uncategorised() {
    let (_dir, data) = load(&with_tied_order());
    let df = ReviewFeatures::new(data).get_training_data().unwrap();

    assert_eq!(
        df.columns,
        vec!["review_id", "order_id", "product_category_name", "length_review", "review_score"]
    );
    let ids: Vec<&Value> = df.column_values("review_id").unwrap();
    assert_eq!(ids, vec![&json!("r1"), &json!("r2"), &json!("r3")]);
    assert_eq!(df.get(2, "length_review"), Some(&json!(2)));
    assert_eq!(df.get(2, "review_score"), Some(&json!(2)));
}

#[test]
fn test_training_data_keeps_uncastable_scores() {
    let mut files = fixture_files();
    append_rows(
        &mut files,
        "olist_order_reviews_dataset.csv",
        "r3,o1,4.5,,,2018-01-08 00:00:00,2018-01-09 00:00:00\n",
    );
    let (_dir, data) = load(&files);
    let df = ReviewFeatures::new(data).get_training_data().unwrap();

    // a fractional score blocks the integer cast for the whole column
    assert_eq!(df.get(0, "review_score"), Some(&json!(5.0)));
    assert_eq!(df.get(2, "review_score"), Some(&json!(4.5)));
    assert_eq!(df.get(0, "length_review"), Some(&json!(20)));
}
