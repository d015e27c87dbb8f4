//! Synthetic Olist directory shared by the integration tests.
//!
//! Two orders: `o1` is delivered and reviewed 5 stars, `o2` is still shipping
//! and reviewed 1 star. Product `p1` appears twice in `o1`.

#![allow(dead_code)]

use olist_core::Olist;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;

pub type Files = BTreeMap<&'static str, String>;

pub fn fixture_files() -> Files {
    let mut files = Files::new();
    files.insert(
        "olist_customers_dataset.csv",
        "customer_id,customer_unique_id,customer_zip_code_prefix,customer_city,customer_state\n\
         c1,u1,1001,sao paulo,SP\n\
         c2,u2,20000,rio de janeiro,RJ\n"
            .to_string(),
    );
    files.insert(
        "olist_geolocation_dataset.csv",
        "geolocation_zip_code_prefix,geolocation_lat,geolocation_lng,geolocation_city,geolocation_state\n\
         1001,-23.50,-46.60,sao paulo,SP\n\
         1001,-23.60,-46.70,sao paulo,SP\n\
         20000,-22.90,-43.20,rio de janeiro,RJ\n\
         13000,-22.90,-47.06,campinas,SP\n"
            .to_string(),
    );
    files.insert(
        "olist_order_items_dataset.csv",
        "order_id,order_item_id,product_id,seller_id,shipping_limit_date,price,freight_value\n\
         o1,1,p1,s1,2018-01-03 10:00:00,50.0,10.0\n\
         o1,2,p1,s1,2018-01-03 10:00:00,50.0,10.0\n\
         o1,3,p2,s2,2018-01-03 10:00:00,30.0,5.5\n\
         o2,1,p2,s2,2018-02-03 08:00:00,25.0,4.5\n"
            .to_string(),
    );
    files.insert(
        "olist_order_payments_dataset.csv",
        "order_id,payment_sequential,payment_type,payment_installments,payment_value\n\
         o1,1,credit_card,2,155.5\n\
         o2,1,boleto,1,29.5\n"
            .to_string(),
    );
    files.insert(
        "olist_order_reviews_dataset.csv",
        "review_id,order_id,review_score,review_comment_title,review_comment_message,review_creation_date,review_answer_timestamp\n\
         r1,o1,5,,\"Ótimo, chegou antes!\",2018-01-06 00:00:00,2018-01-07 10:00:00\n\
         r2,o2,1,,,2018-02-16 00:00:00,2018-02-17 00:00:00\n"
            .to_string(),
    );
    files.insert(
        "olist_orders_dataset.csv",
        "order_id,customer_id,order_status,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date,order_delivered_customer_date,order_estimated_delivery_date\n\
         o1,c1,delivered,2018-01-01 10:00:00,2018-01-01 11:00:00,2018-01-02 10:00:00,2018-01-05 22:00:00,2018-01-11 10:00:00\n\
         o2,c2,shipped,2018-02-01 08:00:00,2018-02-01 09:00:00,2018-02-02 08:00:00,,2018-02-15 08:00:00\n"
            .to_string(),
    );
    files.insert(
        "product_category_name_translation.csv",
        "product_category_name,product_category_name_english\n\
         beleza_saude,health_beauty\n\
         esporte_lazer,sports_leisure\n"
            .to_string(),
    );
    files.insert(
        "olist_products_dataset.csv",
        "product_id,product_category_name,product_name_lenght,product_description_lenght,product_photos_qty,product_weight_g,product_length_cm,product_height_cm,product_width_cm\n\
         p1,beleza_saude,40,300,2,500,20,10,15\n\
         p2,esporte_lazer,35,250,1,1200,30,20,25\n\
         p3,beleza_saude,20,100,1,300,10,5,10\n\
         p4,,10,50,1,100,5,5,5\n"
            .to_string(),
    );
    files.insert(
        "olist_sellers_dataset.csv",
        "seller_id,seller_zip_code_prefix,seller_city,seller_state\n\
         s1,13000,campinas,SP\n\
         s2,20000,rio de janeiro,RJ\n"
            .to_string(),
    );
    files
}

/// Write `files` into a fresh temporary directory.
pub fn write_dir(files: &Files) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

/// Load `files` and hand back the shared raw tables. The directory is
/// returned so it outlives the test body.
pub fn load(files: &Files) -> (TempDir, Arc<olist_core::OlistData>) {
    olist_core::logging::init_tracing("warn");
    let dir = write_dir(files);
    let data = Olist::new(dir.path()).get_data().unwrap();
    (dir, Arc::new(data))
}

pub fn fixture() -> (TempDir, Arc<olist_core::OlistData>) {
    load(&fixture_files())
}

/// Append CSV rows to one fixture file.
pub fn append_rows(files: &mut Files, name: &'static str, rows: &str) {
    let content = files.get_mut(name).unwrap();
    content.push_str(rows);
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
