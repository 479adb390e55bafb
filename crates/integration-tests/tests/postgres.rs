//! Catalog behaviour over `PostgreSQL`.
//!
//! These tests require a reachable `PostgreSQL` database in
//! `CATALOG_DATABASE_URL` (or `DATABASE_URL`). Migrations are applied on
//! start. Every test registers its own merchant under a random store URL, so
//! the suite can share one database and run in parallel.
//!
//! Run with:
//! `cargo test -p catalog-integration-tests --test postgres -- --ignored`

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use catalog_api::config::ApiConfig;
use catalog_api::db::{CatalogStore, PgCatalogStore, RepositoryError, create_pool};
use catalog_api::models::NewMerchant;
use catalog_core::{Email, Price, ProductInput, VariantInput};
use catalog_integration_tests::{TestApp, product_payload, variant};

async fn pg_app() -> (TestApp<PgCatalogStore>, String) {
    let database_url = ApiConfig::database_url_from_env().unwrap();
    let pool = create_pool(&database_url).await.unwrap();
    sqlx::migrate!("../api/migrations").run(&pool).await.unwrap();

    let store_url = format!("{}.myshopify.com", Uuid::new_v4());
    let app = TestApp::with_store(PgCatalogStore::new(pool), &store_url).await;
    (app, store_url)
}

fn payload(store_url: &str, external_id: i64, title: &str, variants: &Value) -> Value {
    let mut payload = product_payload(external_id, title, variants);
    payload["store_url"] = json!(store_url);
    payload
}

fn variant_input(external_id: &str, price: &str, inventory_quantity: i32) -> VariantInput {
    VariantInput {
        external_id: external_id.to_owned(),
        title: format!("Variant {external_id}"),
        sku: None,
        price: Price::parse(price).unwrap(),
        compare_at_price: None,
        inventory_quantity,
    }
}

async fn product_count(app: &TestApp<PgCatalogStore>) -> Value {
    app.get(&format!("/api/products/?merchant_id={}", app.merchant_id))
        .await
        .body["count"]
        .clone()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CATALOG_DATABASE_URL)"]
async fn test_reimport_updates_the_same_row() {
    let (app, store_url) = pg_app().await;
    let body = payload(
        &store_url,
        632_910_392,
        "IPod Nano - 8GB",
        &json!([variant(1, "199.00", 10), variant(2, "149.50", 3)]),
    );

    let first = app.import(&body).await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    assert_eq!(first.body["base_price"], "149.50");

    let second = app.import(&body).await;
    assert_eq!(second.status, StatusCode::OK, "{}", second.body);
    assert_eq!(second.body["id"], first.body["id"]);
    assert_eq!(product_count(&app).await, 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CATALOG_DATABASE_URL)"]
async fn test_reimport_merges_variants_and_keeps_omitted_fields() {
    let (app, store_url) = pg_app().await;
    let id = app
        .import_ok(&payload(
            &store_url,
            10,
            "Shirt",
            &json!([variant(1, "20.00", 5), variant(2, "15.00", 1)]),
        ))
        .await;

    let mut update = payload(
        &store_url,
        10,
        "Shirt v2",
        &json!([variant(1, "12.00", 9), variant(3, "30.00", 0)]),
    );
    let product = update["product"].as_object_mut().unwrap();
    product.remove("description");
    product.remove("product_type");
    assert_eq!(app.import(&update).await.status, StatusCode::OK);

    let detail = app.get(&format!("/api/products/{id}/")).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["title"], "Shirt v2");
    assert_eq!(detail.body["description"], "Description of Shirt");
    assert_eq!(detail.body["product_type"], "Apparel");
    assert_eq!(detail.body["base_price"], "12.00");

    let variants = detail.body["variants"].as_array().unwrap();
    let summary: Vec<_> = variants
        .iter()
        .map(|v| {
            (
                v["external_id"].as_str().unwrap(),
                v["price"].as_str().unwrap(),
                v["inventory_quantity"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        [("1", "12.00", 9), ("2", "15.00", 1), ("3", "30.00", 0)]
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CATALOG_DATABASE_URL)"]
async fn test_failed_variant_rolls_back_the_whole_import() {
    let (app, _) = pg_app().await;
    let input = ProductInput {
        external_id: "broken".to_owned(),
        title: "Broken".to_owned(),
        description: None,
        product_type: None,
        // Negative stock passes the type system but not the CHECK constraint.
        variants: vec![variant_input("1", "5.00", 1), variant_input("2", "6.00", -1)],
    };

    let err = app
        .store()
        .import_product(app.merchant_id, &input)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Database(_)), "{err}");
    assert_eq!(product_count(&app).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CATALOG_DATABASE_URL)"]
async fn test_search_treats_wildcards_literally() {
    let (app, store_url) = pg_app().await;
    app.import_ok(&payload(&store_url, 1, "100% Cotton Tee", &json!([])))
        .await;
    app.import_ok(&payload(&store_url, 2, "1000 Yarns", &json!([])))
        .await;
    app.import_ok(&payload(&store_url, 3, "Under_score Cap", &json!([])))
        .await;

    let percent = app
        .get(&format!(
            "/api/products/?merchant_id={}&search=100%25",
            app.merchant_id
        ))
        .await;
    assert_eq!(percent.body["count"], 1);
    assert_eq!(percent.body["results"][0]["title"], "100% Cotton Tee");

    let underscore = app
        .get(&format!(
            "/api/products/?merchant_id={}&search=r_s",
            app.merchant_id
        ))
        .await;
    assert_eq!(underscore.body["count"], 1);
    assert_eq!(underscore.body["results"][0]["title"], "Under_score Cap");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CATALOG_DATABASE_URL)"]
async fn test_bulk_count_ignores_unknown_ids() {
    let (app, store_url) = pg_app().await;
    let a = app.import_ok(&payload(&store_url, 1, "A", &json!([]))).await;
    let b = app.import_ok(&payload(&store_url, 2, "B", &json!([]))).await;

    for _ in 0..2 {
        let response = app
            .post(
                "/api/products/bulk-activate/",
                &json!({"product_ids": [a, b, b, 3_000_000_000_i64], "active": false}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        assert_eq!(response.body["updated_count"], 2);
    }

    let inactive = app
        .get(&format!(
            "/api/products/?merchant_id={}&active=false",
            app.merchant_id
        ))
        .await;
    assert_eq!(inactive.body["count"], 2);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CATALOG_DATABASE_URL)"]
async fn test_duplicate_store_url_is_a_conflict() {
    let (app, store_url) = pg_app().await;
    let err = app
        .store()
        .create_merchant(&NewMerchant {
            name: "Copycat".to_owned(),
            email: Email::parse("copycat@example.com").unwrap(),
            store_url,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)), "{err}");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (CATALOG_DATABASE_URL)"]
async fn test_concurrent_imports_converge_on_one_row() {
    let (app, _) = pg_app().await;
    let input = ProductInput {
        external_id: "race".to_owned(),
        title: "Race".to_owned(),
        description: Some("Same product, many workers".to_owned()),
        product_type: None,
        variants: vec![variant_input("1", "9.99", 3)],
    };

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let store = app.store().clone();
        let input = input.clone();
        let merchant_id = app.merchant_id;
        tasks.push(tokio::spawn(async move {
            store.import_product(merchant_id, &input).await.unwrap()
        }));
    }

    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.unwrap());
    }

    assert_eq!(outcomes.iter().filter(|o| o.created).count(), 1);
    assert!(outcomes.iter().all(|o| o.product_id == outcomes[0].product_id));
    assert_eq!(product_count(&app).await, 1);
}
