//! Product listing, detail, bulk activation and removal over HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use catalog_integration_tests::{TestApp, product_payload, variant};

/// Import three products: "Test Shirt", "Plain Hat" (description mentions
/// testing) and "Wool Scarf".
async fn seeded() -> (TestApp, Vec<i64>) {
    let app = TestApp::new().await;
    let mut ids = Vec::new();

    ids.push(
        app.import_ok(&product_payload(1, "Test Shirt", &json!([variant(1, "20.00", 1)])))
            .await,
    );

    let mut hat = product_payload(2, "Plain Hat", &json!([variant(2, "15.00", 1)]));
    hat["product"]["description"] = json!("Field TESTED for durability");
    ids.push(app.import_ok(&hat).await);

    ids.push(
        app.import_ok(&product_payload(3, "Wool Scarf", &json!([variant(3, "30.00", 1)])))
            .await,
    );
    (app, ids)
}

fn titles(body: &Value) -> Vec<&str> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_requires_merchant_id() {
    let app = TestApp::new().await;

    let response = app.get("/api/products/").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "merchant_id query parameter is required");

    let response = app.get("/api/products?merchant_id=abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["fields"]["merchant_id"].is_array());
}

#[tokio::test]
async fn test_list_unknown_merchant_is_not_found() {
    let app = TestApp::new().await;
    let response = app.get("/api/products/?merchant_id=9999").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Merchant with id 9999 does not exist");
}

#[tokio::test]
async fn test_list_shape_and_order() {
    let (app, ids) = seeded().await;
    let response = app
        .get(&format!("/api/products/?merchant_id={}", app.merchant_id))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["count"], 3);
    assert_eq!(response.body["page"], 1);
    assert_eq!(response.body["page_size"], 20);
    assert_eq!(titles(&response.body), ["Test Shirt", "Plain Hat", "Wool Scarf"]);

    let first = &response.body["results"][0];
    assert_eq!(first["id"], ids[0]);
    assert_eq!(first["external_id"], "1");
    assert_eq!(first["base_price"], "20.00");
    assert_eq!(first["active"], true);
    assert!(first.get("variants").is_none());
}

#[tokio::test]
async fn test_search_is_case_insensitive_over_title_and_description() {
    let (app, _) = seeded().await;
    let response = app
        .get(&format!(
            "/api/products/?merchant_id={}&search=test",
            app.merchant_id
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(titles(&response.body), ["Test Shirt", "Plain Hat"]);
}

#[tokio::test]
async fn test_pagination() {
    let (app, _) = seeded().await;
    let base = format!("/api/products/?merchant_id={}", app.merchant_id);

    let page2 = app.get(&format!("{base}&page=2&page_size=2")).await;
    assert_eq!(page2.body["count"], 3);
    assert_eq!(titles(&page2.body), ["Wool Scarf"]);

    let past_end = app.get(&format!("{base}&page=9&page_size=2")).await;
    assert_eq!(past_end.status, StatusCode::OK);
    assert!(titles(&past_end.body).is_empty());

    let capped = app.get(&format!("{base}&page_size=1000")).await;
    assert_eq!(capped.body["page_size"], 100);

    let invalid = app.get(&format!("{base}&page=0")).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_detail_includes_variants_and_merchant() {
    let (app, ids) = seeded().await;
    let response = app.get(&format!("/api/products/{}/", ids[1])).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["merchant_id"], app.merchant_id.as_i32());
    assert_eq!(response.body["merchant_name"], "Test Store");
    assert_eq!(response.body["product_type"], "Apparel");
    assert_eq!(response.body["variants"][0]["sku"], "SKU-2");
    assert_eq!(response.body["variants"][0]["retail_price"], "15.00");
}

#[tokio::test]
async fn test_detail_not_found() {
    let app = TestApp::new().await;
    for uri in ["/api/products/9999/", "/api/products/not-a-number"] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(response.body["error"], "Product not found");
    }
}

#[tokio::test]
async fn test_bulk_activate_ignores_unknown_ids() {
    let (app, ids) = seeded().await;
    let response = app
        .post(
            "/api/products/bulk-activate/",
            &json!({"product_ids": [ids[0], ids[1], 999], "active": false}),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "message": "Successfully updated 2 products",
            "updated_count": 2,
            "active": false,
        })
    );

    let inactive = app
        .get(&format!(
            "/api/products/?merchant_id={}&active=false",
            app.merchant_id
        ))
        .await;
    assert_eq!(titles(&inactive.body), ["Test Shirt", "Plain Hat"]);
}

#[tokio::test]
async fn test_bulk_activate_accepts_id_strings_and_oversized_ids() {
    let (app, ids) = seeded().await;
    let response = app
        .post(
            "/api/products/bulk-activate/",
            &json!({
                "product_ids": [ids[0].to_string(), 3_000_000_000_i64],
                "active": false
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["updated_count"], 1);
}

#[tokio::test]
async fn test_bulk_activate_validation() {
    let app = TestApp::new().await;

    for body in [
        json!({"product_ids": [], "active": true}),
        json!({"product_ids": ["x"], "active": true}),
        json!({"product_ids": [1]}),
        json!({"active": "yes", "product_ids": 5}),
    ] {
        let response = app.post("/api/products/bulk-activate", &body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response.body["fields"].is_object());
    }
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let (app, ids) = seeded().await;
    let uri = format!("/api/products/{}/remove/", ids[2]);

    for _ in 0..2 {
        let response = app.post(&uri, &json!({})).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.body,
            json!({
                "message": "Product \"Wool Scarf\" has been deactivated",
                "product_id": ids[2],
            })
        );
    }

    let detail = app.get(&format!("/api/products/{}", ids[2])).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["active"], false);

    let missing = app.post("/api/products/9999/remove", &json!({})).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reimport_does_not_reactivate() {
    let (app, ids) = seeded().await;
    app.post(&format!("/api/products/{}/remove", ids[0]), &json!({}))
        .await;

    let response = app
        .import(&product_payload(1, "Test Shirt", &json!([variant(1, "21.00", 1)])))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["active"], false);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = TestApp::new().await;

    let health = app.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, "ok");
    assert!(health.headers.contains_key("x-request-id"));

    let ready = app.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}
