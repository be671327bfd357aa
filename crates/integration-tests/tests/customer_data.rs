//! Integration tests for the spreadsheet cache: health reporting and refresh.

use order_enricher_integration_tests::{MockShop, TestApp, TestOptions, fixtures};
use reqwest::StatusCode;
use serde_json::json;

const ORDER_1001: u64 = 450_789_469;

#[tokio::test]
async fn test_health_reports_loaded_cache() {
    let shop = MockShop::default();
    shop.set_csv(fixtures::CUSTOMER_CSV);
    let app = TestApp::spawn(shop, TestOptions::default()).await;

    let (status, body) = app.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["status"], json!("healthy"));
    assert!(body["timestamp"].is_string());

    let cache = &body["customer_cache"];
    assert_eq!(cache["entries"], json!(2));
    assert_eq!(cache["source_configured"], json!(true));
    assert!(cache["last_refreshed"].is_string());
    assert!(cache["last_error"].is_null());
}

#[tokio::test]
async fn test_health_without_sheet_source() {
    let options = TestOptions {
        sheet: false,
        ..TestOptions::default()
    };
    let app = TestApp::spawn(MockShop::default(), options).await;

    let (status, body) = app.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["customer_cache"]["entries"], json!(0));
    assert_eq!(body["customer_cache"]["source_configured"], json!(false));
}

#[tokio::test]
async fn test_failed_load_empties_cache_but_stays_healthy() {
    // No CSV seeded: the export answers 404
    let app = TestApp::spawn(MockShop::default(), TestOptions::default()).await;

    let (status, body) = app.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer_cache"]["entries"], json!(0));
    assert!(
        body["customer_cache"]["last_error"]
            .as_str()
            .is_some_and(|e| e.contains("404"))
    );
}

#[tokio::test]
async fn test_refresh_picks_up_new_rows() {
    let shop = MockShop::default();
    shop.add_order(fixtures::order(ORDER_1001, 1001));
    let app = TestApp::spawn(shop, TestOptions::default()).await;

    // Before the sheet exists, platform data is used
    let (_, body) = app.get_json(&format!("/orders/{ORDER_1001}")).await;
    assert_eq!(
        body["order"]["customer_info"]["email"],
        json!("platform@example.com")
    );

    app.shop.set_csv(fixtures::CUSTOMER_CSV);
    let resp = app.post_json("/refresh-customer-data", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.expect("Response was not JSON");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["count"], json!(2));
    assert!(body["message"].is_string());
    assert!(body["timestamp"].is_string());
    assert!(body.get("last_error").is_none());

    let (_, body) = app.get_json(&format!("/orders/{ORDER_1001}")).await;
    assert_eq!(
        body["order"]["customer_info"]["email"],
        json!("sheet.jane@example.com")
    );
}

#[tokio::test]
async fn test_failed_refresh_replaces_cache_with_empty() {
    let shop = MockShop::default();
    shop.set_csv(fixtures::CUSTOMER_CSV);
    let app = TestApp::spawn(shop, TestOptions::default()).await;

    app.shop.remove_csv();
    let resp = app.post_json("/refresh-customer-data", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.expect("Response was not JSON");
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["count"], json!(0));
    assert!(body["last_error"].is_string());

    let (_, health) = app.get_json("/health").await;
    assert_eq!(health["customer_cache"]["entries"], json!(0));
}

#[tokio::test]
async fn test_unparsable_sheet_is_reported() {
    let shop = MockShop::default();
    shop.set_csv("Email,Phone\nx@example.com,123\n");
    let app = TestApp::spawn(shop, TestOptions::default()).await;

    let (_, body) = app.get_json("/health").await;
    assert_eq!(body["customer_cache"]["entries"], json!(0));
    assert!(body["customer_cache"]["last_error"].is_string());
}
