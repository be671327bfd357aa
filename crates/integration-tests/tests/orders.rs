//! Integration tests for the enriched order endpoints.

use order_enricher_integration_tests::{MockShop, TestApp, TestOptions, fixtures};
use reqwest::StatusCode;
use serde_json::{Value, json};

const ORDER_1001: u64 = 450_789_469;
const ORDER_1002: u64 = 450_789_470;
const ORDER_1003: u64 = 450_789_471;

/// Three orders; 1001 and 1002 have spreadsheet rows, 1003 does not.
async fn app_with_orders() -> TestApp {
    let shop = MockShop::default();
    shop.set_csv(fixtures::CUSTOMER_CSV);
    shop.add_order(fixtures::order(ORDER_1001, 1001));
    shop.add_order(fixtures::order(ORDER_1002, 1002));
    shop.add_order(fixtures::order(ORDER_1003, 1003));
    TestApp::spawn(shop, TestOptions::default()).await
}

fn find(orders: &Value, id: u64) -> &Value {
    orders
        .as_array()
        .expect("orders is not an array")
        .iter()
        .find(|order| order["id"] == json!(id))
        .expect("order missing from response")
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_orders_enriches_each_order() {
    let app = app_with_orders().await;

    let (status, body) = app.get_json("/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["count"], json!(3));

    let order = find(&body["orders"], ORDER_1001);
    assert_eq!(
        order["customer_info"],
        json!({
            "id": 207_119_551,
            "email": "sheet.jane@example.com",
            "first_name": "Jane",
            "last_name": "Sheetley",
            "full_name": "Jane Sheetley",
            "phone": "+1 613 555 0101",
            "accepts_marketing": true
        })
    );
    assert_eq!(order["shipping_info"]["address1"], json!("12 Bank St, Unit 4"));
    assert_eq!(order["shipping_info"]["city"], json!("Ottawa"));
    assert_eq!(order["enrichment"], json!({ "status": "enriched" }));

    // Original fields pass through untouched
    assert_eq!(order["tags"], json!("wholesale"));
    assert_eq!(order["total_price"], json!("199.00"));
    assert_eq!(order["customer"]["email"], json!("platform@example.com"));

    let transactions = order["transactions"].as_array().expect("no transactions");
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["amount"], json!("199.00"));
    assert_eq!(transactions[0]["kind"], json!("sale"));
    assert!(transactions[0].get("payment_details").is_none());
}

#[tokio::test]
async fn test_order_without_sheet_entry_uses_platform_fields() {
    let app = app_with_orders().await;

    let (_, body) = app.get_json("/orders").await;
    let info = &find(&body["orders"], ORDER_1003)["customer_info"];

    assert_eq!(info["email"], json!("platform@example.com"));
    assert_eq!(info["full_name"], json!("Platform Person"));
    assert_eq!(info["phone"], json!("+1 416 555 0199"));
    assert_eq!(
        find(&body["orders"], ORDER_1003)["shipping_info"]["city"],
        json!("Toronto")
    );
}

#[tokio::test]
async fn test_sheet_precedence_is_per_field() {
    let app = app_with_orders().await;

    let (_, body) = app.get_json("/orders").await;
    let info = &find(&body["orders"], ORDER_1002)["customer_info"];

    // The sheet row for 1002 only carries a first name
    assert_eq!(info["first_name"], json!("Sam"));
    assert_eq!(info["last_name"], json!("Person"));
    assert_eq!(info["full_name"], json!("Sam Person"));
    assert_eq!(info["email"], json!("platform@example.com"));
}

#[tokio::test]
async fn test_guest_order_falls_back_to_contact_email() {
    let shop = MockShop::default();
    shop.add_order(fixtures::guest_order(ORDER_1001, 1001));
    let app = TestApp::spawn(shop, TestOptions::default()).await;

    let (_, body) = app.get_json("/orders").await;
    let info = &body["orders"][0]["customer_info"];

    assert_eq!(info["id"], Value::Null);
    assert_eq!(info["email"], json!("guest1001@example.com"));
    assert_eq!(info["full_name"], Value::Null);
    assert_eq!(info["accepts_marketing"], json!(false));
}

#[tokio::test]
async fn test_include_transactions_false_skips_fetch() {
    let app = app_with_orders().await;

    let (status, body) = app.get_json("/orders?include_transactions=false").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["orders"][0].get("transactions").is_none());
    assert_eq!(app.shop.transaction_requests(), 0);
    assert_eq!(app.shop.variant_requests(), 0);
}

#[tokio::test]
async fn test_include_sku_resolves_blank_skus() {
    let app = app_with_orders().await;

    let (_, body) = app
        .get_json("/orders?include_sku=true&include_transactions=false")
        .await;
    let items = &find(&body["orders"], ORDER_1001)["line_items"];

    assert_eq!(items[0]["sku"], json!("SKU-39072856"));
    assert_eq!(items[0]["barcode"], json!("BAR-39072856"));
    // No variant, nothing to look up
    assert_eq!(items[1]["sku"], Value::Null);
    assert_eq!(app.shop.variant_requests(), 3);
}

#[tokio::test]
async fn test_transaction_failure_yields_empty_list() {
    let app = app_with_orders().await;
    app.shop.fail_transactions(ORDER_1002);

    let (status, body) = app.get_json("/orders").await;
    assert_eq!(status, StatusCode::OK);

    let failed = find(&body["orders"], ORDER_1002);
    assert_eq!(failed["transactions"], json!([]));
    assert_eq!(
        failed["enrichment"],
        json!({ "status": "partial", "degraded": ["attach_transactions"] })
    );

    let healthy = find(&body["orders"], ORDER_1001);
    assert_eq!(healthy["transactions"].as_array().map(Vec::len), Some(1));
    assert_eq!(healthy["enrichment"]["status"], json!("enriched"));
}

#[tokio::test]
async fn test_list_failure_is_500_with_message() {
    let app = app_with_orders().await;
    app.shop.fail_list(503, "Service temporarily unavailable");

    let (status, body) = app.get_json("/orders").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|e| e.contains("Service temporarily unavailable"))
    );
}

#[tokio::test]
async fn test_filters_are_forwarded() {
    let app = app_with_orders().await;

    app.get_json("/orders").await;
    let query = app.shop.last_list_query().expect("no listing request");
    assert_eq!(query.get("limit").map(String::as_str), Some("250"));
    assert_eq!(query.get("status").map(String::as_str), Some("any"));
    assert!(!query.contains_key("financial_status"));

    app.get_json("/orders?limit=50&status=open&financial_status=paid&created_at_min=2024-01-01T00:00:00Z")
        .await;
    let query = app.shop.last_list_query().expect("no listing request");
    assert_eq!(query.get("limit").map(String::as_str), Some("50"));
    assert_eq!(query.get("status").map(String::as_str), Some("open"));
    assert_eq!(query.get("financial_status").map(String::as_str), Some("paid"));
    assert_eq!(
        query.get("created_at_min").map(String::as_str),
        Some("2024-01-01T00:00:00Z")
    );
}

#[tokio::test]
async fn test_malformed_limit_is_400() {
    let app = app_with_orders().await;

    let (status, body) = app.get_json("/orders?limit=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(app.shop.last_list_query().is_none());
}

#[tokio::test]
async fn test_batched_listing_preserves_order() {
    let shop = MockShop::default();
    let ids: Vec<u64> = (0..12).map(|n| ORDER_1001 + n).collect();
    for (n, id) in (1001..).zip(&ids) {
        shop.add_order(fixtures::order(*id, n));
    }
    let app = TestApp::spawn(shop, TestOptions::default()).await;

    let (status, body) = app.get_json("/orders").await;
    assert_eq!(status, StatusCode::OK);

    let returned: Vec<u64> = body["orders"]
        .as_array()
        .expect("orders is not an array")
        .iter()
        .filter_map(|order| order["id"].as_u64())
        .collect();
    assert_eq!(returned, ids);
    assert_eq!(app.shop.transaction_requests(), 12);
    assert!(
        body["orders"]
            .as_array()
            .is_some_and(|orders| orders.iter().all(|o| o["transactions"].is_array()))
    );
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn test_rate_limited_transactions_are_retried() {
    let shop = MockShop::default();
    shop.add_order(fixtures::order(ORDER_1001, 1001));
    shop.throttle_transactions(2);
    let app = TestApp::spawn(shop, TestOptions::default()).await;

    let (_, body) = app.get_json("/orders").await;
    assert_eq!(
        body["orders"][0]["transactions"].as_array().map(Vec::len),
        Some(1)
    );
    assert_eq!(body["orders"][0]["enrichment"]["status"], json!("enriched"));
    assert_eq!(app.shop.transaction_requests(), 3);
}

#[tokio::test]
async fn test_exhausted_rate_limit_degrades_to_empty() {
    let shop = MockShop::default();
    shop.add_order(fixtures::order(ORDER_1001, 1001));
    shop.throttle_transactions(10);
    let app = TestApp::spawn(shop, TestOptions::default()).await;

    let (status, body) = app.get_json("/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"][0]["transactions"], json!([]));
    assert_eq!(body["orders"][0]["enrichment"]["status"], json!("partial"));
    assert_eq!(app.shop.transaction_requests(), 3);
}

// ============================================================================
// Single order
// ============================================================================

#[tokio::test]
async fn test_get_order_is_fully_enriched() {
    let app = app_with_orders().await;

    let (status, body) = app.get_json(&format!("/orders/{ORDER_1001}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let order = &body["order"];
    assert_eq!(order["id"], json!(ORDER_1001));
    assert_eq!(order["customer_info"]["email"], json!("sheet.jane@example.com"));
    assert_eq!(order["line_items"][0]["sku"], json!("SKU-39072856"));
    assert_eq!(order["transactions"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_get_order_accepts_gid() {
    let app = app_with_orders().await;

    let (status, body) = app
        .get_json(&format!("/orders/gid%3A%2F%2Fshopify%2FOrder%2F{ORDER_1001}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["id"], json!(ORDER_1001));
}

#[tokio::test]
async fn test_get_order_upstream_failure_is_404() {
    let app = app_with_orders().await;
    app.shop.fail_order(ORDER_1001);

    let (status, body) = app.get_json(&format!("/orders/{ORDER_1001}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().is_some_and(|e| e.contains("Order")));
}

#[tokio::test]
async fn test_get_unknown_order_is_404() {
    let app = app_with_orders().await;

    let (status, _) = app.get_json("/orders/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_order_transaction_failure_still_returns_order() {
    let app = app_with_orders().await;
    app.shop.fail_transactions(ORDER_1001);

    let (status, body) = app.get_json(&format!("/orders/{ORDER_1001}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["transactions"], json!([]));
}

#[tokio::test]
async fn test_non_numeric_order_id_is_404() {
    let app = app_with_orders().await;

    let (status, body) = app.get_json("/orders/latest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));

    let (status, _) = app.get_json("/debug/order/latest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sparse_order_passes_through_unchanged() {
    let shop = MockShop::default();
    shop.add_order(json!({
        "id": ORDER_1003,
        "name": "#1003",
        "financial_status": "partially_voided",
        "total_price": "12.00"
    }));
    let app = TestApp::spawn(shop, TestOptions::default()).await;

    let (status, body) = app.get_json(&format!("/debug/order/{ORDER_1003}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["order"],
        json!({
            "id": ORDER_1003,
            "name": "#1003",
            "financial_status": "partially_voided",
            "total_price": "12.00"
        })
    );
    assert_eq!(body["derived"]["payment_captured"], json!(false));

    let (status, body) = app.get_json(&format!("/orders/{ORDER_1003}")).await;
    assert_eq!(status, StatusCode::OK);
    let order = &body["order"];
    assert_eq!(order["financial_status"], json!("partially_voided"));
    assert!(order.get("line_items").is_none());
    assert!(order.get("email").is_none());
    assert!(order.get("customer").is_none());
}

// ============================================================================
// Diagnostics
// ============================================================================

#[tokio::test]
async fn test_debug_order_reports_derivation() {
    let app = app_with_orders().await;

    let (status, body) = app.get_json(&format!("/debug/order/{ORDER_1001}")).await;
    assert_eq!(status, StatusCode::OK);

    // Raw order: no enrichment fields
    assert!(body["order"].get("customer_info").is_none());
    assert_eq!(body["order"]["line_items"][0]["sku"], json!(""));

    let derived = &body["derived"];
    assert_eq!(derived["has_customer"], json!(true));
    assert_eq!(derived["has_shipping_address"], json!(true));
    assert_eq!(derived["has_billing_address"], json!(false));
    assert_eq!(derived["normalized_order_number"], json!("1001"));
    assert_eq!(derived["has_sheet_entry"], json!(true));
    assert_eq!(derived["financial_status"], json!("paid"));
    assert_eq!(derived["payment_captured"], json!(true));
    assert_eq!(derived["line_items_missing_sku"], json!(1));
    assert_eq!(
        derived["reconciled"]["customer"]["email"],
        json!("sheet.jane@example.com")
    );
}
