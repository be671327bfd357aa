//! HTTP route handlers.
//!
//! # Route Structure
//!
//! All routes are mounted under the configured base path (default `/api`).
//!
//! ```text
//! GET  /health                  - Liveness plus customer cache status
//!
//! # Orders (signed when SHOPIFY_APP_SECRET is set)
//! GET  /orders                  - Enriched order listing
//! GET  /orders/{order_id}       - Single enriched order
//! GET  /debug/order/{order_id}  - Raw order with reconciliation diagnostics
//!
//! # Cache
//! POST /refresh-customer-data   - Reload the customer spreadsheet
//!
//! # Pass-through
//! POST /graphql                 - Forward to the Admin GraphQL API
//! ```

pub mod customer_data;
pub mod debug;
pub mod graphql;
pub mod health;
pub mod orders;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use order_enricher_core::OrderId;

use crate::error::AppError;
use crate::middleware::verify_app_proxy_signature;
use crate::state::AppState;

/// Build the route table, unprefixed.
pub fn routes(state: &AppState) -> Router<AppState> {
    let signed = Router::new()
        .route("/orders", get(orders::list_orders))
        .route("/orders/{order_id}", get(orders::get_order))
        .route("/debug/order/{order_id}", get(debug::order_diagnostics))
        .route("/refresh-customer-data", post(customer_data::refresh))
        .route("/graphql", post(graphql::forward))
        .route_layer(from_fn_with_state(state.clone(), verify_app_proxy_signature));

    Router::new()
        .route("/health", get(health::health))
        .merge(signed)
}

/// Parse an order ID path segment (numeric or GID form).
///
/// A segment that is not an order ID is answered like an unknown order.
fn parse_order_id(raw: &str) -> Result<OrderId, AppError> {
    raw.parse()
        .map_err(|_: order_enricher_core::ParseIdError| {
            AppError::NotFound(format!("Order {raw}"))
        })
}
