//! Enriched order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::parse_order_id;
use crate::enrichment::{EnrichOptions, EnrichedOrder, enrich_order, enrich_orders};
use crate::error::AppError;
use crate::shopify::OrderFilters;
use crate::shopify::policy::{UpstreamOp, recover};
use crate::state::AppState;

/// Query parameters for the order listing.
///
/// Everything arrives as text so malformed values produce a JSON 400 rather
/// than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub limit: Option<String>,
    pub status: Option<String>,
    pub financial_status: Option<String>,
    pub created_at_min: Option<String>,
    pub created_at_max: Option<String>,
    pub include_transactions: Option<String>,
    pub include_sku: Option<String>,
}

impl ListOrdersQuery {
    fn filters(&self) -> Result<OrderFilters, AppError> {
        let defaults = OrderFilters::default();

        let limit = match self.limit.as_deref() {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| AppError::BadRequest(format!("invalid limit: {raw:?}")))?,
            None => defaults.limit,
        };

        Ok(OrderFilters {
            status: self.status.clone().unwrap_or(defaults.status),
            financial_status: self.financial_status.clone(),
            created_at_min: self.created_at_min.clone(),
            created_at_max: self.created_at_max.clone(),
            limit,
        })
    }

    /// Transactions are on unless explicitly `false`; SKUs are off unless
    /// explicitly `true`.
    fn options(&self) -> EnrichOptions {
        EnrichOptions {
            transactions: self.include_transactions.as_deref() != Some("false"),
            skus: self.include_sku.as_deref() == Some("true"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub count: usize,
    pub orders: Vec<EnrichedOrder>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: EnrichedOrder,
}

/// List orders, enriched.
///
/// A failure to list orders is the only upstream failure that fails the
/// request.
#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<OrdersResponse>, AppError> {
    let filters = query.filters()?;
    let options = query.options();

    let orders = recover(
        UpstreamOp::ListOrders,
        state.shopify().list_orders(&filters).await,
    )?
    .value;

    let sheet = state.sheet().snapshot().await;
    let orders = enrich_orders(
        state.shopify(),
        &sheet,
        orders,
        options,
        state.config().enrichment,
    )
    .await;

    info!(count = orders.len(), ?options, "Served enriched orders");
    Ok(Json(OrdersResponse {
        success: true,
        count: orders.len(),
        orders,
    }))
}

/// Fetch one order with every enrichment stage applied.
///
/// Any failure to fetch the order is reported as not found.
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order_id = parse_order_id(&order_id)?;

    let order = recover(
        UpstreamOp::GetOrder,
        state.shopify().get_order(order_id).await,
    )?
    .value
    .ok_or_else(|| AppError::NotFound(format!("Order {order_id}")))?;

    let sheet = state.sheet().snapshot().await;
    let order = enrich_order(state.shopify(), &sheet, order, EnrichOptions::ALL).await;

    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Uri;

    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListOrdersQuery {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        let uri: Uri = format!("/orders?{encoded}").parse().unwrap();
        Query::<ListOrdersQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_defaults() {
        let query = query(&[]);
        assert_eq!(query.filters().unwrap(), OrderFilters::default());
        assert_eq!(
            query.options(),
            EnrichOptions {
                transactions: true,
                skus: false
            }
        );
    }

    #[test]
    fn test_only_literal_false_disables_transactions() {
        assert!(!query(&[("include_transactions", "false")]).options().transactions);
        assert!(query(&[("include_transactions", "0")]).options().transactions);
        assert!(query(&[("include_transactions", "FALSE")]).options().transactions);
    }

    #[test]
    fn test_include_sku() {
        assert!(query(&[("include_sku", "true")]).options().skus);
        assert!(!query(&[("include_sku", "yes")]).options().skus);
    }

    #[test]
    fn test_filters_are_forwarded() {
        let filters = query(&[
            ("limit", "50"),
            ("status", "open"),
            ("financial_status", "paid"),
            ("created_at_max", "2024-12-31T23:59:59Z"),
        ])
        .filters()
        .unwrap();

        assert_eq!(filters.limit, 50);
        assert_eq!(filters.status, "open");
        assert_eq!(filters.financial_status.as_deref(), Some("paid"));
        assert_eq!(
            filters.created_at_max.as_deref(),
            Some("2024-12-31T23:59:59Z")
        );
    }

    #[test]
    fn test_malformed_limit_is_bad_request() {
        let err = query(&[("limit", "lots")]).filters().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
