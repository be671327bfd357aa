//! Order Enricher Proxy - Enriched Shopify orders over HTTP.
//!
//! Sits between a storefront (usually through a Shopify app proxy) and the
//! Shopify Admin REST API. Orders are returned with normalized customer and
//! shipping records reconciled against a customer spreadsheet, plus payment
//! transactions and resolved SKUs.
//!
//! # Architecture
//!
//! - [`shopify`] - Admin REST client, rate-limit backoff, failure policies
//! - [`sheets`] - Spreadsheet cache held as an immutable swapped snapshot
//! - [`enrichment`] - Staged per-order pipeline with batching
//! - [`routes`] - Axum handlers mounted under `API_BASE_PATH`
//!
//! The library exposes [`app`] so the router can be exercised in tests
//! without binding a port.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backoff;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod sheets;
pub mod shopify;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the full application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let routes = routes::routes(&state);
    let base_path = state.config().base_path.clone();

    let router = if base_path.is_empty() {
        routes
    } else {
        Router::new().nest(&base_path, routes)
    };

    router
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
