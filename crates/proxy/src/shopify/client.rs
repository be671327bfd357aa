//! REST client for the order, transaction and variant resources.

use std::sync::Arc;
use std::time::Duration;

use order_enricher_core::{Order, OrderId, Transaction, Variant, VariantId};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::ShopifyError;
use crate::backoff::{BackoffPolicy, retry_rate_limited};
use crate::config::ShopifyConfig;

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Per-request timeout for upstream calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest page the orders endpoint returns.
pub const MAX_ORDERS_PER_PAGE: u32 = 250;

/// Retry-After assumed when a 429 carries none.
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Longest upstream error body kept in error messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Filters for the order list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilters {
    /// Order status (`open`, `closed`, `cancelled`, `any`).
    pub status: String,
    pub financial_status: Option<String>,
    pub created_at_min: Option<String>,
    pub created_at_max: Option<String>,
    /// Page size, clamped to `1..=250` when sent.
    pub limit: u32,
}

impl Default for OrderFilters {
    fn default() -> Self {
        Self {
            status: "any".to_string(),
            financial_status: None,
            created_at_min: None,
            created_at_max: None,
            limit: MAX_ORDERS_PER_PAGE,
        }
    }
}

impl OrderFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("status", self.status.clone()),
            ("limit", self.limit.clamp(1, MAX_ORDERS_PER_PAGE).to_string()),
        ];
        let optional = [
            ("financial_status", &self.financial_status),
            ("created_at_min", &self.created_at_min),
            ("created_at_max", &self.created_at_max),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.clone().map(|v| (key, v))),
        );
        pairs
    }
}

/// Raw upstream response relayed by the GraphQL pass-through.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Deserialize)]
struct OrdersEnvelope {
    orders: Vec<Order>,
}

#[derive(Deserialize)]
struct OrderEnvelope {
    order: Order,
}

#[derive(Deserialize)]
struct TransactionsEnvelope {
    transactions: Vec<Transaction>,
}

#[derive(Deserialize)]
struct VariantEnvelope {
    variant: Variant,
}

/// Shopify Admin REST API client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    base_url: String,
    backoff: BackoffPolicy,
}

impl ShopifyClient {
    /// Create a new Shopify Admin API client.
    ///
    /// # Errors
    ///
    /// Returns error if the access token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCESS_TOKEN_HEADER,
            HeaderValue::from_str(config.access_token.expose_secret())
                .map_err(|e| ShopifyError::Parse(format!("Invalid access token format: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(ShopifyClientInner {
                client,
                base_url: config.base_url(),
                backoff: BackoffPolicy {
                    max_attempts: config.max_attempts,
                    initial_delay: config.initial_retry_delay,
                },
            }),
        })
    }

    /// Admin REST base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Fetch one page of orders.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filters: &OrderFilters) -> Result<Vec<Order>, ShopifyError> {
        let envelope: OrdersEnvelope = self.get("/orders.json", &filters.query_pairs()).await?;
        debug!(count = envelope.orders.len(), "Fetched orders");
        Ok(envelope.orders)
    }

    /// Fetch a single order; `Ok(None)` when Shopify has no such order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, ShopifyError> {
        let path = format!("/orders/{order_id}.json");
        match self.get::<OrderEnvelope>(&path, &[]).await {
            Ok(envelope) => Ok(Some(envelope.order)),
            Err(ShopifyError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch the payment transactions of an order.
    ///
    /// Rate-limited responses are retried with exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, retries are exhausted, or the
    /// response cannot be parsed.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn list_transactions(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Transaction>, ShopifyError> {
        let path = format!("/orders/{order_id}/transactions.json");
        let envelope: TransactionsEnvelope =
            retry_rate_limited(self.inner.backoff, "list_transactions", || {
                self.get(&path, &[])
            })
            .await?;
        Ok(envelope.transactions)
    }

    /// Fetch a product variant; `Ok(None)` when Shopify has no such variant.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn get_variant(&self, variant_id: VariantId) -> Result<Option<Variant>, ShopifyError> {
        let path = format!("/variants/{variant_id}.json");
        match self.get::<VariantEnvelope>(&path, &[]).await {
            Ok(envelope) => Ok(Some(envelope.variant)),
            Err(ShopifyError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Forward a GraphQL request body to the Admin GraphQL endpoint.
    ///
    /// The upstream status and body are returned as-is, including non-2xx
    /// responses.
    ///
    /// # Errors
    ///
    /// Returns error only if the request could not be sent or the body could
    /// not be read.
    #[instrument(skip(self, body))]
    pub async fn forward_graphql(&self, body: &Value) -> Result<ForwardedResponse, ShopifyError> {
        let url = self.url("/graphql.json", &[])?;
        let response = self.inner.client.post(url).json(body).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!(status, bytes = body.len(), "Forwarded GraphQL request");
        Ok(ForwardedResponse {
            status,
            content_type,
            body,
        })
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ShopifyError> {
        let mut url = Url::parse(&format!("{}{path}", self.inner.base_url))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Execute a GET request against the Admin REST API.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ShopifyError> {
        let url = self.url(path, query)?;
        let response = self.inner.client.get(url).send().await?;
        Self::handle_response(response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ShopifyError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ShopifyError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Map a non-success response to an error.
    async fn parse_error(response: reqwest::Response) -> ShopifyError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map_or(DEFAULT_RETRY_AFTER_SECS, whole_seconds);
            return ShopifyError::RateLimited(retry_after);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        match status {
            401 | 403 => ShopifyError::Unauthorized(message),
            404 => ShopifyError::NotFound(message),
            _ => ShopifyError::Api { status, message },
        }
    }
}

/// Round a `Retry-After` value (Shopify sends fractional seconds) up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(secs: f64) -> u64 {
    secs.ceil().max(0.0) as u64
}

/// Extract Shopify's `errors` field, falling back to the truncated body.
fn error_message(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("errors").cloned())
        .map_or_else(
            || body.to_string(),
            |errors| match errors {
                Value::String(s) => s,
                other => other.to_string(),
            },
        );

    if message.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = message.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{truncated}...")
    } else {
        message
    }
}
