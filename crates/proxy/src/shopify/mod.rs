//! Shopify Admin REST API client.
//!
//! Covers the handful of resources the proxy reads (orders, transactions,
//! variants) plus a raw GraphQL forwarder. Authentication is a static
//! `X-Shopify-Access-Token` header.
//!
//! # Example
//!
//! ```rust,ignore
//! use order_enricher_proxy::shopify::{OrderFilters, ShopifyClient};
//!
//! let client = ShopifyClient::new(&config.shopify)?;
//!
//! let orders = client.list_orders(&OrderFilters::default()).await?;
//! let transactions = client.list_transactions(orders[0].id).await?;
//! ```

mod client;
pub mod policy;

pub use client::{ForwardedResponse, OrderFilters, ShopifyClient};

use thiserror::Error;

use crate::backoff::RateLimited;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API returned an error response.
    #[error("Shopify API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl RateLimited for ShopifyError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_429_is_rate_limited() {
        assert!(ShopifyError::RateLimited(2).is_rate_limited());
        assert!(!ShopifyError::Unauthorized("bad token".to_string()).is_rate_limited());
        assert!(
            !ShopifyError::Api {
                status: 500,
                message: "boom".to_string()
            }
            .is_rate_limited()
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ShopifyError::Api {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Shopify API error: 502 - Bad Gateway");
        assert_eq!(
            ShopifyError::RateLimited(4).to_string(),
            "Rate limited, retry after 4 seconds"
        );
    }
}
