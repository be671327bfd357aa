//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::sheets::CustomerSheet;
use crate::shopify::{ShopifyClient, ShopifyError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ProxyConfig,
    shopify: ShopifyClient,
    sheet: CustomerSheet,
}

impl AppState {
    /// Build the Shopify client and an empty spreadsheet cache.
    ///
    /// # Errors
    ///
    /// Returns error if either HTTP client cannot be built.
    pub fn new(config: ProxyConfig) -> Result<Self, ShopifyError> {
        let shopify = ShopifyClient::new(&config.shopify)?;
        let sheet = CustomerSheet::new(&config.sheet)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                shopify,
                sheet,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn shopify(&self) -> &ShopifyClient {
        &self.inner.shopify
    }

    #[must_use]
    pub fn sheet(&self) -> &CustomerSheet {
        &self.inner.sheet
    }
}
