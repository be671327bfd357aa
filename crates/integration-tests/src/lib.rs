//! Integration tests for the order enrichment proxy.
//!
//! Every test runs the real router from [`order_enricher_proxy::app`] on an
//! ephemeral port, pointed at [`MockShop`]: an in-process axum server standing
//! in for the Shopify Admin REST API and the spreadsheet CSV export. Tests
//! talk to the proxy over HTTP with `reqwest`; nothing leaves the machine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p order-enricher-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let shop = MockShop::default();
//! shop.add_order(fixtures::order(450_789_469, 1001));
//!
//! let app = TestApp::spawn(shop, TestOptions::default()).await;
//! let resp = app.get("/orders").await;
//! assert_eq!(resp.status(), StatusCode::OK);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod fixtures;
mod mock_shop;

use std::net::Ipv4Addr;
use std::time::Duration;

use order_enricher_proxy::config::{
    EnrichmentConfig, LogFormat, ProxyConfig, SheetConfig, ShopifyConfig, normalize_base_path,
};
use order_enricher_proxy::middleware::app_proxy::{SIGNATURE_PARAM, sign};
use order_enricher_proxy::state::AppState;
use reqwest::{Client, Response};
use secrecy::SecretString;
use serde_json::Value;
use tokio::net::TcpListener;

pub use mock_shop::{ACCESS_TOKEN, API_VERSION, MockShop};

/// How the proxy under test is configured.
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub base_path: String,
    pub app_secret: Option<String>,
    /// Point the proxy at the mock CSV export.
    pub sheet: bool,
    pub batch_delay: Duration,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            base_path: "/api".to_string(),
            app_secret: None,
            sheet: true,
            batch_delay: Duration::from_millis(20),
        }
    }
}

/// A running proxy and the mock upstream behind it.
pub struct TestApp {
    pub client: Client,
    pub addr: String,
    pub base_path: String,
    pub shop: MockShop,
    app_secret: Option<String>,
}

impl TestApp {
    /// Start the mock upstream and the proxy.
    ///
    /// Like the binary, the spreadsheet is loaded once before serving.
    pub async fn spawn(shop: MockShop, options: TestOptions) -> Self {
        let shop_url = shop.spawn().await;
        let base_path = normalize_base_path(&options.base_path);

        let config = ProxyConfig {
            host: Ipv4Addr::LOCALHOST.into(),
            port: 0,
            base_path: base_path.clone(),
            shopify: ShopifyConfig {
                store: "mock-shop.myshopify.com".to_string(),
                api_version: API_VERSION.to_string(),
                access_token: SecretString::from(ACCESS_TOKEN),
                api_base_url: Some(format!("{shop_url}/admin/api/{API_VERSION}")),
                app_secret: options.app_secret.clone().map(SecretString::from),
                max_attempts: 3,
                initial_retry_delay: Duration::from_millis(10),
            },
            sheet: SheetConfig {
                export_url: options.sheet.then(|| format!("{shop_url}/sheet.csv")),
                refresh_interval: None,
            },
            enrichment: EnrichmentConfig {
                batch_size: 5,
                batch_delay: options.batch_delay,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
            log_format: LogFormat::Text,
        };

        let state = AppState::new(config).expect("Failed to create application state");
        state.sheet().refresh().await;
        let app = order_enricher_proxy::app(state);

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("Failed to bind proxy listener");
        let addr = listener.local_addr().expect("Proxy listener has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Proxy server error");
        });

        Self {
            client: Client::new(),
            addr: format!("http://{addr}"),
            base_path,
            shop,
            app_secret: options.app_secret,
        }
    }

    /// Absolute URL of a route under the base path.
    #[must_use]
    pub fn url(&self, route: &str) -> String {
        format!("{}{}{route}", self.addr, self.base_path)
    }

    /// URL carrying a valid app-proxy signature over `params`.
    ///
    /// Without a configured secret the parameters are sent unsigned.
    #[must_use]
    pub fn signed_url(&self, route: &str, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by_key(|(key, _)| *key);

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.extend_pairs(&sorted);

        if let Some(secret) = &self.app_secret {
            let message: String = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect();
            let signature = sign(&message, secret).expect("Failed to sign query");
            query.append_pair(SIGNATURE_PARAM, &signature);
        }

        format!("{}?{}", self.url(route), query.finish())
    }

    pub async fn get(&self, route: &str) -> Response {
        self.client
            .get(self.url(route))
            .send()
            .await
            .expect("Request to proxy failed")
    }

    pub async fn post_json(&self, route: &str, body: &Value) -> Response {
        self.client
            .post(self.url(route))
            .json(body)
            .send()
            .await
            .expect("Request to proxy failed")
    }

    pub async fn get_json(&self, route: &str) -> (reqwest::StatusCode, Value) {
        let resp = self.get(route).await;
        let status = resp.status();
        let body = resp.json().await.expect("Response was not JSON");
        (status, body)
    }
}
