//! HTTP middleware stack for the proxy.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS (permissive)
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. App-proxy signature check (every route except health, when configured)

pub mod app_proxy;
pub mod request_id;

pub use app_proxy::verify_app_proxy_signature;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
