//! Shopify app-proxy signature verification.
//!
//! Requests forwarded through a Shopify app proxy carry a `signature` query
//! parameter: the hex HMAC-SHA256, keyed by the app secret, of the remaining
//! parameters sorted by key and concatenated as `key=value` with no separator.
//! Repeated keys have their values joined with `,`.
//!
//! Verification is active only when `SHOPIFY_APP_SECRET` is configured.

use std::collections::BTreeMap;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";

/// Why a request failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing app proxy signature")]
    Missing,
    #[error("invalid app proxy signature")]
    Mismatch,
    #[error("invalid app secret: {0}")]
    InvalidKey(String),
}

/// Reject requests whose app-proxy signature does not verify.
pub async fn verify_app_proxy_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(secret) = state.config().shopify.app_secret.as_ref() else {
        return next.run(request).await;
    };

    let query = request.uri().query().unwrap_or_default();
    match verify_query(query, secret.expose_secret()) {
        Ok(()) => {
            debug!("App proxy signature verified");
            next.run(request).await
        }
        Err(err) => {
            warn!(path = %request.uri().path(), error = %err, "Rejected app proxy request");
            AppError::Unauthorized(err.to_string()).into_response()
        }
    }
}

/// Verify the `signature` parameter of a raw query string.
///
/// # Errors
///
/// Returns [`SignatureError::Missing`] without a signature and
/// [`SignatureError::Mismatch`] when it does not match.
pub fn verify_query(query: &str, secret: &str) -> Result<(), SignatureError> {
    let (signature, message) = signed_message(query);
    let signature = signature.ok_or(SignatureError::Missing)?;
    let expected = sign(&message, secret)?;

    if constant_time_compare(&expected, &signature.to_ascii_lowercase()) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Hex HMAC-SHA256 of `message`.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidKey`] if the key is rejected.
pub fn sign(message: &str, secret: &str) -> Result<String, SignatureError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Split a query into its signature and the message that was signed.
fn signed_message(query: &str) -> (Option<String>, String) {
    let mut signature = None;
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key == SIGNATURE_PARAM {
            signature = Some(value.into_owned());
        } else {
            params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }

    let message = params
        .iter()
        .map(|(key, values)| format!("{key}={}", values.join(",")))
        .collect();

    (signature, message)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "hush";
    const QUERY: &str = "extra=1&extra=2&shop=shop-name.myshopify.com\
                         &path_prefix=%2Fapps%2Fenricher&timestamp=1317327555";

    #[test]
    fn test_signed_message_sorts_and_joins() {
        let (signature, message) = signed_message(&format!("{QUERY}&signature=abc"));
        assert_eq!(signature.as_deref(), Some("abc"));
        assert_eq!(
            message,
            "extra=1,2path_prefix=/apps/enrichershop=shop-name.myshopify.comtimestamp=1317327555"
        );
    }

    #[test]
    fn test_valid_signature() {
        let (_, message) = signed_message(QUERY);
        let signature = sign(&message, SECRET).unwrap();
        assert!(verify_query(&format!("{QUERY}&signature={signature}"), SECRET).is_ok());
    }

    #[test]
    fn test_signature_position_does_not_matter() {
        let (_, message) = signed_message(QUERY);
        let signature = sign(&message, SECRET).unwrap();
        assert!(verify_query(&format!("signature={signature}&{QUERY}"), SECRET).is_ok());
    }

    #[test]
    fn test_tampered_query_is_rejected() {
        let (_, message) = signed_message(QUERY);
        let signature = sign(&message, SECRET).unwrap();
        let tampered = QUERY.replace("extra=2", "extra=3");
        assert_eq!(
            verify_query(&format!("{tampered}&signature={signature}"), SECRET),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let (_, message) = signed_message(QUERY);
        let signature = sign(&message, "other").unwrap();
        assert_eq!(
            verify_query(&format!("{QUERY}&signature={signature}"), SECRET),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_missing_signature() {
        assert_eq!(verify_query(QUERY, SECRET), Err(SignatureError::Missing));
        assert_eq!(verify_query("", SECRET), Err(SignatureError::Missing));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
    }
}
