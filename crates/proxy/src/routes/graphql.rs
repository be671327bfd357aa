//! Admin GraphQL pass-through.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::instrument;

use crate::error::AppError;
use crate::shopify::ForwardedResponse;
use crate::state::AppState;

impl IntoResponse for ForwardedResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = self
            .content_type
            .and_then(|ct| HeaderValue::from_str(&ct).ok())
            .unwrap_or_else(|| HeaderValue::from_static("application/json"));

        let mut response = (status, self.body).into_response();
        response.headers_mut().insert(CONTENT_TYPE, content_type);
        response
    }
}

/// Require a JSON object with a string `query`.
fn validate(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    match body.get("query") {
        Some(Value::String(query)) if !query.trim().is_empty() => Ok(body),
        _ => Err(AppError::BadRequest(
            "request body must contain a GraphQL query".to_string(),
        )),
    }
}

/// Forward `{query, variables}` to the Admin GraphQL API.
///
/// The upstream status and body are relayed unmodified, including GraphQL
/// errors and non-2xx responses.
#[instrument(skip(state, body))]
pub async fn forward(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ForwardedResponse, AppError> {
    let body = validate(body)?;
    Ok(state.shopify().forward_graphql(&body).await?)
}
