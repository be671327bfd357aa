//! Liveness endpoint.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sheets::SheetSnapshot;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub customer_cache: CacheStatus,
}

/// What the customer cache currently holds.
#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub entries: usize,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub source_configured: bool,
    pub last_error: Option<String>,
}

impl CacheStatus {
    fn new(snapshot: &SheetSnapshot, source_configured: bool) -> Self {
        Self {
            entries: snapshot.len(),
            last_refreshed: snapshot.refreshed_at,
            source_configured,
            last_error: snapshot.last_error.clone(),
        }
    }
}

/// Always healthy while the process serves requests; spreadsheet trouble is
/// reported in `customer_cache` only.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.sheet().snapshot().await;

    Json(HealthResponse {
        success: true,
        status: "healthy",
        timestamp: Utc::now(),
        customer_cache: CacheStatus::new(&snapshot, state.sheet().is_configured()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cache_status_before_first_refresh() {
        let status = CacheStatus::new(&SheetSnapshot::default(), false);
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({
                "entries": 0,
                "last_refreshed": null,
                "source_configured": false,
                "last_error": null,
            })
        );
    }

    #[test]
    fn test_cache_status_reports_error() {
        let snapshot = SheetSnapshot {
            last_error: Some("spreadsheet export returned HTTP 404".to_string()),
            ..SheetSnapshot::from_entries(std::collections::HashMap::new())
        };
        let status = CacheStatus::new(&snapshot, true);

        assert!(status.source_configured);
        assert!(status.last_refreshed.is_some());
        assert_eq!(
            status.last_error.as_deref(),
            Some("spreadsheet export returned HTTP 404")
        );
    }
}
