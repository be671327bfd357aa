//! Customer spreadsheet cache management.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use crate::sheets::SheetSnapshot;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<&SheetSnapshot> for RefreshResponse {
    fn from(snapshot: &SheetSnapshot) -> Self {
        let message = match &snapshot.last_error {
            None => "Customer data refreshed".to_string(),
            Some(_) => "Customer data refresh failed; cache is empty".to_string(),
        };

        Self {
            success: snapshot.last_error.is_none(),
            message,
            count: snapshot.len(),
            timestamp: snapshot.refreshed_at.unwrap_or_else(Utc::now),
            last_error: snapshot.last_error.clone(),
        }
    }
}

/// Rebuild the cache from the spreadsheet export.
///
/// Answers 200 either way; `success` says whether the download worked.
#[instrument(skip(state))]
pub async fn refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    let snapshot = state.sheet().refresh().await;
    info!(
        entries = snapshot.len(),
        ok = snapshot.last_error.is_none(),
        "Customer data refresh requested"
    );
    Json(RefreshResponse::from(snapshot.as_ref()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use order_enricher_core::SheetEntry;

    use super::*;

    #[test]
    fn test_successful_refresh() {
        let mut entries = HashMap::new();
        entries.insert("1001".to_string(), SheetEntry::default());
        entries.insert("1002".to_string(), SheetEntry::default());

        let response = RefreshResponse::from(&SheetSnapshot::from_entries(entries));
        assert!(response.success);
        assert_eq!(response.count, 2);
        assert!(response.last_error.is_none());
    }

    #[test]
    fn test_failed_refresh() {
        let snapshot = SheetSnapshot {
            last_error: Some("no customer spreadsheet configured".to_string()),
            ..SheetSnapshot::default()
        };

        let response = RefreshResponse::from(&snapshot);
        assert!(!response.success);
        assert_eq!(response.count, 0);
        assert_eq!(
            response.last_error.as_deref(),
            Some("no customer spreadsheet configured")
        );
    }
}
