//! In-memory cache of the customer spreadsheet.
//!
//! The cache holds one immutable [`SheetSnapshot`] behind a
//! `RwLock<Arc<_>>`. Readers clone the `Arc` and keep a consistent view for
//! the whole request; a refresh builds a complete new snapshot and swaps the
//! pointer. A failed refresh swaps in an empty snapshot that records the
//! error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use order_enricher_core::{
    Order, ParsedSheet, SheetEntry, SheetError, parse_customer_sheet, sheet_entry_for,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::config::SheetConfig;

/// Per-request timeout for the export download.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while downloading the spreadsheet export.
#[derive(Debug, Error)]
pub enum SheetFetchError {
    #[error("no customer spreadsheet configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("spreadsheet export returned HTTP {0}")]
    Status(u16),

    #[error(transparent)]
    Parse(#[from] SheetError),
}

/// One complete view of the spreadsheet.
#[derive(Debug, Clone, Default)]
pub struct SheetSnapshot {
    /// Entries keyed by normalized order number.
    pub entries: HashMap<String, SheetEntry>,
    /// When this snapshot was built; `None` before the first refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Why the refresh that built this snapshot failed, if it did.
    pub last_error: Option<String>,
}

impl SheetSnapshot {
    fn loaded(parsed: ParsedSheet) -> Self {
        Self {
            entries: parsed.entries,
            refreshed_at: Some(Utc::now()),
            last_error: None,
        }
    }

    fn failed(err: &SheetFetchError) -> Self {
        Self {
            entries: HashMap::new(),
            refreshed_at: Some(Utc::now()),
            last_error: Some(err.to_string()),
        }
    }

    /// Build a snapshot from ready-made entries.
    #[must_use]
    pub fn from_entries(entries: HashMap<String, SheetEntry>) -> Self {
        Self {
            entries,
            refreshed_at: Some(Utc::now()),
            last_error: None,
        }
    }

    /// The entry for an order, by name then order number.
    #[must_use]
    pub fn entry_for(&self, order: &Order) -> Option<&SheetEntry> {
        sheet_entry_for(order, &self.entries)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared handle to the spreadsheet cache.
#[derive(Clone)]
pub struct CustomerSheet {
    inner: Arc<CustomerSheetInner>,
}

struct CustomerSheetInner {
    client: reqwest::Client,
    export_url: Option<String>,
    snapshot: RwLock<Arc<SheetSnapshot>>,
}

impl CustomerSheet {
    /// Create an empty cache for the configured export URL.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &SheetConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            inner: Arc::new(CustomerSheetInner {
                client,
                export_url: config.export_url.clone(),
                snapshot: RwLock::new(Arc::new(SheetSnapshot::default())),
            }),
        })
    }

    /// Whether an export URL is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.export_url.is_some()
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<SheetSnapshot> {
        Arc::clone(&*self.inner.snapshot.read().await)
    }

    /// Download and parse the export, then swap in the new snapshot.
    ///
    /// Never fails: any error produces an empty snapshot carrying the error
    /// text. Concurrent refreshes are allowed; the last to finish wins.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Arc<SheetSnapshot> {
        let snapshot = match self.fetch().await {
            Ok(parsed) => {
                info!(
                    entries = parsed.entries.len(),
                    skipped_rows = parsed.skipped_rows,
                    "Customer spreadsheet loaded"
                );
                SheetSnapshot::loaded(parsed)
            }
            Err(SheetFetchError::NotConfigured) => {
                warn!("No customer spreadsheet configured, cache left empty");
                SheetSnapshot::failed(&SheetFetchError::NotConfigured)
            }
            Err(err) => {
                error!(error = %err, "Customer spreadsheet refresh failed, cache emptied");
                SheetSnapshot::failed(&err)
            }
        };

        let snapshot = Arc::new(snapshot);
        *self.inner.snapshot.write().await = Arc::clone(&snapshot);
        snapshot
    }

    async fn fetch(&self) -> Result<ParsedSheet, SheetFetchError> {
        let url = self
            .inner
            .export_url
            .as_deref()
            .ok_or(SheetFetchError::NotConfigured)?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SheetFetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(parse_customer_sheet(&body)?)
    }

    /// Refresh on a fixed interval until the runtime shuts down.
    ///
    /// The first refresh happens one `every` after spawning.
    #[must_use]
    pub fn spawn_periodic_refresh(&self, every: Duration) -> JoinHandle<()> {
        let sheet = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                sheet.refresh().await;
            }
        })
    }
}
