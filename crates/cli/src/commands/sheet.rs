//! Customer spreadsheet inspection.
//!
//! Uses the same parser and the same lookup rules as the proxy, so what these
//! commands report is what the proxy will load.

use std::path::PathBuf;

use order_enricher_core::{
    ParsedSheet, SheetColumns, SheetError, normalize_order_number, parse_customer_sheet,
};
use order_enricher_proxy::config::{ConfigError, SheetConfig};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SheetCommandError {
    #[error("no source given and neither CUSTOMER_SHEET_URL nor GOOGLE_SHEET_ID is set")]
    NoSource,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to download export: {0}")]
    Http(#[from] reqwest::Error),

    #[error("export returned HTTP {0}")]
    Status(u16),

    #[error(transparent)]
    Parse(#[from] SheetError),

    #[error("no entry for order {0}")]
    NoEntry(String),
}

/// Where a CSV export comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    fn resolve(arg: Option<&str>) -> Result<Self, SheetCommandError> {
        match arg {
            Some(raw) => Ok(Self::parse(raw)),
            None => {
                dotenvy::dotenv().ok();
                SheetConfig::from_env()?
                    .export_url
                    .map(Self::Url)
                    .ok_or(SheetCommandError::NoSource)
            }
        }
    }

    fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    async fn load(&self) -> Result<ParsedSheet, SheetCommandError> {
        let body = match self {
            Self::Url(url) => {
                info!(%url, "Downloading spreadsheet export");
                let response = reqwest::get(url).await?;
                if !response.status().is_success() {
                    return Err(SheetCommandError::Status(response.status().as_u16()));
                }
                response.text().await?
            }
            Self::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SheetCommandError::Read {
                        path: path.clone(),
                        source,
                    })?
            }
        };

        Ok(parse_customer_sheet(&body)?)
    }
}

/// Print detected columns and the entry count.
///
/// # Errors
///
/// Returns an error if the export cannot be loaded or parsed.
pub async fn inspect(source: Option<&str>) -> Result<(), SheetCommandError> {
    let sheet = Source::resolve(source)?.load().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Columns:");
        for line in describe_columns(&sheet.headers, &sheet.columns) {
            println!("  {line}");
        }
        println!("Entries: {}", sheet.entries.len());
        if sheet.skipped_rows > 0 {
            println!("Skipped rows (no order number): {}", sheet.skipped_rows);
        }
    }

    Ok(())
}

/// Print the entry for one order as JSON.
///
/// # Errors
///
/// Returns an error if the export cannot be loaded or has no such order.
pub async fn lookup(source: Option<&str>, order_number: &str) -> Result<(), SheetCommandError> {
    let sheet = Source::resolve(source)?.load().await?;

    let entry = sheet
        .get(order_number)
        .ok_or_else(|| SheetCommandError::NoEntry(normalize_order_number(order_number)))?;

    let rendered = serde_json::to_string_pretty(entry).unwrap_or_else(|_| format!("{entry:?}"));

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }

    Ok(())
}

/// One `field -> header` line per detected column.
fn describe_columns(headers: &[String], columns: &SheetColumns) -> Vec<String> {
    let header = |idx: Option<usize>| match idx.and_then(|i| headers.get(i)) {
        Some(name) => format!("{name:?} (column {})", idx.unwrap_or_default() + 1),
        None => "-".to_string(),
    };

    [
        ("order", Some(columns.order)),
        ("email", columns.email),
        ("phone", columns.phone),
        ("first_name", columns.first_name),
        ("last_name", columns.last_name),
        ("address1", columns.address1),
        ("address2", columns.address2),
        ("city", columns.city),
        ("province", columns.province),
        ("zip", columns.zip),
        ("country", columns.country),
    ]
    .into_iter()
    .map(|(field, idx)| format!("{field:<10} -> {}", header(idx)))
    .collect()
}
