//! Order Enricher CLI - Customer spreadsheet tools.
//!
//! # Usage
//!
//! ```bash
//! # Show detected columns and entry count
//! order-enricher-cli sheet inspect ./customers.csv
//!
//! # Print the entry for one order (any spelling of the number works)
//! order-enricher-cli sheet lookup "#1033" --source https://example.com/export.csv
//! ```
//!
//! Without `--source` / a path, the export configured for the proxy
//! (`CUSTOMER_SHEET_URL` or `GOOGLE_SHEET_ID`) is used.
//!
//! # Commands
//!
//! - `sheet inspect` - Parse an export and report what the proxy would load
//! - `sheet lookup` - Show the entry the proxy would match for an order

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "order-enricher-cli")]
#[command(author, version, about = "Order enricher operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the customer spreadsheet
    Sheet {
        #[command(subcommand)]
        action: SheetAction,
    },
}

#[derive(Subcommand)]
enum SheetAction {
    /// Parse an export and report detected columns and entry count
    Inspect {
        /// File path or http(s) URL of the CSV export
        source: Option<String>,
    },
    /// Print the entry for one order
    Lookup {
        /// Order number (`1033`, `#1033` and `Order 1033` are equivalent)
        order_number: String,

        /// File path or http(s) URL of the CSV export
        #[arg(short, long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Sheet { action } => match action {
            SheetAction::Inspect { source } => {
                commands::sheet::inspect(source.as_deref()).await?;
            }
            SheetAction::Lookup {
                order_number,
                source,
            } => {
                commands::sheet::lookup(source.as_deref(), &order_number).await?;
            }
        },
    }
    Ok(())
}
