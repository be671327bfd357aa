//! Order Enricher Core - Shared types and pure logic.
//!
//! This crate provides the pieces shared by every order-enricher component:
//! - `proxy` - HTTP proxy that serves enriched orders
//! - `cli` - Operator tools for inspecting the customer spreadsheet
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Everything here can be tested without a network.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs and the order, transaction and customer records
//! - [`sheet`] - CSV parsing for the customer spreadsheet export
//! - [`reconcile`] - Field-by-field merging of spreadsheet and platform data

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod reconcile;
pub mod sheet;
pub mod types;

pub use reconcile::{Reconciled, full_name, reconcile, sheet_entry_for};
pub use sheet::{
    ParsedSheet, SheetColumns, SheetEntry, SheetError, normalize_order_number,
    parse_customer_sheet,
};
pub use types::*;
