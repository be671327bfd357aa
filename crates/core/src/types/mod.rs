//! Core types for the order enrichment proxy.
//!
//! Platform records (`Order`, `Transaction`, `Variant`) keep every field they
//! do not interpret in a flattened `extra` map so they pass through unchanged.

pub mod customer;
pub mod id;
pub mod order;
pub mod status;
pub mod transaction;
pub mod variant;

pub use customer::{CustomerInfo, ShippingInfo};
pub use id::*;
pub use order::{LineItem, MailingAddress, MarketingConsent, Order, OrderCustomer};
pub use status::FinancialStatus;
pub use transaction::{Transaction, TransactionSummary};
pub use variant::Variant;
