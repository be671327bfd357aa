//! Normalized customer and shipping records.
//!
//! These are synthesized per order by [`crate::reconcile`]; they are never
//! cached or keyed by customer.

use serde::{Deserialize, Serialize};

use super::id::CustomerId;

/// Normalized customer identity for one order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub id: Option<CustomerId>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Space-joined first and last name; `None` iff both are `None`.
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub accepts_marketing: bool,
}

/// Normalized shipping address for one order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}
