//! Order domain types for the Shopify REST Admin API.
//!
//! Only the fields the proxy reads or writes are typed. Everything else is
//! captured in `extra` and serialized back out untouched, so the enriched
//! order is a superset of what the platform returned. Typed fields the
//! platform left out stay out on the way back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::{CustomerId, LineItemId, OrderId, VariantId};
use super::status::FinancialStatus;

/// A purchase record from the commerce platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Platform order ID.
    pub id: OrderId,
    /// Display name (e.g., `#1033`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sequential order number (e.g., `1033`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<u64>,
    /// Email captured at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact email (set for guest checkouts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    /// Phone captured at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Payment state, kept as sent so unfamiliar values survive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_status: Option<String>,
    /// Whether the buyer opted into marketing at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_accepts_marketing: Option<bool>,
    /// Embedded customer (absent for some guest checkouts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<OrderCustomer>,
    /// Shipping address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<MailingAddress>,
    /// Billing address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<MailingAddress>,
    /// Purchased line items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<LineItem>>,
    /// Fields passed through without interpretation.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Create a bare order with only an ID.
    ///
    /// Mostly useful for tests and fixtures.
    #[must_use]
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            name: None,
            order_number: None,
            email: None,
            contact_email: None,
            phone: None,
            financial_status: None,
            buyer_accepts_marketing: None,
            customer: None,
            shipping_address: None,
            billing_address: None,
            line_items: None,
            extra: Map::new(),
        }
    }

    /// Payment state, interpreted.
    #[must_use]
    pub fn financial_status_kind(&self) -> Option<FinancialStatus> {
        self.financial_status.as_deref().map(FinancialStatus::from)
    }

    /// Line items, empty when the platform sent none.
    #[must_use]
    pub fn line_items(&self) -> &[LineItem] {
        self.line_items.as_deref().unwrap_or_default()
    }
}

/// Customer object embedded in an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCustomer {
    /// Platform customer ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CustomerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Legacy marketing flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepts_marketing: Option<bool>,
    /// Current email marketing consent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_marketing_consent: Option<MarketingConsent>,
    /// Customer's default address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_address: Option<MailingAddress>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrderCustomer {
    /// Marketing consent as a flag.
    ///
    /// Prefers the legacy `accepts_marketing` flag, then the consent state.
    #[must_use]
    pub fn accepts_marketing(&self) -> Option<bool> {
        self.accepts_marketing.or_else(|| {
            self.email_marketing_consent
                .as_ref()
                .and_then(|consent| consent.state.as_deref())
                .map(|state| state.eq_ignore_ascii_case("subscribed"))
        })
    }
}

/// Email marketing consent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingConsent {
    /// Consent state (e.g., `subscribed`, `not_subscribed`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mailing address as returned by the REST API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MailingAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Province or state name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// Postal/ZIP code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A line item in an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LineItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Variant reference used to resolve a missing SKU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    /// Barcode, attached when the SKU is resolved from the variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LineItem {
    /// Whether the line item needs its SKU resolved from the variant.
    #[must_use]
    pub fn needs_sku(&self) -> bool {
        self.variant_id.is_some() && self.sku.as_deref().is_none_or(|sku| sku.trim().is_empty())
    }
}
