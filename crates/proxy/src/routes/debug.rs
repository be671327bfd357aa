//! Reconciliation diagnostics for a single order.
//!
//! Shows which customer fields the platform supplied, whether the spreadsheet
//! has an entry, and what reconciliation produced from the two.

use axum::{
    Json,
    extract::{Path, State},
};
use order_enricher_core::{FinancialStatus, Order, Reconciled, normalize_order_number, reconcile};
use serde::Serialize;
use tracing::instrument;

use super::parse_order_id;
use crate::error::AppError;
use crate::sheets::SheetSnapshot;
use crate::shopify::policy::{UpstreamOp, recover};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DiagnosticsResponse {
    pub success: bool,
    pub order: Order,
    pub derived: Derived,
}

/// Facts derived from an order and the current spreadsheet snapshot.
#[derive(Debug, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Derived {
    pub has_customer: bool,
    pub has_customer_email: bool,
    pub has_customer_name: bool,
    pub has_customer_phone: bool,
    pub has_order_email: bool,
    pub has_contact_email: bool,
    pub has_shipping_address: bool,
    pub has_billing_address: bool,
    pub has_shipping_name: bool,
    pub normalized_order_number: Option<String>,
    pub has_sheet_entry: bool,
    pub financial_status: Option<String>,
    pub payment_captured: Option<bool>,
    pub line_items_missing_sku: usize,
    pub reconciled: Reconciled,
}

fn present(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

impl Derived {
    #[must_use]
    pub fn new(order: &Order, sheet: &SheetSnapshot) -> Self {
        let customer = order.customer.as_ref();
        let entry = sheet.entry_for(order);

        let normalized_order_number = order
            .name
            .as_deref()
            .map(normalize_order_number)
            .filter(|n| !n.is_empty())
            .or_else(|| order.order_number.map(|n| n.to_string()));

        Self {
            has_customer: customer.is_some(),
            has_customer_email: present(customer.and_then(|c| c.email.as_ref())),
            has_customer_name: customer.is_some_and(|c| {
                present(c.first_name.as_ref()) || present(c.last_name.as_ref())
            }),
            has_customer_phone: present(customer.and_then(|c| c.phone.as_ref())),
            has_order_email: present(order.email.as_ref()),
            has_contact_email: present(order.contact_email.as_ref()),
            has_shipping_address: order.shipping_address.is_some(),
            has_billing_address: order.billing_address.is_some(),
            has_shipping_name: order.shipping_address.as_ref().is_some_and(|a| {
                present(a.first_name.as_ref()) || present(a.last_name.as_ref())
            }),
            normalized_order_number,
            has_sheet_entry: entry.is_some(),
            financial_status: order.financial_status.clone(),
            payment_captured: order.financial_status_kind().map(FinancialStatus::is_captured),
            line_items_missing_sku: order.line_items().iter().filter(|i| i.needs_sku()).count(),
            reconciled: reconcile(order, entry),
        }
    }
}

/// Return the raw order alongside its diagnostics.
#[instrument(skip(state))]
pub async fn order_diagnostics(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<DiagnosticsResponse>, AppError> {
    let order_id = parse_order_id(&order_id)?;

    let order = recover(
        UpstreamOp::GetOrder,
        state.shopify().get_order(order_id).await,
    )?
    .value
    .ok_or_else(|| AppError::NotFound(format!("Order {order_id}")))?;

    let sheet = state.sheet().snapshot().await;
    let derived = Derived::new(&order, &sheet);

    Ok(Json(DiagnosticsResponse {
        success: true,
        order,
        derived,
    }))
}
