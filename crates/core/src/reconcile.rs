//! Field reconciliation between the customer spreadsheet and platform data.
//!
//! Precedence is decided per field, never per record:
//!
//! 1. spreadsheet value
//! 2. platform value (customer object, or the order's shipping address for
//!    shipping fields)
//! 3. order/address-level fallbacks
//! 4. `None`
//!
//! Empty and whitespace-only strings count as absent at every layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sheet::{SheetEntry, normalize_order_number};
use crate::types::{CustomerInfo, MailingAddress, Order, ShippingInfo};

/// Normalized records for one order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciled {
    pub customer: CustomerInfo,
    pub shipping: ShippingInfo,
}

/// Find the spreadsheet entry for an order.
///
/// Tries the display name (`#1033`) first, then the numeric order number.
#[must_use]
pub fn sheet_entry_for<'a>(
    order: &Order,
    entries: &'a HashMap<String, SheetEntry>,
) -> Option<&'a SheetEntry> {
    let by_name = order
        .name
        .as_deref()
        .map(normalize_order_number)
        .filter(|key| !key.is_empty())
        .and_then(|key| entries.get(&key));

    by_name.or_else(|| {
        order
            .order_number
            .and_then(|number| entries.get(&number.to_string()))
    })
}

/// Build the normalized customer and shipping records for an order.
#[must_use]
pub fn reconcile(order: &Order, sheet: Option<&SheetEntry>) -> Reconciled {
    Reconciled {
        customer: reconcile_customer(order, sheet),
        shipping: reconcile_shipping(order, sheet),
    }
}

fn reconcile_customer(order: &Order, sheet: Option<&SheetEntry>) -> CustomerInfo {
    let customer = order.customer.as_ref();
    let shipping = order.shipping_address.as_ref();
    let billing = order.billing_address.as_ref();

    let first_name = first_present([
        sheet.and_then(|s| s.first_name.as_deref()),
        customer.and_then(|c| c.first_name.as_deref()),
        shipping.and_then(|a| a.first_name.as_deref()),
        billing.and_then(|a| a.first_name.as_deref()),
    ]);
    let last_name = first_present([
        sheet.and_then(|s| s.last_name.as_deref()),
        customer.and_then(|c| c.last_name.as_deref()),
        shipping.and_then(|a| a.last_name.as_deref()),
        billing.and_then(|a| a.last_name.as_deref()),
    ]);

    CustomerInfo {
        id: customer.and_then(|c| c.id),
        email: first_present([
            sheet.and_then(|s| s.email.as_deref()),
            customer.and_then(|c| c.email.as_deref()),
            order.email.as_deref(),
            order.contact_email.as_deref(),
        ]),
        full_name: full_name(first_name.as_deref(), last_name.as_deref()),
        first_name,
        last_name,
        phone: first_present([
            sheet.and_then(|s| s.phone.as_deref()),
            customer.and_then(|c| c.phone.as_deref()),
            order.phone.as_deref(),
            shipping.and_then(|a| a.phone.as_deref()),
            billing.and_then(|a| a.phone.as_deref()),
        ]),
        accepts_marketing: customer
            .and_then(crate::types::OrderCustomer::accepts_marketing)
            .or(order.buyer_accepts_marketing)
            .unwrap_or(false),
    }
}

fn reconcile_shipping(order: &Order, sheet: Option<&SheetEntry>) -> ShippingInfo {
    let layers: [Option<&MailingAddress>; 3] = [
        order.shipping_address.as_ref(),
        order
            .customer
            .as_ref()
            .and_then(|c| c.default_address.as_ref()),
        order.billing_address.as_ref(),
    ];

    let pick = |from_sheet: Option<&str>, field: fn(&MailingAddress) -> Option<&str>| {
        first_present(
            std::iter::once(from_sheet).chain(layers.iter().map(|layer| layer.and_then(field))),
        )
    };

    ShippingInfo {
        first_name: pick(sheet.and_then(|s| s.first_name.as_deref()), |a| {
            a.first_name.as_deref()
        }),
        last_name: pick(sheet.and_then(|s| s.last_name.as_deref()), |a| {
            a.last_name.as_deref()
        }),
        company: pick(None, |a| a.company.as_deref()),
        address1: pick(sheet.and_then(|s| s.address1.as_deref()), |a| {
            a.address1.as_deref()
        }),
        address2: pick(sheet.and_then(|s| s.address2.as_deref()), |a| {
            a.address2.as_deref()
        }),
        city: pick(sheet.and_then(|s| s.city.as_deref()), |a| a.city.as_deref()),
        province: pick(sheet.and_then(|s| s.province.as_deref()), |a| {
            a.province.as_deref()
        }),
        zip: pick(sheet.and_then(|s| s.zip.as_deref()), |a| a.zip.as_deref()),
        country: pick(sheet.and_then(|s| s.country.as_deref()), |a| {
            a.country.as_deref()
        }),
        phone: pick(sheet.and_then(|s| s.phone.as_deref()), |a| a.phone.as_deref()),
    }
}

/// Join first and last name with a space.
///
/// Returns `None` iff both parts are absent or blank.
#[must_use]
pub fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn first_present<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
