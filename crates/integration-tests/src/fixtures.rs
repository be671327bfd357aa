//! Admin REST payloads shaped like Shopify's.

use serde_json::{Value, json};

/// Spreadsheet export keyed by order number.
pub const CUSTOMER_CSV: &str = "\
Order Number,Email,Phone,First Name,Last Name,Address,City,Province,Zip,Country
#1001,sheet.jane@example.com,+1 613 555 0101,Jane,Sheetley,\"12 Bank St, Unit 4\",Ottawa,ON,K1P 1A1,Canada
1002,,,Sam,,,,,,
";

/// A paid order with an embedded customer, a shipping address and one line
/// item whose SKU is blank.
#[must_use]
pub fn order(id: u64, number: u64) -> Value {
    json!({
        "id": id,
        "name": format!("#{number}"),
        "order_number": number,
        "email": format!("order{number}@example.com"),
        "financial_status": "paid",
        "currency": "USD",
        "total_price": "199.00",
        "tags": "wholesale",
        "customer": {
            "id": 207_119_551,
            "email": "platform@example.com",
            "first_name": "Platform",
            "last_name": "Person",
            "phone": "+1 416 555 0199",
            "email_marketing_consent": { "state": "subscribed" }
        },
        "shipping_address": {
            "first_name": "Shipping",
            "last_name": "Person",
            "address1": "1 King St W",
            "city": "Toronto",
            "province": "ON",
            "zip": "M5H 1A1",
            "country": "Canada"
        },
        "line_items": [
            {
                "id": id * 10 + 1,
                "title": "Pineapple Soap",
                "quantity": 2,
                "variant_id": 39_072_856,
                "sku": ""
            },
            {
                "id": id * 10 + 2,
                "title": "Gift Card",
                "quantity": 1,
                "variant_id": null,
                "sku": null
            }
        ]
    })
}

/// A guest checkout: no customer object, contact email only.
#[must_use]
pub fn guest_order(id: u64, number: u64) -> Value {
    json!({
        "id": id,
        "name": format!("#{number}"),
        "order_number": number,
        "contact_email": format!("guest{number}@example.com"),
        "financial_status": "pending",
        "line_items": []
    })
}

/// The single sale transaction the mock returns for every order.
#[must_use]
pub fn transaction(order_id: u64) -> Value {
    json!({
        "id": order_id + 1,
        "order_id": order_id,
        "kind": "sale",
        "gateway": "shopify_payments",
        "status": "success",
        "amount": "199.00",
        "currency": "USD",
        "authorization": "ch_3Nk1",
        "created_at": "2024-05-01T12:00:00-04:00",
        "test": false,
        "payment_details": { "credit_card_company": "Visa" }
    })
}

#[must_use]
pub fn variant(id: u64) -> Value {
    json!({
        "id": id,
        "sku": format!("SKU-{id}"),
        "barcode": format!("BAR-{id}"),
        "title": "Default Title"
    })
}
