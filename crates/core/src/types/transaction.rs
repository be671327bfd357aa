//! Payment transaction types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::{OrderId, TransactionId};

/// A payment-gateway event (charge, refund, ...) as returned by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    /// Payment gateway name (e.g., `shopify_payments`, `bogus`).
    #[serde(default)]
    pub gateway: Option<String>,
    /// Transaction kind (`sale`, `authorization`, `capture`, `refund`, `void`).
    #[serde(default)]
    pub kind: Option<String>,
    /// Transaction status (`success`, `pending`, `failure`, `error`).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Gateway authorization code.
    #[serde(default)]
    pub authorization: Option<String>,
    /// Gateway receipt, shape depends on the gateway.
    #[serde(default)]
    pub receipt: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Normalized transaction attached to an enriched order.
///
/// A fixed field set; everything else from the platform is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub id: TransactionId,
    pub gateway: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub authorization: Option<String>,
    pub receipt: Option<Value>,
    pub created_at: Option<String>,
}

impl From<Transaction> for TransactionSummary {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            gateway: tx.gateway,
            kind: tx.kind,
            status: tx.status,
            amount: tx.amount,
            currency: tx.currency,
            authorization: tx.authorization,
            receipt: tx.receipt,
            created_at: tx.created_at.or(tx.processed_at),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_summary_keeps_fixed_field_set() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": 389_404_469,
            "order_id": 450_789_469,
            "kind": "authorization",
            "gateway": "bogus",
            "status": "success",
            "amount": "409.94",
            "currency": "USD",
            "authorization": "authorization-key",
            "receipt": {"testcase": true, "authorization": "123456"},
            "created_at": "2005-08-01T11:57:11-04:00",
            "test": false,
            "payment_details": {"credit_card_number": "•••• •••• •••• 4242"}
        }))
        .unwrap();

        let summary = TransactionSummary::from(tx);
        assert_eq!(summary.amount, Some(Decimal::from_str("409.94").unwrap()));

        let out = serde_json::to_value(&summary).unwrap();
        let keys: Vec<&str> = out.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 9);
        assert!(out.get("payment_details").is_none());
        assert!(out.get("test").is_none());
        assert_eq!(out["amount"], json!("409.94"));
        assert_eq!(out["receipt"]["authorization"], json!("123456"));
    }

    #[test]
    fn test_summary_falls_back_to_processed_at() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": 1,
            "amount": 10,
            "processed_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        let summary = TransactionSummary::from(tx);
        assert_eq!(summary.created_at.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(summary.amount, Some(Decimal::from(10)));
    }
}
