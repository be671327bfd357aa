//! Product variant type.

use serde::{Deserialize, Serialize};

use super::id::VariantId;

/// A purchasable configuration of a product, carrying SKU and barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}
