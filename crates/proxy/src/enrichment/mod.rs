//! Order enrichment pipeline.
//!
//! Each order passes through up to three stages, left to right:
//!
//! 1. **reconcile** - merge spreadsheet and platform fields into
//!    `customer_info` / `shipping_info` (pure, never fails)
//! 2. **resolve SKUs** - fetch variants for line items missing a SKU
//! 3. **attach transactions** - fetch and attach normalized transactions
//!
//! Upstream failures inside a stage are recovered through the failure policy
//! table and recorded in the order's [`EnrichmentReport`]; no stage returns an
//! error, so callers always receive an order.

mod batch;

pub use batch::run_in_batches;

use std::future::Future;

use order_enricher_core::{
    CustomerInfo, LineItem, Order, OrderId, Reconciled, ShippingInfo, Transaction,
    TransactionSummary, Variant, VariantId, reconcile,
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::EnrichmentConfig;
use crate::sheets::SheetSnapshot;
use crate::shopify::policy::{Recovered, UpstreamOp, recover};
use crate::shopify::{ShopifyClient, ShopifyError};

/// Per-order lookups the pipeline needs from the platform.
pub trait OrderDetails: Send + Sync {
    fn fetch_transactions(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<Vec<Transaction>, ShopifyError>> + Send;

    fn fetch_variant(
        &self,
        variant_id: VariantId,
    ) -> impl Future<Output = Result<Option<Variant>, ShopifyError>> + Send;
}

impl OrderDetails for ShopifyClient {
    fn fetch_transactions(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<Vec<Transaction>, ShopifyError>> + Send {
        self.list_transactions(order_id)
    }

    fn fetch_variant(
        &self,
        variant_id: VariantId,
    ) -> impl Future<Output = Result<Option<Variant>, ShopifyError>> + Send {
        self.get_variant(variant_id)
    }
}

/// Which optional stages to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnrichOptions {
    pub transactions: bool,
    pub skus: bool,
}

impl EnrichOptions {
    /// Every stage enabled.
    pub const ALL: Self = Self {
        transactions: true,
        skus: true,
    };

    const fn needs_upstream(self) -> bool {
        self.transactions || self.skus
    }
}

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Reconcile,
    ResolveSkus,
    AttachTransactions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStatus {
    #[default]
    Enriched,
    Partial,
}

/// Outcome of the pipeline for one order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EnrichmentReport {
    pub status: EnrichmentStatus,
    /// Stages that fell back after an upstream failure.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<Stage>,
}

impl EnrichmentReport {
    fn record(&mut self, stage: Stage, degraded: bool) {
        if degraded {
            self.status = EnrichmentStatus::Partial;
            self.degraded.push(stage);
        }
    }
}

/// An order with its derived records attached.
///
/// Serializes as the original order object plus `customer_info`,
/// `shipping_info`, `transactions` (when requested) and `enrichment`.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer_info: CustomerInfo,
    pub shipping_info: ShippingInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<TransactionSummary>>,
    pub enrichment: EnrichmentReport,
}

impl EnrichedOrder {
    /// Run the reconcile stage.
    #[must_use]
    pub fn reconciled(order: Order, sheet: &SheetSnapshot) -> Self {
        let Reconciled { customer, shipping } = reconcile(&order, sheet.entry_for(&order));
        Self {
            order,
            customer_info: customer,
            shipping_info: shipping,
            transactions: None,
            enrichment: EnrichmentReport::default(),
        }
    }

    /// Run the optional stages.
    async fn finish<S: OrderDetails>(mut self, source: &S, options: EnrichOptions) -> Self {
        if options.skus {
            let degraded = match self.order.line_items.as_mut() {
                Some(items) => resolve_skus(source, items).await,
                None => false,
            };
            self.enrichment.record(Stage::ResolveSkus, degraded);
        }

        if options.transactions {
            let Recovered { value, swallowed } = recover(
                UpstreamOp::ListTransactions,
                source.fetch_transactions(self.order.id).await,
            )
            .unwrap_or_else(Recovered::fallback);

            self.transactions = Some(value.into_iter().map(TransactionSummary::from).collect());
            self.enrichment
                .record(Stage::AttachTransactions, swallowed.is_some());
        }

        self
    }
}

/// Fill in missing SKUs from each line item's variant, one lookup at a time.
///
/// Returns whether any lookup failed. A failed or empty lookup leaves the
/// line item as it was.
async fn resolve_skus<S: OrderDetails>(source: &S, line_items: &mut [LineItem]) -> bool {
    let mut degraded = false;

    for item in line_items.iter_mut().filter(|item| item.needs_sku()) {
        let Some(variant_id) = item.variant_id else {
            continue;
        };

        let recovered = recover(UpstreamOp::GetVariant, source.fetch_variant(variant_id).await)
            .unwrap_or_else(Recovered::fallback);
        degraded |= recovered.is_degraded();

        if let Some(variant) = recovered.value {
            if let Some(sku) = variant.sku.filter(|sku| !sku.trim().is_empty()) {
                item.sku = Some(sku);
            }
            if item.barcode.is_none() {
                item.barcode = variant.barcode;
            }
        } else {
            debug!(variant_id = %variant_id, "No variant found for line item");
        }
    }

    degraded
}

/// Enrich a single order through every requested stage.
#[instrument(skip_all, fields(order_id = %order.id))]
pub async fn enrich_order<S: OrderDetails>(
    source: &S,
    sheet: &SheetSnapshot,
    order: Order,
    options: EnrichOptions,
) -> EnrichedOrder {
    EnrichedOrder::reconciled(order, sheet)
        .finish(source, options)
        .await
}

/// Enrich a page of orders.
///
/// Every order is reconciled first. The upstream stages then run in
/// concurrent batches paced by `batching`; when no upstream stage is
/// requested no batching happens at all. Output order matches input order.
#[instrument(skip_all, fields(orders = orders.len()))]
pub async fn enrich_orders<S: OrderDetails>(
    source: &S,
    sheet: &SheetSnapshot,
    orders: Vec<Order>,
    options: EnrichOptions,
    batching: EnrichmentConfig,
) -> Vec<EnrichedOrder> {
    let reconciled: Vec<EnrichedOrder> = orders
        .into_iter()
        .map(|order| EnrichedOrder::reconciled(order, sheet))
        .collect();

    if !options.needs_upstream() {
        return reconciled;
    }

    run_in_batches(
        reconciled,
        batching.batch_size,
        batching.batch_delay,
        |order| order.finish(source, options),
    )
    .await
}
