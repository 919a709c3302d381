//! Stock and Readiness Reports
//!
//! Read-only views computed from live rows on every call. Nothing here is
//! cached or denormalized: on-order totals change the moment an order line
//! or order status does.

use serde::Serialize;
use std::collections::HashMap;

use crate::core::error::AppResult;
use crate::db::CatalogStore;
use crate::db::models::{OrderStatus, Product};

/// One product joined with its open-order totals
#[derive(Debug, Clone, Serialize)]
pub struct InventoryRow {
    #[serde(flatten)]
    pub product: Product,
    /// Units ordered across PENDING / IN_TRANSIT orders
    pub qty_ordered_total: i64,
    /// Units already received against those same orders
    pub qty_received_total: i64,
}

/// Counts surfaced to the storefront synchronizer
#[derive(Debug, Clone, Serialize)]
pub struct SyncReadiness {
    pub products_ready: u64,
    pub orders_pending: u64,
}

/// Reporting facade over the catalog store
#[derive(Clone)]
pub struct ReportService {
    store: CatalogStore,
}

impl ReportService {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    /// Every product with what is still inbound for it.
    ///
    /// Only orders that can still receive goods count; RECEIVED orders
    /// contribute nothing, so totals drain as orders close out.
    pub fn inventory(&self) -> AppResult<Vec<InventoryRow>> {
        let mut on_order: HashMap<String, (i64, i64)> = HashMap::new();
        for order in self.store.get_all_orders()? {
            if !matches!(order.status, OrderStatus::Pending | OrderStatus::InTransit) {
                continue;
            }
            for line in &order.items {
                let entry = on_order.entry(line.sku.clone()).or_default();
                entry.0 += line.qty_ordered;
                entry.1 += line.qty_received;
            }
        }

        let rows = self
            .store
            .get_all_products()?
            .into_iter()
            .map(|product| {
                let (ordered, received) =
                    on_order.get(&product.sku).copied().unwrap_or((0, 0));
                InventoryRow {
                    product,
                    qty_ordered_total: ordered,
                    qty_received_total: received,
                }
            })
            .collect();
        Ok(rows)
    }

    /// What a storefront push would cover right now
    pub fn sync_readiness(&self) -> AppResult<SyncReadiness> {
        let products_ready = self.store.stats()?.product_count;
        let orders_pending = self
            .store
            .get_all_orders()?
            .iter()
            .filter(|order| order.status == OrderStatus::Pending)
            .count() as u64;

        Ok(SyncReadiness {
            products_ready,
            orders_pending,
        })
    }
}
