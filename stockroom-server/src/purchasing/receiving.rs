//! Barcode-Scan Receiving
//!
//! Resolves one physical scan into a stock increment and, where possible, a
//! purchase-order line credit. Resolution order:
//!
//! 1. Look the code up as SKU, then as barcode
//! 2. Unknown code: prepare an ad-hoc draft product for the scanned code
//! 3. Pick the purchase order to credit (explicit id, sole open candidate,
//!    or ask the operator to choose)
//! 4. Credit the matching line and bump stock in one committed transaction
//!
//! A scan that needs operator disambiguation commits nothing: the transaction
//! is dropped, so an ad-hoc draft prepared in step 2 never survives a
//! `multiple_pos` answer.

use serde::Serialize;

use crate::core::error::{AppError, AppResult};
use crate::db::CatalogStore;
use crate::db::models::{
    LineStatus, OrderLine, OrderStatus, Product, ProductStatus, PurchaseOrder, derive_status,
};

/// How the scan was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// Stock was incremented (and a line credited when one matched)
    Received,
    /// More than one open order wants this SKU; nothing was changed
    MultiplePos,
}

/// One selectable order when a scan is ambiguous
#[derive(Debug, Clone, Serialize)]
pub struct PoCandidate {
    pub order_id: u64,
    pub supplier_name: String,
    /// Quantity still outstanding on the candidate's line for this SKU
    pub missing_qty: i64,
}

/// Full answer to a single scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub status: ScanStatus,
    pub product: Product,
    /// The credited line after the increment, when an order matched
    pub po_item: Option<OrderLine>,
    /// Populated only for `multiple_pos`
    pub po_options: Vec<PoCandidate>,
    pub warning: Option<String>,
}

/// Scan-driven goods-in engine
#[derive(Clone)]
pub struct ReceivingEngine {
    store: CatalogStore,
}

impl ReceivingEngine {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    /// Process one scan of `code` (SKU or barcode).
    ///
    /// `order_id` pins the purchase order to credit, even when resolution
    /// is skipped. Without it the engine auto-selects when exactly one open
    /// order has an unfinished line for the SKU; `skip_order_resolution`
    /// turns that candidate search off and receives loose stock.
    pub fn receive(
        &self,
        code: &str,
        order_id: Option<u64>,
        skip_order_resolution: bool,
    ) -> AppResult<ScanOutcome> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::validation("Code is required"));
        }

        let txn = self.store.begin_write()?;

        let mut product = match self.store.find_product_by_code_txn(&txn, code)? {
            Some(product) => product,
            None => {
                // Ad-hoc item: track stock for it anyway. Only persisted if
                // this scan commits.
                let mut draft =
                    Product::new(code, format!("Ad-hoc Scanned {code}"), ProductStatus::Draft);
                draft.barcode = code.to_string();
                tracing::info!(code = %code, "Scan for unknown code, creating ad-hoc product");
                draft
            }
        };

        let selected_order = if order_id.is_some() {
            // An explicit id is always credited; the skip flag only turns
            // off the candidate search below
            order_id
        } else if skip_order_resolution {
            None
        } else {
            let candidates = self.store.find_open_orders_with_sku_txn(&txn, &product.sku)?;
            if candidates.len() > 1 {
                // Operator must choose; drop the transaction so nothing
                // (including an ad-hoc draft) is written
                let po_options = candidates
                    .iter()
                    .filter_map(|order| candidate_for(order, &product.sku))
                    .collect();
                tracing::info!(
                    sku = %product.sku,
                    candidates = candidates.len(),
                    "Scan is ambiguous across open orders"
                );
                return Ok(ScanOutcome {
                    status: ScanStatus::MultiplePos,
                    product,
                    po_item: None,
                    po_options,
                    warning: None,
                });
            }
            candidates.first().map(|order| order.id)
        };

        let mut po_item = None;
        let mut warning = None;

        if let Some(id) = selected_order {
            match self.store.get_order_txn(&txn, id)? {
                Some(mut order) => {
                    // Explicit order ids credit the line whatever its status,
                    // pushing completed lines into overfill
                    if let Some(line) =
                        order.items.iter_mut().find(|line| line.sku == product.sku)
                    {
                        line.qty_received += 1;
                        line.status = derive_status(line.qty_ordered, line.qty_received);
                        po_item = Some(line.clone());

                        if order.is_fully_received() && order.status != OrderStatus::Received {
                            order.status = OrderStatus::Received;
                            tracing::info!(order_id = id, "Purchase order fully received");
                        }
                        order.updated_at = shared::now_millis();
                        self.store.put_order(&txn, &order)?;
                    } else {
                        warning = Some("Item not found in this PO".to_string());
                        tracing::warn!(
                            order_id = id,
                            sku = %product.sku,
                            "Scanned item has no line on the selected order"
                        );
                    }
                }
                None => {
                    warning = Some("Item not found in this PO".to_string());
                    tracing::warn!(order_id = id, "Scan targeted a missing order");
                }
            }
        }

        product.stock_on_hand += 1;
        product.updated_at = shared::now_millis();
        self.store.put_product(&txn, &product)?;
        txn.commit()?;

        tracing::info!(
            sku = %product.sku,
            stock = product.stock_on_hand,
            order = ?selected_order,
            "Scan received"
        );
        Ok(ScanOutcome {
            status: ScanStatus::Received,
            product,
            po_item,
            po_options: Vec::new(),
            warning,
        })
    }
}

/// Project an order onto the candidate list shown to the operator
fn candidate_for(order: &PurchaseOrder, sku: &str) -> Option<PoCandidate> {
    order
        .items
        .iter()
        .find(|line| {
            line.sku == sku && matches!(line.status, LineStatus::Pending | LineStatus::Partial)
        })
        .map(|line| PoCandidate {
            order_id: order.id,
            supplier_name: order.supplier_name.clone(),
            missing_qty: line.qty_ordered - line.qty_received,
        })
}
