//! Purchase Order Import
//!
//! Turns an order spreadsheet into a PurchaseOrder with embedded lines,
//! reconciling each row against the catalog. The whole import is one write
//! transaction: a duplicate-file conflict rolls everything back, including
//! placeholder products created for unknown SKUs.
//!
//! # Overwrite
//!
//! Re-importing the same (supplier, file) pair with `overwrite` replaces the
//! order's lines with the freshly parsed set while carrying already-received
//! quantities over by SKU. Order status, creation time and source identity
//! never change on overwrite.

use serde::Serialize;
use std::collections::HashMap;

use crate::catalog::mapper::map_rows;
use crate::core::error::{AppError, AppResult};
use crate::db::CatalogStore;
use crate::db::models::{OrderLine, Product, ProductStatus, PurchaseOrder, derive_status};
use crate::db::storage::ORDER_ID_KEY;

/// Whether the import created a new order or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportAction {
    Created,
    Updated,
}

/// Import summary returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct OrderImportOutcome {
    pub order_id: u64,
    pub item_count: usize,
    /// `found_skus.len()`, kept as its own field in the wire format
    pub found_count: usize,
    /// SKUs matched against the catalog; newly created placeholders are
    /// annotated with " (created)"
    pub found_skus: Vec<String>,
    /// SKUs that had no catalog row before this import
    pub missing_skus: Vec<String>,
    pub action: ImportAction,
}

/// Spreadsheet-to-order importer
#[derive(Clone)]
pub struct OrderImporter {
    store: CatalogStore,
}

impl OrderImporter {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    /// Import an order sheet for a supplier.
    ///
    /// Unlike catalog import there is no default mapping here: an order
    /// without a configured column layout is rejected. Rows with quantity
    /// zero or below are silently dropped.
    pub fn import_order(
        &self,
        supplier_id: u64,
        file_name: &str,
        grid: &[Vec<String>],
        overwrite: bool,
    ) -> AppResult<OrderImportOutcome> {
        let txn = self.store.begin_write()?;
        let supplier = self.store.require_supplier_txn(&txn, supplier_id)?;

        let Some(mapping) = supplier.mapping_config.clone() else {
            return Err(AppError::configuration(format!(
                "Supplier {} has no mapping configured; set one up before importing orders",
                supplier.name
            )));
        };

        let mut lines: Vec<OrderLine> = Vec::new();
        let mut found_skus: Vec<String> = Vec::new();
        let mut missing_skus: Vec<String> = Vec::new();

        for row in map_rows(grid, &mapping) {
            // A line with zero or negative quantity is not a line item
            if row.qty <= 0 {
                continue;
            }

            match self.store.get_product_txn(&txn, &row.sku)? {
                Some(mut product) => {
                    if product.barcode.is_empty() && !row.barcode.is_empty() {
                        product.barcode = row.barcode.clone();
                        product.updated_at = shared::now_millis();
                        self.store.put_product(&txn, &product)?;
                    }
                    found_skus.push(row.sku.clone());
                }
                None => {
                    let mut placeholder =
                        Product::new(&row.sku, &row.title, ProductStatus::Draft);
                    placeholder.barcode = row.barcode.clone();
                    placeholder.supplier_id = Some(supplier.id);
                    self.store.put_product(&txn, &placeholder)?;
                    missing_skus.push(row.sku.clone());
                    found_skus.push(format!("{} (created)", row.sku));
                }
            }

            lines.push(OrderLine::new(row.sku, row.qty));
        }

        if lines.is_empty() {
            let qty_col = mapping
                .col_qty
                .map_or("unmapped".to_string(), |c| c.to_string());
            return Err(AppError::validation(format!(
                "No valid items found using supplier mapping (header row {}, sku col {}, qty col {})",
                mapping.header_row, mapping.col_sku, qty_col
            )));
        }

        let item_count = lines.len();
        match self
            .store
            .find_order_by_source_txn(&txn, &supplier.name, file_name)?
        {
            Some(existing) if !overwrite => {
                // Dropping the transaction rolls back any placeholder
                // products and barcode backfills made above
                Err(AppError::DuplicateOrder {
                    order_id: existing.id,
                    supplier_name: supplier.name,
                    file_name: file_name.to_string(),
                })
            }
            Some(mut existing) => {
                let received: HashMap<String, i64> = existing
                    .items
                    .iter()
                    .filter(|line| line.qty_received > 0)
                    .map(|line| (line.sku.clone(), line.qty_received))
                    .collect();
                for line in &mut lines {
                    if let Some(&qty) = received.get(&line.sku) {
                        line.qty_received = qty;
                        line.status = derive_status(line.qty_ordered, qty);
                    }
                }

                existing.items = lines;
                existing.updated_at = shared::now_millis();
                self.store.put_order(&txn, &existing)?;
                txn.commit()?;

                tracing::info!(
                    order_id = existing.id,
                    supplier = %supplier.name,
                    file = %file_name,
                    items = item_count,
                    "Purchase order overwritten"
                );
                Ok(OrderImportOutcome {
                    order_id: existing.id,
                    item_count,
                    found_count: found_skus.len(),
                    found_skus,
                    missing_skus,
                    action: ImportAction::Updated,
                })
            }
            None => {
                let id = self.store.next_id(&txn, ORDER_ID_KEY)?;
                let order = PurchaseOrder::new(id, &supplier.name, file_name, lines);
                self.store.put_order(&txn, &order)?;
                txn.commit()?;

                tracing::info!(
                    order_id = id,
                    supplier = %supplier.name,
                    file = %file_name,
                    items = item_count,
                    missing = missing_skus.len(),
                    "Purchase order imported"
                );
                Ok(OrderImportOutcome {
                    order_id: id,
                    item_count,
                    found_count: found_skus.len(),
                    found_skus,
                    missing_skus,
                    action: ImportAction::Created,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{LineStatus, Supplier, SupplierDraft};
    use crate::db::storage::SUPPLIER_ID_KEY;
    use shared::MappingConfig;

    fn importer() -> OrderImporter {
        OrderImporter::new(CatalogStore::open_in_memory().unwrap())
    }

    fn order_mapping() -> MappingConfig {
        // SKU, title, barcode, qty
        MappingConfig {
            header_row: 0,
            col_sku: 0,
            col_title: Some(1),
            col_barcode: Some(2),
            col_qty: Some(3),
            col_price: None,
            col_brand: None,
        }
    }

    fn add_supplier(store: &CatalogStore, name: &str, mapping: Option<MappingConfig>) -> Supplier {
        let txn = store.begin_write().unwrap();
        let id = store.next_id(&txn, SUPPLIER_ID_KEY).unwrap();
        let supplier = Supplier::new(
            id,
            SupplierDraft {
                name: name.to_string(),
                mapping_config: mapping,
                ..Default::default()
            },
        );
        store.put_supplier(&txn, &supplier).unwrap();
        txn.commit().unwrap();
        supplier
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn missing_mapping_is_a_configuration_error() {
        let importer = importer();
        let supplier = add_supplier(&importer.store, "Acme", None);

        let err = importer
            .import_order(supplier.id, "po.xlsx", &grid(&[]), false)
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn zero_and_negative_quantities_never_become_lines() {
        let importer = importer();
        let supplier = add_supplier(&importer.store, "Acme", Some(order_mapping()));
        let sheet = grid(&[
            &["SKU", "Title", "Barcode", "Qty"],
            &["A-1", "Widget", "", "0"],
            &["B-2", "Gadget", "", "-1"],
            &["C-3", "Gizmo", "", ""],
            &["D-4", "Doohickey", "", "2"],
        ]);

        let outcome = importer
            .import_order(supplier.id, "po.xlsx", &sheet, false)
            .unwrap();
        assert_eq!(outcome.item_count, 1);

        let order = importer.store.get_order(outcome.order_id).unwrap().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].sku, "D-4");
        assert_eq!(order.items[0].status, LineStatus::Pending);
    }

    #[test]
    fn all_rows_filtered_reports_the_mapping_coordinates() {
        let importer = importer();
        let supplier = add_supplier(&importer.store, "Acme", Some(order_mapping()));
        let sheet = grid(&[&["h"], &["A-1", "Widget", "", "0"]]);

        let err = importer
            .import_order(supplier.id, "po.xlsx", &sheet, false)
            .unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("header row 0"));
                assert!(msg.contains("sku col 0"));
                assert!(msg.contains("qty col 3"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_skus_become_draft_placeholders() {
        let importer = importer();
        let supplier = add_supplier(&importer.store, "Acme", Some(order_mapping()));
        let sheet = grid(&[&["h"], &["GHOST-1", "Phantom Widget", "4009", "3"]]);

        let outcome = importer
            .import_order(supplier.id, "po.xlsx", &sheet, false)
            .unwrap();
        assert_eq!(outcome.missing_skus, vec!["GHOST-1"]);
        assert_eq!(outcome.found_skus, vec!["GHOST-1 (created)"]);
        assert_eq!(outcome.found_count, 1);

        let placeholder = importer.store.get_product("GHOST-1").unwrap().unwrap();
        assert_eq!(placeholder.status, ProductStatus::Draft);
        assert_eq!(placeholder.title, "Phantom Widget");
        assert_eq!(placeholder.barcode, "4009");
        assert_eq!(placeholder.supplier_id, Some(supplier.id));
    }

    #[test]
    fn known_skus_get_barcode_backfill_only_when_empty() {
        let importer = importer();
        let supplier = add_supplier(&importer.store, "Acme", Some(order_mapping()));

        let txn = importer.store.begin_write().unwrap();
        let bare = Product::new("A-1", "Widget", ProductStatus::Approved);
        let mut coded = Product::new("B-2", "Gadget", ProductStatus::Approved);
        coded.barcode = "111".to_string();
        importer.store.put_product(&txn, &bare).unwrap();
        importer.store.put_product(&txn, &coded).unwrap();
        txn.commit().unwrap();

        let sheet = grid(&[
            &["h"],
            &["A-1", "", "4009", "1"],
            &["B-2", "", "999", "1"],
        ]);
        let outcome = importer
            .import_order(supplier.id, "po.xlsx", &sheet, false)
            .unwrap();
        assert_eq!(outcome.found_skus, vec!["A-1", "B-2"]);
        assert_eq!(outcome.found_count, 2);
        assert!(outcome.missing_skus.is_empty());

        let bare = importer.store.get_product("A-1").unwrap().unwrap();
        assert_eq!(bare.barcode, "4009");
        let coded = importer.store.get_product("B-2").unwrap().unwrap();
        assert_eq!(coded.barcode, "111");
    }

    #[test]
    fn duplicate_file_without_overwrite_conflicts_and_mutates_nothing() {
        let importer = importer();
        let supplier = add_supplier(&importer.store, "Acme", Some(order_mapping()));
        let sheet = grid(&[&["h"], &["A-1", "Widget", "", "5"]]);
        let first = importer
            .import_order(supplier.id, "po.xlsx", &sheet, false)
            .unwrap();

        let retry = grid(&[&["h"], &["GHOST-9", "New Phantom", "", "5"]]);
        let err = importer
            .import_order(supplier.id, "po.xlsx", &retry, false)
            .unwrap_err();
        match err {
            AppError::DuplicateOrder { order_id, .. } => assert_eq!(order_id, first.order_id),
            other => panic!("expected duplicate order, got {other:?}"),
        }

        // The rejected import's placeholder was rolled back with the txn
        assert!(importer.store.get_product("GHOST-9").unwrap().is_none());
        let order = importer.store.get_order(first.order_id).unwrap().unwrap();
        assert_eq!(order.items[0].sku, "A-1");
    }

    #[test]
    fn overwrite_restores_received_quantities_by_sku() {
        let importer = importer();
        let supplier = add_supplier(&importer.store, "Acme", Some(order_mapping()));
        let sheet = grid(&[
            &["h"],
            &["A-1", "Widget", "", "5"],
            &["B-2", "Gadget", "", "2"],
        ]);
        let first = importer
            .import_order(supplier.id, "po.xlsx", &sheet, false)
            .unwrap();
        let original_created_at = importer
            .store
            .get_order(first.order_id)
            .unwrap()
            .unwrap()
            .created_at;

        // Some receiving happened in the meantime
        let txn = importer.store.begin_write().unwrap();
        let mut order = importer.store.get_order_txn(&txn, first.order_id).unwrap().unwrap();
        order.items[0].qty_received = 3;
        order.items[0].status = derive_status(5, 3);
        importer.store.put_order(&txn, &order).unwrap();
        txn.commit().unwrap();

        // The corrected sheet halves A-1 and drops B-2 for C-3
        let corrected = grid(&[
            &["h"],
            &["A-1", "Widget", "", "2"],
            &["C-3", "Gizmo", "", "4"],
        ]);
        let outcome = importer
            .import_order(supplier.id, "po.xlsx", &corrected, true)
            .unwrap();
        assert_eq!(outcome.action, ImportAction::Updated);
        assert_eq!(outcome.order_id, first.order_id);

        let order = importer.store.get_order(first.order_id).unwrap().unwrap();
        assert_eq!(order.items.len(), 2);
        // Received quantity survived and the status was re-derived: 3 of 2
        // ordered is now overfilled
        assert_eq!(order.items[0].sku, "A-1");
        assert_eq!(order.items[0].qty_received, 3);
        assert_eq!(order.items[0].status, LineStatus::Overfilled);
        // New line starts clean
        assert_eq!(order.items[1].sku, "C-3");
        assert_eq!(order.items[1].qty_received, 0);
        assert_eq!(order.items[1].status, LineStatus::Pending);
        assert_eq!(order.created_at, original_created_at);
    }

    #[test]
    fn reimport_under_a_new_file_name_creates_a_second_order() {
        let importer = importer();
        let supplier = add_supplier(&importer.store, "Acme", Some(order_mapping()));
        let sheet = grid(&[&["h"], &["A-1", "Widget", "", "5"]]);

        let first = importer
            .import_order(supplier.id, "po-july.xlsx", &sheet, false)
            .unwrap();
        let second = importer
            .import_order(supplier.id, "po-august.xlsx", &sheet, false)
            .unwrap();
        assert_eq!(first.action, ImportAction::Created);
        assert_eq!(second.action, ImportAction::Created);
        assert_ne!(first.order_id, second.order_id);
    }
}
