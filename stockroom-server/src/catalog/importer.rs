//! Catalog Import
//!
//! Bulk-upserts a supplier price list into the product catalog and refreshes
//! the supplier's detected-brand cache. Stock is never touched here; only
//! receiving moves stock.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::catalog::mapper::{MappedRow, map_rows};
use crate::core::error::AppResult;
use crate::db::CatalogStore;
use crate::db::models::{Product, ProductStatus};
use shared::MappingConfig;

/// Import summary: distinct SKUs written and brand-cache size afterwards
#[derive(Debug, Clone, Serialize)]
pub struct CatalogImportOutcome {
    pub count: usize,
    pub brand_count: usize,
}

/// Price-list importer
#[derive(Clone)]
pub struct CatalogImporter {
    store: CatalogStore,
}

impl CatalogImporter {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    /// Upsert every mapped row of a price-list grid under the supplier.
    ///
    /// Rows sharing a SKU collapse to the last occurrence. Existing products
    /// keep their stock, status, image fields and supplier link; only the
    /// price-list attributes (barcode, title, brand, price) refresh. New
    /// products start at PENDING_IMAGE with zero stock. Suppliers without a
    /// mapping fall back to the default catalog layout instead of failing.
    pub fn import_catalog(
        &self,
        supplier_id: u64,
        grid: &[Vec<String>],
    ) -> AppResult<CatalogImportOutcome> {
        let txn = self.store.begin_write()?;
        let mut supplier = self.store.require_supplier_txn(&txn, supplier_id)?;

        let mapping = supplier.mapping_config.clone().unwrap_or_else(|| {
            tracing::debug!(
                supplier = %supplier.name,
                "No mapping configured, using the default catalog layout"
            );
            MappingConfig::catalog_default()
        });

        let mut rows: HashMap<String, MappedRow> = HashMap::new();
        let mut brands: BTreeSet<String> = supplier.detected_brands.iter().cloned().collect();
        for row in map_rows(grid, &mapping) {
            if !row.brand.is_empty() {
                brands.insert(row.brand.clone());
            }
            rows.insert(row.sku.clone(), row);
        }

        let count = rows.len();
        for row in rows.into_values() {
            match self.store.get_product_txn(&txn, &row.sku)? {
                Some(mut existing) => {
                    existing.barcode = row.barcode;
                    existing.title = row.title;
                    existing.brand = row.brand;
                    existing.price = row.price;
                    existing.updated_at = shared::now_millis();
                    self.store.put_product(&txn, &existing)?;
                }
                None => {
                    let mut product =
                        Product::new(row.sku, row.title, ProductStatus::PendingImage);
                    product.barcode = row.barcode;
                    product.supplier_id = Some(supplier.id);
                    product.brand = row.brand;
                    product.price = row.price;
                    self.store.put_product(&txn, &product)?;
                }
            }
        }

        supplier.detected_brands = brands.into_iter().collect();
        supplier.updated_at = shared::now_millis();
        let brand_count = supplier.detected_brands.len();
        self.store.put_supplier(&txn, &supplier)?;
        txn.commit()?;

        tracing::info!(
            supplier = %supplier.name,
            count,
            brands = brand_count,
            "Catalog imported"
        );

        Ok(CatalogImportOutcome { count, brand_count })
    }
}
