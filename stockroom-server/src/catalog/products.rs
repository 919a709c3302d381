//! Product Lifecycle
//!
//! Human-facing catalog operations: accepting preview drafts, partial edits,
//! deletion with media cleanup, and the clear-everything reset used between
//! ingestion runs.

use serde::Serialize;
use uuid::Uuid;

use crate::core::config::Config;
use crate::core::error::{AppError, AppResult};
use crate::db::CatalogStore;
use crate::db::models::{Product, ProductPatch, ProductStatus};

/// Rows removed by [`ProductService::clear`]
#[derive(Debug, Clone, Serialize)]
pub struct ClearOutcome {
    pub products: u64,
    pub source_files: u64,
}

/// Catalog lifecycle service
#[derive(Clone)]
pub struct ProductService {
    store: CatalogStore,
    config: Config,
}

impl ProductService {
    pub fn new(store: CatalogStore, config: Config) -> Self {
        Self { store, config }
    }

    /// Persist an accepted preview draft, keyed by SKU.
    ///
    /// When the SKU already exists, the draft's title and crop metadata are
    /// copied onto the existing row and it becomes APPROVED under its old id.
    /// That is how a PENDING_IMAGE row from a price list gains its mined
    /// image. Unknown SKUs are created fresh as APPROVED.
    pub fn accept_draft(&self, draft: Product) -> AppResult<Product> {
        if draft.sku.trim().is_empty() {
            return Err(AppError::validation("SKU is required"));
        }

        let txn = self.store.begin_write()?;
        let accepted = match self.store.get_product_txn(&txn, &draft.sku)? {
            Some(mut existing) => {
                existing.title = draft.title;
                existing.image_path = draft.image_path;
                existing.source_page_image_path = draft.source_page_image_path;
                existing.source_page_dims = draft.source_page_dims;
                existing.image_rect = draft.image_rect;
                existing.status = ProductStatus::Approved;
                existing.updated_at = shared::now_millis();
                existing
            }
            None => {
                let mut product = draft;
                let now = shared::now_millis();
                product.id = Uuid::new_v4();
                product.status = ProductStatus::Approved;
                product.created_at = now;
                product.updated_at = now;
                product
            }
        };
        self.store.put_product(&txn, &accepted)?;
        txn.commit()?;

        tracing::info!(sku = %accepted.sku, "Draft accepted into catalog");
        Ok(accepted)
    }

    /// Apply a partial edit to a product found by internal id.
    /// Changing the SKU re-keys the row; the new SKU must be free.
    pub fn update(&self, id: Uuid, patch: ProductPatch) -> AppResult<Product> {
        let txn = self.store.begin_write()?;
        let mut product = self
            .store
            .find_product_by_id_txn(&txn, id)?
            .ok_or_else(|| AppError::not_found(format!("Product not found: {id}")))?;

        let old_sku = product.sku.clone();
        if let Some(sku) = patch.sku {
            let sku = sku.trim().to_string();
            if sku.is_empty() {
                return Err(AppError::validation("SKU must not be empty"));
            }
            if sku != old_sku && self.store.get_product_txn(&txn, &sku)?.is_some() {
                return Err(AppError::conflict(format!("SKU already in use: {sku}")));
            }
            product.sku = sku;
        }
        if let Some(title) = patch.title {
            product.title = title;
        }
        if let Some(status) = patch.status {
            product.status = status;
        }
        product.updated_at = shared::now_millis();

        if product.sku != old_sku {
            self.store.remove_product(&txn, &old_sku)?;
        }
        self.store.put_product(&txn, &product)?;
        txn.commit()?;

        Ok(product)
    }

    /// Delete a product, then remove its mined image best-effort
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let txn = self.store.begin_write()?;
        let product = self
            .store
            .find_product_by_id_txn(&txn, id)?
            .ok_or_else(|| AppError::not_found(format!("Product not found: {id}")))?;
        self.store.remove_product(&txn, &product.sku)?;
        txn.commit()?;

        if let Some(local) = self.config.media_path_to_local(&product.image_path) {
            if let Err(e) = tokio::fs::remove_file(&local).await {
                tracing::warn!(
                    sku = %product.sku,
                    path = %local.display(),
                    error = %e,
                    "Could not remove product image"
                );
            }
        }

        tracing::info!(sku = %product.sku, "Product deleted");
        Ok(())
    }

    /// All products, newest first
    pub fn list(&self) -> AppResult<Vec<Product>> {
        let mut products = self.store.get_all_products()?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    /// Wipe the catalog and the upload history in one transaction
    pub fn clear(&self) -> AppResult<ClearOutcome> {
        let txn = self.store.begin_write()?;
        let products = self.store.clear_products(&txn)?;
        let source_files = self.store.clear_source_files(&txn)?;
        txn.commit()?;

        tracing::info!(products, source_files, "Catalog cleared");
        Ok(ClearOutcome {
            products,
            source_files,
        })
    }
}
