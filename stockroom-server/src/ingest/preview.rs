//! Manifest Preview
//!
//! Projects a worker manifest into draft products the operator can review.
//! Nothing here touches the database: a draft only becomes a catalog row
//! when a human accepts it.

use serde::Serialize;
use uuid::Uuid;

use crate::core::config::Config;
use crate::core::error::{AppError, AppResult};
use crate::db::models::{Product, ProductStatus};
use shared::worker::{Manifest, ManifestItem};

/// Review payload built from one manifest
#[derive(Debug, Clone, Serialize)]
pub struct ManifestPreview {
    pub products: Vec<Product>,
    /// SKUs the worker was asked to find but could not (targeted mode)
    pub missing_skus: Vec<String>,
    pub mode: String,
}

/// Manifest-to-draft projection
#[derive(Debug, Clone)]
pub struct PreviewBuilder {
    config: Config,
}

impl PreviewBuilder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn build_preview(&self, bytes: &[u8]) -> AppResult<ManifestPreview> {
        let manifest = Manifest::decode(bytes)
            .map_err(|e| AppError::validation(format!("Invalid manifest format: {e}")))?;

        let products = manifest
            .items
            .iter()
            .map(|item| self.draft_product(item))
            .collect();

        tracing::debug!(
            items = manifest.items.len(),
            missing = manifest.missing_skus.len(),
            mode = %manifest.mode,
            "Manifest preview built"
        );
        Ok(ManifestPreview {
            products,
            missing_skus: manifest.missing_skus,
            mode: manifest.mode,
        })
    }

    /// One manifest item becomes one transient draft product
    fn draft_product(&self, item: &ManifestItem) -> Product {
        let id = Uuid::parse_str(&item.uuid).unwrap_or_else(|_| Uuid::new_v4());

        let sku = if item.detected_sku.is_empty() {
            // Hyphenated UUID rendering, so eight chars is the first group
            format!("DRAFT-{}", &id.to_string()[..8])
        } else {
            item.detected_sku.clone()
        };
        let title = if item.detected_name.is_empty() {
            format!("Detected Item (Page {})", item.source_page)
        } else {
            item.detected_name.clone()
        };

        let mut product = Product::new(sku, title, ProductStatus::Draft);
        product.id = id;
        product.image_path = self.config.to_media_path(&item.file_path);
        product.source_page_image_path = self.config.to_media_path(&item.source_page_image_path);
        product.source_page_dims = item.source_page_dims.map(|[w, h]| [w as i64, h as i64]);
        product.image_rect = item
            .crop_box
            .map(|[x1, y1, x2, y2]| [x1 as i64, y1 as i64, x2 as i64, y2 as i64]);
        product
    }
}
