//! Product Model

use serde::{Deserialize, Serialize};
use shared::Timestamp;
use uuid::Uuid;

/// Product lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    /// Placeholder awaiting human review (worker drafts, ad-hoc scans)
    Draft,
    /// Imported from a catalog sheet, no image mined yet
    PendingImage,
    /// Draft accepted by a human
    Approved,
    Published,
    Archived,
}

/// Product model
///
/// `sku` is the business key every other module resolves against; `barcode`
/// is a secondary lookup used by the receiving scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    #[serde(default)]
    pub barcode: String,
    pub supplier_id: Option<u64>,
    #[serde(default)]
    pub stock_on_hand: i64,
    #[serde(default)]
    pub stock_reserved: i64,
    /// Public media path of the cropped product image
    #[serde(default)]
    pub image_path: String,
    pub status: ProductStatus,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub price: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Public media path of the full source page the image was cropped from
    #[serde(default)]
    pub source_page_image_path: String,
    /// Rendered page size as `[width, height]`
    pub source_page_dims: Option<[i64; 2]>,
    /// Crop rectangle on the source page as `[x1, y1, x2, y2]`
    pub image_rect: Option<[i64; 4]>,
}

impl Product {
    pub fn new(sku: impl Into<String>, title: impl Into<String>, status: ProductStatus) -> Self {
        let now = shared::now_millis();
        Self {
            id: Uuid::new_v4(),
            sku: sku.into(),
            barcode: String::new(),
            supplier_id: None,
            stock_on_hand: 0,
            stock_reserved: 0,
            image_path: String::new(),
            status,
            title: title.into(),
            description: String::new(),
            brand: String::new(),
            price: 0.0,
            created_at: now,
            updated_at: now,
            source_page_image_path: String::new(),
            source_page_dims: None,
            image_rect: None,
        }
    }
}

/// Partial product update; absent fields keep their current values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub title: Option<String>,
    pub status: Option<ProductStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_wire_spelling() {
        let json = serde_json::to_string(&ProductStatus::PendingImage).unwrap();
        assert_eq!(json, "\"PENDING_IMAGE\"");
        let back: ProductStatus = serde_json::from_str("\"APPROVED\"").unwrap();
        assert_eq!(back, ProductStatus::Approved);
    }

    #[test]
    fn new_product_has_fresh_id_and_zero_stock() {
        let p = Product::new("SKU-1", "Widget", ProductStatus::PendingImage);
        let q = Product::new("SKU-1", "Widget", ProductStatus::PendingImage);
        assert_ne!(p.id, q.id);
        assert_eq!(p.stock_on_hand, 0);
        assert_eq!(p.created_at, p.updated_at);
    }
}
