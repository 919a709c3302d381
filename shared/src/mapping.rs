//! Spreadsheet Mapping Configuration
//!
//! Per-supplier column layout for catalog and purchase-order sheets. The
//! worker's targeting sidecar embeds the same schema, so the field names
//! here are the wire contract for both sides.

use serde::{Deserialize, Serialize};

/// Column mapping for a supplier spreadsheet.
///
/// Indices are zero-based. `header_row` is the row holding column titles;
/// data starts on the row below it. Optional columns are simply absent when
/// the supplier's sheets do not carry that attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub header_row: usize,
    #[serde(default)]
    pub col_sku: usize,
    #[serde(default)]
    pub col_title: Option<usize>,
    #[serde(default)]
    pub col_barcode: Option<usize>,
    #[serde(default)]
    pub col_qty: Option<usize>,
    #[serde(default)]
    pub col_price: Option<usize>,
    #[serde(default)]
    pub col_brand: Option<usize>,
}

impl MappingConfig {
    /// Fallback layout for catalog import when a supplier has no mapping
    /// configured yet: SKU, quantity, price, brand in the first four columns.
    pub fn catalog_default() -> Self {
        Self {
            header_row: 0,
            col_sku: 0,
            col_title: None,
            col_barcode: None,
            col_qty: Some(1),
            col_price: Some(2),
            col_brand: Some(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_mapping() {
        let raw = r#"{"header_row":2,"col_sku":1,"col_title":4,"col_barcode":0,"col_qty":5,"col_price":6,"col_brand":3}"#;
        let mapping: MappingConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(mapping.header_row, 2);
        assert_eq!(mapping.col_sku, 1);
        assert_eq!(mapping.col_barcode, Some(0));
        assert_eq!(mapping.col_qty, Some(5));
    }

    #[test]
    fn missing_columns_decode_as_unmapped() {
        let mapping: MappingConfig = serde_json::from_str(r#"{"header_row":0,"col_sku":0}"#).unwrap();
        assert_eq!(mapping.col_title, None);
        assert_eq!(mapping.col_qty, None);
        assert_eq!(mapping.col_brand, None);
    }

    #[test]
    fn catalog_default_layout() {
        let mapping = MappingConfig::catalog_default();
        assert_eq!(mapping.header_row, 0);
        assert_eq!(mapping.col_sku, 0);
        assert_eq!(mapping.col_qty, Some(1));
        assert_eq!(mapping.col_price, Some(2));
        assert_eq!(mapping.col_brand, Some(3));
        assert_eq!(mapping.col_title, None);
    }
}
