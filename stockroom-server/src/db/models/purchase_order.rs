//! Purchase Order Model

use serde::{Deserialize, Serialize};
use shared::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    InTransit,
    Received,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineStatus {
    Pending,
    Partial,
    Completed,
    Overfilled,
}

/// Derive a line's status from its quantities.
///
/// Single source of truth wherever line status is computed: fresh import,
/// overwrite restore, and receiving all go through here.
pub fn derive_status(ordered: i64, received: i64) -> LineStatus {
    match received.cmp(&ordered) {
        std::cmp::Ordering::Less if received == 0 => LineStatus::Pending,
        std::cmp::Ordering::Less => LineStatus::Partial,
        std::cmp::Ordering::Equal => LineStatus::Completed,
        std::cmp::Ordering::Greater => LineStatus::Overfilled,
    }
}

/// One line of a purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub qty_ordered: i64,
    #[serde(default)]
    pub qty_received: i64,
    pub status: LineStatus,
}

impl OrderLine {
    pub fn new(sku: impl Into<String>, qty_ordered: i64) -> Self {
        Self {
            sku: sku.into(),
            qty_ordered,
            qty_received: 0,
            status: derive_status(qty_ordered, 0),
        }
    }
}

/// Purchase order with embedded lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: u64,
    /// Together with `file_name`, the duplicate-detection key
    pub supplier_name: String,
    pub file_name: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PurchaseOrder {
    pub fn new(
        id: u64,
        supplier_name: impl Into<String>,
        file_name: impl Into<String>,
        items: Vec<OrderLine>,
    ) -> Self {
        let now = shared::now_millis();
        Self {
            id,
            supplier_name: supplier_name.into(),
            file_name: file_name.into(),
            status: OrderStatus::Pending,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether every line has arrived in full (or over)
    pub fn is_fully_received(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|line| matches!(line.status, LineStatus::Completed | LineStatus::Overfilled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_status_covers_all_quantity_shapes() {
        assert_eq!(derive_status(10, 0), LineStatus::Pending);
        assert_eq!(derive_status(10, 3), LineStatus::Partial);
        assert_eq!(derive_status(10, 10), LineStatus::Completed);
        assert_eq!(derive_status(10, 12), LineStatus::Overfilled);
    }

    #[test]
    fn new_line_status_matches_derivation() {
        let line = OrderLine::new("SKU-1", 5);
        assert_eq!(line.status, LineStatus::Pending);
        assert_eq!(line.qty_received, 0);
    }

    #[test]
    fn fully_received_requires_every_line_complete() {
        let mut order = PurchaseOrder::new(1, "Acme", "po.xlsx", vec![
            OrderLine::new("A", 2),
            OrderLine::new("B", 1),
        ]);
        assert!(!order.is_fully_received());

        order.items[0].qty_received = 2;
        order.items[0].status = derive_status(2, 2);
        assert!(!order.is_fully_received());

        order.items[1].qty_received = 3;
        order.items[1].status = derive_status(1, 3);
        assert!(order.is_fully_received());
    }

    #[test]
    fn line_status_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&LineStatus::Overfilled).unwrap(),
            "\"OVERFILLED\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::InTransit).unwrap(),
            "\"IN_TRANSIT\""
        );
    }
}
