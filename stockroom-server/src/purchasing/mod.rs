//! Purchase Order Module
//!
//! Everything between a supplier's order sheet and goods on the shelf:
//!
//! - **import**: spreadsheet-to-order reconciliation against the catalog
//! - **receiving**: barcode-scan goods-in with order line crediting
//!
//! # Data Flow
//!
//! ```text
//! Order sheet → OrderImporter → PurchaseOrder (lines Pending)
//!                                       ↓
//! Scan code  → ReceivingEngine → line credit + stock increment
//!                                       ↓
//!               all lines Completed/Overfilled → order Received
//! ```

pub mod import;
pub mod receiving;

pub use import::{ImportAction, OrderImportOutcome, OrderImporter};
pub use receiving::{PoCandidate, ReceivingEngine, ScanOutcome, ScanStatus};
