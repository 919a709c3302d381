//! Persisted data models

pub mod product;
pub mod purchase_order;
pub mod source_file;
pub mod supplier;

pub use product::{Product, ProductPatch, ProductStatus};
pub use purchase_order::{LineStatus, OrderLine, OrderStatus, PurchaseOrder, derive_status};
pub use source_file::SourceFile;
pub use supplier::{Contact, ContactKind, Supplier, SupplierDraft};
