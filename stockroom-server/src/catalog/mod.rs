//! Product Catalog Module
//!
//! Spreadsheet-driven catalog management:
//!
//! - **sheet**: workbook bytes to a string grid
//! - **mapper**: supplier column-mapping applied to a grid
//! - **importer**: catalog sheet upsert into the product table
//! - **products**: draft acceptance and product lifecycle
//! - **suppliers**: supplier directory with per-supplier mappings
//!
//! # Data Flow
//!
//! ```text
//! .xlsx bytes → decode_grid → map_rows(mapping) → CatalogImporter upsert
//!                                                       ↓
//!                           products / suppliers ← CatalogStore
//! ```

pub mod importer;
pub mod mapper;
pub mod products;
pub mod sheet;
pub mod suppliers;

pub use importer::{CatalogImportOutcome, CatalogImporter};
pub use mapper::{MappedRow, map_rows};
pub use products::{ClearOutcome, ProductService};
pub use sheet::{decode_grid, preview_grid};
pub use suppliers::SupplierService;
