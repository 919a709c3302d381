//! Stockroom Server - retail back-office ingestion and reconciliation engine
//!
//! # Architecture overview
//!
//! The engine sits between three worlds: spreadsheets suppliers send,
//! a document-mining worker that extracts product images from PDFs, and
//! the barcode scanner at the receiving bench.
//!
//! - **catalog** (`catalog`): spreadsheet import, supplier mappings,
//!   product lifecycle
//! - **purchasing** (`purchasing`): order import and scan-driven receiving
//! - **ingestion** (`ingest`): filesystem hand-off to the mining worker,
//!   manifest preview
//! - **persistence** (`db`): embedded redb store with JSON rows
//! - **reports** (`reports`): inventory and sync-readiness views
//!
//! # Module structure
//!
//! ```text
//! stockroom-server/src/
//! ├── core/          # Config, state, errors
//! ├── catalog/       # Sheets, mappings, products, suppliers
//! ├── purchasing/    # Order import, receiving
//! ├── ingest/        # Worker queue, coordinator, preview
//! ├── db/            # Storage and models
//! ├── reports.rs     # Read-only stock views
//! └── utils/         # Logging setup
//! ```

pub mod catalog;
pub mod core;
pub mod db;
pub mod ingest;
pub mod purchasing;
pub mod reports;
pub mod utils;

// Re-export public types
pub use core::{AppError, AppResult, AppState, Config};
pub use db::{CatalogStore, StoreError, StoreResult};
pub use reports::ReportService;

// Re-export logger functions
pub use utils::{cleanup_old_logs, init_logger, init_logger_with_file};
