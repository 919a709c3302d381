//! Application State
//!
//! Single owner of every service the engine exposes. `AppState` is cheap to
//! clone: the store shares one database handle and the queue sits behind an
//! `Arc`, so clones are shallow.
//!
//! # Service components
//!
//! | Field | Type | Purpose |
//! |-------|------|---------|
//! | config | Config | Runtime configuration (immutable) |
//! | store | CatalogStore | Embedded redb database |
//! | queue | Arc<dyn JobQueue> | Filesystem hand-off to the mining worker |
//! | suppliers | SupplierService | Supplier directory |
//! | products | ProductService | Draft acceptance and product lifecycle |
//! | catalog_import | CatalogImporter | Catalog spreadsheet ingestion |
//! | order_import | OrderImporter | Purchase order spreadsheet ingestion |
//! | receiving | ReceivingEngine | Barcode-scan goods-in |
//! | ingestion | IngestionCoordinator | Upload / trigger / preview pipeline |
//! | reports | ReportService | Inventory and readiness views |
//!
//! # Usage
//!
//! ```ignore
//! let config = Config::from_env();
//! let state = AppState::initialize(&config).await?;
//! let outcome = state.receiving.receive("4001234567890", None, false)?;
//! ```

use std::sync::Arc;

use crate::catalog::{CatalogImporter, ProductService, SupplierService};
use crate::core::config::Config;
use crate::core::error::AppResult;
use crate::db::CatalogStore;
use crate::ingest::{DirQueue, IngestionCoordinator, JobQueue};
use crate::purchasing::{OrderImporter, ReceivingEngine};
use crate::reports::ReportService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: CatalogStore,
    pub queue: Arc<dyn JobQueue>,
    pub suppliers: SupplierService,
    pub products: ProductService,
    pub catalog_import: CatalogImporter,
    pub order_import: OrderImporter,
    pub receiving: ReceivingEngine,
    pub ingestion: IngestionCoordinator,
    pub reports: ReportService,
}

impl AppState {
    /// Initialize the engine.
    ///
    /// Order matters: the data directory and database first, then the queue
    /// directories shared with the worker, then the services on top.
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await?;
        let store = CatalogStore::open(config.database_path())?;

        let dir_queue = DirQueue::new(&config.shared_dir);
        dir_queue.initialize().await?;
        let queue: Arc<dyn JobQueue> = Arc::new(dir_queue);

        let state = Self {
            config: config.clone(),
            store: store.clone(),
            queue: queue.clone(),
            suppliers: SupplierService::new(store.clone()),
            products: ProductService::new(store.clone(), config.clone()),
            catalog_import: CatalogImporter::new(store.clone()),
            order_import: OrderImporter::new(store.clone()),
            receiving: ReceivingEngine::new(store.clone()),
            ingestion: IngestionCoordinator::new(store.clone(), queue, config.clone()),
            reports: ReportService::new(store),
        };

        tracing::info!(
            database = %state.config.database_path().display(),
            shared_dir = %state.config.shared_dir,
            environment = %state.config.environment,
            "Stockroom engine initialized"
        );
        Ok(state)
    }
}
