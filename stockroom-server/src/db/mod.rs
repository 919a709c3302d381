//! Database layer

pub mod models;
pub mod storage;

pub use storage::{CatalogStore, StoreError, StoreResult};
