//! Unified error handling
//!
//! Application-level error enum shared by every service:
//!
//! | Category | Meaning |
//! |----------|---------|
//! | Validation | Malformed payload, undecodable manifest, empty import |
//! | NotFound | Unknown supplier, order, product, or staged file |
//! | Conflict | Duplicate supplier name |
//! | DuplicateOrder | Same supplier and file already imported (carries the order id for retry-with-overwrite) |
//! | Configuration | Supplier mapping missing where it is required |
//! | Storage / Io | Persistence and filesystem failures |
//! | Serialization | Sidecar or manifest JSON that cannot be encoded |
//!
//! # Example
//!
//! ```ignore
//! Err(AppError::not_found("Supplier not found"))
//! ```

use crate::db::storage::StoreError;

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A purchase order for the same supplier and file already exists.
    /// Carries the existing order id so the caller can retry with overwrite.
    #[error("Duplicate purchase order {order_id} for {supplier_name} / {file_name}")]
    DuplicateOrder {
        order_id: u64,
        supplier_name: String,
        file_name: String,
    },

    #[error("Storage error: {0}")]
    Storage(StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::SupplierNotFound(id) => {
                AppError::NotFound(format!("Supplier not found: {id}"))
            }
            StoreError::OrderNotFound(id) => {
                AppError::NotFound(format!("Purchase order not found: {id}"))
            }
            other => AppError::Storage(other),
        }
    }
}

impl From<redb::CommitError> for AppError {
    fn from(e: redb::CommitError) -> Self {
        AppError::Storage(StoreError::from(e))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
