//! Shared contracts for the stockroom workspace
//!
//! Types exchanged between the server and the document-mining worker:
//! the spreadsheet mapping schema, the worker's manifest/progress/sidecar
//! file formats, and small common utilities.

pub mod mapping;
pub mod types;
pub mod util;
pub mod worker;

// Re-exports
pub use mapping::MappingConfig;
pub use serde::{Deserialize, Serialize};
pub use types::Timestamp;
pub use util::now_millis;
pub use worker::{Manifest, ManifestItem, TargetSkuSidecar};
