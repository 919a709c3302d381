//! Source File Model

use serde::{Deserialize, Serialize};
use shared::Timestamp;

/// Uploaded document tracked through the ingestion pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: u64,
    pub file_name: String,
    pub file_size: u64,
    /// Location inside the staging area at upload time
    pub file_path: String,
    pub status: String,
    pub created_at: Timestamp,
}

impl SourceFile {
    pub fn new(
        id: u64,
        file_name: impl Into<String>,
        file_size: u64,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            file_size,
            file_path: file_path.into(),
            status: "Uploaded".to_string(),
            created_at: shared::now_millis(),
        }
    }
}
