//! Worker File Contract
//!
//! The document-mining worker communicates exclusively through files in the
//! shared directory tree: it picks jobs up from `raw/`, reads an optional
//! targeting sidecar, and drops a manifest (plus an optional progress
//! marker) into `processed/`. This module defines those file formats and
//! the naming scheme for locating them.

use serde::{Deserialize, Serialize};

/// One detected item in a worker manifest.
///
/// Paths are absolute inside the worker's filesystem; the server rewrites
/// them to public media paths before showing them to anyone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestItem {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub file_path: String,
    /// 1-based page number in the source document.
    #[serde(default)]
    pub source_page: i64,
    #[serde(default)]
    pub source_page_image_path: String,
    /// Rendered page size as `[width, height]` pixels.
    #[serde(default)]
    pub source_page_dims: Option<[f64; 2]>,
    /// Crop box on the rendered page as `[x1, y1, x2, y2]`.
    #[serde(default, rename = "box")]
    pub crop_box: Option<[f64; 4]>,
    #[serde(default)]
    pub detection_method: String,
    #[serde(default)]
    pub detected_sku: String,
    #[serde(default)]
    pub detected_name: String,
    #[serde(default)]
    pub detected_text: String,
}

/// Worker output manifest.
///
/// The current worker writes the object form. Older builds emitted a bare
/// item array; [`Manifest::decode`] still accepts it, reporting `auto` mode
/// and no missing-SKU list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub items: Vec<ManifestItem>,
    #[serde(default)]
    pub missing_skus: Vec<String>,
    #[serde(default)]
    pub mode: String,
}

impl Manifest {
    /// Decode manifest bytes, falling back to the legacy bare-array form.
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::from_slice::<Manifest>(bytes) {
            Ok(manifest) => Ok(manifest),
            Err(_) => {
                let items: Vec<ManifestItem> = serde_json::from_slice(bytes)?;
                Ok(Manifest {
                    items,
                    missing_skus: Vec::new(),
                    mode: "auto".to_string(),
                })
            }
        }
    }
}

/// Targeting sidecar placed next to a queued file.
///
/// Written whenever a job is scoped to a supplier. `target_skus` may be
/// empty; the sidecar's presence alone tells the worker which supplier the
/// document belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSkuSidecar {
    #[serde(default)]
    pub target_skus: Vec<String>,
    pub supplier_id: u64,
}

impl TargetSkuSidecar {
    pub fn new(target_skus: Vec<String>, supplier_id: u64) -> Self {
        Self {
            target_skus,
            supplier_id,
        }
    }
}

/// Manifest file name the worker writes for `file_name`.
pub fn manifest_name(file_name: &str) -> String {
    format!("manifest_{file_name}.json")
}

/// Progress marker file name for `file_name`.
pub fn progress_name(file_name: &str) -> String {
    format!("progress_{file_name}.json")
}

/// Targeting sidecar file name for `file_name`.
pub fn sidecar_name(file_name: &str) -> String {
    format!("target_skus_{file_name}.json")
}
