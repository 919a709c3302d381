//! Filesystem Job Queue
//!
//! Hand-off protocol with the external document-mining worker. The shared
//! directory is the queue:
//!
//! ```text
//! shared/
//! ├── uploads/     staged files, not yet visible to the worker
//! ├── raw/         the worker's inbox (rename from uploads/ = enqueue)
//! └── processed/   worker output: manifest_*.json, progress_*.json
//! ```
//!
//! The worker runs in its own container under a different uid, so every file
//! this side writes is opened up for it. A `target_skus_{file}.json` sidecar
//! placed next to a queued file switches the worker into supplier-scoped
//! extraction.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::error::{AppError, AppResult};
use shared::TargetSkuSidecar;
use shared::worker::{manifest_name, progress_name, sidecar_name};

/// Queue operations the ingestion coordinator depends on
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Write an uploaded spreadsheet or PDF into staging
    async fn stage(&self, file_name: &str, bytes: &[u8]) -> AppResult<PathBuf>;

    /// Move a staged file into the worker's inbox
    async fn enqueue(&self, file_name: &str) -> AppResult<()>;

    /// Write the supplier-scope sidecar next to a queued file
    async fn write_sidecar(&self, file_name: &str, sidecar: &TargetSkuSidecar) -> AppResult<()>;

    async fn is_staged(&self, file_name: &str) -> bool;
    async fn is_queued(&self, file_name: &str) -> bool;

    /// Whether the worker has produced a manifest for the file
    async fn is_ready(&self, file_name: &str) -> bool;

    /// Raw manifest bytes, `None` while the worker is still running
    async fn read_manifest(&self, file_name: &str) -> AppResult<Option<Vec<u8>>>;

    /// Raw progress report bytes, `None` if the worker has not written one
    async fn read_progress(&self, file_name: &str) -> AppResult<Option<Vec<u8>>>;
}

/// Directory-backed queue implementation
#[derive(Debug, Clone)]
pub struct DirQueue {
    uploads_dir: PathBuf,
    raw_dir: PathBuf,
    processed_dir: PathBuf,
}

impl DirQueue {
    pub fn new(shared_dir: impl AsRef<Path>) -> Self {
        let shared_dir = shared_dir.as_ref();
        Self {
            uploads_dir: shared_dir.join("uploads"),
            raw_dir: shared_dir.join("raw"),
            processed_dir: shared_dir.join("processed"),
        }
    }

    /// Create the queue directories and open them up for the worker
    pub async fn initialize(&self) -> AppResult<()> {
        for dir in [&self.uploads_dir, &self.raw_dir, &self.processed_dir] {
            fs::create_dir_all(dir).await?;
            grant_worker_access(dir).await;
        }
        tracing::info!(
            uploads = %self.uploads_dir.display(),
            raw = %self.raw_dir.display(),
            processed = %self.processed_dir.display(),
            "Job queue directories ready"
        );
        Ok(())
    }

    async fn read_optional(&self, path: &Path) -> AppResult<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl JobQueue for DirQueue {
    async fn stage(&self, file_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        let path = self.uploads_dir.join(file_name);
        fs::write(&path, bytes).await?;
        grant_worker_access(&path).await;
        tracing::info!(file = %file_name, size = bytes.len(), "File staged");
        Ok(path)
    }

    async fn enqueue(&self, file_name: &str) -> AppResult<()> {
        let from = self.uploads_dir.join(file_name);
        let to = self.raw_dir.join(file_name);
        fs::rename(&from, &to).await?;
        grant_worker_access(&to).await;
        tracing::info!(file = %file_name, "File queued for processing");
        Ok(())
    }

    async fn write_sidecar(&self, file_name: &str, sidecar: &TargetSkuSidecar) -> AppResult<()> {
        let path = self.raw_dir.join(sidecar_name(file_name));
        let bytes = serde_json::to_vec(sidecar)?;
        fs::write(&path, bytes).await?;
        grant_worker_access(&path).await;
        tracing::info!(
            file = %file_name,
            supplier_id = sidecar.supplier_id,
            skus = sidecar.target_skus.len(),
            "Supplier-scope sidecar written"
        );
        Ok(())
    }

    async fn is_staged(&self, file_name: &str) -> bool {
        path_exists(&self.uploads_dir.join(file_name)).await
    }

    async fn is_queued(&self, file_name: &str) -> bool {
        path_exists(&self.raw_dir.join(file_name)).await
    }

    async fn is_ready(&self, file_name: &str) -> bool {
        path_exists(&self.processed_dir.join(manifest_name(file_name))).await
    }

    async fn read_manifest(&self, file_name: &str) -> AppResult<Option<Vec<u8>>> {
        self.read_optional(&self.processed_dir.join(manifest_name(file_name)))
            .await
    }

    async fn read_progress(&self, file_name: &str) -> AppResult<Option<Vec<u8>>> {
        self.read_optional(&self.processed_dir.join(progress_name(file_name)))
            .await
    }
}

async fn path_exists(path: &Path) -> bool {
    matches!(fs::try_exists(path).await, Ok(true))
}

/// Make a path writable for the worker container's uid. Permission errors are
/// survivable (single-uid dev setups), so they only warn.
#[cfg(unix)]
async fn grant_worker_access(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let perms = std::fs::Permissions::from_mode(0o777);
    if let Err(e) = fs::set_permissions(path, perms).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to open path for worker");
    }
}

#[cfg(not(unix))]
async fn grant_worker_access(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> (tempfile::TempDir, DirQueue) {
        let dir = tempfile::tempdir().unwrap();
        let queue = DirQueue::new(dir.path());
        (dir, queue)
    }

    #[tokio::test]
    async fn initialize_creates_all_three_directories() {
        let (dir, queue) = queue();
        queue.initialize().await.unwrap();

        for name in ["uploads", "raw", "processed"] {
            assert!(dir.path().join(name).is_dir());
        }
    }

    #[tokio::test]
    async fn stage_then_enqueue_moves_the_file() {
        let (dir, queue) = queue();
        queue.initialize().await.unwrap();

        queue.stage("catalog.xlsx", b"bytes").await.unwrap();
        assert!(queue.is_staged("catalog.xlsx").await);
        assert!(!queue.is_queued("catalog.xlsx").await);

        queue.enqueue("catalog.xlsx").await.unwrap();
        assert!(!queue.is_staged("catalog.xlsx").await);
        assert!(queue.is_queued("catalog.xlsx").await);
        assert_eq!(
            std::fs::read(dir.path().join("raw/catalog.xlsx")).unwrap(),
            b"bytes"
        );
    }

    #[tokio::test]
    async fn enqueue_without_staged_file_is_an_io_error() {
        let (_dir, queue) = queue();
        queue.initialize().await.unwrap();

        let err = queue.enqueue("ghost.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[tokio::test]
    async fn sidecar_lands_next_to_the_queued_file() {
        let (dir, queue) = queue();
        queue.initialize().await.unwrap();

        let sidecar = TargetSkuSidecar::new(vec!["A-1".into(), "B-2".into()], 7);
        queue.write_sidecar("list.pdf", &sidecar).await.unwrap();

        let bytes = std::fs::read(dir.path().join("raw/target_skus_list.pdf.json")).unwrap();
        let parsed: TargetSkuSidecar = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.supplier_id, 7);
        assert_eq!(parsed.target_skus, vec!["A-1", "B-2"]);
    }

    #[tokio::test]
    async fn readiness_follows_the_manifest_file() {
        let (dir, queue) = queue();
        queue.initialize().await.unwrap();
        assert!(!queue.is_ready("scan.pdf").await);
        assert!(queue.read_manifest("scan.pdf").await.unwrap().is_none());

        std::fs::write(
            dir.path().join("processed/manifest_scan.pdf.json"),
            br#"{"items": []}"#,
        )
        .unwrap();

        assert!(queue.is_ready("scan.pdf").await);
        let bytes = queue.read_manifest("scan.pdf").await.unwrap().unwrap();
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn progress_is_absent_until_the_worker_reports() {
        let (dir, queue) = queue();
        queue.initialize().await.unwrap();
        assert!(queue.read_progress("scan.pdf").await.unwrap().is_none());

        std::fs::write(
            dir.path().join("processed/progress_scan.pdf.json"),
            br#"{"current": 2, "total": 9}"#,
        )
        .unwrap();

        let bytes = queue.read_progress("scan.pdf").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["current"], 2);
    }
}
