//! Ingestion Coordinator
//!
//! Drives a document through the worker hand-off: stage the upload, queue it
//! (optionally scoped to one supplier's SKUs), poll for worker output, and
//! turn the finished manifest into a reviewable preview.
//!
//! ```text
//! stage ──► uploads/  ──trigger──► raw/ ──worker──► processed/manifest_*.json
//!    │                    │                                  │
//!    └─ SourceFile row    └─ target_skus sidecar             └─ check_status / preview
//! ```

use serde::Serialize;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::error::{AppError, AppResult};
use crate::db::CatalogStore;
use crate::db::models::SourceFile;
use crate::db::storage::SOURCE_FILE_ID_KEY;
use crate::ingest::preview::{ManifestPreview, PreviewBuilder};
use crate::ingest::queue::JobQueue;
use shared::TargetSkuSidecar;
use shared::worker::Manifest;

/// Result of a trigger request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOutcome {
    Triggered,
    /// The file had already left staging; the worker is (or was) on it
    AlreadyQueued,
}

/// Where a queued document currently stands
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingState {
    /// Worker finished; the decoded manifest is attached
    Ready(Manifest),
    /// Worker published a progress report, surfaced verbatim
    InProgress(serde_json::Value),
    /// Queued or running with nothing reported yet
    Processing,
}

/// One staged file with its readiness flag
#[derive(Debug, Clone, Serialize)]
pub struct StagedFile {
    #[serde(flatten)]
    pub file: SourceFile,
    pub is_ready: bool,
}

/// Upload-to-preview pipeline coordinator
#[derive(Clone)]
pub struct IngestionCoordinator {
    store: CatalogStore,
    queue: Arc<dyn JobQueue>,
    preview: PreviewBuilder,
    config: Config,
}

impl IngestionCoordinator {
    pub fn new(store: CatalogStore, queue: Arc<dyn JobQueue>, config: Config) -> Self {
        Self {
            store,
            queue,
            preview: PreviewBuilder::new(config.clone()),
            config,
        }
    }

    /// Accept an upload into the staging area and record it
    pub async fn stage(&self, file_name: &str, bytes: &[u8]) -> AppResult<SourceFile> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(AppError::validation("File name is required"));
        }
        if file_name.contains(['/', '\\']) {
            return Err(AppError::validation(
                "File name must not contain path separators",
            ));
        }
        if bytes.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if bytes.len() as u64 > self.config.max_upload_bytes {
            return Err(AppError::validation(format!(
                "File exceeds the {} byte upload limit",
                self.config.max_upload_bytes
            )));
        }

        let path = self.queue.stage(file_name, bytes).await?;

        let txn = self.store.begin_write()?;
        let id = self.store.next_id(&txn, SOURCE_FILE_ID_KEY)?;
        let record = SourceFile::new(id, file_name, bytes.len() as u64, path.display().to_string());
        self.store.put_source_file(&txn, &record)?;
        txn.commit()?;

        Ok(record)
    }

    /// Move a staged file into the worker queue.
    ///
    /// With a `supplier_id` the file is queued in supplier-scoped mode: the
    /// supplier's known SKUs go into a targeting sidecar first. Triggering a
    /// file that already left staging succeeds idempotently.
    pub async fn trigger(
        &self,
        file_name: &str,
        supplier_id: Option<u64>,
    ) -> AppResult<TriggerOutcome> {
        if !self.queue.is_staged(file_name).await {
            if self.queue.is_queued(file_name).await {
                tracing::info!(file = %file_name, "Trigger request for already-queued file");
                return Ok(TriggerOutcome::AlreadyQueued);
            }
            return Err(AppError::not_found(format!(
                "File not found in staging: {file_name}"
            )));
        }

        if let Some(supplier_id) = supplier_id {
            let skus: Vec<String> = self
                .store
                .get_products_for_supplier(supplier_id)?
                .into_iter()
                .map(|product| product.sku)
                .filter(|sku| !sku.is_empty())
                .collect();
            // Written even when empty: the sidecar's presence alone switches
            // the worker into supplier-scoped mode
            let sidecar = TargetSkuSidecar::new(skus, supplier_id);
            self.queue.write_sidecar(file_name, &sidecar).await?;
        }

        self.queue.enqueue(file_name).await?;
        Ok(TriggerOutcome::Triggered)
    }

    /// Poll worker output for a queued file
    pub async fn check_status(&self, file_name: &str) -> AppResult<ProcessingState> {
        if let Some(bytes) = self.queue.read_manifest(file_name).await? {
            let manifest = Manifest::decode(&bytes)
                .map_err(|e| AppError::validation(format!("Invalid manifest format: {e}")))?;
            return Ok(ProcessingState::Ready(manifest));
        }

        if let Some(bytes) = self.queue.read_progress(file_name).await?
            && let Ok(progress) = serde_json::from_slice::<serde_json::Value>(&bytes)
        {
            return Ok(ProcessingState::InProgress(progress));
        }

        // Unreadable progress reports degrade to the generic marker
        Ok(ProcessingState::Processing)
    }

    /// Build the review preview from a finished manifest
    pub async fn preview(&self, file_name: &str) -> AppResult<ManifestPreview> {
        let Some(bytes) = self.queue.read_manifest(file_name).await? else {
            return Err(AppError::not_found(format!(
                "No manifest yet for {file_name}"
            )));
        };
        self.preview.build_preview(&bytes)
    }

    /// Every recorded upload, newest first, flagged with manifest readiness
    pub async fn list_staged(&self) -> AppResult<Vec<StagedFile>> {
        let mut files = self.store.get_all_source_files()?;
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut out = Vec::with_capacity(files.len());
        for file in files {
            let is_ready = self.queue.is_ready(&file.file_name).await;
            out.push(StagedFile { file, is_ready });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Product, ProductStatus};
    use crate::ingest::queue::DirQueue;

    async fn coordinator() -> (tempfile::TempDir, IngestionCoordinator) {
        let dir = tempfile::tempdir().unwrap();
        let queue = DirQueue::new(dir.path());
        queue.initialize().await.unwrap();
        let config = Config::with_overrides(
            dir.path().display().to_string(),
            dir.path().join("data").display().to_string(),
        );
        let coordinator = IngestionCoordinator::new(
            CatalogStore::open_in_memory().unwrap(),
            Arc::new(queue),
            config,
        );
        (dir, coordinator)
    }

    fn add_supplier_product(store: &CatalogStore, sku: &str, supplier_id: u64) {
        let mut product = Product::new(sku, format!("Product {sku}"), ProductStatus::Approved);
        product.supplier_id = Some(supplier_id);
        let txn = store.begin_write().unwrap();
        store.put_product(&txn, &product).unwrap();
        txn.commit().unwrap();
    }

    #[tokio::test]
    async fn stage_records_a_source_file_row() {
        let (dir, coordinator) = coordinator().await;

        let record = coordinator.stage("catalog.xlsx", b"content").await.unwrap();
        assert_eq!(record.file_name, "catalog.xlsx");
        assert_eq!(record.file_size, 7);
        assert_eq!(record.status, "Uploaded");
        assert!(dir.path().join("uploads/catalog.xlsx").is_file());

        let listed = coordinator.list_staged().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].is_ready);
    }

    #[tokio::test]
    async fn stage_rejects_bad_names_and_payloads() {
        let (_dir, coordinator) = coordinator().await;

        for (name, bytes) in [
            ("", b"x" as &[u8]),
            ("   ", b"x"),
            ("../escape.pdf", b"x"),
            ("nested\\path.pdf", b"x"),
            ("empty.pdf", b""),
        ] {
            let err = coordinator.stage(name, bytes).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{name:?}");
        }
    }

    #[tokio::test]
    async fn stage_enforces_the_upload_ceiling() {
        let (_dir, coordinator) = coordinator().await;
        let mut small = coordinator.clone();
        small.config.max_upload_bytes = 4;

        let err = small.stage("big.pdf", b"12345").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(small.stage("ok.pdf", b"1234").await.is_ok());
    }

    #[tokio::test]
    async fn trigger_moves_file_and_writes_supplier_sidecar() {
        let (dir, coordinator) = coordinator().await;
        add_supplier_product(&coordinator.store, "A-1", 7);
        add_supplier_product(&coordinator.store, "B-2", 7);
        add_supplier_product(&coordinator.store, "C-3", 8);
        coordinator.stage("list.pdf", b"pdf").await.unwrap();

        let outcome = coordinator.trigger("list.pdf", Some(7)).await.unwrap();
        assert_eq!(outcome, TriggerOutcome::Triggered);
        assert!(dir.path().join("raw/list.pdf").is_file());

        let sidecar: TargetSkuSidecar = serde_json::from_slice(
            &std::fs::read(dir.path().join("raw/target_skus_list.pdf.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(sidecar.supplier_id, 7);
        assert_eq!(sidecar.target_skus, vec!["A-1", "B-2"]);
    }

    #[tokio::test]
    async fn trigger_without_supplier_writes_no_sidecar() {
        let (dir, coordinator) = coordinator().await;
        coordinator.stage("auto.pdf", b"pdf").await.unwrap();

        coordinator.trigger("auto.pdf", None).await.unwrap();
        assert!(!dir.path().join("raw/target_skus_auto.pdf.json").exists());
    }

    #[tokio::test]
    async fn trigger_with_unknown_supplier_still_scopes_the_job() {
        let (dir, coordinator) = coordinator().await;
        coordinator.stage("scan.pdf", b"pdf").await.unwrap();

        coordinator.trigger("scan.pdf", Some(99)).await.unwrap();

        let sidecar: TargetSkuSidecar = serde_json::from_slice(
            &std::fs::read(dir.path().join("raw/target_skus_scan.pdf.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(sidecar.supplier_id, 99);
        assert!(sidecar.target_skus.is_empty());
    }

    #[tokio::test]
    async fn retriggering_a_queued_file_is_idempotent() {
        let (_dir, coordinator) = coordinator().await;
        coordinator.stage("list.pdf", b"pdf").await.unwrap();
        coordinator.trigger("list.pdf", None).await.unwrap();

        let outcome = coordinator.trigger("list.pdf", None).await.unwrap();
        assert_eq!(outcome, TriggerOutcome::AlreadyQueued);
    }

    #[tokio::test]
    async fn triggering_an_unknown_file_is_not_found() {
        let (_dir, coordinator) = coordinator().await;
        let err = coordinator.trigger("ghost.pdf", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn status_walks_processing_progress_ready() {
        let (dir, coordinator) = coordinator().await;
        coordinator.stage("scan.pdf", b"pdf").await.unwrap();
        coordinator.trigger("scan.pdf", None).await.unwrap();

        assert!(matches!(
            coordinator.check_status("scan.pdf").await.unwrap(),
            ProcessingState::Processing
        ));

        std::fs::write(
            dir.path().join("processed/progress_scan.pdf.json"),
            br#"{"current": 3, "total": 10}"#,
        )
        .unwrap();
        match coordinator.check_status("scan.pdf").await.unwrap() {
            ProcessingState::InProgress(progress) => assert_eq!(progress["current"], 3),
            other => panic!("expected in_progress, got {other:?}"),
        }

        std::fs::write(
            dir.path().join("processed/manifest_scan.pdf.json"),
            br#"{"items": [], "missing_skus": [], "mode": "auto"}"#,
        )
        .unwrap();
        match coordinator.check_status("scan.pdf").await.unwrap() {
            ProcessingState::Ready(manifest) => assert_eq!(manifest.mode, "auto"),
            other => panic!("expected ready, got {other:?}"),
        }
        assert!(coordinator.list_staged().await.unwrap()[0].is_ready);
    }

    #[tokio::test]
    async fn unreadable_progress_degrades_to_processing() {
        let (dir, coordinator) = coordinator().await;
        std::fs::write(
            dir.path().join("processed/progress_scan.pdf.json"),
            b"not json",
        )
        .unwrap();

        assert!(matches!(
            coordinator.check_status("scan.pdf").await.unwrap(),
            ProcessingState::Processing
        ));
    }

    #[tokio::test]
    async fn preview_requires_a_manifest() {
        let (dir, coordinator) = coordinator().await;

        let err = coordinator.preview("scan.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        std::fs::write(
            dir.path().join("processed/manifest_scan.pdf.json"),
            br#"{"items": [{"uuid": "", "file_path": "/x.jpg", "source_page": 1}]}"#,
        )
        .unwrap();
        let preview = coordinator.preview("scan.pdf").await.unwrap();
        assert_eq!(preview.products.len(), 1);
    }

    #[tokio::test]
    async fn list_staged_is_newest_first() {
        let (_dir, coordinator) = coordinator().await;
        let first = coordinator.stage("first.pdf", b"a").await.unwrap();
        let second = coordinator.stage("second.pdf", b"b").await.unwrap();

        let listed = coordinator.list_staged().await.unwrap();
        assert_eq!(listed.len(), 2);
        // Equal timestamps keep insertion order stable, so second may tie
        let names: Vec<&str> = listed.iter().map(|f| f.file.file_name.as_str()).collect();
        assert!(names.contains(&first.file_name.as_str()));
        assert!(names.contains(&second.file_name.as_str()));
        assert!(listed[0].file.created_at >= listed[1].file.created_at);
    }
}
