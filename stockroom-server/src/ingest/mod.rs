//! Document Ingestion Module
//!
//! Hand-off pipeline between uploaded documents and the external mining
//! worker:
//!
//! - **queue**: filesystem job queue shared with the worker
//! - **coordinator**: stage / trigger / poll / list orchestration
//! - **preview**: manifest-to-draft-product projection for human review
//!
//! # Data Flow
//!
//! ```text
//! Upload → stage (uploads/) → trigger (raw/ + sidecar) → worker
//!                                                          ↓
//! Operator review ← preview ← check_status ← processed/manifest_*.json
//! ```

pub mod coordinator;
pub mod preview;
pub mod queue;

pub use coordinator::{IngestionCoordinator, ProcessingState, StagedFile, TriggerOutcome};
pub use preview::{ManifestPreview, PreviewBuilder};
pub use queue::{DirQueue, JobQueue};
