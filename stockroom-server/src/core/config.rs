use std::path::PathBuf;

/// Runtime configuration for the stockroom engine
///
/// # Environment variables
///
/// Every knob can be overridden through the environment:
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | SHARED_DIR | ./shared | Directory tree shared with the mining worker |
/// | DATA_DIR | ./data | Embedded database location |
/// | MAX_UPLOAD_BYTES | 52428800 | Upload size ceiling (50 MB) |
/// | WORKER_PROCESSED_PREFIX | /app/shared/processed | Worker-side path root in manifests |
/// | MEDIA_PREFIX | /media | Public path prefix served to clients |
/// | ENVIRONMENT | development | Runtime environment |
///
/// # Example
///
/// ```ignore
/// SHARED_DIR=/srv/stockroom/shared DATA_DIR=/srv/stockroom/data ...
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the directory tree shared with the worker
    /// (`uploads/`, `raw/`, `processed/` live under it)
    pub shared_dir: String,
    /// Directory holding the embedded database
    pub data_dir: String,
    /// Upload size ceiling in bytes
    pub max_upload_bytes: u64,
    /// Path prefix the worker uses for its own output in manifests
    pub worker_processed_prefix: String,
    /// Public media prefix those paths are rewritten to
    pub media_prefix: String,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            shared_dir: std::env::var("SHARED_DIR").unwrap_or_else(|_| "./shared".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(52_428_800),
            worker_processed_prefix: std::env::var("WORKER_PROCESSED_PREFIX")
                .unwrap_or_else(|_| "/app/shared/processed".into()),
            media_prefix: std::env::var("MEDIA_PREFIX").unwrap_or_else(|_| "/media".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the directory roots, keeping everything else from the
    /// environment. Used by tests.
    pub fn with_overrides(shared_dir: impl Into<String>, data_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.shared_dir = shared_dir.into();
        config.data_dir = data_dir.into();
        config
    }

    /// Path of the embedded database file
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("stockroom.redb")
    }

    /// Directory the worker drops manifests and images into
    pub fn processed_dir(&self) -> PathBuf {
        PathBuf::from(&self.shared_dir).join("processed")
    }

    /// Rewrite a worker-side path from a manifest to its public media form.
    /// Paths outside the worker's output root pass through unchanged.
    pub fn to_media_path(&self, worker_path: &str) -> String {
        match worker_path.strip_prefix(&self.worker_processed_prefix) {
            Some(rest) => format!("{}{}", self.media_prefix, rest),
            None => worker_path.to_string(),
        }
    }

    /// Map a public media path back onto the processed directory.
    /// Returns `None` for paths outside the media prefix.
    pub fn media_path_to_local(&self, media_path: &str) -> Option<PathBuf> {
        let rest = media_path.strip_prefix(&self.media_prefix)?;
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        Some(self.processed_dir().join(rest))
    }

    /// Whether this is a production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether this is a development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
