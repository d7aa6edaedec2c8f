//! Model Store - loads the model bundle once per store lifetime.
//!
//! A missing or corrupt artifact leaves the store in the `Unavailable`
//! state; nothing is thrown past this boundary.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Serialize;

use super::bundle::ModelBundle;

/// Outcome of the one-time load
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(Arc<ModelBundle>),
    Unavailable { reason: String },
}

impl ModelState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn bundle(&self) -> Option<&Arc<ModelBundle>> {
        match self {
            Self::Ready(bundle) => Some(bundle),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}

/// Store status for the UI / status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub model_loaded: bool,
    pub model_path: String,
    pub reason: Option<String>,
    pub artifact_reads: u64,
}

/// Lazy, thread-safe, load-once holder of the model bundle
#[derive(Debug)]
pub struct ModelStore {
    path: PathBuf,
    expected_sha256: Option<String>,
    state: OnceCell<ModelState>,
    reads: AtomicU64,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            expected_sha256: None,
            state: OnceCell::new(),
            reads: AtomicU64::new(0),
        }
    }

    /// Pin the artifact to a SHA-256 digest
    pub fn with_checksum(mut self, sha256: Option<String>) -> Self {
        self.expected_sha256 = sha256;
        self
    }

    /// Store that already holds a bundle (no artifact is read)
    pub fn preloaded(bundle: ModelBundle) -> Self {
        let store = Self::new("<memory>");
        let _ = store.state.set(ModelState::Ready(Arc::new(bundle)));
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the bundle; the artifact is read on the first call only
    pub fn load(&self) -> &ModelState {
        self.state.get_or_init(|| self.read_artifact())
    }

    /// Number of times the artifact was actually read
    pub fn load_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> StoreStatus {
        let state = self.load();
        StoreStatus {
            model_loaded: state.is_ready(),
            model_path: self.path.display().to_string(),
            reason: state.unavailable_reason().map(str::to_string),
            artifact_reads: self.load_count(),
        }
    }

    fn read_artifact(&self) -> ModelState {
        self.reads.fetch_add(1, Ordering::SeqCst);
        log::info!("Loading model artifact from: {}", self.path.display());

        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let reason = format!("Model file not found: {}", self.path.display());
                log::error!("{}", reason);
                return ModelState::Unavailable { reason };
            }
            Err(e) => {
                let reason = format!("Error reading model: {}", e);
                log::error!("{}", reason);
                return ModelState::Unavailable { reason };
            }
        };

        match ModelBundle::from_bytes(&bytes, &self.path, self.expected_sha256.as_deref()) {
            Ok(bundle) => {
                log::info!(
                    "Model loaded: {} (threshold {:.3}, {} bytes)",
                    bundle.model().name(),
                    bundle.threshold().value(),
                    bytes.len()
                );
                ModelState::Ready(Arc::new(bundle))
            }
            Err(e) => {
                let reason = format!("Error loading model: {}", e);
                log::error!("{}", reason);
                ModelState::Unavailable { reason }
            }
        }
    }
}
