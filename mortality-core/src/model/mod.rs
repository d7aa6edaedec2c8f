//! Model Module - ModelStore and RiskClassifier
//!
//! Loads the trained classifier bundle once, then turns feature rows into
//! thresholded risk predictions.

pub mod bundle;
pub mod forest;
pub mod inference;
pub mod store;
pub mod threshold;

// Re-export common types
pub use bundle::{BundleSource, Classifier, ModelBundle, ModelMetrics};
pub use forest::RandomForest;
pub use inference::{engine_stats, predict, EngineStats, PredictError, PredictionResult, RiskLabel};
pub use store::{ModelState, ModelStore, StoreStatus};
pub use threshold::{DecisionThreshold, TRAINED_THRESHOLD};

use crate::features::layout::LayoutMismatchError;

/// Artifact and model errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("artifact is not a valid model export: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("artifact checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error("decision threshold {0} is outside (0, 1)")]
    InvalidThreshold(f64),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}
