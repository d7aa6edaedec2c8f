//! Model Bundle - classifier + decision threshold + evaluation metrics.
//!
//! The on-disk artifact is a JSON export of the trained pipeline. Only three
//! logical fields matter to the service: the model, its threshold and the
//! optional display metrics.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::forest::{ForestSpec, RandomForest};
use super::threshold::DecisionThreshold;
use super::ModelError;
use crate::features::{layout, FeatureRow};

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Opaque binary classifier: feature row in, positive-class probability out
pub trait Classifier: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    fn predict_probability(&self, row: &FeatureRow) -> Result<f64, ModelError>;
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Evaluation statistics shipped with the model (display only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(rename = "F1", default)]
    pub f1: Option<f64>,
    #[serde(rename = "Precision", default)]
    pub precision: Option<f64>,
    #[serde(rename = "Recall", default)]
    pub recall: Option<f64>,
    #[serde(default)]
    pub classification_report: Option<String>,
}

/// Where a bundle came from
#[derive(Debug, Clone, Serialize)]
pub struct BundleSource {
    pub path: String,
    pub sha256: String,
    pub layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
}

/// Model description as written by the export script
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ModelSpec {
    RandomForest(ForestSpec),
}

/// Serialized artifact
#[derive(Debug, Deserialize)]
struct ModelArtifact {
    feature_names: Vec<String>,
    threshold: f64,
    #[serde(default)]
    metrics: Option<ModelMetrics>,
    model: ModelSpec,
}

/// Loaded, immutable model bundle
#[derive(Debug, Clone)]
pub struct ModelBundle {
    model: Arc<dyn Classifier>,
    threshold: DecisionThreshold,
    metrics: Option<ModelMetrics>,
    source: Option<BundleSource>,
}

impl ModelBundle {
    /// Assemble a bundle around an in-memory classifier
    pub fn new(
        model: Arc<dyn Classifier>,
        threshold: f64,
        metrics: Option<ModelMetrics>,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            model,
            threshold: DecisionThreshold::new(threshold)?,
            metrics,
            source: None,
        })
    }

    /// Decode an artifact, checking checksum, layout, threshold and trees
    pub fn from_bytes(
        bytes: &[u8],
        origin: &Path,
        expected_sha256: Option<&str>,
    ) -> Result<Self, ModelError> {
        let sha256 = hex::encode(Sha256::digest(bytes));
        if let Some(expected) = expected_sha256 {
            if !expected.eq_ignore_ascii_case(&sha256) {
                return Err(ModelError::Checksum {
                    expected: expected.to_string(),
                    actual: sha256,
                });
            }
        }

        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        layout::validate_columns(&artifact.feature_names)?;

        let model: Arc<dyn Classifier> = match artifact.model {
            ModelSpec::RandomForest(spec) => Arc::new(RandomForest::try_from(spec)?),
        };

        Ok(Self {
            model,
            threshold: DecisionThreshold::new(artifact.threshold)?,
            metrics: artifact.metrics,
            source: Some(BundleSource {
                path: origin.display().to_string(),
                sha256,
                layout_hash: layout::hash_columns(&artifact.feature_names),
                loaded_at: Utc::now(),
            }),
        })
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub fn threshold(&self) -> DecisionThreshold {
        self.threshold
    }

    pub fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }

    pub fn source(&self) -> Option<&BundleSource> {
        self.source.as_ref()
    }
}
