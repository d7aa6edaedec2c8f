//! Risk Classifier - runs the loaded model and applies the decision threshold.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

use super::store::ModelState;
use super::threshold::DecisionThreshold;
use super::ModelError;
use crate::features::FeatureRow;

// ============================================================================
// STATE
// ============================================================================

/// Latency stats
static LATENCY_SUM_US: AtomicU64 = AtomicU64::new(0);
static INFERENCE_COUNT: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Binary risk class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLabel {
    HighRisk,
    LowRisk,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighRisk => "HIGH_RISK",
            Self::LowRisk => "LOW_RISK",
        }
    }

    /// Human-readable risk level
    pub fn risk_level(&self) -> &'static str {
        match self {
            Self::HighRisk => "HIGH RISK",
            Self::LowRisk => "LOW RISK",
        }
    }

    /// Integer class as the training code produced it
    pub fn as_flag(&self) -> u8 {
        match self {
            Self::HighRisk => 1,
            Self::LowRisk => 0,
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prediction output. The label is always derived from the probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    probability: f64,
    label: RiskLabel,
    threshold_used: f64,
}

impl PredictionResult {
    pub fn decide(probability: f64, threshold: DecisionThreshold) -> Self {
        let label = if threshold.is_high_risk(probability) {
            RiskLabel::HighRisk
        } else {
            RiskLabel::LowRisk
        };

        Self {
            probability,
            label,
            threshold_used: threshold.value(),
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn label(&self) -> RiskLabel {
        self.label
    }

    pub fn threshold_used(&self) -> f64 {
        self.threshold_used
    }

    pub fn is_high_risk(&self) -> bool {
        self.label == RiskLabel::HighRisk
    }
}

/// Engine stats for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub inference_count: u64,
    pub avg_latency_ms: f64,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Model not loaded: {reason}")]
    ModelUnavailable { reason: String },

    #[error("Inference failed: {0}")]
    Inference(#[from] ModelError),

    #[error("Model returned an invalid probability: {0}")]
    InvalidProbability(f64),
}

// ============================================================================
// PREDICTION
// ============================================================================

/// Run the model on one feature row
pub fn predict(state: &ModelState, row: &FeatureRow) -> Result<PredictionResult, PredictError> {
    let bundle = match state {
        ModelState::Ready(bundle) => bundle,
        ModelState::Unavailable { reason } => {
            return Err(PredictError::ModelUnavailable { reason: reason.clone() });
        }
    };

    let start = Instant::now();
    let probability = bundle.model().predict_probability(row)?;
    let elapsed_us = start.elapsed().as_micros() as u64;

    LATENCY_SUM_US.fetch_add(elapsed_us, Ordering::Relaxed);
    INFERENCE_COUNT.fetch_add(1, Ordering::Relaxed);

    if !(0.0..=1.0).contains(&probability) {
        log::warn!("Model {} produced probability {}", bundle.model().name(), probability);
        return Err(PredictError::InvalidProbability(probability));
    }

    let result = PredictionResult::decide(probability, bundle.threshold());
    log::debug!(
        "Prediction: p={:.3} threshold={:.3} -> {} ({}us)",
        result.probability(),
        result.threshold_used(),
        result.label(),
        elapsed_us
    );

    Ok(result)
}

pub fn engine_stats() -> EngineStats {
    let sum = LATENCY_SUM_US.load(Ordering::Relaxed);
    let count = INFERENCE_COUNT.load(Ordering::Relaxed);
    let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

    EngineStats {
        inference_count: count,
        avg_latency_ms: avg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{build, PatientInput};
    use crate::test_fixtures::{ready_state, FailingModel};
    use crate::model::ModelBundle;
    use std::sync::Arc;

    fn row() -> FeatureRow {
        build(&PatientInput::new(8.0, 20.0, 1.0, 250.0, vec![])).unwrap()
    }

    #[test]
    fn test_high_risk_scenario() {
        let result = predict(&ready_state(0.75, 0.612), &row()).unwrap();
        assert_eq!(result.label(), RiskLabel::HighRisk);
        assert_eq!(result.probability(), 0.75);
        assert_eq!(result.threshold_used(), 0.612);
    }

    #[test]
    fn test_low_risk_scenario() {
        let result = predict(&ready_state(0.40, 0.612), &row()).unwrap();
        assert_eq!(result.label(), RiskLabel::LowRisk);
        assert_eq!(result.probability(), 0.40);
    }

    #[test]
    fn test_tie_goes_to_high_risk() {
        let result = predict(&ready_state(0.612, 0.612), &row()).unwrap();
        assert_eq!(result.label(), RiskLabel::HighRisk);
    }

    #[test]
    fn test_label_matches_comparison_over_grid() {
        for t in [0.1, 0.25, 0.5, 0.612, 0.9] {
            for i in 0..=100 {
                let p = i as f64 / 100.0;
                let r = PredictionResult::decide(p, DecisionThreshold::new(t).unwrap());
                assert_eq!(r.is_high_risk(), p >= t, "p={} t={}", p, t);
            }
        }
    }

    #[test]
    fn test_unavailable_model_fails() {
        let state = ModelState::Unavailable { reason: "Model file not found".into() };
        let err = predict(&state, &row()).unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable { .. }));
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let err = predict(&ready_state(1.3, 0.612), &row()).unwrap_err();
        assert!(matches!(err, PredictError::InvalidProbability(_)));

        let err = predict(&ready_state(f64::NAN, 0.612), &row()).unwrap_err();
        assert!(matches!(err, PredictError::InvalidProbability(_)));
    }

    #[test]
    fn test_model_error_propagates() {
        let bundle = ModelBundle::new(Arc::new(FailingModel), 0.612, None).unwrap();
        let state = ModelState::Ready(Arc::new(bundle));
        assert!(matches!(predict(&state, &row()), Err(PredictError::Inference(_))));
    }

    #[test]
    fn test_stats_track_inference() {
        predict(&ready_state(0.5, 0.612), &row()).unwrap();
        assert!(engine_stats().inference_count >= 1);
    }

    #[test]
    fn test_serialized_shape() {
        let r = PredictionResult::decide(0.75, DecisionThreshold::default());
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["label"], "HIGH_RISK");
        assert_eq!(json["probability"], 0.75);
        assert_eq!(json["threshold_used"], 0.612);
    }
}
