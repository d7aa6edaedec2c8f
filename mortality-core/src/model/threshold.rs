//! Decision Threshold
//!
//! Fixed probability cutoff chosen at training time. It is read from the
//! model artifact and never recomputed at runtime.

use serde::{Deserialize, Serialize};

use super::ModelError;

/// Threshold the published model was tuned to
pub const TRAINED_THRESHOLD: f64 = 0.612;

/// Probability cutoff, strictly inside (0, 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DecisionThreshold(f64);

impl DecisionThreshold {
    pub fn new(value: f64) -> Result<Self, ModelError> {
        if value.is_finite() && value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(ModelError::InvalidThreshold(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Ties go to high risk: `probability >= threshold`
    pub fn is_high_risk(&self, probability: f64) -> bool {
        probability >= self.0
    }
}

impl Default for DecisionThreshold {
    fn default() -> Self {
        Self(TRAINED_THRESHOLD)
    }
}

impl TryFrom<f64> for DecisionThreshold {
    type Error = ModelError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DecisionThreshold> for f64 {
    fn from(t: DecisionThreshold) -> f64 {
        t.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_trained_value() {
        assert_eq!(DecisionThreshold::default().value(), 0.612);
    }

    #[test]
    fn test_boundary_is_high_risk() {
        let t = DecisionThreshold::new(0.612).unwrap();
        assert!(t.is_high_risk(0.612));
        assert!(t.is_high_risk(0.6121));
        assert!(!t.is_high_risk(0.6119));
    }

    #[test]
    fn test_out_of_range_rejected() {
        for bad in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(DecisionThreshold::new(bad).is_err(), "{} accepted", bad);
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: DecisionThreshold = serde_json::from_str("0.5").unwrap();
        assert_eq!(ok.value(), 0.5);
        assert!(serde_json::from_str::<DecisionThreshold>("1.2").is_err());
    }
}
