//! Feature Row - ordered model input built from a validated PatientInput.
//!
//! Raw clinical units pass through untouched; scaling and encoding belong to
//! the model's own pipeline.

use serde::{Deserialize, Serialize};

use super::input::{InputError, PatientInput};
use super::layout::{self, FEATURE_COUNT, FEATURE_LAYOUT};

/// A single cell of a feature row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

/// Ordered mapping from column name to value, in training order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    columns: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRow {
    pub fn columns(&self) -> &[(&'static str, FeatureValue)] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        layout::feature_index(name).and_then(|i| self.columns.get(i).map(|(_, v)| v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Build the model row for a patient.
///
/// Fails when the input is outside its domain; a row is never built from
/// unchecked values.
pub fn build(input: &PatientInput) -> Result<FeatureRow, InputError> {
    input.check()?;

    let values = [
        FeatureValue::Number(input.lactate),
        FeatureValue::Number(input.urea),
        FeatureValue::Number(input.creatinine),
        FeatureValue::Number(input.platelets),
        FeatureValue::Text(input.resuscitation_value()),
    ];

    let columns: Vec<_> = FEATURE_LAYOUT.iter().copied().zip(values).collect();
    debug_assert_eq!(columns.len(), FEATURE_COUNT);

    Ok(FeatureRow { columns })
}
