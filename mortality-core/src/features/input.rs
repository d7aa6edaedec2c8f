//! Patient Input - the five clinical values a prediction is made from.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Domain bounds accepted for numeric inputs
pub mod bounds {
    pub const LACTATE: (f64, f64) = (0.2, 15.0);
    pub const UREA: (f64, f64) = (2.0, 450.0);
    pub const CREATININE: (f64, f64) = (0.3, 16.0);
    pub const PLATELETS: (f64, f64) = (5.0, 800.0);
}

/// Literal sent to the model when no intervention was received
pub const NO_RESUSCITATION: &str = "None";

/// Resuscitation interventions (fixed vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resuscitation {
    #[serde(rename = "Fluid")]
    Fluid,
    #[serde(rename = "Use of Vasopressors")]
    Vasopressors,
    #[serde(rename = "Use of Invasive Ventilation")]
    InvasiveVentilation,
    #[serde(rename = "Use of Non-Invasive Ventilation")]
    NonInvasiveVentilation,
    #[serde(rename = "CPR")]
    Cpr,
}

impl Resuscitation {
    pub const ALL: [Resuscitation; 5] = [
        Resuscitation::Fluid,
        Resuscitation::Vasopressors,
        Resuscitation::InvasiveVentilation,
        Resuscitation::NonInvasiveVentilation,
        Resuscitation::Cpr,
    ];

    /// Tag exactly as it appeared in the training data
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fluid => "Fluid",
            Self::Vasopressors => "Use of Vasopressors",
            Self::InvasiveVentilation => "Use of Invasive Ventilation",
            Self::NonInvasiveVentilation => "Use of Non-Invasive Ventilation",
            Self::Cpr => "CPR",
        }
    }
}

impl std::fmt::Display for Resuscitation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clinical input for one prediction request.
///
/// Range rules live on the fields; [`PatientInput::check`] adds the
/// finiteness rule that `validator` ranges do not cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PatientInput {
    /// Lactate (ABG), mmol/L
    #[validate(range(min = 0.2, max = 15.0))]
    pub lactate: f64,

    /// Urea, mg/dl
    #[validate(range(min = 2.0, max = 450.0))]
    pub urea: f64,

    /// Creatinine, mg/dl
    #[validate(range(min = 0.3, max = 16.0))]
    pub creatinine: f64,

    /// Platelets, 10^6/uL
    #[validate(range(min = 5.0, max = 800.0))]
    pub platelets: f64,

    /// Interventions in selection order
    #[serde(default)]
    pub resuscitation: Vec<Resuscitation>,
}

/// Rejected patient input
#[derive(Debug, Clone, thiserror::Error)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("invalid input: {0}")]
    OutOfRange(String),
}

impl PatientInput {
    pub fn new(
        lactate: f64,
        urea: f64,
        creatinine: f64,
        platelets: f64,
        resuscitation: Vec<Resuscitation>,
    ) -> Self {
        Self {
            lactate,
            urea,
            creatinine,
            platelets,
            resuscitation,
        }
    }

    /// Full validation: finite values inside the domain bounds
    pub fn check(&self) -> Result<(), InputError> {
        for (field, value) in [
            ("lactate", self.lactate),
            ("urea", self.urea),
            ("creatinine", self.creatinine),
            ("platelets", self.platelets),
        ] {
            if !value.is_finite() {
                return Err(InputError::NotFinite { field });
            }
        }

        self.validate()
            .map_err(|e| InputError::OutOfRange(e.to_string()))
    }

    /// Selected tags, duplicates dropped, first occurrence wins
    pub fn selected(&self) -> Vec<Resuscitation> {
        let mut seen = Vec::with_capacity(self.resuscitation.len());
        for tag in &self.resuscitation {
            if !seen.contains(tag) {
                seen.push(*tag);
            }
        }
        seen
    }

    /// Categorical encoding used at training time
    pub fn resuscitation_value(&self) -> String {
        let selected = self.selected();
        if selected.is_empty() {
            return NO_RESUSCITATION.to_string();
        }

        selected
            .iter()
            .map(Resuscitation::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PatientInput {
        PatientInput::new(8.0, 20.0, 1.0, 250.0, vec![])
    }

    #[test]
    fn test_empty_selection_encodes_none() {
        assert_eq!(input().resuscitation_value(), "None");
    }

    #[test]
    fn test_selection_order_is_kept() {
        let mut p = input();
        p.resuscitation = vec![Resuscitation::Fluid, Resuscitation::Cpr];
        assert_eq!(p.resuscitation_value(), "Fluid, CPR");

        p.resuscitation = vec![Resuscitation::Cpr, Resuscitation::Fluid];
        assert_eq!(p.resuscitation_value(), "CPR, Fluid");
    }

    #[test]
    fn test_duplicate_tags_dropped() {
        let mut p = input();
        p.resuscitation = vec![
            Resuscitation::Vasopressors,
            Resuscitation::Fluid,
            Resuscitation::Vasopressors,
        ];
        assert_eq!(p.resuscitation_value(), "Use of Vasopressors, Fluid");
    }

    #[test]
    fn test_bounds_inclusive() {
        let low = PatientInput::new(0.2, 2.0, 0.3, 5.0, vec![]);
        let high = PatientInput::new(15.0, 450.0, 16.0, 800.0, vec![]);
        assert!(low.check().is_ok());
        assert!(high.check().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut p = input();
        p.lactate = 15.1;
        assert!(matches!(p.check(), Err(InputError::OutOfRange(_))));

        let mut p = input();
        p.platelets = 4.9;
        assert!(matches!(p.check(), Err(InputError::OutOfRange(_))));
    }

    #[test]
    fn test_nan_rejected() {
        let mut p = input();
        p.urea = f64::NAN;
        assert!(matches!(p.check(), Err(InputError::NotFinite { field: "urea" })));
    }

    #[test]
    fn test_deserialize_tags_from_display_names() {
        let json = r#"{"lactate": 2.0, "urea": 20.0, "creatinine": 1.0, "platelets": 250.0,
                       "resuscitation": ["Use of Invasive Ventilation", "CPR"]}"#;
        let p: PatientInput = serde_json::from_str(json).unwrap();
        assert_eq!(p.resuscitation, vec![Resuscitation::InvasiveVentilation, Resuscitation::Cpr]);
    }

    #[test]
    fn test_missing_tags_default_to_empty() {
        let json = r#"{"lactate": 2.0, "urea": 20.0, "creatinine": 1.0, "platelets": 250.0}"#;
        let p: PatientInput = serde_json::from_str(json).unwrap();
        assert!(p.resuscitation.is_empty());
        assert_eq!(p.resuscitation_value(), "None");
    }
}
