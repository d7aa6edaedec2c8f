//! Integration Tests for the FeatureBuilder

use super::layout::*;
use super::{build, FeatureValue, InputError, PatientInput, Resuscitation};

fn patient(resuscitation: Vec<Resuscitation>) -> PatientInput {
    PatientInput::new(8.0, 20.0, 1.0, 250.0, resuscitation)
}

#[test]
fn test_row_follows_training_layout() {
    let row = build(&patient(vec![])).unwrap();

    assert_eq!(row.len(), FEATURE_COUNT);
    assert_eq!(row.names(), FEATURE_LAYOUT.to_vec());
    assert_eq!(row.get(LACTATE), Some(&FeatureValue::Number(8.0)));
    assert_eq!(row.get(UREA), Some(&FeatureValue::Number(20.0)));
    assert_eq!(row.get(CREATININE), Some(&FeatureValue::Number(1.0)));
    assert_eq!(row.get(PLATELETS), Some(&FeatureValue::Number(250.0)));
    assert_eq!(row.get(RESUSCITATION), Some(&FeatureValue::Text("None".into())));
}

#[test]
fn test_build_is_deterministic() {
    let input = patient(vec![Resuscitation::Fluid, Resuscitation::Cpr]);
    let first = build(&input).unwrap();
    let second = build(&input).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.get(RESUSCITATION).and_then(FeatureValue::as_text),
        Some("Fluid, CPR")
    );
}

#[test]
fn test_no_normalization_applied() {
    let input = PatientInput::new(14.9, 449.0, 15.5, 799.0, vec![]);
    let row = build(&input).unwrap();
    let numbers: Vec<f64> = row.columns().iter().filter_map(|(_, v)| v.as_number()).collect();
    assert_eq!(numbers, vec![14.9, 449.0, 15.5, 799.0]);
}

#[test]
fn test_invalid_input_never_builds() {
    let mut input = patient(vec![]);
    input.creatinine = 0.0;
    assert!(matches!(build(&input), Err(InputError::OutOfRange(_))));

    input.creatinine = f64::INFINITY;
    assert!(matches!(build(&input), Err(InputError::NotFinite { .. })));
}

#[test]
fn test_row_serializes_in_order() {
    let row = build(&patient(vec![Resuscitation::Vasopressors])).unwrap();
    let json = serde_json::to_value(&row).unwrap();
    let cols = json["columns"].as_array().unwrap();
    assert_eq!(cols[0][0], LACTATE);
    assert_eq!(cols[4][1], "Use of Vasopressors");
}
