//! Shared test fixtures: small forests, fixed-output models, artifacts.

use std::sync::Arc;

use serde_json::json;

use crate::features::{layout, FeatureRow, FEATURE_LAYOUT};
use crate::model::forest::{ColumnEncoding, DecisionTree, RandomForest};
use crate::model::{Classifier, ModelBundle, ModelError, ModelState};

/// Model that always answers the same probability
#[derive(Debug)]
pub struct FixedProbability(pub f64);

impl Classifier for FixedProbability {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict_probability(&self, _row: &FeatureRow) -> Result<f64, ModelError> {
        Ok(self.0)
    }
}

/// Model that always fails
#[derive(Debug)]
pub struct FailingModel;

impl Classifier for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    fn predict_probability(&self, _row: &FeatureRow) -> Result<f64, ModelError> {
        Err(ModelError::Encoding("boom".into()))
    }
}

pub fn ready_state(probability: f64, threshold: f64) -> ModelState {
    let bundle = ModelBundle::new(Arc::new(FixedProbability(probability)), threshold, None)
        .expect("valid threshold");
    ModelState::Ready(Arc::new(bundle))
}

/// Splits on lactate <= 4.0, then on the CPR indicator; plus a 0.5 stump
pub fn lactate_forest() -> RandomForest {
    let encoding = vec![
        ColumnEncoding::Numeric { column: layout::LACTATE.into(), impute: None },
        ColumnEncoding::Numeric { column: layout::UREA.into(), impute: None },
        ColumnEncoding::Numeric { column: layout::CREATININE.into(), impute: None },
        ColumnEncoding::Numeric { column: layout::PLATELETS.into(), impute: None },
        ColumnEncoding::OneHot {
            column: layout::RESUSCITATION.into(),
            categories: vec!["None".into(), "CPR".into(), "Fluid".into()],
        },
    ];
    let tree = DecisionTree::new(
        vec![1, -1, 3, -1, -1],
        vec![2, -1, 4, -1, -1],
        vec![0, -2, 5, -2, -2],
        vec![4.0, -2.0, 0.5, -2.0, -2.0],
        vec![
            vec![50.0, 50.0],
            vec![9.0, 1.0],
            vec![20.0, 20.0],
            vec![3.0, 7.0],
            vec![1.0, 9.0],
        ],
    );
    let stump = DecisionTree::new(vec![-1], vec![-1], vec![-2], vec![-2.0], vec![vec![1.0, 1.0]]);
    RandomForest::new(encoding, vec![tree, stump]).expect("valid forest")
}

/// JSON artifact wrapping [`lactate_forest`]
pub fn artifact_json(threshold: f64) -> String {
    let mut model = serde_json::to_value(lactate_forest()).expect("forest serializes");
    model["kind"] = json!("random_forest");

    json!({
        "feature_names": FEATURE_LAYOUT,
        "threshold": threshold,
        "metrics": {
            "F1": 0.5,
            "Precision": 0.45,
            "Recall": 0.6,
            "classification_report": "precision recall f1-score support"
        },
        "model": model,
    })
    .to_string()
}
