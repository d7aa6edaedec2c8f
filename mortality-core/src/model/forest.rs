//! Random Forest evaluator
//!
//! Reads a forest exported in scikit-learn's array layout (one set of
//! parallel node arrays per tree) together with the column encoding the
//! training pipeline applied in front of it.

use serde::{Deserialize, Serialize};

use super::bundle::Classifier;
use super::ModelError;
use crate::features::{layout, FeatureRow, FeatureValue};

/// sklearn marks leaves with -1 children
const LEAF: i64 = -1;

/// Index of the positive (mortality) class in leaf value arrays
const POSITIVE_CLASS: usize = 1;

// ============================================================================
// COLUMN ENCODING
// ============================================================================

/// How a named input column expands into the numeric vector the trees split on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnEncoding {
    /// Passed through; `impute` replaces a missing value
    Numeric {
        column: String,
        #[serde(default)]
        impute: Option<f64>,
    },
    /// One output per category, unknown categories encode as all zeros
    OneHot {
        column: String,
        categories: Vec<String>,
    },
}

impl ColumnEncoding {
    pub fn column(&self) -> &str {
        match self {
            Self::Numeric { column, .. } | Self::OneHot { column, .. } => column,
        }
    }

    fn width(&self) -> usize {
        match self {
            Self::Numeric { .. } => 1,
            Self::OneHot { categories, .. } => categories.len(),
        }
    }

    fn encode_into(&self, value: Option<&FeatureValue>, out: &mut Vec<f64>) -> Result<(), ModelError> {
        match self {
            Self::Numeric { column, impute } => {
                let v = match value {
                    Some(FeatureValue::Number(v)) => *v,
                    None => impute.ok_or_else(|| {
                        ModelError::Encoding(format!("missing value for '{}'", column))
                    })?,
                    Some(FeatureValue::Text(s)) => {
                        return Err(ModelError::Encoding(format!(
                            "'{}' expects a number, got text '{}'",
                            column, s
                        )));
                    }
                };
                out.push(v);
            }
            Self::OneHot { column, categories } => {
                let text = match value {
                    Some(FeatureValue::Text(s)) => s.as_str(),
                    Some(FeatureValue::Number(_)) => {
                        return Err(ModelError::Encoding(format!(
                            "'{}' expects a category, got a number",
                            column
                        )));
                    }
                    None => "",
                };
                out.extend(categories.iter().map(|c| if c == text { 1.0 } else { 0.0 }));
            }
        }
        Ok(())
    }
}

// ============================================================================
// DECISION TREE
// ============================================================================

/// One tree, node arrays indexed by node id (root = 0)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    /// Per-node class weights `[negative, positive]`
    value: Vec<Vec<f64>>,
}

impl DecisionTree {
    /// Node arrays in sklearn's `tree_` layout. Checked when the forest is built.
    pub fn new(
        children_left: Vec<i64>,
        children_right: Vec<i64>,
        feature: Vec<i64>,
        threshold: Vec<f64>,
        value: Vec<Vec<f64>>,
    ) -> Self {
        Self { children_left, children_right, feature, threshold, value }
    }

    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }

    /// Structural checks; children always point forward so traversal ends
    fn validate(&self, width: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if [self.children_right.len(), self.feature.len(), self.threshold.len(), self.value.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err("node arrays differ in length".into());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {} has a single child", node));
                }
                let weights = &self.value[node];
                if weights.len() <= POSITIVE_CLASS {
                    return Err(format!("leaf {} has no positive class weight", node));
                }
                let total: f64 = weights.iter().sum();
                if total <= 0.0 || weights.iter().any(|w| *w < 0.0 || !w.is_finite()) {
                    return Err(format!("leaf {} has invalid class weights", node));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} has out-of-order child {}", node, child));
                }
            }
            let f = self.feature[node];
            if f < 0 || f as usize >= width {
                return Err(format!("node {} splits on unknown feature {}", node, f));
            }
            if !self.threshold[node].is_finite() {
                return Err(format!("node {} has a non-finite threshold", node));
            }
        }
        Ok(())
    }

    /// Positive-class probability at the leaf reached by `x`
    fn leaf_probability(&self, x: &[f64]) -> f64 {
        let mut node = 0usize;
        while !self.is_leaf(node) {
            let f = self.feature[node] as usize;
            node = if x[f] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }

        let weights = &self.value[node];
        let total: f64 = weights.iter().sum();
        weights[POSITIVE_CLASS] / total
    }
}

// ============================================================================
// FOREST
// ============================================================================

/// Forest as read from an artifact, before any structural checks
#[derive(Debug, Clone, Deserialize)]
pub struct ForestSpec {
    pub encoding: Vec<ColumnEncoding>,
    pub trees: Vec<DecisionTree>,
}

/// Averaging ensemble of decision trees.
///
/// Only constructed through [`RandomForest::new`], so every tree it holds
/// has been checked against the encoding width.
#[derive(Debug, Clone, Serialize)]
pub struct RandomForest {
    encoding: Vec<ColumnEncoding>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(encoding: Vec<ColumnEncoding>, trees: Vec<DecisionTree>) -> Result<Self, ModelError> {
        let forest = Self { encoding, trees };
        forest.validate()?;
        Ok(forest)
    }

    pub fn encoding(&self) -> &[ColumnEncoding] {
        &self.encoding
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Width of the encoded vector the trees index into
    pub fn encoded_width(&self) -> usize {
        self.encoding.iter().map(ColumnEncoding::width).sum()
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidModel("forest has no trees".into()));
        }
        for enc in &self.encoding {
            if layout::feature_index(enc.column()).is_none() {
                return Err(ModelError::InvalidModel(format!(
                    "encoding references unknown column '{}'",
                    enc.column()
                )));
            }
        }

        let width = self.encoded_width();
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(width)
                .map_err(|reason| ModelError::InvalidModel(format!("tree {}: {}", i, reason)))?;
        }
        Ok(())
    }

    /// Apply the column encoding to a feature row
    pub fn encode(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        let mut x = Vec::with_capacity(self.encoded_width());
        for enc in &self.encoding {
            enc.encode_into(row.get(enc.column()), &mut x)?;
        }
        Ok(x)
    }
}

impl TryFrom<ForestSpec> for RandomForest {
    type Error = ModelError;

    fn try_from(spec: ForestSpec) -> Result<Self, Self::Error> {
        Self::new(spec.encoding, spec.trees)
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn predict_probability(&self, row: &FeatureRow) -> Result<f64, ModelError> {
        let x = self.encode(row)?;
        let sum: f64 = self.trees.iter().map(|t| t.leaf_probability(&x)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{build, PatientInput, Resuscitation};
    use crate::test_fixtures::lactate_forest;

    fn probability(input: PatientInput) -> f64 {
        let forest = lactate_forest();
        forest.predict_probability(&build(&input).unwrap()).unwrap()
    }

    #[test]
    fn test_low_lactate_path() {
        // (0.1 + 0.5) / 2
        let p = probability(PatientInput::new(2.0, 20.0, 1.0, 250.0, vec![]));
        assert!((p - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_high_lactate_without_cpr() {
        // (0.7 + 0.5) / 2
        let p = probability(PatientInput::new(8.0, 20.0, 1.0, 250.0, vec![]));
        assert!((p - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_high_lactate_with_cpr() {
        // (0.9 + 0.5) / 2
        let p = probability(PatientInput::new(8.0, 20.0, 1.0, 250.0, vec![Resuscitation::Cpr]));
        assert!((p - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_split_is_inclusive_left() {
        let p = probability(PatientInput::new(4.0, 20.0, 1.0, 250.0, vec![]));
        assert!((p - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_category_encodes_zeros() {
        let forest = lactate_forest();
        let row = build(&PatientInput::new(
            2.0, 20.0, 1.0, 250.0,
            vec![Resuscitation::Fluid, Resuscitation::Cpr],
        ))
        .unwrap();
        let x = forest.encode(&row).unwrap();
        assert_eq!(&x[4..], &[0.0, 0.0, 0.0]);
    }

    /// Re-run construction over a forest whose parts were edited in place
    fn rebuild(forest: RandomForest) -> Result<RandomForest, ModelError> {
        RandomForest::new(forest.encoding, forest.trees)
    }

    #[test]
    fn test_backward_child_rejected() {
        let mut forest = lactate_forest();
        forest.trees[0].children_left[2] = 1;
        forest.trees[0].children_left[0] = 0;
        assert!(matches!(rebuild(forest), Err(ModelError::InvalidModel(_))));
    }

    #[test]
    fn test_feature_out_of_range_rejected() {
        let mut forest = lactate_forest();
        forest.trees[0].feature[0] = 42;
        let err = rebuild(forest).unwrap_err();
        assert!(err.to_string().contains("unknown feature 42"));
    }

    #[test]
    fn test_hand_built_tree_is_checked_before_use() {
        let encoding = lactate_forest().encoding().to_vec();
        let tree = DecisionTree::new(
            vec![1, -1, -1],
            vec![2, -1, -1],
            vec![99, -2, -2],
            vec![0.5, -2.0, -2.0],
            vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
        );
        assert!(matches!(
            RandomForest::new(encoding, vec![tree]),
            Err(ModelError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_mismatched_node_arrays_rejected() {
        let encoding = lactate_forest().encoding().to_vec();
        let tree = DecisionTree::new(vec![-1], vec![-1], vec![], vec![-2.0], vec![vec![1.0, 1.0]]);
        let err = RandomForest::new(encoding, vec![tree]).unwrap_err();
        assert!(err.to_string().contains("node arrays differ in length"));
    }

    #[test]
    fn test_artifact_forest_conversion_validates() {
        let forest = lactate_forest();
        let spec = ForestSpec { encoding: forest.encoding.clone(), trees: forest.trees.clone() };
        assert_eq!(RandomForest::try_from(spec).unwrap().tree_count(), 2);

        let spec = ForestSpec { encoding: forest.encoding, trees: Vec::new() };
        assert!(RandomForest::try_from(spec).is_err());
    }

    #[test]
    fn test_unknown_column_rejected() {
        let mut forest = lactate_forest();
        forest.encoding[0] = ColumnEncoding::Numeric { column: "Sodium".into(), impute: None };
        assert!(rebuild(forest).is_err());
    }

    #[test]
    fn test_empty_forest_rejected() {
        let mut forest = lactate_forest();
        forest.trees.clear();
        assert!(rebuild(forest).is_err());
    }
}
