//! Classification: document vector → class code.
//!
//! The trained model is read from a JSON description tagged by `kind`.
//! Two model families are supported:
//!
//! ```json
//! { "kind": "random_forest", "n_features": 100, "classes": [0, 1],
//!   "trees": [ { "nodes": [
//!       { "feature": 7, "threshold": 0.12, "left": 1, "right": 2 },
//!       { "value": [30.0, 2.0] },
//!       { "value": [1.0, 41.0] } ] } ] }
//!
//! { "kind": "logistic_regression", "n_features": 100,
//!   "coef": [ ... ], "intercept": -0.3, "classes": [0, 1] }
//! ```
//!
//! Forest splits send a sample left when `x[feature] <= threshold`, with the
//! `f32` feature widened to `f64` first. Each tree
//! votes with its leaf's normalised class weights; the class with the highest
//! mean weight wins, the earliest class on ties. A logistic model picks
//! `classes[1]` when `intercept + coef·x > 0`.
//!
//! Models are validated when loaded, so prediction cannot loop or index out
//! of bounds for correctly sized input.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// A deterministic, stateless decision function over fixed-width vectors.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Width of the vectors the model was trained on.
    fn input_dimension(&self) -> usize;

    /// Class code for `features`.
    fn predict(&self, features: &[f32]) -> Result<i64, InputWidthError>;
}

/// A feature vector of the wrong width reached the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("classifier expects {expected} features, got {actual}")]
pub struct InputWidthError {
    pub expected: usize,
    pub actual: usize,
}

/// Every model family the loader understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl ClassifierModel {
    /// Read and validate a model description from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ArtifactNotFound {
                path: path.to_path_buf(),
            });
        }
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ArtifactUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let model = Self::from_json(&content).map_err(|detail| ConfigError::CorruptClassifier {
            path: path.to_path_buf(),
            detail,
        })?;
        info!(
            "Loaded classifier: {} over {} features",
            model.describe(),
            model.input_dimension()
        );
        Ok(model)
    }

    /// Parse and validate a model description.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let model: Self = serde_json::from_str(json).map_err(|e| e.to_string())?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            ClassifierModel::RandomForest(m) => m.validate(),
            ClassifierModel::LogisticRegression(m) => m.validate(),
        }
    }

    fn describe(&self) -> String {
        match self {
            ClassifierModel::RandomForest(m) => format!("random forest ({} trees)", m.trees.len()),
            ClassifierModel::LogisticRegression(_) => "logistic regression".to_string(),
        }
    }
}

impl Classifier for ClassifierModel {
    fn input_dimension(&self) -> usize {
        match self {
            ClassifierModel::RandomForest(m) => m.input_dimension(),
            ClassifierModel::LogisticRegression(m) => m.input_dimension(),
        }
    }

    fn predict(&self, features: &[f32]) -> Result<i64, InputWidthError> {
        match self {
            ClassifierModel::RandomForest(m) => m.predict(features),
            ClassifierModel::LogisticRegression(m) => m.predict(features),
        }
    }
}

fn check_width(expected: usize, features: &[f32]) -> Result<(), InputWidthError> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(InputWidthError {
            expected,
            actual: features.len(),
        })
    }
}

// ── Random forest ────────────────────────────────────────────────────────

/// An ensemble of decision trees voting with class weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    /// Class code for each position in a leaf's `value`.
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

/// One tree as a flat node array; node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        /// Compared in `f64` against the widened `f32` feature.
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Per-class weight, aligned with [`RandomForest::classes`].
        value: Vec<f32>,
    },
}

impl RandomForest {
    fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("n_features must be at least 1".into());
        }
        if self.classes.is_empty() {
            return Err("classes is empty".into());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {t} has no nodes"));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        if *feature >= self.n_features {
                            return Err(format!(
                                "tree {t} node {i}: feature {feature} out of range"
                            ));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(format!(
                                    "tree {t} node {i}: invalid child index {child}"
                                ));
                            }
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value.len() != self.classes.len() {
                            return Err(format!(
                                "tree {t} node {i}: leaf has {} weights for {} classes",
                                value.len(),
                                self.classes.len()
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn input_dimension(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f32]) -> Result<i64, InputWidthError> {
        check_width(self.n_features, features)?;

        let mut votes = vec![0f64; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf_for(features);
            let total: f64 = leaf.iter().map(|&w| f64::from(w)).sum();
            if total > 0.0 {
                for (vote, &w) in votes.iter_mut().zip(leaf) {
                    *vote += f64::from(w) / total;
                }
            }
        }

        let mut best = 0;
        for (i, &v) in votes.iter().enumerate().skip(1) {
            if v > votes[best] {
                best = i;
            }
        }
        Ok(self.classes[best])
    }
}

impl DecisionTree {
    fn leaf_for(&self, features: &[f32]) -> &[f32] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if f64::from(features[*feature]) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

// ── Logistic regression ──────────────────────────────────────────────────

/// A binary linear model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub n_features: usize,
    pub coef: Vec<f32>,
    pub intercept: f32,
    /// `[negative class, positive class]`.
    pub classes: Vec<i64>,
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("n_features must be at least 1".into());
        }
        if self.coef.len() != self.n_features {
            return Err(format!(
                "{} coefficients for {} features",
                self.coef.len(),
                self.n_features
            ));
        }
        if self.classes.len() != 2 {
            return Err(format!(
                "logistic regression needs exactly 2 classes, got {}",
                self.classes.len()
            ));
        }
        Ok(())
    }

    fn input_dimension(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f32]) -> Result<i64, InputWidthError> {
        check_width(self.n_features, features)?;
        let decision: f64 = f64::from(self.intercept)
            + self
                .coef
                .iter()
                .zip(features)
                .map(|(&c, &x)| f64::from(c) * f64::from(x))
                .sum::<f64>();
        Ok(if decision > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUMP: &str = r#"{
        "kind": "random_forest", "n_features": 2, "classes": [0, 1],
        "trees": [
            { "nodes": [
                { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": [10.0, 0.0] },
                { "value": [1.0, 9.0] } ] },
            { "nodes": [
                { "feature": 1, "threshold": 0.0, "left": 1, "right": 2 },
                { "value": [3.0, 1.0] },
                { "value": [0.0, 5.0] } ] }
        ]
    }"#;

    #[test]
    fn forest_votes_with_mean_leaf_weights() {
        let m = ClassifierModel::from_json(STUMP).unwrap();
        assert_eq!(m.input_dimension(), 2);
        // Tree 1 → [0.1, 0.9], tree 2 → [0.75, 0.25]: mean favours class 1.
        assert_eq!(m.predict(&[0.9, -1.0]).unwrap(), 1);
        // Tree 1 → [1, 0], tree 2 → [0.75, 0.25].
        assert_eq!(m.predict(&[0.0, 0.0]).unwrap(), 0);
        assert_eq!(m.predict(&[0.9, 1.0]).unwrap(), 1);
    }

    #[test]
    fn split_threshold_keeps_double_precision() {
        // 0.1f32 widens to 0.10000000149..., just above the f64 threshold.
        let json = r#"{ "kind": "random_forest", "n_features": 1, "classes": [0, 1],
            "trees": [ { "nodes": [
                { "feature": 0, "threshold": 0.1, "left": 1, "right": 2 },
                { "value": [1.0, 0.0] },
                { "value": [0.0, 1.0] } ] } ] }"#;
        let m = ClassifierModel::from_json(json).unwrap();
        assert_eq!(m.predict(&[0.1]).unwrap(), 1);
        assert_eq!(m.predict(&[0.099_999_99]).unwrap(), 0);
    }

    #[test]
    fn forest_ties_go_to_first_class() {
        let json = r#"{ "kind": "random_forest", "n_features": 1, "classes": [0, 1],
            "trees": [ { "nodes": [ { "value": [2.0, 2.0] } ] } ] }"#;
        let m = ClassifierModel::from_json(json).unwrap();
        assert_eq!(m.predict(&[0.0]).unwrap(), 0);
    }

    #[test]
    fn wrong_width_is_reported() {
        let m = ClassifierModel::from_json(STUMP).unwrap();
        assert_eq!(
            m.predict(&[0.0, 0.0, 0.0]),
            Err(InputWidthError {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn backward_child_index_is_rejected() {
        let json = r#"{ "kind": "random_forest", "n_features": 1, "classes": [0, 1],
            "trees": [ { "nodes": [ { "feature": 0, "threshold": 0.0, "left": 0, "right": 1 },
                                    { "value": [1.0, 0.0] } ] } ] }"#;
        let err = ClassifierModel::from_json(json).unwrap_err();
        assert!(err.contains("invalid child index 0"), "got: {err}");
    }

    #[test]
    fn leaf_width_must_match_classes() {
        let json = r#"{ "kind": "random_forest", "n_features": 1, "classes": [0, 1],
            "trees": [ { "nodes": [ { "value": [1.0] } ] } ] }"#;
        assert!(ClassifierModel::from_json(json).is_err());
    }

    #[test]
    fn out_of_range_feature_is_rejected() {
        let json = r#"{ "kind": "random_forest", "n_features": 1, "classes": [0, 1],
            "trees": [ { "nodes": [ { "feature": 3, "threshold": 0.0, "left": 1, "right": 2 },
                                    { "value": [1.0, 0.0] }, { "value": [0.0, 1.0] } ] } ] }"#;
        let err = ClassifierModel::from_json(json).unwrap_err();
        assert!(err.contains("feature 3"), "got: {err}");
    }

    #[test]
    fn logistic_regression_decision() {
        let json = r#"{ "kind": "logistic_regression", "n_features": 2,
            "coef": [2.0, -1.0], "intercept": -0.5, "classes": [0, 1] }"#;
        let m = ClassifierModel::from_json(json).unwrap();
        assert_eq!(m.predict(&[1.0, 0.0]).unwrap(), 1);
        assert_eq!(m.predict(&[0.0, 1.0]).unwrap(), 0);
        // Decision exactly zero stays negative.
        assert_eq!(m.predict(&[0.25, 0.0]).unwrap(), 0);
    }

    #[test]
    fn logistic_regression_coef_count() {
        let json = r#"{ "kind": "logistic_regression", "n_features": 3,
            "coef": [1.0], "intercept": 0.0, "classes": [0, 1] }"#;
        assert!(ClassifierModel::from_json(json).is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(ClassifierModel::from_json(r#"{ "kind": "svm", "n_features": 2 }"#).is_err());
        assert!(ClassifierModel::from_json("not json").is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ClassifierModel::load(Path::new("/no/such/model.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ArtifactNotFound { .. }));
    }
}
