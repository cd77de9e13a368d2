//! Random forest of binary decision trees
//!
//! Trees are stored as the flat parallel arrays a fitted forest exports:
//! node `i` is a leaf when `children_left[i] == LEAF`, otherwise the walk
//! goes left when `x[feature[i]] <= threshold[i]`.

use serde::{Deserialize, Serialize};

use super::{check_len, ArtifactError, Classifier, ClassifierKind};

/// Child index marking a leaf
pub const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights; only leaf rows are read
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    /// Structural checks. Children must come after their parent, which also
    /// rules out cycles, so `leaf_index` always terminates.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ArtifactError> {
        let n_nodes = self.children_left.len();
        if n_nodes == 0 {
            return Err(ArtifactError::Invalid("tree has no nodes".to_string()));
        }
        if self.children_right.len() != n_nodes
            || self.feature.len() != n_nodes
            || self.threshold.len() != n_nodes
            || self.value.len() != n_nodes
        {
            return Err(ArtifactError::Invalid(
                "tree node arrays differ in length".to_string(),
            ));
        }

        for node in 0..n_nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);

            if left == LEAF {
                let row = &self.value[node];
                if row.len() != n_classes {
                    return Err(ArtifactError::Invalid(format!(
                        "leaf {node} has {} class weights, expected {n_classes}",
                        row.len()
                    )));
                }
                if row.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(ArtifactError::Invalid(format!(
                        "leaf {node} has a negative or non-finite weight"
                    )));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i64 || child >= n_nodes as i64 {
                    return Err(ArtifactError::Invalid(format!(
                        "node {node} has out-of-order child {child}"
                    )));
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(ArtifactError::Invalid(format!(
                    "node {node} splits on feature {feature}, only {n_features} available"
                )));
            }
            if self.threshold[node].is_nan() {
                return Err(ArtifactError::Invalid(format!("node {node} has a NaN threshold")));
            }
        }

        Ok(())
    }

    /// Walk from the root to a leaf. Assumes `validate` passed.
    pub fn leaf_index(&self, x: &[f64]) -> usize {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            // Thresholds were fit against single-precision inputs.
            let value = x[feature] as f32 as f64;
            node = if value <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }

    /// Class distribution at the leaf reached by `x`
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let row = &self.value[self.leaf_index(x)];
        let total: f64 = row.iter().sum();
        if total > 0.0 {
            row.iter().map(|w| w / total).collect()
        } else {
            row.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<i64>,
    pub n_features: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.trees.is_empty() {
            return Err(ArtifactError::Invalid("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| match e {
                    ArtifactError::Invalid(msg) => ArtifactError::Invalid(format!("tree {i}: {msg}")),
                    other => other,
                })?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::RandomForest
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Mean of the per-tree distributions
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_len(self.n_features, x)?;

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(x)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in proba.iter_mut() {
            *p /= n_trees;
        }

        Ok(proba)
    }
}
