//! Frozen regression artifacts for the long-trip estimator.
//!
//! Artifacts are produced offline by the training tooling and serialized as JSON.
//! They are validated once at load time so prediction never has to fail.

use super::TripModel;
use crate::engine::domain::TripFeatures;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

const FEATURE_COUNT: usize = 3;

/// Serialized regressor, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    GradientBoostedTrees(GradientBoostedTrees),
    Linear(LinearModel),
}

impl ModelArtifact {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelArtifactError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Parse and validate an artifact; structural problems surface as `Parse` errors.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelArtifactError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

impl TripModel for ModelArtifact {
    fn predict(&self, features: &TripFeatures) -> f64 {
        match self {
            ModelArtifact::GradientBoostedTrees(model) => model.predict(features),
            ModelArtifact::Linear(model) => model.predict(features),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelArtifactError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Additive tree ensemble: `init + learning_rate * sum(tree leaves)`.
///
/// Only obtainable through deserialization, which validates every tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnsembleFields", into = "EnsembleFields")]
pub struct GradientBoostedTrees {
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

#[derive(Serialize, Deserialize)]
struct EnsembleFields {
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl TryFrom<EnsembleFields> for GradientBoostedTrees {
    type Error = String;

    fn try_from(fields: EnsembleFields) -> Result<Self, Self::Error> {
        if !fields.init.is_finite() || !fields.learning_rate.is_finite() {
            return Err("init and learning_rate must be finite".to_string());
        }
        if fields.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        Ok(Self {
            init: fields.init,
            learning_rate: fields.learning_rate,
            trees: fields.trees,
        })
    }
}

impl From<GradientBoostedTrees> for EnsembleFields {
    fn from(model: GradientBoostedTrees) -> Self {
        Self {
            init: model.init,
            learning_rate: model.learning_rate,
            trees: model.trees,
        }
    }
}

impl GradientBoostedTrees {
    fn predict(&self, features: &TripFeatures) -> f64 {
        let boosted: f64 = self.trees.iter().map(|tree| tree.leaf_value(features)).sum();
        self.init + self.learning_rate * boosted
    }
}

/// Flattened binary tree; node `0` is the root and children always point forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeFields", into = "TreeFields")]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

#[derive(Serialize, Deserialize)]
struct TreeFields {
    nodes: Vec<TreeNode>,
}

impl TryFrom<TreeFields> for RegressionTree {
    type Error = String;

    fn try_from(fields: TreeFields) -> Result<Self, Self::Error> {
        validate_nodes(&fields.nodes)?;
        Ok(Self {
            nodes: fields.nodes,
        })
    }
}

impl From<RegressionTree> for TreeFields {
    fn from(tree: RegressionTree) -> Self {
        Self { nodes: tree.nodes }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl RegressionTree {
    fn leaf_value(&self, features: &TripFeatures) -> f64 {
        let mut index = 0;
        // Validated children point forward, so at most `nodes.len()` steps.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let Some(value) = features.get(*feature) else {
                        break;
                    };
                    index = if *value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return *value,
                None => break,
            }
        }
        f64::NAN
    }
}

fn validate_nodes(nodes: &[TreeNode]) -> Result<(), String> {
    if nodes.is_empty() {
        return Err("tree has no nodes".to_string());
    }
    for (index, node) in nodes.iter().enumerate() {
        match node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= FEATURE_COUNT {
                    return Err(format!("node {index} splits on unknown feature {feature}"));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {index} has a non-finite threshold"));
                }
                for child in [left, right] {
                    if *child <= index || *child >= nodes.len() {
                        return Err(format!("node {index} has invalid child {child}"));
                    }
                }
            }
            TreeNode::Leaf { value } => {
                if !value.is_finite() {
                    return Err(format!("leaf {index} has a non-finite value"));
                }
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LinearFields", into = "LinearFields")]
pub struct LinearModel {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
}

#[derive(Serialize, Deserialize)]
struct LinearFields {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
}

impl TryFrom<LinearFields> for LinearModel {
    type Error = String;

    fn try_from(fields: LinearFields) -> Result<Self, Self::Error> {
        if !fields.intercept.is_finite() || fields.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("linear coefficients must be finite".to_string());
        }
        Ok(Self {
            intercept: fields.intercept,
            coefficients: fields.coefficients,
        })
    }
}

impl From<LinearModel> for LinearFields {
    fn from(model: LinearModel) -> Self {
        Self {
            intercept: model.intercept,
            coefficients: model.coefficients,
        }
    }
}

impl LinearModel {
    fn predict(&self, features: &TripFeatures) -> f64 {
        self.coefficients
            .iter()
            .zip(features.iter())
            .fold(self.intercept, |acc, (coefficient, value)| {
                acc + coefficient * value
            })
    }
}
