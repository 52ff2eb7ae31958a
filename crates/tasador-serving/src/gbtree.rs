//! Gradient-boosted tree ensembles.
//!
//! Trees are read in the XGBoost JSON dump format, where every node is either
//! a split
//!
//! ```json
//! {"nodeid": 0, "split": "area", "split_condition": 80.5,
//!  "yes": 1, "no": 2, "missing": 1, "children": [...]}
//! ```
//!
//! or a leaf `{"nodeid": 1, "leaf": 0.25}`. Split features are schema column
//! names or `f<index>`. At load the nested dump is flattened into an
//! index-addressed node array with features resolved to column positions, so
//! prediction is a tight loop over plain indices.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tasador_core::FeatureSchema;

use crate::error::{ServingError, ServingResult};
use crate::inference::InferenceModel;

/// Learning objective, which fixes the link between margin and prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// Squared error regression (identity link).
    #[default]
    #[serde(rename = "reg:squarederror", alias = "reg:linear")]
    SquaredError,
    /// Absolute error regression (identity link).
    #[serde(rename = "reg:absoluteerror")]
    AbsoluteError,
    /// Gamma regression (log link).
    #[serde(rename = "reg:gamma")]
    Gamma,
    /// Tweedie regression (log link).
    #[serde(rename = "reg:tweedie")]
    Tweedie,
    /// Poisson regression (log link).
    #[serde(rename = "count:poisson")]
    Poisson,
}

impl Objective {
    fn log_link(self) -> bool {
        matches!(self, Objective::Gamma | Objective::Tweedie | Objective::Poisson)
    }
}

fn default_base_score() -> f32 {
    0.5
}

/// Serialized tree ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbTreeSpec {
    /// Global bias, in prediction space.
    #[serde(default = "default_base_score")]
    pub base_score: f32,
    /// Learning objective.
    #[serde(default)]
    pub objective: Objective,
    /// Feature names the ensemble was trained on, in order.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    /// Root node of every tree.
    pub trees: Vec<DumpNode>,
}

/// One node of an XGBoost JSON dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpNode {
    /// Node identifier, unique within its tree.
    pub nodeid: u32,
    /// Split feature (split nodes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<String>,
    /// Threshold: `x < split_condition` goes to `yes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_condition: Option<f32>,
    /// Child taken when the condition holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yes: Option<u32>,
    /// Child taken otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<u32>,
    /// Child taken for missing (NaN) values; defaults to `yes`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<u32>,
    /// Leaf value (leaf nodes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<f32>,
    /// Child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DumpNode>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f32),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn compile(root: &DumpNode, schema: &FeatureSchema) -> ServingResult<Self> {
        let mut flat: Vec<&DumpNode> = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            flat.push(node);
            stack.extend(node.children.iter());
        }

        let mut position: HashMap<u32, usize> = HashMap::with_capacity(flat.len());
        for (pos, node) in flat.iter().enumerate() {
            if position.insert(node.nodeid, pos).is_some() {
                return Err(ServingError::model_load(format!(
                    "duplicate tree node id {}",
                    node.nodeid
                )));
            }
        }
        let resolve = |id: u32| {
            position.get(&id).copied().ok_or_else(|| {
                ServingError::model_load(format!("tree references missing node {id}"))
            })
        };

        let mut nodes = Vec::with_capacity(flat.len());
        for node in &flat {
            if let Some(value) = node.leaf {
                if !value.is_finite() {
                    return Err(ServingError::model_load(format!(
                        "leaf {} has non-finite value",
                        node.nodeid
                    )));
                }
                nodes.push(Node::Leaf(value));
                continue;
            }
            let (Some(split), Some(threshold), Some(yes), Some(no)) =
                (&node.split, node.split_condition, node.yes, node.no)
            else {
                return Err(ServingError::model_load(format!(
                    "node {} is neither a leaf nor a complete split",
                    node.nodeid
                )));
            };
            nodes.push(Node::Split {
                feature: resolve_feature(split, schema)?,
                threshold,
                yes: resolve(yes)?,
                no: resolve(no)?,
                missing: resolve(node.missing.unwrap_or(yes))?,
            });
        }
        Ok(Self { nodes })
    }

    fn leaf_value(&self, features: &[f64]) -> ServingResult<f32> {
        let mut pos = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.nodes.len() {
            match self.nodes[pos] {
                Node::Leaf(value) => return Ok(value),
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    // XGBoost compares in f32.
                    let x = features[feature] as f32;
                    pos = if x.is_nan() {
                        missing
                    } else if x < threshold {
                        yes
                    } else {
                        no
                    };
                }
            }
        }
        Err(ServingError::prediction("tree traversal did not reach a leaf"))
    }
}

fn resolve_feature(split: &str, schema: &FeatureSchema) -> ServingResult<usize> {
    if let Some(idx) = schema.index_of(split) {
        return Ok(idx);
    }
    if let Some(idx) = split.strip_prefix('f').and_then(|s| s.parse::<usize>().ok()) {
        if idx < schema.len() {
            return Ok(idx);
        }
    }
    Err(ServingError::schema_mismatch(format!(
        "tree splits on '{split}', which is not a schema column"
    )))
}

/// A compiled tree ensemble.
#[derive(Debug, Clone)]
pub struct GbTreeModel {
    trees: Vec<Tree>,
    base_margin: f32,
    log_link: bool,
    input_dim: usize,
}

impl GbTreeModel {
    /// Compile `spec` against `schema`.
    ///
    /// # Errors
    ///
    /// Fails with [`ServingError::ModelLoadError`] for malformed trees and
    /// [`ServingError::SchemaMismatch`] when a split names an unknown column.
    pub fn compile(spec: &GbTreeSpec, schema: &FeatureSchema) -> ServingResult<Self> {
        if spec.trees.is_empty() {
            return Err(ServingError::model_load("ensemble has no trees"));
        }
        let log_link = spec.objective.log_link();
        let base_margin = if log_link {
            if spec.base_score <= 0.0 {
                return Err(ServingError::model_load(format!(
                    "base_score must be positive for {:?}, got {}",
                    spec.objective, spec.base_score
                )));
            }
            spec.base_score.ln()
        } else {
            spec.base_score
        };
        let trees = spec
            .trees
            .iter()
            .map(|root| Tree::compile(root, schema))
            .collect::<ServingResult<Vec<_>>>()?;
        Ok(Self {
            trees,
            base_margin,
            log_link,
            input_dim: schema.len(),
        })
    }

    /// Returns the number of trees.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

impl InferenceModel for GbTreeModel {
    fn kind(&self) -> &'static str {
        "gbtree"
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn predict(&self, features: &[f64]) -> ServingResult<f32> {
        if features.len() != self.input_dim {
            return Err(ServingError::length_mismatch(self.input_dim, features.len()));
        }
        let mut margin = self.base_margin;
        for tree in &self.trees {
            margin += tree.leaf_value(features)?;
        }
        Ok(if self.log_link { margin.exp() } else { margin })
    }
}
