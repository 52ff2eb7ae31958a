//! Model families for price inference.
//!
//! A model directory carries a `model.json` describing the estimator:
//!
//! - `gbtree`: a gradient-boosted tree ensemble in XGBoost dump format
//!   (see [`crate::gbtree`]). Trees are self-contained.
//! - `mlp`: a feed-forward regressor whose weights live in
//!   `dense/params.json` as flat `f32` arrays, evaluated with Candle.
//!
//! Every family is loaded behind [`InferenceModel`], which takes one aligned
//! feature vector and returns a single price.

use crate::error::{ServingError, ServingResult};
use crate::gbtree::{GbTreeModel, GbTreeSpec};
use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tasador_core::FeatureSchema;

/// Model specification stored in a model directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Gradient-boosted regression trees.
    Gbtree(GbTreeSpec),
    /// Simple feed-forward network.
    Mlp(MlpSpec),
}

impl ModelSpec {
    /// Short name of the model family.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::Gbtree(_) => "gbtree",
            ModelSpec::Mlp(_) => "mlp",
        }
    }

    /// Feature names the model was trained on, when recorded.
    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            ModelSpec::Gbtree(s) => s.feature_names.as_deref(),
            ModelSpec::Mlp(s) => s.feature_names.as_deref(),
        }
    }

    /// Whether the family reads dense parameters from `dense/params.json`.
    pub fn needs_dense_params(&self) -> bool {
        matches!(self, ModelSpec::Mlp(_))
    }
}

/// Feed-forward regressor layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpSpec {
    pub input_dim: usize,
    pub hidden_dims: Vec<usize>,
    #[serde(default = "default_output_dim")]
    pub output_dim: usize,
    #[serde(default)]
    pub activation: Activation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

fn default_output_dim() -> usize {
    1
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Relu,
    Tanh,
    Sigmoid,
    None,
}

impl Activation {
    fn apply(&self, t: Tensor) -> candle_core::Result<Tensor> {
        match self {
            Activation::Relu => t.relu(),
            Activation::Tanh => t.tanh(),
            Activation::Sigmoid => candle_nn::ops::sigmoid(&t),
            Activation::None => Ok(t),
        }
    }
}

/// Single-example price model.
pub trait InferenceModel: Send + Sync {
    /// Short name of the model family.
    fn kind(&self) -> &'static str;

    /// Number of features the model consumes.
    fn input_dim(&self) -> usize;

    /// Evaluate the model on one aligned feature vector.
    ///
    /// Features arrive at full precision; each family narrows them to its
    /// own input type.
    fn predict(&self, features: &[f64]) -> ServingResult<f32>;
}

/// Build a model from its spec, compiled against `schema`.
///
/// `params` holds the dense parameters for families that need them and is
/// ignored otherwise.
///
/// # Errors
///
/// Returns [`ServingError::ModelLoadError`] for missing or mis-shaped
/// parameters and [`ServingError::SchemaMismatch`] when the model's input
/// width disagrees with the schema.
pub fn build_model(
    spec: &ModelSpec,
    schema: &FeatureSchema,
    params: &HashMap<String, Vec<f32>>,
) -> ServingResult<Box<dyn InferenceModel>> {
    match spec {
        ModelSpec::Gbtree(s) => Ok(Box::new(GbTreeModel::compile(s, schema)?)),
        ModelSpec::Mlp(s) => {
            if s.input_dim != schema.len() {
                return Err(ServingError::length_mismatch(s.input_dim, schema.len()));
            }
            Ok(Box::new(MlpModel::from_params(s, params, &Device::Cpu)?))
        }
    }
}

fn tensor_from_vec(
    params: &HashMap<String, Vec<f32>>,
    name: &str,
    shape: &[usize],
    device: &Device,
) -> ServingResult<Tensor> {
    let data = params
        .get(name)
        .ok_or_else(|| ServingError::model_load(format!("Missing dense param {name:?}")))?;
    let numel: usize = shape.iter().product();
    if data.len() != numel {
        return Err(ServingError::model_load(format!(
            "Param {:?} has len {}, expected {} for shape {:?}",
            name,
            data.len(),
            numel,
            shape
        )));
    }
    Tensor::from_slice(data, shape, device)
        .map_err(|e| ServingError::model_load(format!("Candle tensor init failed: {e}")))
}

fn linear(x: &Tensor, w: &Tensor, b: &Tensor) -> ServingResult<Tensor> {
    // x: [B, in], w: [out, in]
    let y = x.matmul(&w.t()?)?;
    Ok(y.broadcast_add(b)?)
}

#[derive(Debug)]
struct MlpModel {
    spec: MlpSpec,
    // layers: (w, b)
    weights: Vec<(Tensor, Tensor)>,
    device: Device,
}

impl MlpModel {
    fn from_params(
        spec: &MlpSpec,
        params: &HashMap<String, Vec<f32>>,
        device: &Device,
    ) -> ServingResult<Self> {
        if spec.output_dim != 1 {
            return Err(ServingError::model_load(format!(
                "price regressor must have one output, got {}",
                spec.output_dim
            )));
        }

        let mut weights: Vec<(Tensor, Tensor)> = Vec::new();
        let mut in_dim = spec.input_dim;
        let mut all_layers: Vec<usize> = spec.hidden_dims.clone();
        all_layers.push(spec.output_dim);

        for (i, &out_dim) in all_layers.iter().enumerate() {
            let w = tensor_from_vec(
                params,
                &format!("mlp.layers.{i}.weight"),
                &[out_dim, in_dim],
                device,
            )?;
            let b = tensor_from_vec(params, &format!("mlp.layers.{i}.bias"), &[out_dim], device)?;
            weights.push((w, b));
            in_dim = out_dim;
        }

        Ok(Self {
            spec: spec.clone(),
            weights,
            device: device.clone(),
        })
    }
}

impl InferenceModel for MlpModel {
    fn kind(&self) -> &'static str {
        "mlp"
    }

    fn input_dim(&self) -> usize {
        self.spec.input_dim
    }

    fn predict(&self, features: &[f64]) -> ServingResult<f32> {
        if features.len() != self.spec.input_dim {
            return Err(ServingError::length_mismatch(
                self.spec.input_dim,
                features.len(),
            ));
        }
        let input: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let mut x = Tensor::from_vec(input, (1, features.len()), &self.device)?;
        let last = self.weights.len() - 1;
        for (i, (w, b)) in self.weights.iter().enumerate() {
            x = linear(&x, w, b)?;
            if i != last {
                x = self.spec.activation.apply(x)?;
            }
        }
        let out = x.flatten_all()?.to_vec1::<f32>()?;
        out.first()
            .copied()
            .ok_or_else(|| ServingError::prediction("model produced no output"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(n: usize) -> FeatureSchema {
        FeatureSchema::new((0..n).map(|i| format!("col{i}")).collect()).unwrap()
    }

    fn mlp_spec(input_dim: usize, hidden: Vec<usize>) -> MlpSpec {
        MlpSpec {
            input_dim,
            hidden_dims: hidden,
            output_dim: 1,
            activation: Activation::Relu,
            feature_names: None,
        }
    }

    #[test]
    fn test_spec_parsing() {
        let spec: ModelSpec = serde_json::from_str(
            r#"{"type": "mlp", "input_dim": 3, "hidden_dims": [4], "activation": "tanh"}"#,
        )
        .unwrap();
        assert_eq!(spec.kind(), "mlp");
        assert!(spec.needs_dense_params());
        match spec {
            ModelSpec::Mlp(s) => {
                assert_eq!(s.output_dim, 1);
                assert_eq!(s.activation, Activation::Tanh);
            }
            other => panic!("unexpected spec {other:?}"),
        }

        let spec: ModelSpec = serde_json::from_str(
            r#"{"type": "gbtree", "feature_names": ["a"], "trees": [{"nodeid": 0, "leaf": 1.0}]}"#,
        )
        .unwrap();
        assert_eq!(spec.kind(), "gbtree");
        assert!(!spec.needs_dense_params());
        assert_eq!(spec.feature_names(), Some(&["a".to_string()][..]));
    }

    #[test]
    fn test_mlp_linear_forward() {
        // Single layer: y = 2*x0 + 3*x1 + 1
        let mut params = HashMap::new();
        params.insert("mlp.layers.0.weight".to_string(), vec![2.0, 3.0]);
        params.insert("mlp.layers.0.bias".to_string(), vec![1.0]);

        let model = build_model(&ModelSpec::Mlp(mlp_spec(2, vec![])), &schema(2), &params).unwrap();
        assert_eq!(model.kind(), "mlp");
        assert_eq!(model.input_dim(), 2);
        assert_eq!(model.predict(&[1.0, 2.0]).unwrap(), 9.0);
    }

    #[test]
    fn test_mlp_hidden_activation() {
        // Hidden relu layer: h = relu([x0, -x0]), y = h0 + h1
        let mut params = HashMap::new();
        params.insert("mlp.layers.0.weight".to_string(), vec![1.0, -1.0]);
        params.insert("mlp.layers.0.bias".to_string(), vec![0.0, 0.0]);
        params.insert("mlp.layers.1.weight".to_string(), vec![1.0, 1.0]);
        params.insert("mlp.layers.1.bias".to_string(), vec![0.0]);

        let model =
            build_model(&ModelSpec::Mlp(mlp_spec(1, vec![2])), &schema(1), &params).unwrap();
        assert_eq!(model.predict(&[3.0]).unwrap(), 3.0);
        assert_eq!(model.predict(&[-4.0]).unwrap(), 4.0);
    }

    #[test]
    fn test_mlp_param_errors() {
        let mut params = HashMap::new();
        params.insert("mlp.layers.0.weight".to_string(), vec![2.0]);
        params.insert("mlp.layers.0.bias".to_string(), vec![1.0]);

        let err = build_model(&ModelSpec::Mlp(mlp_spec(2, vec![])), &schema(2), &params)
            .err()
            .unwrap();
        assert!(matches!(err, ServingError::ModelLoadError(_)));

        let err = build_model(&ModelSpec::Mlp(mlp_spec(2, vec![])), &schema(2), &HashMap::new())
            .err()
            .unwrap();
        assert!(err.to_string().contains("Missing dense param"));
    }

    #[test]
    fn test_mlp_input_dim_must_match_schema() {
        let err = build_model(&ModelSpec::Mlp(mlp_spec(3, vec![])), &schema(2), &HashMap::new())
            .err()
            .unwrap();
        assert!(matches!(err, ServingError::SchemaMismatch(_)));
    }

    #[test]
    fn test_mlp_rejects_multi_output() {
        let mut spec = mlp_spec(1, vec![]);
        spec.output_dim = 2;
        let mut params = HashMap::new();
        params.insert("mlp.layers.0.weight".to_string(), vec![1.0, 1.0]);
        params.insert("mlp.layers.0.bias".to_string(), vec![0.0, 0.0]);
        assert!(build_model(&ModelSpec::Mlp(spec), &schema(1), &params).is_err());
    }
}
