//! Model loading.
//!
//! This module provides the [`ModelLoader`], which reads a model directory
//! once and produces an immutable [`LoadedModel`]:
//!
//! ```text
//! <model_dir>/
//!   columns.json        feature schema (required)
//!   model.json          model spec (required)
//!   metadata.json       name, version, training date (optional)
//!   dense/params.json   dense weights (mlp only)
//! ```
//!
//! The schema and the model are checked against each other at load, so a
//! model that would see columns in the wrong order never serves a request.

use crate::config::PredictorConfig;
use crate::error::{ServingError, ServingResult};
use crate::inference::{build_model, InferenceModel, ModelSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tasador_core::FeatureSchema;
use tracing::{debug, info, warn};

/// Relative path of the dense parameter file.
pub const DENSE_PARAMS_FILE: &str = "dense/params.json";

/// A schema and model pair ready for prediction.
pub struct LoadedModel {
    /// Path where the model was loaded from
    pub path: PathBuf,

    /// Model version identifier
    pub version: String,

    /// Timestamp when the model was loaded
    pub loaded_at: std::time::Instant,

    /// Model metadata
    pub metadata: ModelMetadata,

    /// Feature schema the model was trained on
    pub schema: Arc<FeatureSchema>,

    /// The estimator
    pub model: Arc<dyn InferenceModel>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("path", &self.path)
            .field("version", &self.version)
            .field("loaded_at", &self.loaded_at)
            .field("metadata", &self.metadata)
            .field("columns", &self.schema.len())
            .field("model_kind", &self.model.kind())
            .finish()
    }
}

impl LoadedModel {
    /// Assemble a loaded model from parts already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ServingError::SchemaMismatch`] if the model's input width
    /// differs from the schema length.
    pub fn from_parts(
        version: impl Into<String>,
        schema: FeatureSchema,
        model: Arc<dyn InferenceModel>,
    ) -> ServingResult<Self> {
        if model.input_dim() != schema.len() {
            return Err(ServingError::length_mismatch(model.input_dim(), schema.len()));
        }
        let version = version.into();
        Ok(Self {
            path: PathBuf::new(),
            metadata: ModelMetadata {
                version: Some(version.clone()),
                ..Default::default()
            },
            version,
            loaded_at: std::time::Instant::now(),
            schema: Arc::new(schema),
            model,
        })
    }

    /// Short name of the model family.
    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }
}

/// Model metadata read from `metadata.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Model description
    pub description: String,

    /// Version label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// When the model was trained, as written by the training job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<String>,

    /// Currency the model predicts in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Custom metadata key-value pairs
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

/// Loads model directories.
///
/// # Example
///
/// ```no_run
/// use tasador_serving::config::PredictorConfig;
/// use tasador_serving::model_loader::ModelLoader;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PredictorConfig::builder().model_dir("/models/bogota").build();
/// let model = ModelLoader::new(config).load()?;
/// println!("Loaded model version: {}", model.version);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ModelLoader {
    config: PredictorConfig,
}

impl ModelLoader {
    /// Create a new model loader with the given configuration.
    pub fn new(config: PredictorConfig) -> Self {
        Self { config }
    }

    /// Load and cross-check the schema and model.
    ///
    /// # Errors
    ///
    /// - [`ServingError::ConfigError`] if the configuration is invalid.
    /// - [`ServingError::ModelLoadError`] if an artifact is missing or
    ///   malformed.
    /// - [`ServingError::SchemaError`] if the schema artifact is invalid.
    /// - [`ServingError::SchemaMismatch`] if the model was trained on other
    ///   columns than the schema lists.
    pub fn load(&self) -> ServingResult<Arc<LoadedModel>> {
        self.config.validate()?;
        let path = self.config.model_dir.clone();
        info!("Loading model from: {:?}", path);

        if !path.is_dir() {
            return Err(ServingError::model_load(format!(
                "Model path does not exist: {path:?}"
            )));
        }

        let schema = self.load_schema()?;
        debug!("Loaded schema with {} columns", schema.len());

        let metadata = self.load_metadata()?;
        debug!("Loaded metadata: {:?}", metadata);

        let spec = self.load_spec()?;
        check_feature_names(&spec, &schema)?;

        let params = if spec.needs_dense_params() {
            load_dense_params(&path.join(DENSE_PARAMS_FILE))?
        } else {
            HashMap::new()
        };

        let model: Arc<dyn InferenceModel> = Arc::from(build_model(&spec, &schema, &params)?);
        if model.input_dim() != schema.len() {
            return Err(ServingError::length_mismatch(model.input_dim(), schema.len()));
        }

        let version = determine_version(&path, &metadata, &schema);
        info!(
            "Model loaded: version {}, {} model, {} features",
            version,
            model.kind(),
            schema.len()
        );

        Ok(Arc::new(LoadedModel {
            path,
            version,
            loaded_at: std::time::Instant::now(),
            metadata,
            schema: Arc::new(schema),
            model,
        }))
    }

    fn load_schema(&self) -> ServingResult<FeatureSchema> {
        let text = read_artifact(&self.config.schema_path())?;
        Ok(FeatureSchema::from_json_str(&text)?)
    }

    fn load_spec(&self) -> ServingResult<ModelSpec> {
        let path = self.config.model_path();
        let text = read_artifact(&path)?;
        serde_json::from_str(&text)
            .map_err(|e| ServingError::model_load(format!("Invalid model spec {path:?}: {e}")))
    }

    fn load_metadata(&self) -> ServingResult<ModelMetadata> {
        let path = self.config.metadata_path();
        if !path.exists() {
            warn!("No {} found, using defaults", self.config.metadata_file);
            return Ok(ModelMetadata::default());
        }
        let text = read_artifact(&path)?;
        serde_json::from_str(&text)
            .map_err(|e| ServingError::model_load(format!("Invalid metadata {path:?}: {e}")))
    }
}

fn read_artifact(path: &Path) -> ServingResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ServingError::model_load(format!("Cannot read {path:?}: {e}")))
}

fn load_dense_params(path: &Path) -> ServingResult<HashMap<String, Vec<f32>>> {
    let text = read_artifact(path)?;
    serde_json::from_str(&text)
        .map_err(|e| ServingError::model_load(format!("Invalid dense params {path:?}: {e}")))
}

fn check_feature_names(spec: &ModelSpec, schema: &FeatureSchema) -> ServingResult<()> {
    let Some(names) = spec.feature_names() else {
        return Ok(());
    };
    if names.len() != schema.len() {
        return Err(ServingError::length_mismatch(names.len(), schema.len()));
    }
    if let Some((pos, (model_col, schema_col))) = names
        .iter()
        .zip(schema.columns())
        .enumerate()
        .find(|(_, (a, b))| a != b)
    {
        return Err(ServingError::schema_mismatch(format!(
            "column {pos} is '{schema_col}' in the schema but '{model_col}' in the model"
        )));
    }
    Ok(())
}

fn determine_version(path: &Path, metadata: &ModelMetadata, schema: &FeatureSchema) -> String {
    if let Some(version) = &metadata.version {
        return version.clone();
    }
    if let Some(version) = schema.version() {
        return version.to_string();
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}
