//! Predictor configuration.
//!
//! This module provides the configuration for locating model artifacts and for
//! shaping the presented result.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tasador_core::RangePolicy;

/// Default width of the price band around the point estimate.
pub const DEFAULT_BAND_RATIO: f64 = 0.10;

/// Configuration for loading a model and presenting estimates.
///
/// # Example
///
/// ```
/// use tasador_serving::config::PredictorConfig;
///
/// let config = PredictorConfig::builder()
///     .model_dir("/models/bogota")
///     .band_ratio(0.15)
///     .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.model_path().to_str(), Some("/models/bogota/model.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Directory holding the model artifacts
    pub model_dir: PathBuf,

    /// Model spec file name, relative to `model_dir`
    pub model_file: String,

    /// Schema file name, relative to `model_dir`
    pub schema_file: String,

    /// Optional metadata file name, relative to `model_dir`
    pub metadata_file: String,

    /// Relative width of the band around the estimate (0.10 = ±10%)
    pub band_ratio: f64,

    /// Handling of numeric inputs outside their domain
    pub range_policy: RangePolicy,

    /// Currency label used when rendering amounts
    pub currency: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./model"),
            model_file: "model.json".to_string(),
            schema_file: "columns.json".to_string(),
            metadata_file: "metadata.json".to_string(),
            band_ratio: DEFAULT_BAND_RATIO,
            range_policy: RangePolicy::Reject,
            currency: "COP".to_string(),
        }
    }
}

impl PredictorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PredictorConfigBuilder {
        PredictorConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Fields absent from the file take their default values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::InvalidConfigFile(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| ConfigError::InvalidConfigFile(format!("{}: {e}", path.display())))
    }

    /// Path of the model spec.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }

    /// Path of the schema artifact.
    pub fn schema_path(&self) -> PathBuf {
        self.model_dir.join(&self.schema_file)
    }

    /// Path of the metadata file.
    pub fn metadata_path(&self) -> PathBuf {
        self.model_dir.join(&self.metadata_file)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.band_ratio) {
            return Err(ConfigError::InvalidBandRatio(self.band_ratio));
        }
        if self.model_file.is_empty() || self.schema_file.is_empty() {
            return Err(ConfigError::EmptyFileName);
        }
        Ok(())
    }
}

/// Builder for [`PredictorConfig`].
#[derive(Debug, Default)]
pub struct PredictorConfigBuilder {
    model_dir: Option<PathBuf>,
    model_file: Option<String>,
    schema_file: Option<String>,
    metadata_file: Option<String>,
    band_ratio: Option<f64>,
    range_policy: Option<RangePolicy>,
    currency: Option<String>,
}

impl PredictorConfigBuilder {
    /// Start from an existing configuration.
    pub fn from_config(config: PredictorConfig) -> Self {
        Self {
            model_dir: Some(config.model_dir),
            model_file: Some(config.model_file),
            schema_file: Some(config.schema_file),
            metadata_file: Some(config.metadata_file),
            band_ratio: Some(config.band_ratio),
            range_policy: Some(config.range_policy),
            currency: Some(config.currency),
        }
    }

    /// Set the model directory.
    pub fn model_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_dir = Some(path.into());
        self
    }

    /// Set the model spec file name.
    pub fn model_file(mut self, name: impl Into<String>) -> Self {
        self.model_file = Some(name.into());
        self
    }

    /// Set the schema file name.
    pub fn schema_file(mut self, name: impl Into<String>) -> Self {
        self.schema_file = Some(name.into());
        self
    }

    /// Set the metadata file name.
    pub fn metadata_file(mut self, name: impl Into<String>) -> Self {
        self.metadata_file = Some(name.into());
        self
    }

    /// Set the band ratio.
    pub fn band_ratio(mut self, ratio: f64) -> Self {
        self.band_ratio = Some(ratio);
        self
    }

    /// Set the range policy.
    pub fn range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = Some(policy);
        self
    }

    /// Set the currency label.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PredictorConfig {
        let default = PredictorConfig::default();
        PredictorConfig {
            model_dir: self.model_dir.unwrap_or(default.model_dir),
            model_file: self.model_file.unwrap_or(default.model_file),
            schema_file: self.schema_file.unwrap_or(default.schema_file),
            metadata_file: self.metadata_file.unwrap_or(default.metadata_file),
            band_ratio: self.band_ratio.unwrap_or(default.band_ratio),
            range_policy: self.range_policy.unwrap_or(default.range_policy),
            currency: self.currency.unwrap_or(default.currency),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Band ratio outside `[0, 1)`
    #[error("Invalid band ratio {0}: must be in [0, 1)")]
    InvalidBandRatio(f64),

    /// Empty artifact file name
    #[error("Artifact file names cannot be empty")]
    EmptyFileName,

    /// Invalid configuration file
    #[error("Invalid configuration file: {0}")]
    InvalidConfigFile(String),
}

impl From<ConfigError> for crate::error::ServingError {
    fn from(err: ConfigError) -> Self {
        crate::error::ServingError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PredictorConfig::default();
        assert_eq!(config.model_file, "model.json");
        assert_eq!(config.schema_file, "columns.json");
        assert_eq!(config.band_ratio, 0.10);
        assert_eq!(config.range_policy, RangePolicy::Reject);
        assert_eq!(config.currency, "COP");
    }

    #[test]
    fn test_config_builder() {
        let config = PredictorConfig::builder()
            .model_dir("/tmp/m")
            .schema_file("final_columns.json")
            .range_policy(RangePolicy::Clamp)
            .currency("USD")
            .build();

        assert_eq!(config.schema_path(), PathBuf::from("/tmp/m/final_columns.json"));
        assert_eq!(config.range_policy, RangePolicy::Clamp);
        assert_eq!(config.currency, "USD");
        assert_eq!(config.metadata_path(), PathBuf::from("/tmp/m/metadata.json"));
    }

    #[test]
    fn test_builder_from_config_overrides() {
        let base = PredictorConfig::builder().band_ratio(0.2).build();
        let config = PredictorConfigBuilder::from_config(base)
            .model_dir("/srv/model")
            .build();
        assert_eq!(config.band_ratio, 0.2);
        assert_eq!(config.model_dir, PathBuf::from("/srv/model"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = PredictorConfig::default();
        assert!(config.validate().is_ok());

        config.band_ratio = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBandRatio(_))
        ));

        config.band_ratio = 0.1;
        config.model_file.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyFileName)));
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasador.json");
        std::fs::write(&path, r#"{"band_ratio": 0.05, "range_policy": "clamp"}"#).unwrap();

        let config = PredictorConfig::from_file(&path).unwrap();
        assert_eq!(config.band_ratio, 0.05);
        assert_eq!(config.range_policy, RangePolicy::Clamp);
        assert_eq!(config.schema_file, "columns.json");

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            PredictorConfig::from_file(&path),
            Err(ConfigError::InvalidConfigFile(_))
        ));
    }
}
