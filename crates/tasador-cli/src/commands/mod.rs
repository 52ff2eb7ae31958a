//! CLI Command Implementations
//!
//! This module contains the implementations for all CLI subcommands:
//!
//! - [`predict`]: one-shot estimate from a JSON file and/or `--set` flags
//! - [`form`]: interactive property form
//! - [`schema`]: feature schema audit
//! - [`options`]: field domains and choice lists

mod form;
mod options;
mod predict;
mod schema;

pub use form::FormCommand;
pub use options::OptionsCommand;
pub use predict::{OutputFormat, PredictCommand};
pub use schema::SchemaCommand;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tasador_core::RangePolicy;
use tasador_serving::{
    LoadedModel, ModelLoader, PredictorConfig, PredictorConfigBuilder, Presenter, PricePredictor,
};
use tracing::info;

/// Options shared by every command that loads a model.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Directory containing columns.json, model.json and metadata.json
    #[arg(long, short = 'd', env = "TASADOR_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// JSON configuration file; flags override its values
    #[arg(long, short = 'c', env = "TASADOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Relative width of the price band (0.10 = ±10%)
    #[arg(long)]
    pub band_ratio: Option<f64>,

    /// Currency label for rendered amounts
    #[arg(long)]
    pub currency: Option<String>,
}

impl ModelArgs {
    /// Resolve the predictor configuration: file first, then flags.
    pub fn resolve(&self, clamp: bool) -> Result<PredictorConfig> {
        let base = match &self.config {
            Some(path) => PredictorConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration {path:?}"))?,
            None => PredictorConfig::default(),
        };

        let mut builder = PredictorConfigBuilder::from_config(base);
        if let Some(dir) = &self.model_dir {
            builder = builder.model_dir(dir);
        }
        if let Some(ratio) = self.band_ratio {
            builder = builder.band_ratio(ratio);
        }
        if let Some(currency) = &self.currency {
            builder = builder.currency(currency);
        }
        if clamp {
            builder = builder.range_policy(RangePolicy::Clamp);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration and load the model.
    pub fn load(&self, clamp: bool) -> Result<Session> {
        let config = self.resolve(clamp)?;
        let model = ModelLoader::new(config.clone())
            .load()
            .with_context(|| format!("Failed to load model from {:?}", config.model_dir))?;
        info!("Serving model version {}", model.version);
        Ok(Session::new(config, model))
    }
}

/// A loaded model with its predictor and presenter.
pub struct Session {
    pub config: PredictorConfig,
    pub model: Arc<LoadedModel>,
    pub predictor: PricePredictor,
    pub presenter: Presenter,
}

impl Session {
    fn new(config: PredictorConfig, model: Arc<LoadedModel>) -> Self {
        let predictor = PricePredictor::new(Arc::clone(&model), config.band_ratio);
        let presenter = Presenter::new(&config.currency, config.band_ratio);
        Self {
            config,
            model,
            predictor,
            presenter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasador.json");
        std::fs::write(
            &path,
            r#"{"model_dir": "/srv/models/bogota", "band_ratio": 0.2, "currency": "USD"}"#,
        )
        .unwrap();

        let args = ModelArgs {
            config: Some(path),
            band_ratio: Some(0.05),
            ..Default::default()
        };
        let config = args.resolve(true).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/srv/models/bogota"));
        assert_eq!(config.band_ratio, 0.05);
        assert_eq!(config.currency, "USD");
        assert_eq!(config.range_policy, RangePolicy::Clamp);
    }

    #[test]
    fn test_invalid_band_ratio_is_rejected() {
        let args = ModelArgs {
            band_ratio: Some(1.5),
            ..Default::default()
        };
        assert!(args.resolve(false).is_err());
    }
}
