//! Model serving for the tasador property price estimator.
//!
//! This crate turns a validated [`tasador_core::PropertyRecord`] into a
//! priced estimate.
//!
//! # Overview
//!
//! - **ModelLoader**: reads a model directory (schema, model spec, metadata,
//!   dense weights) once and cross-checks the schema against the model.
//! - **InferenceModel**: the model families, gradient-boosted trees and a
//!   Candle feed-forward regressor.
//! - **PricePredictor**: aligns records, predicts and computes the band.
//! - **Presenter**: renders estimates as text or JSON.
//!
//! # Architecture
//!
//! ```text
//!   PropertyRecord
//!         │
//!         ▼
//! ┌───────────────────────────────────────────────┐
//! │                PricePredictor                 │
//! │  ┌──────────────┐         ┌────────────────┐  │
//! │  │    align     │ ──────▶ │ InferenceModel │  │
//! │  │ (core crate) │         │ gbtree │ mlp   │  │
//! │  └──────────────┘         └────────────────┘  │
//! └───────────────────────────────────────────────┘
//!         │                            ▲
//!         ▼                            │ Arc<LoadedModel>
//!     Presenter                   ModelLoader
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use tasador_core::{Collector, FormValues};
//! use tasador_serving::{ModelLoader, PredictorConfig, Presenter, PricePredictor};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PredictorConfig::builder()
//!     .model_dir("/models/bogota")
//!     .build();
//!
//! let model = ModelLoader::new(config.clone()).load()?;
//! let predictor = PricePredictor::new(model, config.band_ratio);
//! let presenter = Presenter::new(&config.currency, config.band_ratio);
//!
//! let values = FormValues::from_json_str(r#"{"area": 80, "sector": "CHAPINERO"}"#)?
//!     .with_defaults(true);
//! let record = Collector::new(values, config.range_policy).collect()?;
//!
//! match predictor.estimate(&record) {
//!     Ok(estimate) => println!("{}", presenter.render_text(&estimate.result)),
//!     Err(err) => eprintln!("{}", presenter.render_error(&err)),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`PredictorConfig`] can also be read from JSON; absent fields take their
//! defaults:
//!
//! ```
//! use tasador_core::RangePolicy;
//! use tasador_serving::PredictorConfig;
//!
//! let config: PredictorConfig =
//!     serde_json::from_str(r#"{"model_dir": "/models/bogota", "range_policy": "clamp"}"#).unwrap();
//! assert_eq!(config.range_policy, RangePolicy::Clamp);
//! assert_eq!(config.band_ratio, 0.10);
//! ```

pub mod config;
pub mod error;
pub mod gbtree;
pub mod inference;
pub mod model_loader;
pub mod predictor;
pub mod presenter;

pub use config::{ConfigError, PredictorConfig, PredictorConfigBuilder};
pub use error::{ServingError, ServingResult};
pub use gbtree::{GbTreeModel, GbTreeSpec};
pub use inference::{build_model, InferenceModel, ModelSpec};
pub use model_loader::{LoadedModel, ModelLoader, ModelMetadata};
pub use predictor::{Estimate, PricePredictor, Predictor};
pub use presenter::{format_amount, PredictionResult, Presenter};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
