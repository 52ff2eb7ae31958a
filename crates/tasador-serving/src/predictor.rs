//! Price prediction service.
//!
//! [`PricePredictor`] ties the pieces together: align a validated
//! [`PropertyRecord`] to the loaded schema, ask the model for a point
//! estimate, and compute the price band.

use crate::error::{ServingError, ServingResult};
use crate::model_loader::LoadedModel;
use crate::presenter::PredictionResult;
use serde::Serialize;
use std::sync::Arc;
use tasador_core::{align, FeatureSchema, FeatureVector, PropertyRecord, UnseenValue};
use tracing::debug;

/// Anything that maps an aligned feature vector to a price.
pub trait Predictor: Send + Sync {
    /// Predict a price for `features`.
    ///
    /// # Errors
    ///
    /// Returns [`ServingError::SchemaMismatch`] for a vector of the wrong
    /// length and [`ServingError::PredictionFailure`] if the model fails.
    fn predict(&self, features: &FeatureVector) -> ServingResult<f64>;
}

impl Predictor for LoadedModel {
    fn predict(&self, features: &FeatureVector) -> ServingResult<f64> {
        if features.len() != self.schema.len() {
            return Err(ServingError::length_mismatch(
                self.schema.len(),
                features.len(),
            ));
        }
        let price = self.model.predict(features.values())?;
        if !price.is_finite() {
            return Err(ServingError::prediction(format!(
                "model returned a non-finite price ({price})"
            )));
        }
        Ok(f64::from(price))
    }
}

/// The outcome of one estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    /// Point estimate and band.
    #[serde(flatten)]
    pub result: PredictionResult,
    /// Categorical values the model has never seen.
    pub unseen: Vec<UnseenValue>,
    /// Version of the model that produced the estimate.
    pub model_version: String,
}

/// Estimates prices for property records.
///
/// # Example
///
/// ```no_run
/// use tasador_core::{Collector, FormValues, RangePolicy};
/// use tasador_serving::{ModelLoader, PredictorConfig, PricePredictor};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PredictorConfig::builder().model_dir("/models/bogota").build();
/// let predictor = PricePredictor::new(ModelLoader::new(config.clone()).load()?, config.band_ratio);
///
/// let values = FormValues::from_json_str(r#"{"area": 80, "sector": "CHAPINERO"}"#)?.with_defaults(true);
/// let record = Collector::new(values, RangePolicy::Reject).collect()?;
/// let estimate = predictor.estimate(&record)?;
/// println!("{}", estimate.result.point_estimate);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PricePredictor {
    schema: Arc<FeatureSchema>,
    predictor: Arc<dyn Predictor>,
    version: String,
    band_ratio: f64,
}

impl std::fmt::Debug for PricePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricePredictor")
            .field("columns", &self.schema.len())
            .field("version", &self.version)
            .field("band_ratio", &self.band_ratio)
            .finish()
    }
}

impl PricePredictor {
    /// Serve `model` with a band of `band_ratio` around each estimate.
    pub fn new(model: Arc<LoadedModel>, band_ratio: f64) -> Self {
        Self {
            schema: Arc::clone(&model.schema),
            version: model.version.clone(),
            predictor: model,
            band_ratio,
        }
    }

    /// Serve an arbitrary predictor against `schema`.
    pub fn with_predictor(
        schema: Arc<FeatureSchema>,
        predictor: Arc<dyn Predictor>,
        version: impl Into<String>,
        band_ratio: f64,
    ) -> Self {
        Self {
            schema,
            predictor,
            version: version.into(),
            band_ratio,
        }
    }

    /// Returns the schema records are aligned to.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Returns the model version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the band ratio.
    pub fn band_ratio(&self) -> f64 {
        self.band_ratio
    }

    /// Estimate the price of `record`.
    ///
    /// # Errors
    ///
    /// Propagates [`Predictor::predict`] failures. Unseen categorical values
    /// are not errors; they are listed on the [`Estimate`].
    pub fn estimate(&self, record: &PropertyRecord) -> ServingResult<Estimate> {
        let features = align(record, &self.schema);
        let price = self.predictor.predict(&features)?;
        debug!("Predicted {} from {} features", price, features.len());

        Ok(Estimate {
            result: PredictionResult::with_ratio(price, self.band_ratio),
            unseen: features.unseen().to_vec(),
            model_version: self.version.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::InferenceModel;
    use tasador_core::{CategoricalField, NumericField};

    struct Fixed(f32, usize);

    impl InferenceModel for Fixed {
        fn kind(&self) -> &'static str {
            "fixed"
        }

        fn input_dim(&self) -> usize {
            self.1
        }

        fn predict(&self, _features: &[f64]) -> ServingResult<f32> {
            Ok(self.0)
        }
    }

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            "area".to_string(),
            "sector=CHAPINERO".to_string(),
        ])
        .unwrap()
    }

    fn loaded(price: f32) -> Arc<LoadedModel> {
        Arc::new(LoadedModel::from_parts("test", schema(), Arc::new(Fixed(price, 2))).unwrap())
    }

    #[test]
    fn test_estimate_scenario() {
        let predictor = PricePredictor::new(loaded(500_000_000.0), 0.10);
        let record = PropertyRecord::builder()
            .numeric(NumericField::Area, 80.0)
            .category(CategoricalField::Sector, "CHAPINERO")
            .build();

        let estimate = predictor.estimate(&record).unwrap();
        assert_eq!(estimate.result.point_estimate, 500_000_000.0);
        assert!((estimate.result.lower_bound - 450_000_000.0).abs() < 1e-3);
        assert!((estimate.result.upper_bound - 550_000_000.0).abs() < 1e-3);
        assert_eq!(estimate.model_version, "test");
        assert!(estimate.unseen.is_empty());
    }

    #[test]
    fn test_estimate_reports_unseen() {
        let predictor = PricePredictor::new(loaded(1.0), 0.10);
        let record = PropertyRecord::builder()
            .category(CategoricalField::Sector, "NEW_UNSEEN_SECTOR")
            .build();

        let estimate = predictor.estimate(&record).unwrap();
        assert_eq!(estimate.unseen.len(), 1);
        assert_eq!(estimate.unseen[0].field, CategoricalField::Sector);
    }

    #[test]
    fn test_non_finite_price_is_a_failure() {
        let model = loaded(f32::NAN);
        let err = Predictor::predict(model.as_ref(), &FeatureVector::from_values(vec![0.0; 2]))
            .unwrap_err();
        assert!(matches!(err, ServingError::PredictionFailure(_)));
    }

    #[test]
    fn test_wrong_length_is_a_schema_mismatch() {
        let model = loaded(1.0);
        let err = Predictor::predict(model.as_ref(), &FeatureVector::from_values(vec![0.0; 3]))
            .unwrap_err();
        assert!(matches!(err, ServingError::SchemaMismatch(_)));
    }

    #[test]
    fn test_from_parts_checks_width() {
        assert!(LoadedModel::from_parts("x", schema(), Arc::new(Fixed(1.0, 5))).is_err());
    }

    #[test]
    fn test_with_predictor() {
        struct Doubling;
        impl Predictor for Doubling {
            fn predict(&self, features: &FeatureVector) -> ServingResult<f64> {
                Ok(features.values()[0] * 2.0)
            }
        }

        let predictor = PricePredictor::with_predictor(Arc::new(schema()), Arc::new(Doubling), "d", 0.2);
        let record = PropertyRecord::builder()
            .numeric(NumericField::Area, 100.0)
            .build();
        let estimate = predictor.estimate(&record).unwrap();
        assert_eq!(estimate.result.point_estimate, 200.0);
        assert!((estimate.result.lower_bound - 160.0).abs() < 1e-9);
        assert_eq!(predictor.version(), "d");
    }
}
