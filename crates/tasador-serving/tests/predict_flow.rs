//! End-to-end flow: model directory on disk, form values in, rendered text out.

use std::fs;
use std::path::Path;

use tasador_core::{Collector, FormValues, RangePolicy};
use tasador_serving::{
    ModelLoader, PredictorConfig, Presenter, PricePredictor, ServingError,
};
use tempfile::TempDir;

const COLUMNS: &str = r#"{
    "version": "2024-q2",
    "columns": [
        "area", "bedrooms", "bathrooms", "administration_fee", "parking_spaces",
        "socioeconomic_level", "longitude", "latitude", "jacuzzi", "floor", "closets",
        "fireplace", "pets_allowed", "gym", "elevator", "gated_community",
        "sector=CHAPINERO", "sector=CHICO", "age_of_property=MAS DE 20 ANOS",
        "locality=CHAPINERO", "nearest_tm_station=Calle 85"
    ]
}"#;

// 300M base, +200M for Chapinero, +50M above 100 m2.
const MODEL: &str = r#"{
    "type": "gbtree",
    "base_score": 300000000,
    "trees": [
        {"nodeid": 0, "split": "sector=CHAPINERO", "split_condition": 0.5, "yes": 1, "no": 2,
         "children": [{"nodeid": 1, "leaf": 0}, {"nodeid": 2, "leaf": 200000000}]},
        {"nodeid": 0, "split": "area", "split_condition": 100, "yes": 1, "no": 2,
         "children": [{"nodeid": 1, "leaf": 0}, {"nodeid": 2, "leaf": 50000000}]}
    ]
}"#;

fn write_model(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("columns.json"), COLUMNS).unwrap();
    fs::write(dir.join("model.json"), MODEL).unwrap();
    fs::write(
        dir.join("metadata.json"),
        r#"{"name": "bogota-apartments", "trained_at": "2024-06-30", "currency": "COP"}"#,
    )
    .unwrap();
}

fn form(json: &str) -> FormValues {
    FormValues::from_json_str(json).unwrap().with_defaults(true)
}

fn setup() -> (TempDir, PredictorConfig) {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("bogota");
    write_model(&dir);
    let config = PredictorConfig::builder().model_dir(&dir).build();
    (tmp, config)
}

#[test]
fn test_chapinero_apartment() {
    let (_tmp, config) = setup();
    let model = ModelLoader::new(config.clone()).load().unwrap();
    assert_eq!(model.version, "2024-q2");

    let predictor = PricePredictor::new(model, config.band_ratio);
    let presenter = Presenter::new(&config.currency, config.band_ratio);

    let record = Collector::new(
        form(r#"{"area": 80, "bedrooms": 3, "sector": "CHAPINERO", "locality": "CHAPINERO"}"#),
        RangePolicy::Reject,
    )
    .collect()
    .unwrap();
    let estimate = predictor.estimate(&record).unwrap();

    assert_eq!(
        presenter.render_text(&estimate.result),
        "Predicted Price COP 500,000,000.00\n\
         Predicted Price Range (-10% to +10%): COP 450,000,000.00 - COP 550,000,000.00"
    );
    assert!(estimate.unseen.is_empty());
}

#[test]
fn test_unknown_sector_is_zero_filled() {
    let (_tmp, config) = setup();
    let predictor = PricePredictor::new(ModelLoader::new(config).load().unwrap(), 0.10);

    // Catalog sector the schema was never trained on.
    let record = Collector::new(form(r#"{"area": 120, "sector": "USAQUEN"}"#), RangePolicy::Reject)
        .collect()
        .unwrap();
    let estimate = predictor.estimate(&record).unwrap();

    assert_eq!(estimate.result.point_estimate, 350_000_000.0);
    assert_eq!(estimate.unseen.len(), 1);
    assert_eq!(estimate.unseen[0].value, "USAQUEN");
}

#[test]
fn test_out_of_range_input_never_reaches_the_model() {
    let (_tmp, config) = setup();
    let err = Collector::new(form(r#"{"area": 5000}"#), RangePolicy::Reject)
        .collect()
        .unwrap_err();
    let err = ServingError::from(err);
    assert!(err.is_client_error());

    let presenter = Presenter::new(&config.currency, config.band_ratio);
    assert!(presenter
        .render_error(&err)
        .starts_with("Error in making prediction: Invalid input:"));

    let record = Collector::new(form(r#"{"area": 5000}"#), RangePolicy::Clamp)
        .collect()
        .unwrap();
    let predictor = PricePredictor::new(ModelLoader::new(config).load().unwrap(), 0.10);
    assert_eq!(
        predictor.estimate(&record).unwrap().result.point_estimate,
        350_000_000.0
    );
}

#[test]
fn test_json_rendering() {
    let (_tmp, config) = setup();
    let predictor = PricePredictor::new(ModelLoader::new(config.clone()).load().unwrap(), 0.10);
    let record = Collector::new(form(r#"{"sector": "CHAPINERO"}"#), RangePolicy::Reject)
        .collect()
        .unwrap();
    let estimate = predictor.estimate(&record).unwrap();

    let doc = Presenter::new(&config.currency, 0.10).render_json(&estimate);
    assert_eq!(doc["model_version"], "2024-q2");
    assert_eq!(doc["point_estimate"], 500_000_000.0);
    assert!(doc["unseen"].as_array().unwrap().is_empty());
}

#[test]
fn test_mismatched_model_fails_at_load() {
    let (_tmp, config) = setup();
    fs::write(
        config.model_path(),
        r#"{"type": "gbtree", "feature_names": ["area"], "trees": [{"nodeid": 0, "leaf": 1}]}"#,
    )
    .unwrap();
    let err = ModelLoader::new(config).load().unwrap_err();
    assert!(matches!(err, ServingError::SchemaMismatch(_)));
    assert!(!err.is_client_error());
}
