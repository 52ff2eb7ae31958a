//! Core types for the tasador property price estimator.
//!
//! This crate holds everything that happens before a model is invoked:
//!
//! - **Fields and catalog**: the attributes of the property form, their
//!   numeric domains and the closed choice lists of categorical fields.
//! - **Collection**: turning raw form values into a validated, immutable
//!   [`PropertyRecord`].
//! - **Schema**: compiling the model's ordered column list into index tables.
//! - **Alignment**: producing the one-hot [`FeatureVector`] the model expects.
//!
//! # Example
//!
//! ```
//! use tasador_core::align::align;
//! use tasador_core::collector::{Collector, FormValues, RangePolicy};
//! use tasador_core::schema::FeatureSchema;
//!
//! let schema = FeatureSchema::from_json_str(
//!     r#"["area", "bedrooms", "sector=CHAPINERO", "locality=CHAPINERO"]"#,
//! )
//! .unwrap();
//!
//! let mut values = FormValues::new().with_defaults(true);
//! values.assign("area=80").unwrap();
//! values.assign("bedrooms=3").unwrap();
//! values.assign("sector=CHAPINERO").unwrap();
//! values.assign("locality=CHAPINERO").unwrap();
//! let record = Collector::new(values, RangePolicy::Reject).collect().unwrap();
//!
//! let vector = align(&record, &schema);
//! assert_eq!(vector.values(), &[80.0, 3.0, 1.0, 1.0]);
//! ```
//!
//! # Modules
//!
//! - [`field`]: field kinds and numeric domains.
//! - [`catalog`]: choice lists for categorical fields.
//! - [`record`]: the immutable property record.
//! - [`collector`]: input sources and validation.
//! - [`schema`]: feature schema compilation and coverage.
//! - [`align`]: record to feature vector alignment.
//! - [`error`]: error types for the library.

pub mod align;
pub mod catalog;
pub mod collector;
pub mod error;
pub mod field;
pub mod record;
pub mod schema;

pub use align::{align, FeatureVector, UnseenValue};
pub use collector::{Collector, FieldSource, FormValues, RangePolicy};
pub use error::{CoreError, Result};
pub use field::{BinaryField, CategoricalField, Field, NumericDomain, NumericField};
pub use record::{PropertyRecord, PropertyRecordBuilder};
pub use schema::{ColumnKind, FeatureSchema, Passthrough, SchemaCoverage};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
