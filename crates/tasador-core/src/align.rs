//! Feature alignment.
//!
//! [`align`] turns a [`PropertyRecord`] into the exact input vector a model
//! was trained on:
//!
//! 1. pass-through attributes are copied to their columns;
//! 2. each categorical value sets its `field=value` indicator to 1, in
//!    [`CategoricalField::ALL`] order;
//! 3. every other column stays 0.
//!
//! Each column is fed by at most one attribute: no categorical field name is a
//! prefix of another, and no pass-through name has the form
//! `field<separator>value`. A value without an indicator column is treated as
//! "none of the known categories" and reported on the vector.
//!
//! Values are kept at full `f64` precision. Models narrow them to their own
//! input type when evaluating.

use serde::Serialize;
use tracing::warn;

use crate::field::CategoricalField;
use crate::record::PropertyRecord;
use crate::schema::FeatureSchema;

/// A categorical value the schema has no indicator column for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnseenValue {
    /// The categorical field.
    pub field: CategoricalField,
    /// The submitted value.
    pub value: String,
}

/// A record aligned to a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
    unseen: Vec<UnseenValue>,
}

impl FeatureVector {
    /// Wrap raw values, e.g. for callers that align elsewhere.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            unseen: Vec::new(),
        }
    }

    /// Returns the feature values in schema order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the number of features.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the vector is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the categorical values that had no indicator column.
    pub fn unseen(&self) -> &[UnseenValue] {
        &self.unseen
    }
}

/// Align `record` to `schema`.
///
/// The output has exactly `schema.len()` entries. This function never fails:
/// categorical values unknown to the schema leave their indicator family at
/// zero and are listed in [`FeatureVector::unseen`]. Fields the schema has no
/// indicator columns for at all (such as ordinal fields fed as numbers) are
/// not considered unseen.
///
/// # Examples
///
/// ```
/// use tasador_core::align::align;
/// use tasador_core::field::{CategoricalField, NumericField};
/// use tasador_core::record::PropertyRecord;
/// use tasador_core::schema::FeatureSchema;
///
/// let schema = FeatureSchema::new(vec![
///     "area".to_string(),
///     "sector=CHAPINERO".to_string(),
///     "sector=CHICO".to_string(),
/// ])
/// .unwrap();
/// let record = PropertyRecord::builder()
///     .numeric(NumericField::Area, 80.0)
///     .category(CategoricalField::Sector, "CHICO")
///     .build();
///
/// assert_eq!(align(&record, &schema).values(), &[80.0, 0.0, 1.0]);
/// ```
pub fn align(record: &PropertyRecord, schema: &FeatureSchema) -> FeatureVector {
    let mut values = vec![0.0f64; schema.len()];

    for &(attribute, idx) in schema.passthrough() {
        values[idx] = attribute.value(record);
    }

    let mut unseen = Vec::new();
    for field in CategoricalField::ALL {
        let value = record.category(field);
        match schema.indicator_index(field, value) {
            Some(idx) => values[idx] = 1.0,
            None if schema.has_indicators(field) => {
                warn!(
                    "No indicator column '{}'; treating {} as none of the known categories",
                    schema.indicator_name(field, value),
                    field.name()
                );
                unseen.push(UnseenValue {
                    field,
                    value: value.to_string(),
                });
            }
            None => {}
        }
    }

    FeatureVector { values, unseen }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{Collector, FormValues, RangePolicy};
    use crate::field::{BinaryField, NumericField};
    use proptest::prelude::*;

    fn scenario_schema() -> FeatureSchema {
        let mut columns: Vec<String> = [
            "area",
            "bedrooms",
            "bathrooms",
            "administration_fee",
            "parking_spaces",
            "socioeconomic_level",
            "longitude",
            "latitude",
            "jacuzzi",
            "floor",
            "closets",
            "fireplace",
            "pets_allowed",
            "gym",
            "elevator",
            "gated_community",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for sector in ["CHAPINERO", "CHICO", "USAQUEN"] {
            columns.push(format!("sector={sector}"));
        }
        for age in ["MAS DE 20 ANOS", "ENTRE 0 Y 5 ANOS"] {
            columns.push(format!("age_of_property={age}"));
        }
        for locality in ["CHAPINERO", "SUBA"] {
            columns.push(format!("locality={locality}"));
        }
        for station in ["Calle 85", "Calle 72"] {
            columns.push(format!("nearest_tm_station={station}"));
        }
        FeatureSchema::new(columns).unwrap()
    }

    fn scenario_record(sector: &str) -> PropertyRecord {
        PropertyRecord::builder()
            .numeric(NumericField::Area, 80.0)
            .numeric(NumericField::Bedrooms, 3.0)
            .numeric(NumericField::Bathrooms, 2.0)
            .numeric(NumericField::AdministrationFee, 300_000.0)
            .numeric(NumericField::Floor, 3.0)
            .numeric(NumericField::Closets, 2.0)
            .numeric(NumericField::Longitude, -74.05)
            .numeric(NumericField::Latitude, 4.65)
            .category(CategoricalField::Sector, sector)
            .category(CategoricalField::Locality, "CHAPINERO")
            .category(CategoricalField::AgeOfProperty, "MAS DE 20 ANOS")
            .category(CategoricalField::NearestTmStation, "Calle 85")
            .category(CategoricalField::SocioeconomicLevel, "4")
            .category(CategoricalField::ParkingSpaces, "1")
            .build()
    }

    fn indicator_entries(schema: &FeatureSchema, vector: &FeatureVector) -> Vec<(String, f64)> {
        schema
            .columns()
            .iter()
            .zip(vector.values())
            .filter(|(c, _)| c.contains('='))
            .map(|(c, v)| (c.clone(), *v))
            .collect()
    }

    #[test]
    fn test_scenario_known_values() {
        let schema = scenario_schema();
        let vector = align(&scenario_record("CHAPINERO"), &schema);

        assert_eq!(vector.len(), schema.len());
        assert!(vector.unseen().is_empty());

        for (column, value) in indicator_entries(&schema, &vector) {
            let expected = matches!(
                column.as_str(),
                "sector=CHAPINERO"
                    | "locality=CHAPINERO"
                    | "age_of_property=MAS DE 20 ANOS"
                    | "nearest_tm_station=Calle 85"
            );
            assert_eq!(value, if expected { 1.0 } else { 0.0 }, "{column}");
        }
    }

    #[test]
    fn test_scenario_only_sector_and_locality_indicators() {
        let schema = FeatureSchema::new(vec![
            "area".to_string(),
            "sector=CHAPINERO".to_string(),
            "sector=CHICO".to_string(),
            "locality=CHAPINERO".to_string(),
            "locality=SUBA".to_string(),
        ])
        .unwrap();
        let vector = align(&scenario_record("CHAPINERO"), &schema);
        assert_eq!(vector.values(), &[80.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_scenario_unseen_sector() {
        let schema = scenario_schema();
        let vector = align(&scenario_record("NEW_UNSEEN_SECTOR"), &schema);

        assert_eq!(vector.len(), schema.len());
        for (column, value) in indicator_entries(&schema, &vector) {
            if column.starts_with("sector=") {
                assert_eq!(value, 0.0, "{column}");
            }
        }
        assert_eq!(
            vector.unseen(),
            &[UnseenValue {
                field: CategoricalField::Sector,
                value: "NEW_UNSEEN_SECTOR".to_string(),
            }]
        );

        // Identical to the known case except for the sector family.
        let known = align(&scenario_record("CHAPINERO"), &schema);
        let sector_idx = schema.index_of("sector=CHAPINERO").unwrap();
        for (i, (a, b)) in known.values().iter().zip(vector.values()).enumerate() {
            if i != sector_idx {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_passthrough_values() {
        let schema = scenario_schema();
        let record = PropertyRecord::builder()
            .numeric(NumericField::Latitude, 4.65)
            .flag(BinaryField::Gym, true)
            .category(CategoricalField::SocioeconomicLevel, "6")
            .build();
        let vector = align(&record, &schema);
        let at = |name: &str| vector.values()[schema.index_of(name).unwrap()];

        assert_eq!(at("latitude"), 4.65);
        assert_eq!(at("gym"), 1.0);
        assert_eq!(at("elevator"), 0.0);
        assert_eq!(at("socioeconomic_level"), 6.0);
    }

    #[test]
    fn test_unbounded_numbers_keep_their_value() {
        let values = FormValues::from_json_str(
            r#"{"administration_fee": 123456789, "floor": 1e39, "closets": 16777217, "latitude": 4.651}"#,
        )
        .unwrap()
        .with_defaults(true);
        let record = Collector::new(values, RangePolicy::Reject).collect().unwrap();
        let schema = scenario_schema();
        let vector = align(&record, &schema);
        let at = |name: &str| vector.values()[schema.index_of(name).unwrap()];

        assert_eq!(at("administration_fee"), 123_456_789.0);
        assert_eq!(at("floor"), 1e39);
        assert!(at("floor").is_finite());
        assert_eq!(at("closets"), 16_777_217.0);
        assert_eq!(at("latitude"), 4.651);
    }

    #[test]
    fn test_ordinal_indicators() {
        let schema = FeatureSchema::new(vec![
            "parking_spaces=0".to_string(),
            "parking_spaces=1".to_string(),
            "parking_spaces=2".to_string(),
        ])
        .unwrap();
        let record = PropertyRecord::builder()
            .category(CategoricalField::ParkingSpaces, "2")
            .build();
        assert_eq!(align(&record, &schema).values(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_fields_without_indicators_are_not_unseen() {
        let schema = FeatureSchema::new(vec!["area".to_string()]).unwrap();
        let vector = align(&scenario_record("ANYTHING"), &schema);
        assert!(vector.unseen().is_empty());
        assert_eq!(vector.values(), &[80.0]);
    }

    proptest! {
        #[test]
        fn prop_length_matches_schema_and_is_deterministic(
            area in 10.0f64..=1000.0,
            sector_idx in 0usize..93,
            station_idx in 0usize..132,
            gym in any::<bool>(),
        ) {
            let schema = scenario_schema();
            let record = PropertyRecord::builder()
                .numeric(NumericField::Area, area)
                .flag(BinaryField::Gym, gym)
                .category(CategoricalField::Sector, CategoricalField::Sector.choices()[sector_idx])
                .category(
                    CategoricalField::NearestTmStation,
                    CategoricalField::NearestTmStation.choices()[station_idx],
                )
                .build();

            let first = align(&record, &schema);
            let second = align(&record, &schema);
            prop_assert_eq!(first.len(), schema.len());
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.values()[schema.index_of("area").unwrap()], area);
        }

        #[test]
        fn prop_each_family_has_at_most_one_hot(sector_idx in 0usize..93, locality_idx in 0usize..19) {
            let schema = scenario_schema();
            let sector = CategoricalField::Sector.choices()[sector_idx];
            let locality = CategoricalField::Locality.choices()[locality_idx];
            let record = PropertyRecord::builder()
                .category(CategoricalField::Sector, sector)
                .category(CategoricalField::Locality, locality)
                .build();
            let vector = align(&record, &schema);

            for (field, value) in [(CategoricalField::Sector, sector), (CategoricalField::Locality, locality)] {
                let prefix = format!("{}=", field.name());
                let hot: Vec<&String> = schema
                    .columns()
                    .iter()
                    .zip(vector.values())
                    .filter(|(c, v)| c.starts_with(&prefix) && **v == 1.0)
                    .map(|(c, _)| c)
                    .collect();
                match schema.indicator_index(field, value) {
                    Some(idx) => prop_assert_eq!(hot, vec![&schema.columns()[idx]]),
                    None => prop_assert!(hot.is_empty()),
                }
            }
        }
    }
}
