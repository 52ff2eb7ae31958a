//! The property record submitted for a single prediction.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::field::{BinaryField, CategoricalField, NumericField};

/// One submitted property.
///
/// A record is immutable once built: its fields are private and only exposed
/// through read accessors. Records produced by [`crate::collector::Collector`]
/// are validated against the field domains and the catalog; records built with
/// [`PropertyRecord::builder`] are taken as given.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    numeric: [f64; NumericField::ALL.len()],
    flags: [bool; BinaryField::ALL.len()],
    categories: [String; CategoricalField::ALL.len()],
}

impl PropertyRecord {
    /// Creates a builder pre-filled with the form defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use tasador_core::field::{CategoricalField, NumericField};
    /// use tasador_core::record::PropertyRecord;
    ///
    /// let record = PropertyRecord::builder()
    ///     .numeric(NumericField::Area, 80.0)
    ///     .category(CategoricalField::Sector, "CHAPINERO")
    ///     .build();
    /// assert_eq!(record.numeric(NumericField::Area), 80.0);
    /// assert_eq!(record.category(CategoricalField::Sector), "CHAPINERO");
    /// ```
    pub fn builder() -> PropertyRecordBuilder {
        PropertyRecordBuilder::default()
    }

    /// Returns the value of a numeric field.
    #[inline]
    pub fn numeric(&self, field: NumericField) -> f64 {
        self.numeric[field.index()]
    }

    /// Returns the value of a binary flag.
    #[inline]
    pub fn flag(&self, field: BinaryField) -> bool {
        self.flags[field.index()]
    }

    /// Returns the selected value of a categorical field.
    #[inline]
    pub fn category(&self, field: CategoricalField) -> &str {
        &self.categories[field.index()]
    }

    /// Returns the numeric value of an ordinal field.
    ///
    /// Returns `None` for non-ordinal fields or values that are not numbers.
    pub fn ordinal(&self, field: CategoricalField) -> Option<f64> {
        if !field.is_ordinal() {
            return None;
        }
        self.category(field).trim().parse::<f64>().ok()
    }
}

impl Serialize for PropertyRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.numeric.len() + self.flags.len() + self.categories.len();
        let mut map = serializer.serialize_map(Some(len))?;
        for field in NumericField::ALL {
            map.serialize_entry(field.name(), &self.numeric(field))?;
        }
        for field in BinaryField::ALL {
            map.serialize_entry(field.name(), &u8::from(self.flag(field)))?;
        }
        for field in CategoricalField::ALL {
            map.serialize_entry(field.name(), self.category(field))?;
        }
        map.end()
    }
}

/// Builder for [`PropertyRecord`].
#[derive(Debug, Clone)]
pub struct PropertyRecordBuilder {
    record: PropertyRecord,
}

impl Default for PropertyRecordBuilder {
    fn default() -> Self {
        let numeric = NumericField::ALL.map(|f| f.domain().default);
        let categories = CategoricalField::ALL.map(|f| {
            f.choices()
                .first()
                .map(|c| (*c).to_string())
                .unwrap_or_default()
        });
        Self {
            record: PropertyRecord {
                numeric,
                flags: [false; BinaryField::ALL.len()],
                categories,
            },
        }
    }
}

impl PropertyRecordBuilder {
    /// Set a numeric field.
    pub fn numeric(mut self, field: NumericField, value: f64) -> Self {
        self.record.numeric[field.index()] = value;
        self
    }

    /// Set a binary flag.
    pub fn flag(mut self, field: BinaryField, value: bool) -> Self {
        self.record.flags[field.index()] = value;
        self
    }

    /// Set a categorical field.
    pub fn category(mut self, field: CategoricalField, value: impl Into<String>) -> Self {
        self.record.categories[field.index()] = value.into();
        self
    }

    /// Build the record.
    pub fn build(self) -> PropertyRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let record = PropertyRecord::builder().build();
        assert_eq!(record.numeric(NumericField::Area), 10.0);
        assert_eq!(record.numeric(NumericField::AdministrationFee), 0.0);
        assert_eq!(record.numeric(NumericField::Longitude), 0.0);
        assert!(!record.flag(BinaryField::Gym));
        assert_eq!(record.category(CategoricalField::ParkingSpaces), "0");
        assert_eq!(record.category(CategoricalField::SocioeconomicLevel), "1");
    }

    #[test]
    fn test_ordinal_values() {
        let record = PropertyRecord::builder()
            .category(CategoricalField::SocioeconomicLevel, "4")
            .category(CategoricalField::Sector, "CHICO")
            .build();
        assert_eq!(record.ordinal(CategoricalField::SocioeconomicLevel), Some(4.0));
        assert_eq!(record.ordinal(CategoricalField::Sector), None);
    }

    #[test]
    fn test_serialize_as_flat_map() {
        let record = PropertyRecord::builder()
            .numeric(NumericField::Bedrooms, 3.0)
            .flag(BinaryField::Elevator, true)
            .category(CategoricalField::Locality, "SUBA")
            .build();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["bedrooms"], 3.0);
        assert_eq!(json["elevator"], 1);
        assert_eq!(json["locality"], "SUBA");
        assert_eq!(json.as_object().unwrap().len(), 20);
    }
}
