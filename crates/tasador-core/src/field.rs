//! Field definitions for the property form.
//!
//! Every attribute a user can submit is one of three kinds:
//!
//! - [`NumericField`]: a bounded scalar with a [`NumericDomain`].
//! - [`BinaryField`]: a 0/1 amenity flag.
//! - [`CategoricalField`]: a choice from a closed list (see [`crate::catalog`]).
//!
//! Field names double as feature column names, so they must match the names
//! used when the model was trained.

use serde::{Deserialize, Serialize};

use crate::catalog;

/// Numeric property attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    /// Built area in square meters.
    Area,
    /// Number of bedrooms.
    Bedrooms,
    /// Number of bathrooms.
    Bathrooms,
    /// Monthly administration fee in COP.
    AdministrationFee,
    /// Floor the unit is on.
    Floor,
    /// Number of closets.
    Closets,
    /// Longitude in decimal degrees.
    Longitude,
    /// Latitude in decimal degrees.
    Latitude,
}

impl NumericField {
    /// All numeric fields, in record order.
    pub const ALL: [NumericField; 8] = [
        NumericField::Area,
        NumericField::Bedrooms,
        NumericField::Bathrooms,
        NumericField::AdministrationFee,
        NumericField::Floor,
        NumericField::Closets,
        NumericField::Longitude,
        NumericField::Latitude,
    ];

    /// Returns the column name of this field.
    pub fn name(self) -> &'static str {
        match self {
            NumericField::Area => "area",
            NumericField::Bedrooms => "bedrooms",
            NumericField::Bathrooms => "bathrooms",
            NumericField::AdministrationFee => "administration_fee",
            NumericField::Floor => "floor",
            NumericField::Closets => "closets",
            NumericField::Longitude => "longitude",
            NumericField::Latitude => "latitude",
        }
    }

    /// Returns the prompt label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            NumericField::Area => "Area (in square meters)",
            NumericField::Bedrooms => "Number of Bedrooms",
            NumericField::Bathrooms => "Number of Bathrooms",
            NumericField::AdministrationFee => "Administration Fee (in $COP)",
            NumericField::Floor => "Floor",
            NumericField::Closets => "Number of Closets",
            NumericField::Longitude => "Longitude",
            NumericField::Latitude => "Latitude",
        }
    }

    /// Returns the declared domain of this field.
    pub fn domain(self) -> NumericDomain {
        match self {
            NumericField::Area => NumericDomain::integral(10.0, Some(1000.0), 1.0),
            NumericField::Bedrooms | NumericField::Bathrooms => {
                NumericDomain::integral(1.0, Some(10.0), 1.0)
            }
            NumericField::AdministrationFee => NumericDomain::integral(0.0, None, 1000.0),
            NumericField::Floor => NumericDomain::integral(1.0, None, 1.0),
            NumericField::Closets => NumericDomain::integral(0.0, None, 1.0),
            NumericField::Longitude => NumericDomain::decimal(-180.0, 180.0, 0.001),
            NumericField::Latitude => NumericDomain::decimal(-90.0, 90.0, 0.001),
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// The declared domain of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericDomain {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound, `None` when unbounded.
    pub max: Option<f64>,
    /// Increment offered by interactive prompts.
    pub step: f64,
    /// Whether only whole numbers are accepted.
    pub integral: bool,
    /// Value pre-filled by the form.
    pub default: f64,
}

impl NumericDomain {
    fn integral(min: f64, max: Option<f64>, step: f64) -> Self {
        Self {
            min,
            max,
            step,
            integral: true,
            default: min,
        }
    }

    fn decimal(min: f64, max: f64, step: f64) -> Self {
        Self {
            min,
            max: Some(max),
            step,
            integral: false,
            default: 0.0,
        }
    }

    /// Returns the upper bound, `f64::INFINITY` when unbounded.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.max.unwrap_or(f64::INFINITY)
    }

    /// Returns true if `value` lies within `[min, max]`.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.upper()
    }

    /// Clamps `value` into the domain, rounding integral domains.
    pub fn clamp(&self, value: f64) -> f64 {
        let value = if self.integral { value.round() } else { value };
        value.clamp(self.min, self.upper())
    }
}

/// Binary amenity flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryField {
    /// Has a jacuzzi.
    Jacuzzi,
    /// Has a fireplace.
    Fireplace,
    /// Pets are allowed.
    PetsAllowed,
    /// Building has a gym.
    Gym,
    /// Building has an elevator.
    Elevator,
    /// Located in a gated community.
    GatedCommunity,
}

impl BinaryField {
    /// All binary fields, in record order.
    pub const ALL: [BinaryField; 6] = [
        BinaryField::Jacuzzi,
        BinaryField::Fireplace,
        BinaryField::PetsAllowed,
        BinaryField::Gym,
        BinaryField::Elevator,
        BinaryField::GatedCommunity,
    ];

    /// Returns the column name of this field.
    pub fn name(self) -> &'static str {
        match self {
            BinaryField::Jacuzzi => "jacuzzi",
            BinaryField::Fireplace => "fireplace",
            BinaryField::PetsAllowed => "pets_allowed",
            BinaryField::Gym => "gym",
            BinaryField::Elevator => "elevator",
            BinaryField::GatedCommunity => "gated_community",
        }
    }

    /// Returns the prompt label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            BinaryField::Jacuzzi => "Has Jacuzzi?",
            BinaryField::Fireplace => "Has Fireplace?",
            BinaryField::PetsAllowed => "Allows Pets?",
            BinaryField::Gym => "Has Gym?",
            BinaryField::Elevator => "Has Elevator?",
            BinaryField::GatedCommunity => "Gated Community?",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Categorical attributes with closed choice lists.
///
/// The declaration order is the order in which indicator columns are written
/// during alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    /// Real-estate sector.
    Sector,
    /// Age bracket of the building.
    AgeOfProperty,
    /// Administrative locality.
    Locality,
    /// Nearest TransMilenio station.
    NearestTmStation,
    /// Socioeconomic stratum (1-6).
    SocioeconomicLevel,
    /// Number of parking spaces (0-4).
    ParkingSpaces,
}

impl CategoricalField {
    /// All categorical fields, in alignment order.
    pub const ALL: [CategoricalField; 6] = [
        CategoricalField::Sector,
        CategoricalField::AgeOfProperty,
        CategoricalField::Locality,
        CategoricalField::NearestTmStation,
        CategoricalField::SocioeconomicLevel,
        CategoricalField::ParkingSpaces,
    ];

    /// Returns the column prefix of this field.
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Sector => "sector",
            CategoricalField::AgeOfProperty => "age_of_property",
            CategoricalField::Locality => "locality",
            CategoricalField::NearestTmStation => "nearest_tm_station",
            CategoricalField::SocioeconomicLevel => "socioeconomic_level",
            CategoricalField::ParkingSpaces => "parking_spaces",
        }
    }

    /// Returns the prompt label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            CategoricalField::Sector => "Sector",
            CategoricalField::AgeOfProperty => "Age of Property",
            CategoricalField::Locality => "Locality",
            CategoricalField::NearestTmStation => "Nearest TM Station",
            CategoricalField::SocioeconomicLevel => "Socioeconomic Level",
            CategoricalField::ParkingSpaces => "Number of Parking Spaces",
        }
    }

    /// Returns true for choice fields whose values are numbers.
    ///
    /// Ordinal fields also expose their numeric value under the bare field
    /// name during alignment.
    pub fn is_ordinal(self) -> bool {
        matches!(
            self,
            CategoricalField::SocioeconomicLevel | CategoricalField::ParkingSpaces
        )
    }

    /// Returns the closed list of choices for this field.
    pub fn choices(self) -> &'static [&'static str] {
        catalog::choices(self)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Any field of the property form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// A numeric field.
    Numeric(NumericField),
    /// A binary flag.
    Binary(BinaryField),
    /// A categorical field.
    Categorical(CategoricalField),
}

impl Field {
    /// Fields in the order the form presents them.
    pub const FORM_ORDER: [Field; 20] = [
        Field::Numeric(NumericField::Area),
        Field::Numeric(NumericField::Bedrooms),
        Field::Numeric(NumericField::Bathrooms),
        Field::Numeric(NumericField::AdministrationFee),
        Field::Categorical(CategoricalField::ParkingSpaces),
        Field::Categorical(CategoricalField::SocioeconomicLevel),
        Field::Categorical(CategoricalField::AgeOfProperty),
        Field::Numeric(NumericField::Longitude),
        Field::Numeric(NumericField::Latitude),
        Field::Binary(BinaryField::Jacuzzi),
        Field::Numeric(NumericField::Floor),
        Field::Numeric(NumericField::Closets),
        Field::Binary(BinaryField::Fireplace),
        Field::Binary(BinaryField::PetsAllowed),
        Field::Binary(BinaryField::Gym),
        Field::Binary(BinaryField::Elevator),
        Field::Binary(BinaryField::GatedCommunity),
        Field::Categorical(CategoricalField::Locality),
        Field::Categorical(CategoricalField::Sector),
        Field::Categorical(CategoricalField::NearestTmStation),
    ];

    /// Looks up a field by its column name.
    pub fn from_name(name: &str) -> Option<Field> {
        catalog::field_by_name(name)
    }

    /// Returns the column name of this field.
    pub fn name(self) -> &'static str {
        match self {
            Field::Numeric(f) => f.name(),
            Field::Binary(f) => f.name(),
            Field::Categorical(f) => f.name(),
        }
    }

    /// Returns the prompt label shown to users.
    pub fn label(self) -> &'static str {
        match self {
            Field::Numeric(f) => f.label(),
            Field::Binary(f) => f.label(),
            Field::Categorical(f) => f.label(),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
