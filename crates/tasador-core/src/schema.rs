//! Feature schema compilation.
//!
//! A [`FeatureSchema`] is the ordered list of columns a trained model expects.
//! Columns are either bare attribute names (`area`, `gym`, `parking_spaces`)
//! or one-hot indicators named `field<separator>value` (`sector=CHAPINERO`).
//!
//! The column list is compiled once into index tables so that alignment is a
//! lookup per attribute rather than a scan over column names:
//!
//! - pass-through attribute → column index
//! - `(categorical field, value)` → column index
//!
//! The schema is read-only after construction and is meant to be shared
//! (behind an `Arc`) for the lifetime of the process.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::field::{BinaryField, CategoricalField, NumericField};
use crate::record::PropertyRecord;

/// Separator used between field name and value when none is declared.
pub const DEFAULT_SEPARATOR: &str = "=";

/// Separator written by `pandas.get_dummies`.
pub const PANDAS_SEPARATOR: &str = "_";

/// An attribute copied into the feature vector under its bare name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Passthrough {
    /// A numeric attribute.
    Numeric(NumericField),
    /// A binary flag, fed as 0 or 1.
    Flag(BinaryField),
    /// The numeric value of an ordinal categorical field.
    Ordinal(CategoricalField),
}

impl Passthrough {
    /// Every pass-through attribute.
    pub fn all() -> impl Iterator<Item = Passthrough> {
        NumericField::ALL
            .into_iter()
            .map(Passthrough::Numeric)
            .chain(BinaryField::ALL.into_iter().map(Passthrough::Flag))
            .chain(
                CategoricalField::ALL
                    .into_iter()
                    .filter(|f| f.is_ordinal())
                    .map(Passthrough::Ordinal),
            )
    }

    /// Returns the column name of this attribute.
    pub fn name(self) -> &'static str {
        match self {
            Passthrough::Numeric(f) => f.name(),
            Passthrough::Flag(f) => f.name(),
            Passthrough::Ordinal(f) => f.name(),
        }
    }

    /// Reads the attribute from a record.
    ///
    /// Ordinal values that do not parse as numbers read as 0.
    pub fn value(self, record: &PropertyRecord) -> f64 {
        match self {
            Passthrough::Numeric(f) => record.numeric(f),
            Passthrough::Flag(f) => {
                if record.flag(f) {
                    1.0
                } else {
                    0.0
                }
            }
            Passthrough::Ordinal(f) => record.ordinal(f).unwrap_or(0.0),
        }
    }
}

/// How a schema column is fed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// Copied from a record attribute.
    Passthrough(Passthrough),
    /// One-hot indicator for `field == value`.
    Indicator {
        /// The categorical field.
        field: CategoricalField,
        /// The value this column indicates.
        value: String,
    },
    /// Matches no attribute; always 0.
    Unmapped,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaArtifact {
    Columns(Vec<String>),
    Document {
        #[serde(default)]
        version: Option<String>,
        #[serde(default = "default_separator")]
        separator: String,
        columns: Vec<String>,
    },
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

/// The ordered input columns of a trained model, compiled for lookup.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    version: Option<String>,
    separator: String,
    columns: Vec<String>,
    kinds: Vec<ColumnKind>,
    by_name: HashMap<String, usize>,
    passthrough: Vec<(Passthrough, usize)>,
    // Indexed by categorical field: value -> column position.
    indicators: Vec<HashMap<String, usize>>,
}

impl FeatureSchema {
    /// Compile a column list using the default `=` separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use tasador_core::field::CategoricalField;
    /// use tasador_core::schema::FeatureSchema;
    ///
    /// let schema = FeatureSchema::new(vec![
    ///     "area".to_string(),
    ///     "sector=CHAPINERO".to_string(),
    /// ])
    /// .unwrap();
    /// assert_eq!(schema.len(), 2);
    /// assert_eq!(schema.indicator_index(CategoricalField::Sector, "CHAPINERO"), Some(1));
    /// ```
    pub fn new(columns: Vec<String>) -> Result<Self> {
        Self::with_separator(columns, DEFAULT_SEPARATOR)
    }

    /// Compile a column list whose indicator names use `separator`.
    ///
    /// # Errors
    ///
    /// Fails on an empty column list, an empty separator, or duplicate
    /// column names.
    pub fn with_separator(columns: Vec<String>, separator: &str) -> Result<Self> {
        if columns.is_empty() {
            return Err(CoreError::invalid_schema("column list is empty"));
        }
        if separator.is_empty() {
            return Err(CoreError::invalid_schema("separator is empty"));
        }

        let mut by_name = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if by_name.insert(name.clone(), idx).is_some() {
                return Err(CoreError::invalid_schema(format!(
                    "duplicate column '{name}'"
                )));
            }
        }

        let passthrough: Vec<(Passthrough, usize)> = Passthrough::all()
            .filter_map(|p| by_name.get(p.name()).map(|&idx| (p, idx)))
            .collect();

        let mut kinds = vec![ColumnKind::Unmapped; columns.len()];
        for &(p, idx) in &passthrough {
            kinds[idx] = ColumnKind::Passthrough(p);
        }

        let mut indicators = vec![HashMap::new(); CategoricalField::ALL.len()];
        for (idx, name) in columns.iter().enumerate() {
            for field in CategoricalField::ALL {
                let Some(value) = name
                    .strip_prefix(field.name())
                    .and_then(|rest| rest.strip_prefix(separator))
                else {
                    continue;
                };
                indicators[field.index()].insert(value.to_string(), idx);
                if kinds[idx] == ColumnKind::Unmapped {
                    kinds[idx] = ColumnKind::Indicator {
                        field,
                        value: value.to_string(),
                    };
                }
            }
        }

        let unmapped: Vec<&str> = columns
            .iter()
            .zip(&kinds)
            .filter(|(_, k)| **k == ColumnKind::Unmapped)
            .map(|(c, _)| c.as_str())
            .collect();
        if !unmapped.is_empty() {
            warn!(
                "{} schema column(s) match no attribute and will always be 0: {:?}",
                unmapped.len(),
                unmapped
            );
        }
        debug!(
            "Compiled feature schema: {} columns, {} pass-through, {} indicators",
            columns.len(),
            passthrough.len(),
            indicators.iter().map(HashMap::len).sum::<usize>()
        );

        Ok(Self {
            version: None,
            separator: separator.to_string(),
            columns,
            kinds,
            by_name,
            passthrough,
            indicators,
        })
    }

    /// Parse a schema artifact.
    ///
    /// Accepts either a bare JSON array of column names or an object
    /// `{"version": ..., "separator": ..., "columns": [...]}`. A bare array
    /// uses `=` unless it has no `=` indicators but does have `field_value`
    /// ones, in which case `_` is used.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let artifact: SchemaArtifact = serde_json::from_str(text)
            .map_err(|e| CoreError::invalid_schema(format!("malformed schema artifact: {e}")))?;
        match artifact {
            SchemaArtifact::Columns(columns) => {
                let separator = detect_separator(&columns);
                if separator != DEFAULT_SEPARATOR {
                    debug!("Bare column list uses {separator:?} indicators");
                }
                Self::with_separator(columns, separator)
            }
            SchemaArtifact::Document {
                version,
                separator,
                columns,
            } => Ok(Self::with_separator(columns, &separator)?.with_version(version)),
        }
    }

    /// Attach a version label.
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Returns the version label of the artifact, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the indicator separator.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Returns the number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns how each column is fed, in column order.
    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    /// Returns the position of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Returns the pass-through attributes and their column positions.
    pub fn passthrough(&self) -> &[(Passthrough, usize)] {
        &self.passthrough
    }

    /// Returns the position of the `field == value` indicator column.
    pub fn indicator_index(&self, field: CategoricalField, value: &str) -> Option<usize> {
        self.indicators[field.index()].get(value).copied()
    }

    /// Returns true if the schema has at least one indicator column for `field`.
    pub fn has_indicators(&self, field: CategoricalField) -> bool {
        !self.indicators[field.index()].is_empty()
    }

    /// Returns the indicator column name for `field == value`.
    pub fn indicator_name(&self, field: CategoricalField, value: &str) -> String {
        format!("{}{}{}", field.name(), self.separator, value)
    }

    /// Compare the schema against the choice catalog.
    pub fn coverage(&self) -> SchemaCoverage {
        let mut fields = BTreeMap::new();
        for field in CategoricalField::ALL {
            let known = &self.indicators[field.index()];
            let missing = field
                .choices()
                .iter()
                .filter(|c| !known.contains_key(**c))
                .map(|c| (*c).to_string())
                .collect();
            let choices: HashSet<&str> = field.choices().iter().copied().collect();
            let mut extra: Vec<String> = known
                .keys()
                .filter(|v| !choices.contains(v.as_str()))
                .cloned()
                .collect();
            extra.sort();
            fields.insert(
                field,
                FieldCoverage {
                    indicator_columns: known.len(),
                    passthrough: self
                        .passthrough
                        .iter()
                        .any(|(p, _)| *p == Passthrough::Ordinal(field)),
                    missing_choices: missing,
                    extra_values: extra,
                },
            );
        }
        SchemaCoverage {
            columns: self.len(),
            passthrough_columns: self.passthrough.len(),
            unmapped_columns: self
                .columns
                .iter()
                .zip(&self.kinds)
                .filter(|(_, k)| **k == ColumnKind::Unmapped)
                .map(|(c, _)| c.clone())
                .collect(),
            fields,
        }
    }
}

fn detect_separator(columns: &[String]) -> &'static str {
    let has_indicators = |separator: &str| {
        columns.iter().any(|column| {
            CategoricalField::ALL.into_iter().any(|field| {
                column
                    .strip_prefix(field.name())
                    .is_some_and(|rest| rest.starts_with(separator))
            })
        })
    };
    if !has_indicators(DEFAULT_SEPARATOR) && has_indicators(PANDAS_SEPARATOR) {
        PANDAS_SEPARATOR
    } else {
        DEFAULT_SEPARATOR
    }
}

/// How well a schema covers the choice catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCoverage {
    /// Total number of columns.
    pub columns: usize,
    /// Number of pass-through columns.
    pub passthrough_columns: usize,
    /// Columns that match no attribute.
    pub unmapped_columns: Vec<String>,
    /// Per categorical field coverage.
    pub fields: BTreeMap<CategoricalField, FieldCoverage>,
}

/// Coverage of one categorical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCoverage {
    /// Number of indicator columns for this field.
    pub indicator_columns: usize,
    /// Whether the field is also fed as a bare number.
    pub passthrough: bool,
    /// Catalog choices without an indicator column.
    ///
    /// Only meaningful when `indicator_columns > 0`: these values align to all
    /// zeros.
    pub missing_choices: Vec<String>,
    /// Indicator values the catalog does not offer.
    pub extra_values: Vec<String>,
}
