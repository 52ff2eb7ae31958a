//! Input collection for property records.
//!
//! The [`Collector`] pulls every form field from a [`FieldSource`] and checks
//! it against the field's declared domain before assembling an immutable
//! [`PropertyRecord`]. Two sources are provided by the workspace:
//!
//! - [`FormValues`]: a field-name to value map, filled from JSON or from
//!   `field=value` assignments.
//! - the interactive terminal form in `tasador-cli`.
//!
//! # Example
//!
//! ```
//! use tasador_core::collector::{Collector, FormValues, RangePolicy};
//! use tasador_core::field::NumericField;
//!
//! let mut values = FormValues::new().with_defaults(true);
//! values.assign("area=80").unwrap();
//! values.assign("sector=CHAPINERO").unwrap();
//!
//! let record = Collector::new(values, RangePolicy::Reject).collect().unwrap();
//! assert_eq!(record.numeric(NumericField::Area), 80.0);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog;
use crate::error::{CoreError, Result};
use crate::field::{BinaryField, CategoricalField, Field, NumericDomain, NumericField};
use crate::record::PropertyRecord;

/// How numeric values outside their domain are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Out-of-range or fractional values are errors.
    #[default]
    Reject,
    /// Values are clamped into range and integral fields are rounded.
    Clamp,
}

/// A supplier of raw field values.
///
/// Each method returns `Ok(None)` when the source has no value for the field.
pub trait FieldSource {
    /// Supply a numeric value.
    fn number(&mut self, field: NumericField, domain: &NumericDomain) -> Result<Option<f64>>;

    /// Supply a binary flag.
    fn flag(&mut self, field: BinaryField) -> Result<Option<bool>>;

    /// Supply a categorical value chosen from `choices`.
    fn choice(
        &mut self,
        field: CategoricalField,
        choices: &'static [&'static str],
    ) -> Result<Option<String>>;
}

/// Collects one validated [`PropertyRecord`] from a [`FieldSource`].
#[derive(Debug)]
pub struct Collector<S> {
    source: S,
    policy: RangePolicy,
}

impl<S: FieldSource> Collector<S> {
    /// Create a collector over `source`.
    pub fn new(source: S, policy: RangePolicy) -> Self {
        Self { source, policy }
    }

    /// Returns the range policy in effect.
    pub fn policy(&self) -> RangePolicy {
        self.policy
    }

    /// Consume the collector and return its source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Gather every field, in form order, into a record.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure: a missing field, a number outside
    /// its domain (under [`RangePolicy::Reject`]), or a choice outside the
    /// catalog.
    pub fn collect(&mut self) -> Result<PropertyRecord> {
        let mut builder = PropertyRecord::builder();
        for field in Field::FORM_ORDER {
            builder = match field {
                Field::Numeric(f) => {
                    let domain = f.domain();
                    let raw = self.source.number(f, &domain)?.ok_or_else(|| missing(field))?;
                    builder.numeric(f, check_number(f, &domain, raw, self.policy)?)
                }
                Field::Binary(f) => {
                    let raw = self.source.flag(f)?.ok_or_else(|| missing(field))?;
                    builder.flag(f, raw)
                }
                Field::Categorical(f) => {
                    let raw = self
                        .source
                        .choice(f, f.choices())?
                        .ok_or_else(|| missing(field))?;
                    builder.category(f, check_choice(f, &raw)?)
                }
            };
        }
        debug!("Collected property record ({:?} range policy)", self.policy);
        Ok(builder.build())
    }
}

fn missing(field: Field) -> CoreError {
    CoreError::MissingField {
        field: field.name().to_string(),
    }
}

/// Validate a numeric value against its domain.
pub fn check_number(
    field: NumericField,
    domain: &NumericDomain,
    value: f64,
    policy: RangePolicy,
) -> Result<f64> {
    if !value.is_finite() {
        return Err(CoreError::NotFinite {
            field: field.name().to_string(),
        });
    }
    match policy {
        RangePolicy::Clamp => Ok(domain.clamp(value)),
        RangePolicy::Reject => {
            if !domain.contains(value) {
                return Err(CoreError::OutOfRange {
                    field: field.name().to_string(),
                    value,
                    min: domain.min,
                    max: domain.upper(),
                });
            }
            if domain.integral && value.fract() != 0.0 {
                return Err(CoreError::NotIntegral {
                    field: field.name().to_string(),
                    value,
                });
            }
            Ok(value)
        }
    }
}

/// Validate a categorical value against the catalog.
///
/// Ordinal fields accept any spelling of a whole number (`"4"`, `"4.0"`).
pub fn check_choice(field: CategoricalField, value: &str) -> Result<&'static str> {
    let trimmed = value.trim();
    if let Some(choice) = catalog::canonical(field, trimmed) {
        return Ok(choice);
    }
    if field.is_ordinal() {
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.fract() == 0.0 {
                if let Some(choice) = catalog::canonical(field, &format!("{}", n as i64)) {
                    return Ok(choice);
                }
            }
        }
    }
    Err(CoreError::UnknownChoice {
        field: field.name().to_string(),
        value: value.to_string(),
    })
}

/// A field-name keyed map of raw values.
///
/// Values may come from a JSON object or from `field=value` assignments.
/// When defaults are enabled, fields without a value fall back to the form
/// defaults instead of being reported missing.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    values: Map<String, Value>,
    use_defaults: bool,
}

impl FormValues {
    /// Create an empty value map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a value map from a JSON object.
    ///
    /// # Errors
    ///
    /// Fails if `value` is not an object or names a field the form does not have.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(values) = value else {
            return Err(CoreError::source("expected a JSON object of field values"));
        };
        if let Some(unknown) = values.keys().find(|k| Field::from_name(k).is_none()) {
            return Err(CoreError::UnknownField {
                field: unknown.clone(),
            });
        }
        Ok(Self {
            values,
            use_defaults: false,
        })
    }

    /// Parse a value map from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| CoreError::source(format!("invalid JSON input: {e}")))?;
        Self::from_json(value)
    }

    /// Enable or disable the fallback to form defaults.
    pub fn with_defaults(mut self, enabled: bool) -> Self {
        self.use_defaults = enabled;
        self
    }

    /// Set a single field from its textual form.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<()> {
        let field = Field::from_name(name).ok_or_else(|| CoreError::UnknownField {
            field: name.to_string(),
        })?;
        let value = match field {
            Field::Numeric(_) => {
                let n: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| CoreError::invalid_value(name, format!("'{raw}' is not a number")))?;
                serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or(CoreError::NotFinite {
                        field: name.to_string(),
                    })?
            }
            Field::Binary(f) => Value::Bool(parse_flag(f, raw)?),
            Field::Categorical(_) => Value::String(raw.to_string()),
        };
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Apply a `field=value` assignment.
    pub fn assign(&mut self, assignment: &str) -> Result<()> {
        let (name, raw) = assignment.split_once('=').ok_or_else(|| {
            CoreError::source(format!("expected field=value, got '{assignment}'"))
        })?;
        self.set(name.trim(), raw)
    }

    /// Returns the number of explicitly supplied fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no field has been supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_flag(field: BinaryField, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(CoreError::invalid_value(
            field.name(),
            format!("'{other}' is not 0/1"),
        )),
    }
}

impl FieldSource for FormValues {
    fn number(&mut self, field: NumericField, domain: &NumericDomain) -> Result<Option<f64>> {
        match self.values.get(field.name()) {
            None => Ok(self.use_defaults.then_some(domain.default)),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| {
                CoreError::invalid_value(field.name(), format!("'{s}' is not a number"))
            }),
            Some(other) => Err(CoreError::invalid_value(
                field.name(),
                format!("expected a number, got {other}"),
            )),
        }
    }

    fn flag(&mut self, field: BinaryField) -> Result<Option<bool>> {
        match self.values.get(field.name()) {
            None => Ok(self.use_defaults.then_some(false)),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v == 0.0 => Ok(Some(false)),
                Some(v) if v == 1.0 => Ok(Some(true)),
                _ => Err(CoreError::invalid_value(field.name(), format!("{n} is not 0/1"))),
            },
            Some(Value::String(s)) => parse_flag(field, s).map(Some),
            Some(other) => Err(CoreError::invalid_value(
                field.name(),
                format!("expected 0/1, got {other}"),
            )),
        }
    }

    fn choice(
        &mut self,
        field: CategoricalField,
        choices: &'static [&'static str],
    ) -> Result<Option<String>> {
        match self.values.get(field.name()) {
            None if self.use_defaults => Ok(choices.first().map(|c| (*c).to_string())),
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(CoreError::invalid_value(
                field.name(),
                format!("expected a choice, got {other}"),
            )),
        }
    }
}
