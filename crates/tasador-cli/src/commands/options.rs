//! Options Command Implementation
//!
//! Lists the form fields with their domains, or the choices of one field.

use anyhow::{bail, Result};
use clap::Args;
use std::fmt::Write as _;
use tasador_core::Field;

use crate::Outcome;

/// List form fields and their allowed values
///
/// # Example
///
/// ```bash
/// tasador options
/// tasador options nearest_tm_station
/// ```
#[derive(Args, Debug, Clone)]
pub struct OptionsCommand {
    /// Field to describe; all fields when omitted
    pub field: Option<String>,
}

impl OptionsCommand {
    /// Execute the options command
    pub fn run(&self) -> Result<Outcome> {
        match &self.field {
            None => print!("{}", render_fields()),
            Some(name) => {
                let Some(field) = Field::from_name(name) else {
                    bail!("Unknown field '{name}'; run `tasador options` for the list");
                };
                print!("{}", render_field(field));
            }
        }
        Ok(Outcome::Success)
    }
}

fn summary(field: Field) -> String {
    match field {
        Field::Numeric(f) => {
            let d = f.domain();
            let max = d.max.map_or_else(|| "∞".to_string(), |m| m.to_string());
            let kind = if d.integral { "integer" } else { "decimal" };
            format!("{kind} {} to {max}, default {}", d.min, d.default)
        }
        Field::Binary(_) => "yes/no".to_string(),
        Field::Categorical(f) => format!("one of {} choices", f.choices().len()),
    }
}

/// Render the table of all fields in form order.
pub fn render_fields() -> String {
    let mut out = String::new();
    for field in Field::FORM_ORDER {
        let _ = writeln!(
            out,
            "{:<22} {:<28} {}",
            field.name(),
            field.label(),
            summary(field)
        );
    }
    out
}

/// Render one field, with every choice for categorical fields.
pub fn render_field(field: Field) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({}): {}", field.name(), field.label(), summary(field));
    if let Field::Categorical(f) = field {
        for choice in f.choices() {
            let _ = writeln!(out, "  {choice}");
        }
    }
    out
}
