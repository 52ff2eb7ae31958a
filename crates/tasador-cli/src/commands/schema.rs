//! Schema Command Implementation
//!
//! Audits a model's feature schema against the form catalog: which columns
//! feed which attribute, which columns match nothing, and which catalog
//! choices would align to all zeros.

use anyhow::Result;
use clap::Args;
use std::fmt::Write as _;
use tasador_core::SchemaCoverage;

use super::ModelArgs;
use crate::Outcome;

/// Audit the feature schema of a model
///
/// # Example
///
/// ```bash
/// tasador schema --model-dir /models/bogota
/// ```
#[derive(Args, Debug, Clone)]
pub struct SchemaCommand {
    #[command(flatten)]
    pub model: ModelArgs,

    /// List every uncovered choice instead of a count
    #[arg(long)]
    pub full: bool,
}

impl SchemaCommand {
    /// Execute the schema command
    pub fn run(&self) -> Result<Outcome> {
        let session = self.model.load(false)?;
        let model = &session.model;

        println!("Model:     {} ({})", model.version, model.kind());
        if !model.metadata.name.is_empty() {
            println!("Name:      {}", model.metadata.name);
        }
        if let Some(trained_at) = &model.metadata.trained_at {
            println!("Trained:   {trained_at}");
        }
        println!("Separator: {:?}", model.schema.separator());
        print!("{}", render_coverage(&model.schema.coverage(), self.full));
        Ok(Outcome::Success)
    }
}

/// Render a coverage report.
pub fn render_coverage(coverage: &SchemaCoverage, full: bool) -> String {
    let mut out = String::new();
    let indicators: usize = coverage.fields.values().map(|f| f.indicator_columns).sum();
    let _ = writeln!(
        out,
        "Columns:   {} ({} pass-through, {} indicator, {} unmapped)",
        coverage.columns,
        coverage.passthrough_columns,
        indicators,
        coverage.unmapped_columns.len()
    );
    for column in &coverage.unmapped_columns {
        let _ = writeln!(out, "  unmapped: {column}");
    }

    for (field, fc) in &coverage.fields {
        let mode = match (fc.indicator_columns > 0, fc.passthrough) {
            (true, true) => "indicators + number",
            (true, false) => "indicators",
            (false, true) => "number",
            (false, false) => "not used",
        };
        let _ = writeln!(
            out,
            "{:<20} {:<20} {:>4} columns",
            field.name(),
            mode,
            fc.indicator_columns
        );
        if fc.indicator_columns == 0 {
            continue;
        }
        if !fc.missing_choices.is_empty() {
            if full {
                for choice in &fc.missing_choices {
                    let _ = writeln!(out, "  no column for: {choice}");
                }
            } else {
                let _ = writeln!(
                    out,
                    "  {} choices have no column (use --full to list)",
                    fc.missing_choices.len()
                );
            }
        }
        for value in &fc.extra_values {
            let _ = writeln!(out, "  not in catalog: {value}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasador_core::FeatureSchema;

    #[test]
    fn test_render_coverage() {
        let schema = FeatureSchema::new(vec![
            "area".to_string(),
            "sector=CHAPINERO".to_string(),
            "sector=ATLANTIS".to_string(),
            "mystery".to_string(),
        ])
        .unwrap();
        let report = render_coverage(&schema.coverage(), false);

        assert!(report.starts_with("Columns:   4 (1 pass-through, 2 indicator, 1 unmapped)\n"));
        assert!(report.contains("  unmapped: mystery\n"));
        assert!(report.contains("92 choices have no column"));
        assert!(report.contains("  not in catalog: ATLANTIS\n"));

        let full = render_coverage(&schema.coverage(), true);
        assert!(full.contains("  no column for: CHICO\n"));
    }
}
