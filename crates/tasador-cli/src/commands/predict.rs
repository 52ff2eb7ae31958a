//! Predict Command Implementation
//!
//! Estimates the price of one property described by a JSON file, `--set`
//! assignments, or both.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tasador_core::{Collector, FormValues};
use tracing::{debug, error, info};

use super::{ModelArgs, Session};
use crate::Outcome;

/// Rendering of the estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Two human-readable lines
    #[default]
    Text,
    /// A JSON document
    Json,
}

/// Estimate the price of a single property
///
/// # Example
///
/// ```bash
/// tasador predict \
///     --model-dir /models/bogota \
///     --input apartment.json \
///     --set area=95 --set sector=CHICO
/// ```
#[derive(Args, Debug, Clone)]
pub struct PredictCommand {
    #[command(flatten)]
    pub model: ModelArgs,

    /// JSON object of field values
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Field assignment `name=value`; applied after --input
    #[arg(long = "set", short = 's', value_name = "FIELD=VALUE")]
    pub assignments: Vec<String>,

    /// Fill fields without a value from the form defaults
    #[arg(long)]
    pub defaults: bool,

    /// Clamp out-of-range numbers instead of rejecting them
    #[arg(long)]
    pub clamp: bool,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

impl PredictCommand {
    /// Gather the field values from the input file and assignments.
    pub fn form_values(&self) -> Result<FormValues> {
        let mut values = match &self.input {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read input {path:?}"))?;
                FormValues::from_json_str(&text)
                    .with_context(|| format!("Invalid input {path:?}"))?
            }
            None => FormValues::new(),
        };
        for assignment in &self.assignments {
            values.assign(assignment)?;
        }
        debug!("Collected {} explicit field values", values.len());
        Ok(values.with_defaults(self.defaults))
    }

    /// Execute the predict command
    pub fn run(&self) -> Result<Outcome> {
        let values = self.form_values()?;
        let Session {
            config,
            predictor,
            presenter,
            ..
        } = self.model.load(self.clamp)?;

        let outcome = Collector::new(values, config.range_policy)
            .collect()
            .map_err(tasador_serving::ServingError::from)
            .and_then(|record| predictor.estimate(&record));

        match outcome {
            Ok(estimate) => {
                info!("Estimated {:.2}", estimate.result.point_estimate);
                match self.output {
                    OutputFormat::Text => println!("{}", presenter.render_text(&estimate.result)),
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::to_string_pretty(&presenter.render_json(&estimate))?
                    ),
                }
                Ok(Outcome::Success)
            }
            Err(err) => {
                if err.is_client_error() {
                    debug!("Input rejected: {err}");
                } else {
                    error!("Model {} failed: {err}", predictor.version());
                }
                match self.output {
                    OutputFormat::Text => eprintln!("{}", presenter.render_error(&err)),
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::json!({ "error": presenter.render_error(&err) })
                    ),
                }
                Ok(Outcome::Failure)
            }
        }
    }
}
