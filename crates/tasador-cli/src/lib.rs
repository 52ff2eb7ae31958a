//! Tasador CLI Library
//!
//! This crate provides the command-line interface for the Bogotá property
//! price estimator:
//!
//! - **Predict**: one-shot estimate from a JSON file and/or `--set` flags
//! - **Form**: interactive property form
//! - **Schema**: audit a model's feature schema against the form catalog
//! - **Options**: list fields, domains and choices
//!
//! # Example
//!
//! ```bash
//! # Estimate one apartment
//! tasador predict --model-dir /models/bogota --input apartment.json
//!
//! # Same, from flags, falling back to form defaults
//! tasador predict -d /models/bogota --defaults --set area=80 --set sector=CHAPINERO
//!
//! # Interactive form
//! tasador form --model-dir /models/bogota
//! ```

pub mod commands;

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;

pub use commands::{
    FormCommand, ModelArgs, OptionsCommand, OutputFormat, PredictCommand, SchemaCommand,
};

/// Tasador - property price estimates for Bogotá
///
/// Collects a property description, aligns it to the feature schema of a
/// trained model and prints the predicted price with a ±10% band.
#[derive(Parser, Debug)]
#[command(name = "tasador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate the price of one property
    Predict(PredictCommand),

    /// Fill in the property form interactively
    Form(FormCommand),

    /// Audit the feature schema of a model
    Schema(SchemaCommand),

    /// List form fields and their allowed values
    Options(OptionsCommand),
}

impl Cli {
    /// Default log directive for the configured verbosity.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "tasador=info",
            1 => "tasador=debug",
            _ => "tasador=trace",
        }
    }

    /// Dispatch to the selected subcommand.
    pub fn run(&self) -> CliResult<Outcome> {
        match &self.command {
            Commands::Predict(cmd) => cmd.run(),
            Commands::Form(cmd) => cmd.run(),
            Commands::Schema(cmd) => cmd.run(),
            Commands::Options(cmd) => cmd.run(),
        }
    }
}

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command did what was asked
    Success,
    /// The command ran but reported a failure to the user
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Result type alias for CLI operations
pub type CliResult<T> = anyhow::Result<T>;
