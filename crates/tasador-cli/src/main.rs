//! Tasador CLI - property price estimates from the command line.

use clap::Parser;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tasador_cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing subscriber with environment filter
    let filter = match cli.log_directive().parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    debug!("Tasador CLI starting...");

    match cli.run() {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
