//! Form Command Implementation
//!
//! Interactive terminal form. Each field is prompted in form order; after
//! every estimate the user may start over with the previous answers
//! pre-filled.

use anyhow::Result;
use clap::Args;
use inquire::validator::Validation;
use inquire::{Confirm, CustomType, InquireError, Select};
use tasador_core::collector::{check_choice, check_number};
use tasador_core::{
    BinaryField, CategoricalField, Collector, CoreError, FieldSource, NumericDomain, NumericField,
    PropertyRecord, RangePolicy,
};
use tasador_serving::ServingError;
use tracing::{debug, info};

use super::{ModelArgs, Session};
use crate::Outcome;

/// Fill in the property form interactively
///
/// # Example
///
/// ```bash
/// tasador form --model-dir /models/bogota
/// ```
#[derive(Args, Debug, Clone)]
pub struct FormCommand {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Clamp out-of-range numbers instead of re-prompting
    #[arg(long)]
    pub clamp: bool,
}

impl FormCommand {
    /// Execute the form command
    pub fn run(&self) -> Result<Outcome> {
        let Session {
            config,
            predictor,
            presenter,
            ..
        } = self.model.load(self.clamp)?;
        println!("Bogota property price estimator (model {})", predictor.version());

        let mut previous: Option<PropertyRecord> = None;
        loop {
            let mut collector = Collector::new(
                InquireSource::new(config.range_policy, previous.take()),
                config.range_policy,
            );
            let collected = collector.collect();
            if collector.into_source().cancelled {
                info!("Form cancelled");
                return Ok(Outcome::Success);
            }

            match collected
                .map_err(ServingError::from)
                .and_then(|record| predictor.estimate(&record).map(|e| (record, e)))
            {
                Ok((record, estimate)) => {
                    println!("\n{}\n", presenter.render_text(&estimate.result));
                    for unseen in &estimate.unseen {
                        println!(
                            "Note: the model has no data for {} '{}'",
                            unseen.field.label(),
                            unseen.value
                        );
                    }
                    previous = Some(record);
                }
                Err(err) => println!("\n{}\n", presenter.render_error(&err)),
            }

            match Confirm::new("Estimate another property?")
                .with_default(true)
                .prompt()
            {
                Ok(true) => continue,
                Ok(false) | Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(Outcome::Success)
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Prompts for each field with `inquire`.
struct InquireSource {
    policy: RangePolicy,
    previous: Option<PropertyRecord>,
    cancelled: bool,
}

impl InquireSource {
    fn new(policy: RangePolicy, previous: Option<PropertyRecord>) -> Self {
        Self {
            policy,
            previous,
            cancelled: false,
        }
    }

    fn answer<T>(&mut self, result: Result<T, InquireError>) -> tasador_core::Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                self.cancelled = true;
                Err(CoreError::source("form cancelled"))
            }
            Err(err) => Err(CoreError::source(err.to_string())),
        }
    }
}

fn range_hint(field: NumericField, domain: &NumericDomain) -> String {
    let unit = if field == NumericField::AdministrationFee {
        " (COP)"
    } else {
        ""
    };
    match domain.max {
        Some(max) => format!("{} to {}{unit}, step {}", domain.min, max, domain.step),
        None => format!("at least {}{unit}, step {}", domain.min, domain.step),
    }
}

impl FieldSource for InquireSource {
    fn number(
        &mut self,
        field: NumericField,
        domain: &NumericDomain,
    ) -> tasador_core::Result<Option<f64>> {
        let default = self
            .previous
            .as_ref()
            .map_or(domain.default, |r| r.numeric(field));
        let help = range_hint(field, domain);

        let mut prompt = CustomType::<f64>::new(field.label())
            .with_default(default)
            .with_help_message(&help)
            .with_error_message("Please type a number");
        if self.policy == RangePolicy::Reject {
            let domain = *domain;
            prompt = prompt.with_validator(move |value: &f64| {
                match check_number(field, &domain, *value, RangePolicy::Reject) {
                    Ok(_) => Ok(Validation::Valid),
                    Err(err) => Ok(Validation::Invalid(err.to_string().into())),
                }
            });
        }
        let result = prompt.prompt();
        self.answer(result)
    }

    fn flag(&mut self, field: BinaryField) -> tasador_core::Result<Option<bool>> {
        let default = self.previous.as_ref().is_some_and(|r| r.flag(field));
        let result = Confirm::new(field.label()).with_default(default).prompt();
        self.answer(result)
    }

    fn choice(
        &mut self,
        field: CategoricalField,
        choices: &'static [&'static str],
    ) -> tasador_core::Result<Option<String>> {
        let cursor = self
            .previous
            .as_ref()
            .and_then(|r| check_choice(field, r.category(field)).ok())
            .and_then(|prev| choices.iter().position(|c| *c == prev))
            .unwrap_or(0);
        debug!("Prompting {} with {} choices", field.name(), choices.len());

        let result = Select::new(field.label(), choices.to_vec())
            .with_starting_cursor(cursor)
            .with_page_size(10)
            .with_help_message("type to filter, enter to select")
            .prompt();
        Ok(self.answer(result)?.map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_hint() {
        let area = NumericField::Area;
        assert_eq!(range_hint(area, &area.domain()), "10 to 1000, step 1");

        let fee = NumericField::AdministrationFee;
        assert_eq!(
            range_hint(fee, &fee.domain()),
            "at least 0 (COP), step 1000"
        );
    }

    #[test]
    fn test_cancellation_is_recorded() {
        let mut source = InquireSource::new(RangePolicy::Reject, None);
        let result: tasador_core::Result<Option<f64>> =
            source.answer(Err(InquireError::OperationCanceled));
        assert!(result.is_err());
        assert!(source.cancelled);
    }
}
