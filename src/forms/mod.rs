//! Multi-step lead forms: field rules, step gating, the wizard controller and
//! the interactive runner, plus the concrete quote and job application flows.

pub mod application;
pub mod engine;
pub mod quote;
pub mod schema;
pub mod validation;
pub mod wizard;

use std::collections::BTreeMap;

use crate::errors::WizardError;

pub use application::{ApplicationWizard, JobApplication};
pub use engine::{
    ConfirmationResponse, FormEngine, FormInteraction, FormResult, FormSummary, Notice,
    PromptContext, PromptResponse,
};
pub use quote::{FacilityType, QuoteRequest, QuoteWizard};
pub use schema::{FormDescriptor, StepDefinition};
pub use validation::{ChoiceSet, FieldDescriptor, FieldKind, ValidationError, Validator};
pub use wizard::{FormFlow, StepAdvance, WizardController};

/// Normalized value of a field the full schema already required.
pub(crate) fn field_value<'a>(
    form: &'static str,
    values: &'a BTreeMap<&'static str, String>,
    key: &str,
) -> Result<&'a str, WizardError> {
    values
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| WizardError::Payload {
            form,
            reason: format!("missing `{key}`"),
        })
}

/// Normalized value of an optional field; blank counts as absent.
pub(crate) fn optional_value<'a>(
    values: &'a BTreeMap<&'static str, String>,
    key: &str,
) -> Option<&'a str> {
    values
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}
