use std::fmt;

use thiserror::Error;

/// A single field that failed its rule, carried back to the caller so the
/// message can be rendered next to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub key: &'static str,
    pub label: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

/// Failures raised while driving a wizard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Step {step} is incomplete: {} field(s) need attention", .errors.len())]
    StepIncomplete { step: usize, errors: Vec<FieldError> },
    #[error("The form has {} invalid field(s)", .errors.len())]
    FormInvalid { errors: Vec<FieldError> },
    #[error("Unknown field `{0}`")]
    UnknownField(String),
    #[error("Unknown step {0}")]
    UnknownStep(usize),
    #[error("Submission is only available from the final step")]
    NotOnFinalStep,
    #[error("A submission is already in progress")]
    AlreadySubmitting,
    #[error("Invalid form descriptor `{form}`: {reason}")]
    InvalidDescriptor { form: &'static str, reason: String },
    #[error("Could not build the `{form}` payload: {reason}")]
    Payload { form: &'static str, reason: String },
}

impl WizardError {
    /// Field errors carried by this failure, if any.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            WizardError::StepIncomplete { errors, .. } | WizardError::FormInvalid { errors } => {
                errors
            }
            _ => &[],
        }
    }
}

/// Reasons a submission did not go through. These stay in logs; callers only
/// ever show the generic fallback message.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("submission rejected by spam trap")]
    SpamDetected,
    #[error("could not encode payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint returned HTTP {status}")]
    Status { status: u16 },
    #[error("endpoint reported failure: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Configuration loading and persistence failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unknown configuration key `{0}`")]
    UnknownKey(String),
    #[error("Invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_incomplete_reports_count() {
        let err = WizardError::StepIncomplete {
            step: 1,
            errors: vec![FieldError {
                key: "full_name",
                label: "Full name",
                message: "Name is required".into(),
            }],
        };
        assert_eq!(
            err.to_string(),
            "Step 1 is incomplete: 1 field(s) need attention"
        );
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].to_string(), "Full name: Name is required");
    }

    #[test]
    fn rejected_without_reason_has_placeholder() {
        let err = SubmissionError::Rejected(None);
        assert_eq!(err.to_string(), "endpoint reported failure: no reason given");
    }
}
