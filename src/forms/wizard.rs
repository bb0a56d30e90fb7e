//! Step-by-step controller shared by every wizard.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::{FieldError, SubmissionError, WizardError};
use crate::estimate::EstimateBand;
use crate::forms::schema::FormDescriptor;
use crate::submission::{
    SubmissionHandler, SubmissionReceipt, SubmissionStatus, SubmissionTransport,
};

/// High-level form contract for concrete wizards.
///
/// Implementations describe their fields and steps, optionally pre-populate
/// values, and turn the validated values into the payload sent to the
/// endpoint.
pub trait FormFlow {
    type Output: Serialize;

    /// Descriptor controlling fields, rules and step layout.
    fn descriptor(&self) -> &FormDescriptor;

    /// Values present when the wizard opens.
    fn defaults(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Builds the payload from values that already passed the full schema.
    fn commit(&self, values: &BTreeMap<&'static str, String>) -> Result<Self::Output, WizardError>;

    /// Live advisory estimate derived from the current raw values.
    fn estimate(&self, _values: &BTreeMap<String, String>) -> Option<EstimateBand> {
        None
    }
}

/// Result of a successful `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAdvance {
    Moved(usize),
    ReadyToSubmit,
}

/// Owns the values of one wizard session. Values change only through
/// [`WizardController::set_value`] and step transitions.
pub struct WizardController<F: FormFlow> {
    flow: F,
    values: BTreeMap<String, String>,
    errors: BTreeMap<&'static str, String>,
    step: usize,
    status: SubmissionStatus,
}

impl<F: FormFlow> WizardController<F> {
    pub fn new(flow: F) -> Result<Self, WizardError> {
        flow.descriptor().check()?;
        let values = flow.defaults();
        Ok(Self {
            flow,
            values,
            errors: BTreeMap::new(),
            step: 1,
            status: SubmissionStatus::Idle,
        })
    }

    pub fn descriptor(&self) -> &FormDescriptor {
        self.flow.descriptor()
    }

    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.descriptor().step_count()
    }

    pub fn is_last_step(&self) -> bool {
        self.step == self.step_count()
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Inline messages from the last failed gate or submit, keyed by field.
    pub fn errors(&self) -> &BTreeMap<&'static str, String> {
        &self.errors
    }

    pub fn error_for(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    /// Field-update callback. Only keys the descriptor declares are accepted.
    pub fn set_value(&mut self, key: &str, raw: impl Into<String>) -> Result<(), WizardError> {
        let field = self
            .flow
            .descriptor()
            .field(key)
            .ok_or_else(|| WizardError::UnknownField(key.to_string()))?;
        self.errors.remove(field.key);
        self.values.insert(field.key.to_string(), raw.into());
        Ok(())
    }

    /// Runs the step gate for the current step only. Fields owned by other
    /// steps are not looked at until the whole-form check on submit.
    pub fn next(&mut self) -> Result<StepAdvance, WizardError> {
        let step = self.step;
        let form = self.flow.descriptor();
        let name = form.name;
        let step_count = form.step_count();
        let step_keys = form.step(step).map(|def| def.fields.clone()).unwrap_or_default();
        let gate = form.validate_step(step, &self.values);

        for key in step_keys {
            self.errors.remove(key);
        }

        match gate {
            Ok(normalized) => {
                for (key, value) in normalized {
                    self.values.insert(key.to_string(), value);
                }
                if step >= step_count {
                    tracing::debug!(form = name, step, "final step complete");
                    Ok(StepAdvance::ReadyToSubmit)
                } else {
                    self.step = step + 1;
                    tracing::debug!(form = name, step = self.step, "advanced");
                    Ok(StepAdvance::Moved(self.step))
                }
            }
            Err(err) => {
                self.record_errors(err.field_errors());
                tracing::debug!(form = name, step, "step gate rejected");
                Err(err)
            }
        }
    }

    /// Rewinds one step without validating. Returns `false` on the first step.
    pub fn back(&mut self) -> bool {
        if self.step > 1 {
            self.step -= 1;
            tracing::debug!(form = self.flow.descriptor().name, step = self.step, "went back");
            true
        } else {
            false
        }
    }

    /// Recomputed on every call from the current raw values.
    pub fn estimate(&self) -> Option<EstimateBand> {
        self.flow.estimate(&self.values)
    }

    /// First half of a submission: re-checks every field, builds the payload
    /// and flips the status to `Submitting`. A second call before
    /// [`finish_submission`](Self::finish_submission) is refused.
    pub fn begin_submission(&mut self) -> Result<F::Output, WizardError> {
        if self.status.is_submitting() {
            return Err(WizardError::AlreadySubmitting);
        }
        if !self.is_last_step() {
            return Err(WizardError::NotOnFinalStep);
        }

        let normalized = match self.flow.descriptor().validate_all(&self.values) {
            Ok(normalized) => normalized,
            Err(err) => {
                self.errors.clear();
                self.record_errors(err.field_errors());
                tracing::debug!(
                    form = self.flow.descriptor().name,
                    invalid = err.field_errors().len(),
                    "whole-form check rejected submission"
                );
                return Err(err);
            }
        };

        let payload = self.flow.commit(&normalized)?;
        self.errors.clear();
        self.status = SubmissionStatus::Submitting;
        Ok(payload)
    }

    /// Second half of a submission. Success discards the collected values;
    /// any failure shows `fallback` and keeps everything for a manual retry.
    pub fn finish_submission(
        &mut self,
        outcome: Result<SubmissionReceipt, SubmissionError>,
        fallback: String,
    ) {
        let form = self.flow.descriptor().name;
        match outcome {
            Ok(receipt) => {
                tracing::info!(form, reference = %receipt.reference, "submission succeeded");
                self.values = self.flow.defaults();
                self.errors.clear();
                self.step = 1;
                self.status = SubmissionStatus::Success;
            }
            Err(err) => {
                tracing::warn!(form, error = %err, "submission failed");
                self.status = SubmissionStatus::Error(fallback);
            }
        }
    }

    /// Whole-form check, payload build and network call in one go.
    pub async fn submit<T: SubmissionTransport>(
        &mut self,
        handler: &SubmissionHandler<T>,
    ) -> Result<SubmissionStatus, WizardError> {
        let payload = self.begin_submission()?;
        let honeypot = self.honeypot_value().map(str::to_string);
        let outcome = handler
            .submit(self.flow.descriptor().name, honeypot.as_deref(), &payload)
            .await;
        self.finish_submission(outcome, handler.fallback_message());
        Ok(self.status.clone())
    }

    /// Step owning the first invalid field of the last failed check.
    pub fn first_invalid_step(&self) -> Option<usize> {
        let form = self.flow.descriptor();
        self.errors
            .keys()
            .filter_map(|key| form.owning_step(key))
            .min()
    }

    fn honeypot_value(&self) -> Option<&str> {
        self.flow
            .descriptor()
            .honeypot_key()
            .and_then(|key| self.value(key))
    }

    fn record_errors(&mut self, errors: &[FieldError]) {
        for error in errors {
            self.errors.insert(error.key, error.message.clone());
        }
    }
}
