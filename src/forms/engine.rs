//! Interactive runner that drives a [`WizardController`] through a
//! [`FormInteraction`]: one prompt per field, the step gate between pages,
//! a review screen, and the submission itself.

use crate::errors::WizardError;
use crate::estimate::EstimateBand;
use crate::forms::validation::{parse_bool, FieldDescriptor, FieldKind};
use crate::forms::wizard::{FormFlow, StepAdvance, WizardController};
use crate::submission::{SubmissionHandler, SubmissionStatus, SubmissionTransport};

/// How a wizard run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormResult {
    Submitted,
    Cancelled,
}

/// Describes how prompts can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// User supplied a concrete value.
    Value(String),
    /// User chose to keep the current value.
    Keep,
    /// Abort the entire wizard immediately.
    Cancel,
    /// Go back to the previous field (or step).
    Back,
    /// Request additional information for the current field.
    Help,
}

/// Responses accepted on the review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResponse {
    Confirm,
    Back,
    Cancel,
}

/// Messages the runner asks the interaction to surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice<'a> {
    Info(&'a str),
    Warning(&'a str),
    Error(&'a str),
    Success(&'a str),
}

/// Everything needed to render one field prompt.
pub struct PromptContext<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub current: Option<&'a str>,
    pub error: Option<&'a str>,
    pub step: usize,
    pub step_count: usize,
    pub step_title: &'static str,
    pub index: usize,
    pub total: usize,
}

/// Snapshot of collected data displayed before final confirmation.
#[derive(Debug, Default)]
pub struct FormSummary {
    pub entries: Vec<(String, String)>,
    pub estimate: Option<EstimateBand>,
}

impl FormSummary {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec!["Review your entries:".to_string()];
        for (label, value) in &self.entries {
            lines.push(format!("  {}: {}", label, value));
        }
        if let Some(band) = self.estimate {
            lines.push(String::new());
            lines.push(format!("  Estimated range: {}", band));
        }
        lines
    }
}

pub trait FormInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse;

    fn confirm(&mut self, summary: &FormSummary) -> ConfirmationResponse;

    fn notify(&mut self, notice: Notice<'_>);
}

/// Where to resume inside a step after navigation.
#[derive(Clone, Copy)]
enum Resume {
    First,
    Last,
    Field(usize),
}

/// Drives a wizard session from the first prompt to a submission result.
pub struct FormEngine<'a, F: FormFlow> {
    controller: &'a mut WizardController<F>,
    shown_estimate: Option<EstimateBand>,
}

impl<'a, F: FormFlow> FormEngine<'a, F> {
    pub fn new(controller: &'a mut WizardController<F>) -> Self {
        Self {
            controller,
            shown_estimate: None,
        }
    }

    pub async fn run<I: FormInteraction, T: SubmissionTransport>(
        &mut self,
        interaction: &mut I,
        handler: &SubmissionHandler<T>,
    ) -> Result<FormResult, WizardError> {
        let mut resume = Resume::First;

        'steps: loop {
            let step = self.controller.current_step();
            let keys: Vec<&'static str> = self
                .controller
                .descriptor()
                .step_fields(step)?
                .iter()
                .map(|field| field.key)
                .collect();

            let mut index = match resume {
                Resume::First => 0,
                Resume::Last => keys.len().saturating_sub(1),
                Resume::Field(index) => index.min(keys.len().saturating_sub(1)),
            };
            resume = Resume::First;

            while index < keys.len() {
                let key = keys[index];
                let response = {
                    let form = self.controller.descriptor();
                    let Some(descriptor) = form.field(key) else {
                        return Err(WizardError::UnknownField(key.to_string()));
                    };
                    let context = PromptContext {
                        descriptor,
                        current: self.controller.value(key).filter(|value| !value.is_empty()),
                        error: self.controller.error_for(key),
                        step,
                        step_count: form.step_count(),
                        step_title: form.step(step).map(|def| def.title).unwrap_or(""),
                        index,
                        total: keys.len(),
                    };
                    interaction.prompt_field(&context)
                };

                match response {
                    PromptResponse::Cancel => return Ok(FormResult::Cancelled),
                    PromptResponse::Back => {
                        if index > 0 {
                            index -= 1;
                        } else if self.controller.back() {
                            resume = Resume::Last;
                            continue 'steps;
                        } else {
                            interaction.notify(Notice::Warning("Already at the first field."));
                        }
                    }
                    PromptResponse::Help => {
                        let help = self
                            .controller
                            .descriptor()
                            .field(key)
                            .and_then(|field| field.help)
                            .unwrap_or("No additional information available for this field.");
                        interaction.notify(Notice::Info(help));
                    }
                    PromptResponse::Keep => index += 1,
                    PromptResponse::Value(raw) => {
                        self.controller.set_value(key, raw)?;
                        self.refresh_estimate(interaction);
                        index += 1;
                    }
                }
            }

            match self.controller.next() {
                Ok(StepAdvance::Moved(_)) => continue 'steps,
                Ok(StepAdvance::ReadyToSubmit) => {}
                Err(err @ WizardError::StepIncomplete { .. }) => {
                    report(interaction, &err);
                    let first_bad = err
                        .field_errors()
                        .first()
                        .and_then(|bad| keys.iter().position(|key| *key == bad.key))
                        .unwrap_or(0);
                    resume = Resume::Field(first_bad);
                    continue 'steps;
                }
                Err(err) => return Err(err),
            }

            loop {
                let summary = self.summary();
                match interaction.confirm(&summary) {
                    ConfirmationResponse::Cancel => return Ok(FormResult::Cancelled),
                    ConfirmationResponse::Back => {
                        resume = Resume::Last;
                        continue 'steps;
                    }
                    ConfirmationResponse::Confirm => {}
                }

                interaction.notify(Notice::Info("Submitting..."));
                match self.controller.submit(handler).await {
                    Ok(SubmissionStatus::Success) => {
                        interaction.notify(Notice::Success(
                            "Thank you! We received your request and will be in touch within one business day.",
                        ));
                        return Ok(FormResult::Submitted);
                    }
                    Ok(SubmissionStatus::Error(message)) => {
                        interaction.notify(Notice::Error(&message));
                        // Back to the review screen; resubmitting is manual.
                    }
                    Ok(_) => {}
                    Err(err @ WizardError::FormInvalid { .. }) => {
                        report(interaction, &err);
                        let target = self.controller.first_invalid_step().unwrap_or(1);
                        while self.controller.current_step() > target && self.controller.back() {}
                        let first_bad = self.first_error_index(target);
                        resume = Resume::Field(first_bad);
                        continue 'steps;
                    }
                    Err(err) => return Err(err),
                }
            }
        }
    }

    fn refresh_estimate<I: FormInteraction>(&mut self, interaction: &mut I) {
        let current = self.controller.estimate();
        if current == self.shown_estimate {
            return;
        }
        match current {
            Some(band) => {
                let message = format!("Estimated range: {} (advisory, not a binding price)", band);
                interaction.notify(Notice::Info(&message));
            }
            None if self.shown_estimate.is_some() => {
                interaction.notify(Notice::Info("Estimate unavailable for the current inputs."));
            }
            None => {}
        }
        self.shown_estimate = current;
    }

    fn first_error_index(&self, step: usize) -> usize {
        self.controller
            .descriptor()
            .step_fields(step)
            .ok()
            .and_then(|fields| {
                fields
                    .iter()
                    .position(|field| self.controller.error_for(field.key).is_some())
            })
            .unwrap_or(0)
    }

    fn summary(&self) -> FormSummary {
        let form = self.controller.descriptor();
        let mut summary = FormSummary {
            entries: Vec::new(),
            estimate: self.controller.estimate(),
        };
        for field in form.fields.iter().filter(|field| !field.hidden) {
            let display = match self.controller.value(field.key) {
                Some(value) if !value.is_empty() => display_value(field, value),
                _ => "[unfilled]".to_string(),
            };
            summary.entries.push((field.label.to_string(), display));
        }
        summary
    }
}

fn display_value(field: &FieldDescriptor, value: &str) -> String {
    match &field.kind {
        FieldKind::Choice(choices) => choices
            .resolve(value)
            .and_then(|slug| choices.label_for_slug(slug))
            .unwrap_or(value)
            .to_string(),
        FieldKind::Boolean => match parse_bool(value) {
            Some(true) => "Yes".into(),
            Some(false) => "No".into(),
            None => value.to_string(),
        },
        _ => value.to_string(),
    }
}

fn report<I: FormInteraction>(interaction: &mut I, err: &WizardError) {
    interaction.notify(Notice::Warning(&err.to_string()));
    for field in err.field_errors() {
        interaction.notify(Notice::Error(&field.to_string()));
    }
}
