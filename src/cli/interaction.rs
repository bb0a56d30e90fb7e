//! Terminal front-ends for the form runner.

use std::collections::VecDeque;
use std::env;

use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::cli::output;
use crate::forms::{
    ConfirmationResponse, FieldKind, FormInteraction, FormSummary, Notice, PromptContext,
    PromptResponse,
};

/// Environment variable holding `|`-separated scripted answers.
pub const SCRIPT_ENV: &str = "QUOTE_CORE_TEST_INPUTS";

const BACK_LABEL: &str = "<- Back";

fn print_notice(notice: Notice<'_>) {
    match notice {
        Notice::Info(message) => output::info(message),
        Notice::Warning(message) => output::warning(message),
        Notice::Error(message) => output::error(message),
        Notice::Success(message) => output::success(message),
    }
}

fn print_step_header(context: &PromptContext<'_>) {
    if context.index == 0 {
        output::section(format!(
            "Step {} of {}: {}",
            context.step, context.step_count, context.step_title
        ));
    }
    if let Some(error) = context.error {
        output::error(format!("{}: {}", context.descriptor.label, error));
    }
}

fn print_summary(summary: &FormSummary) {
    output::section("Review");
    for line in summary.lines() {
        println!("{line}");
    }
}

/// Maps typed commands to navigation responses.
fn interpret_text(raw: &str, current: Option<&str>) -> PromptResponse {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return if current.is_some() {
            PromptResponse::Keep
        } else {
            PromptResponse::Value(String::new())
        };
    }
    match trimmed.to_ascii_lowercase().as_str() {
        ":cancel" => PromptResponse::Cancel,
        ":back" => PromptResponse::Back,
        ":help" => PromptResponse::Help,
        ":clear" => PromptResponse::Value(String::new()),
        _ => PromptResponse::Value(trimmed.to_string()),
    }
}

/// Interactive implementation backed by dialoguer.
pub struct TerminalInteraction {
    theme: ColorfulTheme,
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn prompt_text(&self, context: &PromptContext<'_>) -> PromptResponse {
        let mut prompt = context.descriptor.label.to_string();
        if !context.descriptor.required {
            prompt.push_str(" (optional)");
        }
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(current) = context.current {
            input = input.default(current.to_string()).show_default(true);
        }
        match input.interact_text() {
            Ok(raw) if context.current.is_some_and(|current| current == raw) => {
                PromptResponse::Keep
            }
            Ok(raw) => interpret_text(&raw, context.current),
            Err(err) => {
                tracing::debug!(error = %err, "text prompt aborted");
                PromptResponse::Cancel
            }
        }
    }

    fn prompt_select(
        &self,
        context: &PromptContext<'_>,
        options: Vec<String>,
        default: usize,
    ) -> PromptResponse {
        let mut items = options.clone();
        let back_index = if context.step > 1 || context.index > 0 {
            items.push(BACK_LABEL.to_string());
            Some(items.len() - 1)
        } else {
            None
        };

        let selection = Select::with_theme(&self.theme)
            .with_prompt(context.descriptor.label)
            .items(&items)
            .default(default.min(items.len().saturating_sub(1)))
            .interact_opt();

        match selection {
            Ok(Some(index)) if Some(index) == back_index => PromptResponse::Back,
            Ok(Some(index)) => PromptResponse::Value(options[index].clone()),
            Ok(None) => PromptResponse::Back,
            Err(err) => {
                tracing::debug!(error = %err, "selection aborted");
                PromptResponse::Cancel
            }
        }
    }
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl FormInteraction for TerminalInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        print_step_header(context);
        match &context.descriptor.kind {
            FieldKind::Choice(choices) => {
                let default = context
                    .current
                    .and_then(|value| choices.resolve(value))
                    .and_then(|slug| choices.position_of_slug(slug))
                    .unwrap_or(0);
                self.prompt_select(context, choices.labels().to_vec(), default)
            }
            FieldKind::Boolean => {
                let default = match context.current {
                    Some("false") => 1,
                    _ => 0,
                };
                self.prompt_select(context, vec!["Yes".into(), "No".into()], default)
            }
            _ => self.prompt_text(context),
        }
    }

    fn confirm(&mut self, summary: &FormSummary) -> ConfirmationResponse {
        print_summary(summary);
        let items = ["Submit", "Edit previous field", "Cancel"];
        match Select::with_theme(&self.theme)
            .with_prompt("Ready to submit?")
            .items(&items)
            .default(0)
            .interact_opt()
        {
            Ok(Some(0)) => ConfirmationResponse::Confirm,
            Ok(Some(1)) => ConfirmationResponse::Back,
            _ => ConfirmationResponse::Cancel,
        }
    }

    fn notify(&mut self, notice: Notice<'_>) {
        print_notice(notice);
    }
}

/// Replays answers from [`SCRIPT_ENV`] so wizards can run without a
/// terminal. Tokens: plain text, `<BLANK>`, `<KEEP>`, `<BACK>`, `<HELP>`,
/// `<CANCEL>`, and `<CONFIRM>` for the review screen. Running out of tokens
/// cancels the wizard.
pub struct ScriptedInteraction {
    inputs: VecDeque<String>,
}

impl ScriptedInteraction {
    pub fn from_env() -> Option<Self> {
        env::var(SCRIPT_ENV).ok().map(|raw| Self::parse(&raw))
    }

    pub fn parse(raw: &str) -> Self {
        Self {
            inputs: raw.split('|').map(|token| token.trim().to_string()).collect(),
        }
    }

    fn next_token(&mut self, label: &str) -> Option<String> {
        let token = self.inputs.pop_front();
        if token.is_none() {
            tracing::debug!(prompt = label, "scripted inputs exhausted");
        }
        token
    }
}

impl FormInteraction for ScriptedInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        print_step_header(context);
        let Some(token) = self.next_token(context.descriptor.label) else {
            return PromptResponse::Cancel;
        };
        println!("{}: {}", context.descriptor.label, token);
        match token.to_ascii_uppercase().as_str() {
            "<CANCEL>" | "<ESC>" => PromptResponse::Cancel,
            "<BACK>" => PromptResponse::Back,
            "<HELP>" => PromptResponse::Help,
            "<KEEP>" => PromptResponse::Keep,
            "<BLANK>" | "<EMPTY>" => PromptResponse::Value(String::new()),
            _ => PromptResponse::Value(token),
        }
    }

    fn confirm(&mut self, summary: &FormSummary) -> ConfirmationResponse {
        print_summary(summary);
        match self.next_token("review").map(|token| token.to_ascii_uppercase()) {
            Some(token) if token == "<CONFIRM>" || token == "<SUBMIT>" => {
                ConfirmationResponse::Confirm
            }
            Some(token) if token == "<BACK>" => ConfirmationResponse::Back,
            _ => ConfirmationResponse::Cancel,
        }
    }

    fn notify(&mut self, notice: Notice<'_>) {
        print_notice(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{FieldDescriptor, Validator};

    #[test]
    fn typed_commands_map_to_navigation() {
        assert_eq!(interpret_text(":back", None), PromptResponse::Back);
        assert_eq!(interpret_text(":HELP", None), PromptResponse::Help);
        assert_eq!(interpret_text("", Some("Austin")), PromptResponse::Keep);
        assert_eq!(interpret_text("", None), PromptResponse::Value(String::new()));
        assert_eq!(
            interpret_text(" Austin ", None),
            PromptResponse::Value("Austin".into())
        );
    }

    #[test]
    fn scripted_tokens_are_replayed_in_order() {
        let field = FieldDescriptor::new("city", "City", FieldKind::Text, Validator::None);
        let context = PromptContext {
            descriptor: &field,
            current: None,
            error: None,
            step: 1,
            step_count: 1,
            step_title: "Where",
            index: 1,
            total: 2,
        };
        let mut scripted = ScriptedInteraction::parse("Austin|<BACK>|<BLANK>");
        assert_eq!(scripted.prompt_field(&context), PromptResponse::Value("Austin".into()));
        assert_eq!(scripted.prompt_field(&context), PromptResponse::Back);
        assert_eq!(scripted.prompt_field(&context), PromptResponse::Value(String::new()));
        assert_eq!(scripted.prompt_field(&context), PromptResponse::Cancel);
    }
}
