//! Field-level rules shared by every wizard.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use strsim::levenshtein;

use crate::utils::parse_grouped_number;

pub static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

pub static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{10}|\(\d{3}\) \d{3}-\d{4})$").expect("valid phone pattern")
});

pub static ZIP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}$").expect("valid zip pattern"));

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Supported data kinds for form fields.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
    Boolean,
    Choice(ChoiceSet),
}

type ValidatorCallback = dyn Fn(&str) -> Result<String, String> + Send + Sync;
type SharedValidatorCallback = Arc<ValidatorCallback>;

/// Built-in validation rules. Each rule returns the normalized value that
/// gets stored once the owning step passes.
#[derive(Clone)]
pub enum Validator {
    None,
    MinLength {
        min: usize,
        message: &'static str,
    },
    MaxLength {
        max: usize,
        message: &'static str,
    },
    Pattern {
        pattern: &'static Lazy<Regex>,
        message: &'static str,
    },
    MinNumber {
        min: u32,
        message: &'static str,
    },
    MustBeTrue {
        message: &'static str,
    },
    Date,
    OneOf {
        choices: ChoiceSet,
        noun: &'static str,
    },
    Custom(SharedValidatorCallback),
}

impl Validator {
    pub fn validate(&self, input: &str) -> Result<String, ValidationError> {
        let trimmed = input.trim();
        match self {
            Validator::None => Ok(trimmed.to_string()),
            Validator::MinLength { min, message } => {
                if trimmed.chars().count() >= *min {
                    Ok(trimmed.to_string())
                } else {
                    Err(ValidationError::new(*message))
                }
            }
            Validator::MaxLength { max, message } => {
                if trimmed.chars().count() <= *max {
                    Ok(trimmed.to_string())
                } else {
                    Err(ValidationError::new(*message))
                }
            }
            Validator::Pattern { pattern, message } => {
                if pattern.is_match(trimmed) {
                    Ok(trimmed.to_string())
                } else {
                    Err(ValidationError::new(*message))
                }
            }
            Validator::MinNumber { min, message } => {
                let value = parse_grouped_number(trimmed)
                    .ok_or_else(|| ValidationError::new("Enter a whole number (e.g., 5000)"))?;
                if value >= *min {
                    Ok(value.to_string())
                } else {
                    Err(ValidationError::new(*message))
                }
            }
            Validator::MustBeTrue { message } => match parse_bool(trimmed) {
                Some(true) => Ok("true".into()),
                _ => Err(ValidationError::new(*message)),
            },
            Validator::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(|d| d.to_string())
                .map_err(|_| ValidationError::new("Use YYYY-MM-DD format")),
            Validator::OneOf { choices, noun } => choices
                .resolve(trimmed)
                .map(str::to_string)
                .ok_or_else(|| {
                    let mut message = format!(
                        "Select a valid {} (options: {})",
                        noun,
                        choices.labels().join(", ")
                    );
                    if let Some(suggestion) = choices.suggest(trimmed) {
                        message.push_str(&format!(". Did you mean `{}`?", suggestion));
                    }
                    ValidationError::new(message)
                }),
            Validator::Custom(func) => func(input).map_err(ValidationError::new),
        }
    }
}

/// Declarative description of a single form field.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub hidden: bool,
    pub help: Option<&'static str>,
    pub validator: Validator,
}

impl FieldDescriptor {
    pub fn new(
        key: &'static str,
        label: &'static str,
        kind: FieldKind,
        validator: Validator,
    ) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
            hidden: false,
            help: None,
            validator,
        }
    }

    /// Hidden spam-trap field. Never prompted and never validated; only the
    /// submission path looks at it.
    pub fn honeypot(key: &'static str) -> Self {
        Self {
            key,
            label: "Website",
            kind: FieldKind::Text,
            required: false,
            hidden: true,
            help: None,
            validator: Validator::None,
        }
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Runs the field's rule against raw input and returns the value to
    /// store.
    pub fn check(&self, raw: &str) -> Result<String, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            if !self.required {
                return Ok(String::new());
            }
            return match self.validator {
                Validator::MinLength { message, .. }
                | Validator::Pattern { message, .. }
                | Validator::MinNumber { message, .. }
                | Validator::MustBeTrue { message } => Err(ValidationError::new(message)),
                _ => Err(ValidationError::new(format!("{} is required", self.label))),
            };
        }

        match (&self.kind, &self.validator) {
            (FieldKind::Boolean, Validator::None) => parse_bool(trimmed)
                .map(|value| value.to_string())
                .ok_or_else(|| ValidationError::new("Answer yes or no")),
            (FieldKind::Integer, Validator::None) => trimmed
                .parse::<i64>()
                .map(|v| v.to_string())
                .map_err(|_| ValidationError::new("Enter a whole number (e.g., 42)")),
            (FieldKind::Date, Validator::None) => Validator::Date.validate(trimmed),
            (FieldKind::Choice(choices), Validator::None) => Validator::OneOf {
                choices: choices.clone(),
                noun: self.label,
            }
            .validate(trimmed),
            (_, validator) => validator.validate(raw),
        }
    }
}

/// Menu-style choices that accept the numeric position, the display label or
/// the stored slug.
#[derive(Debug, Clone)]
pub struct ChoiceSet {
    labels: Vec<String>,
    slugs: Vec<String>,
    alias_to_index: HashMap<String, usize>,
}

impl ChoiceSet {
    pub fn from_pairs<L: Into<String>, S: Into<String>>(pairs: Vec<(L, S)>) -> Self {
        let mut labels = Vec::new();
        let mut slugs = Vec::new();
        let mut alias_to_index = HashMap::new();

        for (idx, (label, slug)) in pairs.into_iter().enumerate() {
            let label = label.into();
            let slug = slug.into();
            alias_to_index.insert((idx + 1).to_string(), idx);
            alias_to_index.insert(label.to_ascii_lowercase(), idx);
            alias_to_index.insert(slug.to_ascii_lowercase(), idx);
            labels.push(label);
            slugs.push(slug);
        }

        Self {
            labels,
            slugs,
            alias_to_index,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Resolves any accepted alias to the stored slug.
    pub fn resolve(&self, input: &str) -> Option<&str> {
        let key = input.trim().to_ascii_lowercase();
        self.alias_to_index
            .get(&key)
            .map(|index| self.slugs[*index].as_str())
    }

    pub fn label_for_slug(&self, slug: &str) -> Option<&str> {
        self.slugs
            .iter()
            .position(|candidate| candidate == slug)
            .map(|index| self.labels[index].as_str())
    }

    pub fn position_of_slug(&self, slug: &str) -> Option<usize> {
        self.slugs.iter().position(|candidate| candidate == slug)
    }

    fn suggest(&self, input: &str) -> Option<&str> {
        let needle = input.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.labels
            .iter()
            .map(|label| (levenshtein(&label.to_ascii_lowercase(), &needle), label))
            .min_by_key(|(distance, _)| *distance)
            .filter(|(distance, _)| *distance <= 3)
            .map(|(_, label)| label.as_str())
    }
}

pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" | "on" => Some(true),
        "n" | "no" | "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

pub fn min_length(min: usize, message: &'static str) -> Validator {
    Validator::MinLength { min, message }
}

pub fn max_length(max: usize, message: &'static str) -> Validator {
    Validator::MaxLength { max, message }
}

pub fn pattern(pattern: &'static Lazy<Regex>, message: &'static str) -> Validator {
    Validator::Pattern { pattern, message }
}

pub fn min_number(min: u32, message: &'static str) -> Validator {
    Validator::MinNumber { min, message }
}

pub fn must_be_true(message: &'static str) -> Validator {
    Validator::MustBeTrue { message }
}

pub fn one_of(choices: ChoiceSet, noun: &'static str) -> Validator {
    Validator::OneOf { choices, noun }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(key: &'static str, validator: Validator) -> FieldDescriptor {
        FieldDescriptor::new(key, "Field", FieldKind::Text, validator)
    }

    #[test]
    fn min_length_uses_declared_message() {
        let field = text("full_name", min_length(2, "Name is required"));
        assert_eq!(field.check("").unwrap_err().message, "Name is required");
        assert_eq!(field.check("J").unwrap_err().message, "Name is required");
        assert_eq!(field.check("  Jo ").unwrap(), "Jo");
    }

    #[test]
    fn phone_accepts_plain_and_formatted() {
        let field = text("phone", pattern(&PHONE_PATTERN, "Please enter a valid phone number"));
        assert!(field.check("5551234567").is_ok());
        assert!(field.check("(555) 123-4567").is_ok());
        assert!(field.check("555-123-4567").is_err());
        assert!(field.check("555123456").is_err());
    }

    #[test]
    fn zip_and_email_shapes() {
        let zip = text("zip", pattern(&ZIP_PATTERN, "zip"));
        assert!(zip.check("78701").is_ok());
        assert!(zip.check("7870").is_err());
        assert!(zip.check("787011").is_err());

        let email = text("email", pattern(&EMAIL_PATTERN, "email"));
        assert!(email.check("ops@example.com").is_ok());
        assert!(email.check("ops@example").is_err());
        assert!(email.check("ops example.com").is_err());
    }

    #[test]
    fn numeric_minimum_accepts_grouped_digits() {
        let field = FieldDescriptor::new(
            "square_footage",
            "Square footage",
            FieldKind::Integer,
            min_number(1_000, "Minimum 1,000 square feet"),
        );
        assert_eq!(field.check("5,000").unwrap(), "5000");
        assert_eq!(
            field.check("999").unwrap_err().message,
            "Minimum 1,000 square feet"
        );
        assert!(field.check("lots").is_err());
        assert!(field.check("5,0,0,0").is_err());
        assert_eq!(
            field.check("5000000000").unwrap_err().message,
            "Enter a whole number (e.g., 5000)"
        );
    }

    #[test]
    fn optional_field_accepts_blank() {
        let field = text("notes", max_length(5, "too long")).with_optional();
        assert_eq!(field.check("   ").unwrap(), "");
        assert_eq!(field.check("short").unwrap(), "short");
        assert_eq!(field.check("longer").unwrap_err().message, "too long");
    }

    #[test]
    fn consent_must_be_true() {
        let field = FieldDescriptor::new(
            "consent",
            "Consent",
            FieldKind::Boolean,
            must_be_true("You must agree to be contacted"),
        );
        assert_eq!(field.check("yes").unwrap(), "true");
        assert!(field.check("no").is_err());
        assert_eq!(
            field.check("").unwrap_err().message,
            "You must agree to be contacted"
        );
    }

    #[test]
    fn choice_resolves_aliases_and_suggests() {
        let choices = ChoiceSet::from_pairs(vec![("Weekly", "weekly"), ("Daily", "daily")]);
        let field = FieldDescriptor::new(
            "frequency",
            "Frequency",
            FieldKind::Choice(choices.clone()),
            one_of(choices, "cleaning frequency"),
        );
        assert_eq!(field.check("2").unwrap(), "daily");
        assert_eq!(field.check("WEEKLY").unwrap(), "weekly");
        let err = field.check("weekyl").unwrap_err();
        assert!(err.message.contains("Did you mean `Weekly`?"), "{}", err.message);
    }
}
