//! Job application for cleaning crew positions.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::WizardError;
use crate::forms::schema::{FormDescriptor, StepDefinition};
use crate::forms::validation::{
    max_length, min_length, must_be_true, one_of, pattern, parse_bool, ChoiceSet,
    FieldDescriptor, FieldKind, Validator, EMAIL_PATTERN, PHONE_PATTERN,
};
use crate::forms::wizard::FormFlow;
use crate::forms::{field_value, optional_value};

pub const ABOUT_MAX_LEN: usize = 500;
const MAX_EXPERIENCE_YEARS: u32 = 60;

const POSITIONS: [(&str, &str); 4] = [
    ("Cleaning technician", "cleaning-technician"),
    ("Floor care specialist", "floor-care-specialist"),
    ("Day porter", "day-porter"),
    ("Team lead", "team-lead"),
];

const AVAILABILITY: [(&str, &str); 4] = [
    ("Full-time", "full-time"),
    ("Part-time", "part-time"),
    ("Evenings / nights", "evenings"),
    ("Weekends", "weekends"),
];

/// Payload posted to the application endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub availability: String,
    pub experience_years: u32,
    pub has_transportation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    pub authorized_to_work: bool,
    pub consent: bool,
}

pub struct ApplicationWizard {
    descriptor: FormDescriptor,
}

impl ApplicationWizard {
    pub fn new() -> Self {
        let positions = ChoiceSet::from_pairs(POSITIONS.to_vec());
        let availability = ChoiceSet::from_pairs(AVAILABILITY.to_vec());

        let fields = vec![
            FieldDescriptor::new(
                "full_name",
                "Full name",
                FieldKind::Text,
                min_length(2, "Name is required"),
            ),
            FieldDescriptor::new(
                "email",
                "Email",
                FieldKind::Text,
                pattern(&EMAIL_PATTERN, "Please enter a valid email address"),
            ),
            FieldDescriptor::new(
                "phone",
                "Phone",
                FieldKind::Text,
                pattern(&PHONE_PATTERN, "Please enter a valid phone number"),
            ),
            FieldDescriptor::new(
                "position",
                "Position",
                FieldKind::Choice(positions.clone()),
                one_of(positions, "position"),
            ),
            FieldDescriptor::new(
                "availability",
                "Availability",
                FieldKind::Choice(availability.clone()),
                one_of(availability, "availability"),
            ),
            FieldDescriptor::new(
                "experience_years",
                "Years of cleaning experience",
                FieldKind::Integer,
                experience_validator(),
            )
            .with_help("Enter 0 if you are new to the industry; we train on the job."),
            FieldDescriptor::new(
                "has_transportation",
                "Reliable transportation",
                FieldKind::Boolean,
                Validator::None,
            ),
            FieldDescriptor::new(
                "about",
                "Tell us about yourself",
                FieldKind::Text,
                max_length(ABOUT_MAX_LEN, "Please keep this to 500 characters or less"),
            )
            .with_optional(),
            FieldDescriptor::new(
                "authorized_to_work",
                "Authorized to work in the US",
                FieldKind::Boolean,
                must_be_true("Work authorization is required for all positions"),
            ),
            FieldDescriptor::new(
                "consent",
                "I agree to be contacted about this application",
                FieldKind::Boolean,
                must_be_true("You must agree to be contacted"),
            ),
            FieldDescriptor::honeypot("website"),
        ];

        let steps = vec![
            StepDefinition::new(1, "Contact", vec!["full_name", "email", "phone"]),
            StepDefinition::new(
                2,
                "Position",
                vec![
                    "position",
                    "availability",
                    "experience_years",
                    "has_transportation",
                ],
            ),
            StepDefinition::new(3, "Final details", vec!["about", "authorized_to_work", "consent"]),
        ];

        Self {
            descriptor: FormDescriptor::new("application", fields, steps),
        }
    }
}

impl Default for ApplicationWizard {
    fn default() -> Self {
        Self::new()
    }
}

fn experience_validator() -> Validator {
    Validator::Custom(Arc::new(|input| {
        let trimmed = input.trim();
        trimmed
            .parse::<u32>()
            .map_err(|_| "Enter a whole number of years (0 or more)".to_string())
            .and_then(|years| {
                if years > MAX_EXPERIENCE_YEARS {
                    Err(format!("Enter {} years or fewer", MAX_EXPERIENCE_YEARS))
                } else {
                    Ok(years.to_string())
                }
            })
    }))
}

impl FormFlow for ApplicationWizard {
    type Output = JobApplication;

    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn commit(&self, values: &BTreeMap<&'static str, String>) -> Result<Self::Output, WizardError> {
        let form = self.descriptor.name;
        let flag = |key: &str| -> Result<bool, WizardError> {
            let raw = field_value(form, values, key)?;
            parse_bool(raw).ok_or_else(|| WizardError::Payload {
                form,
                reason: format!("`{key}` is not a yes/no answer"),
            })
        };

        let experience_years = field_value(form, values, "experience_years")?
            .parse::<u32>()
            .map_err(|err| WizardError::Payload {
                form,
                reason: format!("experience years: {err}"),
            })?;

        Ok(JobApplication {
            full_name: field_value(form, values, "full_name")?.to_string(),
            email: field_value(form, values, "email")?.to_string(),
            phone: field_value(form, values, "phone")?.to_string(),
            position: field_value(form, values, "position")?.to_string(),
            availability: field_value(form, values, "availability")?.to_string(),
            experience_years,
            has_transportation: flag("has_transportation")?,
            about: optional_value(values, "about").map(str::to_string),
            authorized_to_work: flag("authorized_to_work")?,
            consent: flag("consent")?,
        })
    }
}
