//! Facility cleaning quote request.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::WizardError;
use crate::estimate::{self, EstimateBand, Frequency};
use crate::forms::schema::{FormDescriptor, StepDefinition};
use crate::forms::validation::{
    max_length, min_length, min_number, must_be_true, one_of, pattern, ChoiceSet,
    FieldDescriptor, FieldKind, Validator, EMAIL_PATTERN, PHONE_PATTERN, ZIP_PATTERN,
};
use crate::forms::wizard::FormFlow;
use crate::forms::{field_value, optional_value};

pub const NOTES_MAX_LEN: usize = 500;
pub const HONEYPOT_KEY: &str = "website";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    Office,
    Medical,
    Industrial,
    Retail,
    Education,
    Government,
    Other,
}

impl FacilityType {
    pub const ALL: [FacilityType; 7] = [
        FacilityType::Office,
        FacilityType::Medical,
        FacilityType::Industrial,
        FacilityType::Retail,
        FacilityType::Education,
        FacilityType::Government,
        FacilityType::Other,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            FacilityType::Office => "office",
            FacilityType::Medical => "medical",
            FacilityType::Industrial => "industrial",
            FacilityType::Retail => "retail",
            FacilityType::Education => "education",
            FacilityType::Government => "government",
            FacilityType::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FacilityType::Office => "Office building",
            FacilityType::Medical => "Medical / healthcare",
            FacilityType::Industrial => "Industrial / warehouse",
            FacilityType::Retail => "Retail",
            FacilityType::Education => "School / education",
            FacilityType::Government => "Government",
            FacilityType::Other => "Other",
        }
    }

    fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }
}

/// Payload posted to the quote endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub full_name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub facility_type: FacilityType,
    pub square_footage: u32,
    pub frequency: Frequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub consent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<EstimateBand>,
}

pub struct QuoteWizard {
    descriptor: FormDescriptor,
}

impl QuoteWizard {
    pub fn new() -> Self {
        let facility_choices = ChoiceSet::from_pairs(
            FacilityType::ALL
                .iter()
                .map(|kind| (kind.label(), kind.slug()))
                .collect(),
        );
        let frequency_choices = ChoiceSet::from_pairs(
            Frequency::ALL
                .iter()
                .map(|freq| (freq.label(), freq.slug()))
                .collect(),
        );

        let fields = vec![
            FieldDescriptor::new(
                "full_name",
                "Full name",
                FieldKind::Text,
                min_length(2, "Name is required"),
            ),
            FieldDescriptor::new(
                "company",
                "Company",
                FieldKind::Text,
                min_length(2, "Company name is required"),
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
            )
            .with_help("10 digits, or formatted as (555) 123-4567."),
            FieldDescriptor::new(
                "address",
                "Street address",
                FieldKind::Text,
                min_length(5, "Street address is required"),
            ),
            FieldDescriptor::new("city", "City", FieldKind::Text, min_length(2, "City is required")),
            FieldDescriptor::new(
                "zip",
                "ZIP code",
                FieldKind::Text,
                pattern(&ZIP_PATTERN, "Please enter a valid 5-digit ZIP code"),
            ),
            FieldDescriptor::new(
                "facility_type",
                "Facility type",
                FieldKind::Choice(facility_choices.clone()),
                one_of(facility_choices, "facility type"),
            ),
            FieldDescriptor::new(
                "square_footage",
                "Square footage",
                FieldKind::Integer,
                min_number(estimate::MIN_SQUARE_FOOTAGE, "Minimum 1,000 square feet"),
            )
            .with_help("Approximate cleanable area. We service facilities of 1,000 sq ft and up."),
            FieldDescriptor::new(
                "frequency",
                "Cleaning frequency",
                FieldKind::Choice(frequency_choices.clone()),
                one_of(frequency_choices, "cleaning frequency"),
            ),
            FieldDescriptor::new("start_date", "Preferred start date", FieldKind::Date, Validator::Date)
                .with_optional()
                .with_help("Optional. Use YYYY-MM-DD."),
            FieldDescriptor::new(
                "notes",
                "Additional notes",
                FieldKind::Text,
                max_length(NOTES_MAX_LEN, "Notes must be 500 characters or less"),
            )
            .with_optional()
            .with_help("Anything we should know: access hours, special surfaces, current provider."),
            FieldDescriptor::new(
                "consent",
                "I agree to be contacted about this request",
                FieldKind::Boolean,
                must_be_true("You must agree to be contacted"),
            ),
            FieldDescriptor::honeypot(HONEYPOT_KEY),
        ];

        let steps = vec![
            StepDefinition::new(1, "Contact", vec!["full_name", "company", "email", "phone"]),
            StepDefinition::new(
                2,
                "Facility",
                vec![
                    "address",
                    "city",
                    "zip",
                    "facility_type",
                    "square_footage",
                    "frequency",
                ],
            ),
            StepDefinition::new(3, "Details", vec!["start_date", "notes", "consent"]),
        ];

        Self {
            descriptor: FormDescriptor::new("quote", fields, steps),
        }
    }
}

impl Default for QuoteWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl FormFlow for QuoteWizard {
    type Output = QuoteRequest;

    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn commit(&self, values: &BTreeMap<&'static str, String>) -> Result<Self::Output, WizardError> {
        let form = self.descriptor.name;
        let payload_error = |reason: String| WizardError::Payload { form, reason };

        let facility_slug = field_value(form, values, "facility_type")?;
        let facility_type = FacilityType::from_slug(facility_slug)
            .ok_or_else(|| payload_error(format!("unknown facility type `{facility_slug}`")))?;
        let frequency = field_value(form, values, "frequency")?
            .parse::<Frequency>()
            .map_err(payload_error)?;
        let square_footage = field_value(form, values, "square_footage")?
            .parse::<u32>()
            .map_err(|err| payload_error(format!("square footage: {err}")))?;
        let start_date = optional_value(values, "start_date")
            .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .transpose()
            .map_err(|err| payload_error(format!("start date: {err}")))?;

        Ok(QuoteRequest {
            full_name: field_value(form, values, "full_name")?.to_string(),
            company: field_value(form, values, "company")?.to_string(),
            email: field_value(form, values, "email")?.to_string(),
            phone: field_value(form, values, "phone")?.to_string(),
            address: field_value(form, values, "address")?.to_string(),
            city: field_value(form, values, "city")?.to_string(),
            zip: field_value(form, values, "zip")?.to_string(),
            facility_type,
            square_footage,
            frequency,
            start_date,
            notes: optional_value(values, "notes").map(str::to_string),
            consent: field_value(form, values, "consent")? == "true",
            estimate: estimate::estimate(Some(square_footage), Some(frequency)),
        })
    }

    fn estimate(&self, values: &BTreeMap<String, String>) -> Option<EstimateBand> {
        let sq_ft = values.get("square_footage").map(String::as_str).unwrap_or("");
        let frequency = values
            .get("frequency")
            .and_then(|raw| match self.descriptor.field("frequency").map(|f| &f.kind) {
                Some(FieldKind::Choice(choices)) => choices.resolve(raw).map(str::to_string),
                _ => None,
            })
            .unwrap_or_default();
        estimate::estimate_from_raw(sq_ft, &frequency)
    }
}
