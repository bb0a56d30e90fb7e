//! Form descriptors and the step gate.
//!
//! A descriptor holds one full schema. Each step owns a subset of its fields;
//! `validate_step` runs only that subset so visitors are not nagged about
//! fields they have not reached, while `validate_all` runs the whole schema
//! before anything leaves the machine.

use std::collections::{BTreeMap, HashSet};

use crate::errors::{FieldError, WizardError};
use crate::forms::validation::FieldDescriptor;

/// One page of a wizard. Numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub number: usize,
    pub title: &'static str,
    pub fields: Vec<&'static str>,
}

impl StepDefinition {
    pub fn new(number: usize, title: &'static str, fields: Vec<&'static str>) -> Self {
        Self {
            number,
            title,
            fields,
        }
    }
}

/// Metadata describing a full wizard: every field plus the step layout.
pub struct FormDescriptor {
    pub name: &'static str,
    pub fields: Vec<FieldDescriptor>,
    pub steps: Vec<StepDefinition>,
}

impl FormDescriptor {
    pub fn new(
        name: &'static str,
        fields: Vec<FieldDescriptor>,
        steps: Vec<StepDefinition>,
    ) -> Self {
        Self {
            name,
            fields,
            steps,
        }
    }

    /// Structural check: contiguous step numbers, known keys, and every
    /// visible field owned by exactly one step.
    pub fn check(&self) -> Result<(), WizardError> {
        let invalid = |reason: String| WizardError::InvalidDescriptor {
            form: self.name,
            reason,
        };

        if self.steps.is_empty() {
            return Err(invalid("no steps declared".into()));
        }

        let mut owned = HashSet::new();
        for (idx, step) in self.steps.iter().enumerate() {
            if step.number != idx + 1 {
                return Err(invalid(format!(
                    "step numbers must run 1..={} in order, found {} at position {}",
                    self.steps.len(),
                    step.number,
                    idx + 1
                )));
            }
            for key in &step.fields {
                let Some(field) = self.field(key) else {
                    return Err(invalid(format!(
                        "step {} references unknown field `{}`",
                        step.number, key
                    )));
                };
                if field.hidden {
                    return Err(invalid(format!("hidden field `{}` cannot own a step", key)));
                }
                if !owned.insert(*key) {
                    return Err(invalid(format!("field `{}` appears in two steps", key)));
                }
            }
        }

        if let Some(orphan) = self
            .fields
            .iter()
            .find(|field| !field.hidden && !owned.contains(field.key))
        {
            return Err(invalid(format!("field `{}` belongs to no step", orphan.key)));
        }

        Ok(())
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, number: usize) -> Option<&StepDefinition> {
        number
            .checked_sub(1)
            .and_then(|index| self.steps.get(index))
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Visible fields owned by a step, in declaration order of the step.
    pub fn step_fields(&self, number: usize) -> Result<Vec<&FieldDescriptor>, WizardError> {
        let step = self.step(number).ok_or(WizardError::UnknownStep(number))?;
        Ok(step
            .fields
            .iter()
            .filter_map(|key| self.field(key))
            .collect())
    }

    /// Step that owns a field, if any.
    pub fn owning_step(&self, key: &str) -> Option<usize> {
        self.steps
            .iter()
            .find(|step| step.fields.iter().any(|owned| *owned == key))
            .map(|step| step.number)
    }

    /// Key of the hidden spam-trap field, if the form declares one.
    pub fn honeypot_key(&self) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|field| field.hidden)
            .map(|field| field.key)
    }

    /// Step gate: validates only the fields owned by `number`.
    pub fn validate_step(
        &self,
        number: usize,
        values: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<&'static str, String>, WizardError> {
        let fields = self.step_fields(number)?;
        validate_fields(fields, values).map_err(|errors| WizardError::StepIncomplete {
            step: number,
            errors,
        })
    }

    /// Whole-form check run before submission.
    pub fn validate_all(
        &self,
        values: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<&'static str, String>, WizardError> {
        let fields = self.fields.iter().filter(|field| !field.hidden).collect();
        validate_fields(fields, values).map_err(|errors| WizardError::FormInvalid { errors })
    }
}

fn validate_fields(
    fields: Vec<&FieldDescriptor>,
    values: &BTreeMap<String, String>,
) -> Result<BTreeMap<&'static str, String>, Vec<FieldError>> {
    let mut normalized = BTreeMap::new();
    let mut errors = Vec::new();

    for field in fields {
        let raw = values.get(field.key).map(String::as_str).unwrap_or("");
        match field.check(raw) {
            Ok(value) => {
                normalized.insert(field.key, value);
            }
            Err(err) => errors.push(FieldError {
                key: field.key,
                label: field.label,
                message: err.message,
            }),
        }
    }

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::validation::{min_length, FieldKind, Validator};

    fn descriptor(steps: Vec<StepDefinition>) -> FormDescriptor {
        FormDescriptor::new(
            "test",
            vec![
                FieldDescriptor::new("name", "Name", FieldKind::Text, min_length(2, "Name is required")),
                FieldDescriptor::new("city", "City", FieldKind::Text, min_length(2, "City is required")),
                FieldDescriptor::honeypot("website"),
            ],
            steps,
        )
    }

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn check_accepts_well_formed_layout() {
        let form = descriptor(vec![
            StepDefinition::new(1, "One", vec!["name"]),
            StepDefinition::new(2, "Two", vec!["city"]),
        ]);
        assert!(form.check().is_ok());
        assert_eq!(form.honeypot_key(), Some("website"));
        assert_eq!(form.owning_step("city"), Some(2));
    }

    #[test]
    fn check_rejects_gaps_unknown_keys_and_orphans() {
        let gap = descriptor(vec![
            StepDefinition::new(1, "One", vec!["name"]),
            StepDefinition::new(3, "Three", vec!["city"]),
        ]);
        assert!(matches!(gap.check(), Err(WizardError::InvalidDescriptor { .. })));

        let unknown = descriptor(vec![StepDefinition::new(1, "One", vec!["name", "zip"])]);
        assert!(unknown.check().is_err());

        let orphan = descriptor(vec![StepDefinition::new(1, "One", vec!["name"])]);
        assert!(orphan.check().is_err());

        let hidden = descriptor(vec![StepDefinition::new(1, "One", vec!["name", "city", "website"])]);
        assert!(hidden.check().is_err());
    }

    #[test]
    fn step_gate_ignores_other_steps() {
        let form = descriptor(vec![
            StepDefinition::new(1, "One", vec!["name"]),
            StepDefinition::new(2, "Two", vec!["city"]),
        ]);
        let data = values(&[("name", "Jo"), ("city", "")]);

        let passed = form.validate_step(1, &data).unwrap();
        assert_eq!(passed.get("name").map(String::as_str), Some("Jo"));

        let err = form.validate_step(2, &data).unwrap_err();
        assert_eq!(
            err,
            WizardError::StepIncomplete {
                step: 2,
                errors: vec![FieldError {
                    key: "city",
                    label: "City",
                    message: "City is required".into(),
                }],
            }
        );
    }

    #[test]
    fn gate_passes_iff_every_owned_field_passes() {
        let form = descriptor(vec![StepDefinition::new(1, "One", vec!["name", "city"])]);
        for (name, city) in [("Jo", "Austin"), ("", "Austin"), ("Jo", "A"), ("", "")] {
            let data = values(&[("name", name), ("city", city)]);
            let expected = form.field("name").unwrap().check(name).is_ok()
                && form.field("city").unwrap().check(city).is_ok();
            assert_eq!(form.validate_step(1, &data).is_ok(), expected, "{name:?}/{city:?}");
        }
    }

    #[test]
    fn validate_all_skips_hidden_fields() {
        let form = FormDescriptor::new(
            "test",
            vec![
                FieldDescriptor::new("name", "Name", FieldKind::Text, Validator::None),
                FieldDescriptor::honeypot("website"),
            ],
            vec![StepDefinition::new(1, "One", vec!["name"])],
        );
        let data = values(&[("name", "Jo"), ("website", "spam")]);
        let normalized = form.validate_all(&data).unwrap();
        assert!(!normalized.contains_key("website"));
    }

    #[test]
    fn unknown_step_is_reported() {
        let form = descriptor(vec![StepDefinition::new(1, "One", vec!["name", "city"])]);
        assert_eq!(
            form.validate_step(4, &BTreeMap::new()).unwrap_err(),
            WizardError::UnknownStep(4)
        );
        assert!(form.step(0).is_none());
    }
}
