// Modal form state
// Field values live here between frames; validation mirrors the
// required/maxLength/min constraints of the creation and knowledge forms.

use crate::api::{NewAgentRequest, NewKnowledgeSource};

/// Upper bound for free-text fields
pub const MAX_FIELD_LENGTH: usize = 255;

/// Smallest monthly budget accepted by the creation form
pub const MIN_BUDGET: f64 = 1.0;

/// Model labels offered by the creation form
pub const MODEL_OPTIONS: [&str; 2] = ["GPT 3.5", "GPT 4"];

/// Region value and its label
pub const LOCATION_OPTIONS: [(&str, &str); 2] =
    [("uksouth", "UK South"), ("westeurope", "West Europe")];

/// A validation failure attached to one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Message for `field` from the last submit attempt
pub fn error_for<'a>(errors: &'a [FieldError], field: &str) -> Option<&'a str> {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| e.message.as_str())
}

fn check_text(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    label: &str,
    value: &str,
    max_len: Option<usize>,
) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{} is required", label)));
    } else if let Some(max) = max_len {
        if value.chars().count() > max {
            errors.push(FieldError::new(
                field,
                format!("{} must be at most {} characters", label, max),
            ));
        }
    }
}

/// "Create an agent" modal
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCreationForm {
    pub open: bool,
    pub name: String,
    pub description: String,
    pub model_base: String,
    pub location: String,
    pub owner: String,
    pub owner_email: String,
    pub budget: f64,
    /// Errors from the last submit attempt
    pub errors: Vec<FieldError>,
}

impl Default for AgentCreationForm {
    fn default() -> Self {
        Self {
            open: false,
            name: String::new(),
            description: String::new(),
            model_base: MODEL_OPTIONS[0].to_string(),
            location: LOCATION_OPTIONS[0].0.to_string(),
            owner: String::new(),
            owner_email: String::new(),
            budget: MIN_BUDGET,
            errors: Vec::new(),
        }
    }
}

impl AgentCreationForm {
    /// Check every field, returning the request to send when all pass
    pub fn validate(&self) -> Result<NewAgentRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        check_text(&mut errors, "name", "Name", &self.name, None);
        check_text(
            &mut errors,
            "description",
            "Description",
            &self.description,
            Some(MAX_FIELD_LENGTH),
        );
        check_text(&mut errors, "owner", "Owner", &self.owner, Some(MAX_FIELD_LENGTH));
        check_text(
            &mut errors,
            "owner_email",
            "Owner's email",
            &self.owner_email,
            Some(MAX_FIELD_LENGTH),
        );
        if !self.owner_email.trim().is_empty() && !self.owner_email.contains('@') {
            errors.push(FieldError::new(
                "owner_email",
                "Owner's email must contain '@'",
            ));
        }
        if !MODEL_OPTIONS.contains(&self.model_base.as_str()) {
            errors.push(FieldError::new("model_base", "Choose a model"));
        }
        if !LOCATION_OPTIONS
            .iter()
            .any(|(value, _)| *value == self.location)
        {
            errors.push(FieldError::new("location", "Choose a location"));
        }
        if !self.budget.is_finite() || self.budget < MIN_BUDGET {
            errors.push(FieldError::new(
                "budget",
                format!("Budget must be at least {:.2}", MIN_BUDGET),
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewAgentRequest {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            owner: self.owner.trim().to_string(),
            owner_email: self.owner_email.trim().to_string(),
            model_base: self.model_base.clone(),
            location: self.location.clone(),
            // step 0.01
            budget: (self.budget * 100.0).round() / 100.0,
        })
    }

    /// Validate and, on success, clear the fields and close the modal
    pub fn submit(&mut self) -> Option<NewAgentRequest> {
        match self.validate() {
            Ok(request) => {
                *self = Self::default();
                Some(request)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }
}

/// "Add a knowledge source" modal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeSourceForm {
    pub open: bool,
    pub name: String,
    /// File path or URL
    pub source: String,
    pub errors: Vec<FieldError>,
}

impl KnowledgeSourceForm {
    pub fn validate(&self) -> Result<NewKnowledgeSource, Vec<FieldError>> {
        let mut errors = Vec::new();
        check_text(&mut errors, "name", "Name", &self.name, Some(MAX_FIELD_LENGTH));
        if !errors.is_empty() {
            return Err(errors);
        }

        let source = self.source.trim();
        Ok(NewKnowledgeSource {
            name: self.name.trim().to_string(),
            source: (!source.is_empty()).then(|| source.to_string()),
        })
    }

    /// Validate, then reset the fields and close the modal
    pub fn submit(&mut self) -> Option<NewKnowledgeSource> {
        match self.validate() {
            Ok(source) => {
                *self = Self::default();
                Some(source)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }
}
