//! Wizard step definitions.
//!
//! Steps are data: an ordered list of `InstallStep` values, each carrying a
//! form schema, a display template reference, and the tag selecting its
//! post-validation side effect. New steps are inserted by extending
//! [`default_steps`], not by editing workflow control flow.

mod check;
mod database;
mod email;
mod user;

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Side effect executed after a step validates and its parameters persist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Environment verification, no side effect
    Check,
    /// Database schema provisioning
    Database,
    /// Admin role and user creation
    User,
    /// Mailer settings, no side effect
    Email,
}

/// Input type of one form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Password,
    Integer,
    Email,
    Boolean,
    Choice,
}

/// Schema for one form field
#[derive(Debug, Clone, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    /// Valid values for `FieldKind::Choice` fields
    #[serde(skip_serializing_if = "choices_empty")]
    pub choices: &'static [&'static str],
}

fn choices_empty(choices: &&[&str]) -> bool {
    choices.is_empty()
}

impl FieldSchema {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            default: None,
            choices: &[],
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }
}

/// A validation failure on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// One page of the installation wizard
#[derive(Debug, Clone)]
pub struct InstallStep {
    pub index: usize,
    pub key: &'static str,
    pub title: &'static str,
    /// Display reference consumed by the front-end
    pub template: &'static str,
    pub kind: StepKind,
    pub fields: Vec<FieldSchema>,
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

impl InstallStep {
    /// Effective value of a field: submitted value, else the schema default
    pub fn value<'a>(
        &self,
        field: &FieldSchema,
        payload: &'a BTreeMap<String, String>,
    ) -> Option<&'a str> {
        payload
            .get(field.name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
            .or(field.default)
    }

    /// Bind and validate a submitted payload against the form schema
    pub fn validate(&self, payload: &BTreeMap<String, String>) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for field in &self.fields {
            let Some(value) = self.value(field, payload) else {
                if field.required {
                    errors.push(FieldError::new(field.name, format!("{} is required", field.label)));
                }
                continue;
            };

            match field.kind {
                FieldKind::Integer => {
                    if value.parse::<i64>().is_err() {
                        errors.push(FieldError::new(
                            field.name,
                            format!("{} must be a number", field.label),
                        ));
                    }
                }
                FieldKind::Email => {
                    if !EMAIL_RE.is_match(value) {
                        errors.push(FieldError::new(
                            field.name,
                            format!("{} must be a valid email address", field.label),
                        ));
                    }
                }
                FieldKind::Boolean => {
                    if !matches!(value, "true" | "false" | "1" | "0" | "yes" | "no") {
                        errors.push(FieldError::new(
                            field.name,
                            format!("{} must be a boolean", field.label),
                        ));
                    }
                }
                FieldKind::Choice => {
                    if !field.choices.contains(&value) {
                        errors.push(FieldError::new(
                            field.name,
                            format!("{} must be one of: {}", field.label, field.choices.join(", ")),
                        ));
                    }
                }
                FieldKind::Text | FieldKind::Password => {}
            }
        }

        errors
    }

    /// Configuration parameters this step derives from a valid payload
    pub fn parameters(&self, payload: &BTreeMap<String, String>) -> BTreeMap<String, toml::Value> {
        match self.kind {
            StepKind::Database => database::parameters(self, payload),
            StepKind::Email => email::parameters(self, payload),
            // Check derives nothing; the user step's data is consumed only
            // by its side effect and never written to the settings file
            StepKind::Check | StepKind::User => BTreeMap::new(),
        }
    }
}

/// The ordered step list for a standard installation
pub fn default_steps() -> Vec<InstallStep> {
    vec![
        check::step(0),
        database::step(1),
        user::step(2),
        email::step(3),
    ]
}

pub(crate) fn bool_value(value: &str) -> bool {
    matches!(value, "true" | "1" | "yes")
}
