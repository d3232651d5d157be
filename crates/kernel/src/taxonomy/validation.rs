//! Field-level validation errors for terms and vocabularies.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::models::{CreateVocabulary, TermDraft};

/// Messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// No errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: &str, message: &str) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Single-error convenience constructor.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages for one field.
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a field has any message.
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Blank means empty after trimming.
fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Rules every term draft must satisfy before it reaches storage.
pub fn validate_term(draft: &TermDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if is_blank(&draft.title) {
        errors.add("title", "The title cannot be empty");
    }
    if is_blank(&draft.slug) {
        errors.add("slug", "The slug cannot be empty");
    }
    errors
}

/// Rules for a new vocabulary. Alias uniqueness is checked by the service.
pub fn validate_vocabulary(input: &CreateVocabulary) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if is_blank(&input.title) {
        errors.add("title", "The title cannot be empty");
    }
    if is_blank(&input.alias) {
        errors.add("alias", "The alias cannot be empty");
    } else if !is_machine_name(&input.alias) {
        errors.add(
            "alias",
            "The alias may only contain lowercase letters, digits, underscores and hyphens",
        );
    }
    errors
}

fn is_machine_name(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
