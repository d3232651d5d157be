//! Vocabulary model: a named collection of terms.

use serde::{Deserialize, Serialize};

/// A stored vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vocabulary {
    pub id: i64,

    /// Human-readable label.
    pub title: String,

    /// Unique machine name (e.g. "categories", "tags").
    pub alias: String,

    pub description: Option<String>,

    /// Content must pick at least one term.
    pub required: bool,

    /// Content may pick more than one term.
    pub multiple: bool,

    /// Terms are entered as free tags.
    pub tags: bool,

    /// Sort weight.
    pub weight: i32,

    pub created: i64,
    pub updated: i64,
}

/// Input for creating a vocabulary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVocabulary {
    pub title: String,
    pub alias: String,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub tags: bool,
    #[serde(default)]
    pub weight: i32,
}

impl CreateVocabulary {
    /// Minimal input.
    pub fn new(title: &str, alias: &str) -> Self {
        Self {
            title: title.to_string(),
            alias: alias.to_string(),
            ..Self::default()
        }
    }
}
