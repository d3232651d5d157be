//! Term model: a single taxonomy label identified by its slug.

use serde::{Deserialize, Serialize};

/// A stored term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Term {
    /// Row id.
    pub id: i64,

    /// Human-readable label.
    pub title: String,

    /// Unique machine identifier.
    pub slug: String,

    /// Optional description.
    pub description: Option<String>,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last updated.
    pub updated: i64,
}

/// A term about to be written.
///
/// `id` is set when the draft edits an existing row. Timestamps are filled
/// in by the `Model.beforeSave` listeners.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermDraft {
    pub id: Option<i64>,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub updated: Option<i64>,
}

impl TermDraft {
    /// Draft for a new term.
    pub fn new(title: &str, slug: &str) -> Self {
        Self {
            title: title.to_string(),
            slug: slug.to_string(),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Whether the draft creates a new row.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

impl From<&Term> for TermDraft {
    fn from(term: &Term) -> Self {
        Self {
            id: Some(term.id),
            title: term.title.clone(),
            slug: term.slug.clone(),
            description: term.description.clone(),
            created: Some(term.created),
            updated: Some(term.updated),
        }
    }
}

/// Input for placing a (possibly new) term into a vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct AddTerm {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    /// Parent taxonomy row within the target vocabulary.
    pub parent_id: Option<i64>,
}

/// Input for editing a term and its placement.
#[derive(Debug, Clone, Deserialize)]
pub struct EditTerm {
    /// Term being edited.
    pub term_id: i64,
    /// Taxonomy row being moved or re-parented.
    pub taxonomy_id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
}

impl AddTerm {
    pub(crate) fn draft(&self) -> TermDraft {
        TermDraft {
            id: None,
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            created: None,
            updated: None,
        }
    }
}

impl EditTerm {
    pub(crate) fn draft(&self, current: &Term) -> TermDraft {
        TermDraft {
            id: Some(self.term_id),
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            created: Some(current.created),
            updated: Some(current.updated),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn draft_from_term_keeps_identity() {
        let term = Term {
            id: 4,
            title: "Rust".to_string(),
            slug: "rust".to_string(),
            description: None,
            created: 100,
            updated: 200,
        };

        let draft = TermDraft::from(&term);
        assert_eq!(draft.id, Some(4));
        assert!(!draft.is_new());
        assert_eq!(draft.created, Some(100));
    }

    #[test]
    fn add_term_deserializes_without_parent() {
        let input: AddTerm =
            serde_json::from_str(r#"{"title": "Go", "slug": "go", "description": null}"#).unwrap();
        assert!(input.parent_id.is_none());
        assert!(input.draft().is_new());
    }
}
