//! Taxonomy model: the row placing a term into a vocabulary tree.

use serde::{Deserialize, Serialize};

use super::Term;
use crate::tree::TreeNode;

/// A stored taxonomy row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Taxonomy {
    pub id: i64,

    /// Parent row in the same vocabulary (NULL for roots).
    pub parent_id: Option<i64>,

    pub term_id: i64,

    pub vocabulary_id: i64,

    /// Order among siblings.
    pub weight: i32,
}

/// A taxonomy row about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTaxonomy {
    pub parent_id: Option<i64>,
    pub term_id: i64,
    pub vocabulary_id: i64,
    pub weight: i32,
}

/// Conditions for counting taxonomy rows.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyFilter {
    pub term_id: Option<i64>,
    pub vocabulary_id: Option<i64>,
    /// Row to leave out of the count.
    pub exclude_id: Option<i64>,
}

impl TaxonomyFilter {
    /// Rows referencing a term.
    pub fn term(term_id: i64) -> Self {
        Self {
            term_id: Some(term_id),
            ..Self::default()
        }
    }

    /// Restrict to a vocabulary.
    pub fn in_vocabulary(mut self, vocabulary_id: i64) -> Self {
        self.vocabulary_id = Some(vocabulary_id);
        self
    }

    /// Leave one row out.
    pub fn excluding(mut self, taxonomy_id: Option<i64>) -> Self {
        self.exclude_id = taxonomy_id;
        self
    }

    /// Whether `row` satisfies every condition.
    pub fn matches(&self, row: &Taxonomy) -> bool {
        self.term_id.is_none_or(|t| row.term_id == t)
            && self.vocabulary_id.is_none_or(|v| row.vocabulary_id == v)
            && self.exclude_id.is_none_or(|x| row.id != x)
    }
}

impl TreeNode for Taxonomy {
    fn node_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn weight(&self) -> i32 {
        self.weight
    }
}

/// A taxonomy row joined with its term, for tree display.
#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyEntry {
    #[serde(flatten)]
    pub taxonomy: Taxonomy,
    pub term: Term,
}

impl TreeNode for TaxonomyEntry {
    fn node_id(&self) -> i64 {
        self.taxonomy.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.taxonomy.parent_id
    }

    fn weight(&self) -> i32 {
        self.taxonomy.weight
    }
}

/// One line of a flattened vocabulary tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeEntry {
    pub taxonomy_id: i64,
    pub term_id: i64,
    pub title: String,
    pub slug: String,
    pub depth: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn row(id: i64, term_id: i64, vocabulary_id: i64) -> Taxonomy {
        Taxonomy {
            id,
            parent_id: None,
            term_id,
            vocabulary_id,
            weight: 0,
        }
    }

    #[test]
    fn filter_matches_term_and_vocabulary() {
        let filter = TaxonomyFilter::term(1).in_vocabulary(2);
        assert!(filter.matches(&row(10, 1, 2)));
        assert!(!filter.matches(&row(11, 1, 3)));
        assert!(!filter.matches(&row(12, 5, 2)));
    }

    #[test]
    fn filter_excludes_row() {
        let filter = TaxonomyFilter::term(1).in_vocabulary(2).excluding(Some(10));
        assert!(!filter.matches(&row(10, 1, 2)));
        assert!(filter.matches(&row(11, 1, 2)));
    }
}
