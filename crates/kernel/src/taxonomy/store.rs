//! Storage abstraction for terms, vocabularies and taxonomy rows.
//!
//! All persistence for the taxonomy service goes through [`TaxonomyStore`].
//! [`PgTaxonomyStore`](super::PgTaxonomyStore) talks to PostgreSQL;
//! [`MemoryTaxonomyStore`](super::MemoryTaxonomyStore) keeps rows in process.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    CreateVocabulary, NewTaxonomy, Taxonomy, TaxonomyFilter, Term, TermDraft, Vocabulary,
};

/// Row-level storage used by [`TaxonomyService`](super::TaxonomyService).
///
/// Implementations only store and fetch. Uniqueness of slugs and aliases is
/// enforced here as a last line; every other rule lives in the service.
#[async_trait]
pub trait TaxonomyStore: Send + Sync {
    // ---- terms ----

    async fn find_term(&self, id: i64) -> Result<Option<Term>>;

    async fn find_term_by_slug(&self, slug: &str) -> Result<Option<Term>>;

    /// Terms with the given ids, in no particular order.
    async fn find_terms(&self, ids: &[i64]) -> Result<Vec<Term>>;

    /// Insert a term. Fails when the slug is taken.
    async fn insert_term(&self, draft: &TermDraft) -> Result<Term>;

    /// Overwrite title, slug, description and `updated` of a term.
    ///
    /// Returns `None` when no row has that id.
    async fn update_term(&self, id: i64, draft: &TermDraft) -> Result<Option<Term>>;

    /// Delete a term. Returns whether a row was removed.
    async fn delete_term(&self, id: i64) -> Result<bool>;

    // ---- vocabularies ----

    async fn find_vocabulary(&self, id: i64) -> Result<Option<Vocabulary>>;

    async fn find_vocabulary_by_alias(&self, alias: &str) -> Result<Option<Vocabulary>>;

    /// All vocabularies ordered by weight, then title.
    async fn list_vocabularies(&self) -> Result<Vec<Vocabulary>>;

    /// Insert a vocabulary. Fails when the alias is taken.
    async fn insert_vocabulary(&self, input: &CreateVocabulary, now: i64) -> Result<Vocabulary>;

    /// Delete a vocabulary and its taxonomy rows.
    async fn delete_vocabulary(&self, id: i64) -> Result<bool>;

    // ---- taxonomy rows ----

    async fn find_taxonomy(&self, id: i64) -> Result<Option<Taxonomy>>;

    /// Every row of one vocabulary.
    async fn list_taxonomies(&self, vocabulary_id: i64) -> Result<Vec<Taxonomy>>;

    async fn count_taxonomies(&self, filter: &TaxonomyFilter) -> Result<i64>;

    async fn insert_taxonomy(&self, row: &NewTaxonomy) -> Result<Taxonomy>;

    /// Overwrite parent, term, vocabulary and weight of an existing row.
    async fn update_taxonomy(&self, row: &Taxonomy) -> Result<bool>;

    /// Delete rows by id. Returns the number removed.
    async fn delete_taxonomies(&self, ids: &[i64]) -> Result<u64>;

    // ---- health ----

    /// Whether the backing store answers.
    async fn ping(&self) -> bool {
        true
    }
}
