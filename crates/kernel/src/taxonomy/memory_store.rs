//! In-process implementation of TaxonomyStore.
//!
//! Used when no database is configured and by the test suite. Mirrors the
//! PostgreSQL schema's constraints: unique slugs and aliases, terms that
//! cannot be deleted while referenced, and vocabulary deletes that cascade
//! to taxonomy rows.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::TaxonomyStore;
use crate::models::{
    CreateVocabulary, NewTaxonomy, Taxonomy, TaxonomyFilter, Term, TermDraft, Vocabulary,
};

#[derive(Debug, Default)]
struct Tables {
    terms: BTreeMap<i64, Term>,
    vocabularies: BTreeMap<i64, Vocabulary>,
    taxonomies: BTreeMap<i64, Taxonomy>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Taxonomy storage held in memory.
#[derive(Debug, Default)]
pub struct MemoryTaxonomyStore {
    tables: RwLock<Tables>,
}

impl MemoryTaxonomyStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored terms.
    pub fn term_count(&self) -> usize {
        self.tables.read().terms.len()
    }

    /// Number of stored taxonomy rows across all vocabularies.
    pub fn taxonomy_count(&self) -> usize {
        self.tables.read().taxonomies.len()
    }
}

#[async_trait]
impl TaxonomyStore for MemoryTaxonomyStore {
    async fn find_term(&self, id: i64) -> Result<Option<Term>> {
        Ok(self.tables.read().terms.get(&id).cloned())
    }

    async fn find_term_by_slug(&self, slug: &str) -> Result<Option<Term>> {
        Ok(self
            .tables
            .read()
            .terms
            .values()
            .find(|t| t.slug == slug)
            .cloned())
    }

    async fn find_terms(&self, ids: &[i64]) -> Result<Vec<Term>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.terms.get(id).cloned())
            .collect())
    }

    async fn insert_term(&self, draft: &TermDraft) -> Result<Term> {
        let mut tables = self.tables.write();
        if tables.terms.values().any(|t| t.slug == draft.slug) {
            bail!("duplicate term slug '{}'", draft.slug);
        }

        let now = Utc::now().timestamp();
        let id = tables.next_id();
        let term = Term {
            id,
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            created: draft.created.unwrap_or(now),
            updated: draft.updated.unwrap_or(now),
        };
        tables.terms.insert(id, term.clone());
        Ok(term)
    }

    async fn update_term(&self, id: i64, draft: &TermDraft) -> Result<Option<Term>> {
        let mut tables = self.tables.write();
        if tables
            .terms
            .values()
            .any(|t| t.id != id && t.slug == draft.slug)
        {
            bail!("duplicate term slug '{}'", draft.slug);
        }

        let Some(term) = tables.terms.get_mut(&id) else {
            return Ok(None);
        };
        term.title = draft.title.clone();
        term.slug = draft.slug.clone();
        term.description = draft.description.clone();
        term.updated = draft.updated.unwrap_or_else(|| Utc::now().timestamp());
        Ok(Some(term.clone()))
    }

    async fn delete_term(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.write();
        if tables.taxonomies.values().any(|t| t.term_id == id) {
            bail!("term {id} is still referenced by taxonomy rows");
        }
        Ok(tables.terms.remove(&id).is_some())
    }

    async fn find_vocabulary(&self, id: i64) -> Result<Option<Vocabulary>> {
        Ok(self.tables.read().vocabularies.get(&id).cloned())
    }

    async fn find_vocabulary_by_alias(&self, alias: &str) -> Result<Option<Vocabulary>> {
        Ok(self
            .tables
            .read()
            .vocabularies
            .values()
            .find(|v| v.alias == alias)
            .cloned())
    }

    async fn list_vocabularies(&self) -> Result<Vec<Vocabulary>> {
        let mut vocabularies: Vec<Vocabulary> =
            self.tables.read().vocabularies.values().cloned().collect();
        vocabularies.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.title.cmp(&b.title)));
        Ok(vocabularies)
    }

    async fn insert_vocabulary(&self, input: &CreateVocabulary, now: i64) -> Result<Vocabulary> {
        let mut tables = self.tables.write();
        if tables.vocabularies.values().any(|v| v.alias == input.alias) {
            bail!("duplicate vocabulary alias '{}'", input.alias);
        }

        let id = tables.next_id();
        let vocabulary = Vocabulary {
            id,
            title: input.title.clone(),
            alias: input.alias.clone(),
            description: input.description.clone(),
            required: input.required,
            multiple: input.multiple,
            tags: input.tags,
            weight: input.weight,
            created: now,
            updated: now,
        };
        tables.vocabularies.insert(id, vocabulary.clone());
        Ok(vocabulary)
    }

    async fn delete_vocabulary(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.write();
        let removed = tables.vocabularies.remove(&id).is_some();
        if removed {
            tables.taxonomies.retain(|_, t| t.vocabulary_id != id);
        }
        Ok(removed)
    }

    async fn find_taxonomy(&self, id: i64) -> Result<Option<Taxonomy>> {
        Ok(self.tables.read().taxonomies.get(&id).cloned())
    }

    async fn list_taxonomies(&self, vocabulary_id: i64) -> Result<Vec<Taxonomy>> {
        let mut rows: Vec<Taxonomy> = self
            .tables
            .read()
            .taxonomies
            .values()
            .filter(|t| t.vocabulary_id == vocabulary_id)
            .cloned()
            .collect();
        rows.sort_by_key(|t| (t.weight, t.id));
        Ok(rows)
    }

    async fn count_taxonomies(&self, filter: &TaxonomyFilter) -> Result<i64> {
        let count = self
            .tables
            .read()
            .taxonomies
            .values()
            .filter(|t| filter.matches(t))
            .count();
        Ok(i64::try_from(count)?)
    }

    async fn insert_taxonomy(&self, row: &NewTaxonomy) -> Result<Taxonomy> {
        let mut tables = self.tables.write();
        if !tables.terms.contains_key(&row.term_id) {
            bail!("taxonomy references missing term {}", row.term_id);
        }
        if !tables.vocabularies.contains_key(&row.vocabulary_id) {
            bail!("taxonomy references missing vocabulary {}", row.vocabulary_id);
        }

        let id = tables.next_id();
        let taxonomy = Taxonomy {
            id,
            parent_id: row.parent_id,
            term_id: row.term_id,
            vocabulary_id: row.vocabulary_id,
            weight: row.weight,
        };
        tables.taxonomies.insert(id, taxonomy.clone());
        Ok(taxonomy)
    }

    async fn update_taxonomy(&self, row: &Taxonomy) -> Result<bool> {
        let mut tables = self.tables.write();
        let Some(existing) = tables.taxonomies.get_mut(&row.id) else {
            return Ok(false);
        };
        *existing = row.clone();
        Ok(true)
    }

    async fn delete_taxonomies(&self, ids: &[i64]) -> Result<u64> {
        let mut tables = self.tables.write();
        let removed = ids
            .iter()
            .filter(|id| tables.taxonomies.remove(*id).is_some())
            .count();
        Ok(u64::try_from(removed)?)
    }
}
