//! PostgreSQL implementation of TaxonomyStore.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::TaxonomyStore;
use crate::models::{
    CreateVocabulary, NewTaxonomy, Taxonomy, TaxonomyFilter, Term, TermDraft, Vocabulary,
};

const TERM_COLUMNS: &str = "id, title, slug, description, created, updated";
const VOCABULARY_COLUMNS: &str =
    "id, title, alias, description, required, multiple, tags, weight, created, updated";
const TAXONOMY_COLUMNS: &str = "id, parent_id, term_id, vocabulary_id, weight";

/// Taxonomy storage backed by the `terms`, `vocabularies` and `taxonomies`
/// tables.
#[derive(Clone)]
pub struct PgTaxonomyStore {
    pool: PgPool,
}

impl PgTaxonomyStore {
    /// Create a store over a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaxonomyStore for PgTaxonomyStore {
    async fn find_term(&self, id: i64) -> Result<Option<Term>> {
        let term = sqlx::query_as::<_, Term>(&format!(
            "SELECT {TERM_COLUMNS} FROM terms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch term")?;

        Ok(term)
    }

    async fn find_term_by_slug(&self, slug: &str) -> Result<Option<Term>> {
        let term = sqlx::query_as::<_, Term>(&format!(
            "SELECT {TERM_COLUMNS} FROM terms WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch term by slug")?;

        Ok(term)
    }

    async fn find_terms(&self, ids: &[i64]) -> Result<Vec<Term>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let terms = sqlx::query_as::<_, Term>(&format!(
            "SELECT {TERM_COLUMNS} FROM terms WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch terms")?;

        Ok(terms)
    }

    async fn insert_term(&self, draft: &TermDraft) -> Result<Term> {
        let now = Utc::now().timestamp();

        let term = sqlx::query_as::<_, Term>(&format!(
            r#"
            INSERT INTO terms (title, slug, description, created, updated)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TERM_COLUMNS}
            "#
        ))
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(draft.created.unwrap_or(now))
        .bind(draft.updated.unwrap_or(now))
        .fetch_one(&self.pool)
        .await
        .context("failed to insert term")?;

        Ok(term)
    }

    async fn update_term(&self, id: i64, draft: &TermDraft) -> Result<Option<Term>> {
        let now = Utc::now().timestamp();

        let term = sqlx::query_as::<_, Term>(&format!(
            r#"
            UPDATE terms
            SET title = $1, slug = $2, description = $3, updated = $4
            WHERE id = $5
            RETURNING {TERM_COLUMNS}
            "#
        ))
        .bind(&draft.title)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(draft.updated.unwrap_or(now))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to update term")?;

        Ok(term)
    }

    async fn delete_term(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM terms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete term")?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_vocabulary(&self, id: i64) -> Result<Option<Vocabulary>> {
        let vocabulary = sqlx::query_as::<_, Vocabulary>(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM vocabularies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch vocabulary")?;

        Ok(vocabulary)
    }

    async fn find_vocabulary_by_alias(&self, alias: &str) -> Result<Option<Vocabulary>> {
        let vocabulary = sqlx::query_as::<_, Vocabulary>(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM vocabularies WHERE alias = $1"
        ))
        .bind(alias)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch vocabulary by alias")?;

        Ok(vocabulary)
    }

    async fn list_vocabularies(&self) -> Result<Vec<Vocabulary>> {
        let vocabularies = sqlx::query_as::<_, Vocabulary>(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM vocabularies ORDER BY weight, title"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list vocabularies")?;

        Ok(vocabularies)
    }

    async fn insert_vocabulary(&self, input: &CreateVocabulary, now: i64) -> Result<Vocabulary> {
        let vocabulary = sqlx::query_as::<_, Vocabulary>(&format!(
            r#"
            INSERT INTO vocabularies
                (title, alias, description, required, multiple, tags, weight, created, updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {VOCABULARY_COLUMNS}
            "#
        ))
        .bind(&input.title)
        .bind(&input.alias)
        .bind(&input.description)
        .bind(input.required)
        .bind(input.multiple)
        .bind(input.tags)
        .bind(input.weight)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert vocabulary")?;

        Ok(vocabulary)
    }

    async fn delete_vocabulary(&self, id: i64) -> Result<bool> {
        // taxonomies.vocabulary_id cascades
        let result = sqlx::query("DELETE FROM vocabularies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete vocabulary")?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_taxonomy(&self, id: i64) -> Result<Option<Taxonomy>> {
        let taxonomy = sqlx::query_as::<_, Taxonomy>(&format!(
            "SELECT {TAXONOMY_COLUMNS} FROM taxonomies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch taxonomy")?;

        Ok(taxonomy)
    }

    async fn list_taxonomies(&self, vocabulary_id: i64) -> Result<Vec<Taxonomy>> {
        let rows = sqlx::query_as::<_, Taxonomy>(&format!(
            "SELECT {TAXONOMY_COLUMNS} FROM taxonomies WHERE vocabulary_id = $1 ORDER BY weight, id"
        ))
        .bind(vocabulary_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list taxonomies")?;

        Ok(rows)
    }

    async fn count_taxonomies(&self, filter: &TaxonomyFilter) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM taxonomies
            WHERE ($1::BIGINT IS NULL OR term_id = $1)
              AND ($2::BIGINT IS NULL OR vocabulary_id = $2)
              AND ($3::BIGINT IS NULL OR id <> $3)
            "#,
        )
        .bind(filter.term_id)
        .bind(filter.vocabulary_id)
        .bind(filter.exclude_id)
        .fetch_one(&self.pool)
        .await
        .context("failed to count taxonomies")?;

        Ok(count)
    }

    async fn insert_taxonomy(&self, row: &NewTaxonomy) -> Result<Taxonomy> {
        let taxonomy = sqlx::query_as::<_, Taxonomy>(&format!(
            r#"
            INSERT INTO taxonomies (parent_id, term_id, vocabulary_id, weight)
            VALUES ($1, $2, $3, $4)
            RETURNING {TAXONOMY_COLUMNS}
            "#
        ))
        .bind(row.parent_id)
        .bind(row.term_id)
        .bind(row.vocabulary_id)
        .bind(row.weight)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert taxonomy")?;

        Ok(taxonomy)
    }

    async fn update_taxonomy(&self, row: &Taxonomy) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE taxonomies
            SET parent_id = $1, term_id = $2, vocabulary_id = $3, weight = $4
            WHERE id = $5
            "#,
        )
        .bind(row.parent_id)
        .bind(row.term_id)
        .bind(row.vocabulary_id)
        .bind(row.weight)
        .bind(row.id)
        .execute(&self.pool)
        .await
        .context("failed to update taxonomy")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_taxonomies(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM taxonomies WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .context("failed to delete taxonomies")?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }
}
