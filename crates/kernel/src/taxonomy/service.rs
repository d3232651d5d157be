//! Term and vocabulary management.
//!
//! Terms are identified by slug and shared between vocabularies. Placing a
//! term into a vocabulary creates a taxonomy row; the rows of one vocabulary
//! form a tree that no operation here ever mixes with another vocabulary's.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use super::TaxonomyStore;
use super::behaviors::TimestampBehavior;
use super::validation::{ValidationErrors, validate_term, validate_vocabulary};
use crate::event::{EventManager, names};
use crate::models::{
    AddTerm, CreateVocabulary, EditTerm, NewTaxonomy, Taxonomy, TaxonomyEntry, TaxonomyFilter,
    Term, TermDraft, TreeEntry, Vocabulary,
};
use crate::tree::{self, Threaded};

/// Table name reported in model event data.
const TERMS_TABLE: &str = "Taxonomy.Terms";

/// Result of `add` / `edit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// The term was placed; carries the written taxonomy row.
    Saved(Taxonomy),
    /// The term already sits in the target vocabulary.
    AlreadyInVocabulary { term_id: i64 },
    /// An edit tried to take a slug owned by another term.
    SlugTaken,
    /// Input failed validation.
    Invalid(ValidationErrors),
    /// The term or taxonomy row being edited does not exist.
    NotFound,
    /// A `Model.beforeSave` listener stopped the save.
    Aborted,
}

impl SaveOutcome {
    /// Whether a taxonomy row was written.
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    /// The written row, if any.
    pub fn taxonomy(&self) -> Option<&Taxonomy> {
        match self {
            Self::Saved(t) => Some(t),
            _ => None,
        }
    }
}

/// Result of `create_vocabulary`.
#[derive(Debug, Clone, PartialEq)]
pub enum VocabularyOutcome {
    Created(Vocabulary),
    Invalid(ValidationErrors),
}

/// Options for [`TaxonomyService::find_by_vocabulary`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub vocabulary_id: Option<i64>,
}

impl FindOptions {
    pub fn vocabulary(vocabulary_id: i64) -> Self {
        Self {
            vocabulary_id: Some(vocabulary_id),
        }
    }
}

/// Service for terms, vocabularies and their taxonomy trees.
pub struct TaxonomyService {
    store: Arc<dyn TaxonomyStore>,
    events: EventManager<TermDraft>,
    /// Cache: vocabulary id -> vocabulary
    vocabulary_cache: DashMap<i64, Vocabulary>,
}

impl TaxonomyService {
    /// Create a service with only the built-in model listeners.
    pub fn new(store: Arc<dyn TaxonomyStore>) -> Arc<Self> {
        Self::with_events(store, EventManager::new())
    }

    /// Create a service with extra model listeners already attached.
    pub fn with_events(
        store: Arc<dyn TaxonomyStore>,
        mut events: EventManager<TermDraft>,
    ) -> Arc<Self> {
        events.on(Arc::new(TimestampBehavior));
        Arc::new(Self {
            store,
            events,
            vocabulary_cache: DashMap::new(),
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn TaxonomyStore> {
        &self.store
    }

    // -------------------------------------------------------------------------
    // Vocabulary operations
    // -------------------------------------------------------------------------

    /// Create a vocabulary.
    pub async fn create_vocabulary(&self, input: CreateVocabulary) -> Result<VocabularyOutcome> {
        let mut errors = validate_vocabulary(&input);
        if errors.is_empty()
            && self
                .store
                .find_vocabulary_by_alias(&input.alias)
                .await?
                .is_some()
        {
            errors.add("alias", "That alias is already taken");
        }
        if !errors.is_empty() {
            return Ok(VocabularyOutcome::Invalid(errors));
        }

        let vocabulary = self
            .store
            .insert_vocabulary(&input, Utc::now().timestamp())
            .await?;
        self.vocabulary_cache
            .insert(vocabulary.id, vocabulary.clone());
        info!(vocabulary_id = vocabulary.id, alias = %vocabulary.alias, "vocabulary created");
        Ok(VocabularyOutcome::Created(vocabulary))
    }

    /// Get a vocabulary by id, with caching.
    pub async fn vocabulary(&self, id: i64) -> Result<Option<Vocabulary>> {
        if let Some(vocabulary) = self.vocabulary_cache.get(&id) {
            return Ok(Some(vocabulary.clone()));
        }

        let vocabulary = self.store.find_vocabulary(id).await?;
        if let Some(ref v) = vocabulary {
            self.vocabulary_cache.insert(id, v.clone());
        }
        Ok(vocabulary)
    }

    /// Get a vocabulary by alias.
    pub async fn vocabulary_by_alias(&self, alias: &str) -> Result<Option<Vocabulary>> {
        let vocabulary = self.store.find_vocabulary_by_alias(alias).await?;
        if let Some(ref v) = vocabulary {
            self.vocabulary_cache.insert(v.id, v.clone());
        }
        Ok(vocabulary)
    }

    /// List all vocabularies.
    pub async fn vocabularies(&self) -> Result<Vec<Vocabulary>> {
        self.store.list_vocabularies().await
    }

    /// Delete a vocabulary and every taxonomy row in it.
    ///
    /// Terms stay; they can be deleted once nothing references them.
    pub async fn delete_vocabulary(&self, id: i64) -> Result<bool> {
        let deleted = self.store.delete_vocabulary(id).await?;
        self.vocabulary_cache.remove(&id);
        if deleted {
            info!(vocabulary_id = id, "vocabulary deleted");
        }
        Ok(deleted)
    }

    // -------------------------------------------------------------------------
    // Term lookups
    // -------------------------------------------------------------------------

    /// Get a term by id.
    pub async fn term(&self, id: i64) -> Result<Option<Term>> {
        self.store.find_term(id).await
    }

    /// Whether any term has `slug`.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.store.find_term_by_slug(slug).await?.is_some())
    }

    /// Whether the term already sits in the vocabulary, ignoring `exclude`.
    pub async fn is_in_vocabulary(
        &self,
        term_id: i64,
        vocabulary_id: i64,
        exclude: Option<i64>,
    ) -> Result<bool> {
        let filter = TaxonomyFilter::term(term_id)
            .in_vocabulary(vocabulary_id)
            .excluding(exclude);
        Ok(self.store.count_taxonomies(&filter).await? > 0)
    }

    /// The term's taxonomy row in a vocabulary.
    pub async fn taxonomy_for(&self, term_id: i64, vocabulary_id: i64) -> Result<Option<Taxonomy>> {
        Ok(self
            .store
            .list_taxonomies(vocabulary_id)
            .await?
            .into_iter()
            .find(|t| t.term_id == term_id))
    }

    // -------------------------------------------------------------------------
    // Term writes
    // -------------------------------------------------------------------------

    /// Save a term and return its id.
    ///
    /// When another term already has the draft's slug, its id is returned
    /// instead of inserting a duplicate. That term is rewritten only when the
    /// draft brings a new description, or when the draft is that very term.
    /// Returns `None` when a `Model.beforeSave` listener aborts.
    pub async fn save_and_get_id(&self, mut draft: TermDraft) -> Result<Option<i64>> {
        if let Some(existing) = self.store.find_term_by_slug(&draft.slug).await? {
            let same_row = draft.id == Some(existing.id);
            let changed = if same_row {
                draft.title != existing.title || draft.description != existing.description
            } else {
                draft.description.is_some() && draft.description != existing.description
            };

            if changed {
                draft.id = Some(existing.id);
                draft.created = Some(existing.created);
                if !self.before_save(&mut draft) {
                    return Ok(None);
                }
                self.store.update_term(existing.id, &draft).await?;
                self.after_save(&mut draft, false);
            } else {
                debug!(term_id = existing.id, slug = %existing.slug, "reusing term with same slug");
            }
            return Ok(Some(existing.id));
        }

        if !self.before_save(&mut draft) {
            return Ok(None);
        }

        let updated = match draft.id {
            Some(id) => self.store.update_term(id, &draft).await?,
            None => None,
        };
        let (term, created) = match updated {
            Some(term) => (term, false),
            None => (self.store.insert_term(&draft).await?, true),
        };

        draft.id = Some(term.id);
        self.after_save(&mut draft, created);
        if created {
            info!(term_id = term.id, slug = %term.slug, "term created");
        }
        Ok(Some(term.id))
    }

    /// Place a term into a vocabulary, creating the term when its slug is new.
    pub async fn add(&self, input: &AddTerm, vocabulary_id: i64) -> Result<SaveOutcome> {
        let draft = input.draft();
        let errors = validate_term(&draft);
        if !errors.is_empty() {
            return Ok(SaveOutcome::Invalid(errors));
        }
        if let Some(errors) = self
            .check_placement(vocabulary_id, input.parent_id, None)
            .await?
        {
            return Ok(SaveOutcome::Invalid(errors));
        }

        self.save(draft, vocabulary_id, None, input.parent_id).await
    }

    /// Edit a term and move its taxonomy row, possibly into another
    /// vocabulary.
    pub async fn edit(&self, input: &EditTerm, vocabulary_id: i64) -> Result<SaveOutcome> {
        let Some(current) = self.store.find_term(input.term_id).await? else {
            return Ok(SaveOutcome::NotFound);
        };
        let Some(taxonomy) = self
            .store
            .find_taxonomy(input.taxonomy_id)
            .await?
            .filter(|t| t.term_id == current.id)
        else {
            return Ok(SaveOutcome::NotFound);
        };

        let draft = input.draft(&current);
        let errors = validate_term(&draft);
        if !errors.is_empty() {
            return Ok(SaveOutcome::Invalid(errors));
        }

        if draft.slug != current.slug && self.slug_exists(&draft.slug).await? {
            debug!(term_id = current.id, slug = %draft.slug, "edit rejected: slug taken");
            return Ok(SaveOutcome::SlugTaken);
        }

        if let Some(errors) = self
            .check_placement(vocabulary_id, input.parent_id, Some(taxonomy.id))
            .await?
        {
            return Ok(SaveOutcome::Invalid(errors));
        }

        self.save(draft, vocabulary_id, Some(taxonomy.id), input.parent_id)
            .await
    }

    /// Delete a term.
    ///
    /// Refused (returns `false`) while any taxonomy row references the term.
    pub async fn delete(&self, term_id: i64) -> Result<bool> {
        let references = self
            .store
            .count_taxonomies(&TaxonomyFilter::term(term_id))
            .await?;
        if references > 0 {
            debug!(term_id, references, "term delete refused: still placed in vocabularies");
            return Ok(false);
        }

        let Some(term) = self.store.find_term(term_id).await? else {
            return Ok(false);
        };

        let mut draft = TermDraft::from(&term);
        let outcome = self
            .events
            .dispatch(names::MODEL_BEFORE_DELETE, &mut draft, event_data());
        if outcome.stopped {
            debug!(term_id, "term delete stopped by listener");
            return Ok(false);
        }

        let deleted = self.store.delete_term(term_id).await?;
        if deleted {
            self.events
                .dispatch(names::MODEL_AFTER_DELETE, &mut draft, event_data());
            info!(term_id, slug = %term.slug, "term deleted");
        }
        Ok(deleted)
    }

    /// Take a term out of a vocabulary and then delete it.
    ///
    /// The term's taxonomy row goes together with every row below it. The
    /// term itself is only deleted when no other vocabulary still uses it;
    /// the result is `true` only when both steps succeeded.
    pub async fn remove(&self, term_id: i64, vocabulary_id: i64) -> Result<bool> {
        let rows = self.store.list_taxonomies(vocabulary_id).await?;
        let Some(row) = rows.iter().find(|t| t.term_id == term_id) else {
            return Ok(false);
        };

        let mut ids = vec![row.id];
        ids.extend(tree::descendant_ids(&rows, row.id));
        let removed = self.store.delete_taxonomies(&ids).await? > 0;
        debug!(term_id, vocabulary_id, rows = ids.len(), "taxonomy subtree removed");

        Ok(removed && self.delete(term_id).await?)
    }

    // -------------------------------------------------------------------------
    // Tree reads
    // -------------------------------------------------------------------------

    /// Terms placed in a vocabulary, in tree order.
    ///
    /// A missing `vocabulary_id` is a caller mistake: it is logged and yields
    /// no terms.
    pub async fn find_by_vocabulary(&self, options: &FindOptions) -> Result<Vec<Term>> {
        let Some(vocabulary_id) = options.vocabulary_id else {
            warn!("\"vocabulary_id\" key not found");
            return Ok(Vec::new());
        };
        let Some(vocabulary) = self.vocabulary(vocabulary_id).await? else {
            return Ok(Vec::new());
        };

        let entries = self.tree(&vocabulary.alias).await?;
        let mut seen = HashSet::new();
        let ids: Vec<i64> = entries
            .iter()
            .map(|e| e.term_id)
            .filter(|id| seen.insert(*id))
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut terms: HashMap<i64, Term> = self
            .store
            .find_terms(&ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        Ok(ids.iter().filter_map(|id| terms.remove(id)).collect())
    }

    /// Flattened tree of a vocabulary, in display order.
    pub async fn tree(&self, vocabulary_alias: &str) -> Result<Vec<TreeEntry>> {
        let Some(vocabulary) = self.vocabulary_by_alias(vocabulary_alias).await? else {
            return Ok(Vec::new());
        };

        let threaded = self.threaded(vocabulary.id).await?;
        Ok(tree::flatten(&threaded)
            .into_iter()
            .map(|(depth, entry)| TreeEntry {
                taxonomy_id: entry.taxonomy.id,
                term_id: entry.term.id,
                title: entry.term.title.clone(),
                slug: entry.term.slug.clone(),
                depth,
            })
            .collect())
    }

    /// Nested tree of a vocabulary's rows with their terms.
    pub async fn threaded(&self, vocabulary_id: i64) -> Result<Vec<Threaded<TaxonomyEntry>>> {
        let rows = self.store.list_taxonomies(vocabulary_id).await?;
        let ids: Vec<i64> = rows
            .iter()
            .map(|t| t.term_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let terms: HashMap<i64, Term> = self
            .store
            .find_terms(&ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let entries: Vec<TaxonomyEntry> = rows
            .into_iter()
            .filter_map(|taxonomy| {
                let term = terms.get(&taxonomy.term_id)?.clone();
                Some(TaxonomyEntry { taxonomy, term })
            })
            .collect();
        Ok(tree::thread(entries))
    }

    /// Move a row one place earlier among its siblings.
    pub async fn move_up(&self, taxonomy_id: i64) -> Result<bool> {
        self.shift(taxonomy_id, true).await
    }

    /// Move a row one place later among its siblings.
    pub async fn move_down(&self, taxonomy_id: i64) -> Result<bool> {
        self.shift(taxonomy_id, false).await
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Steps shared by `add` and `edit`, after validation passed.
    async fn save(
        &self,
        draft: TermDraft,
        vocabulary_id: i64,
        taxonomy_id: Option<i64>,
        parent_id: Option<i64>,
    ) -> Result<SaveOutcome> {
        let Some(term_id) = self.save_and_get_id(draft).await? else {
            return Ok(SaveOutcome::Aborted);
        };

        if self
            .is_in_vocabulary(term_id, vocabulary_id, taxonomy_id)
            .await?
        {
            debug!(term_id, vocabulary_id, "term already in vocabulary");
            return Ok(SaveOutcome::AlreadyInVocabulary { term_id });
        }

        let scope = self.store.list_taxonomies(vocabulary_id).await?;

        let Some(taxonomy_id) = taxonomy_id else {
            let row = NewTaxonomy {
                parent_id,
                term_id,
                vocabulary_id,
                weight: tree::next_weight(&scope, parent_id),
            };
            let taxonomy = self.store.insert_taxonomy(&row).await?;
            info!(term_id, vocabulary_id, taxonomy_id = taxonomy.id, "term added to vocabulary");
            return Ok(SaveOutcome::Saved(taxonomy));
        };

        let Some(current) = self.store.find_taxonomy(taxonomy_id).await? else {
            return Ok(SaveOutcome::NotFound);
        };

        let stays = current.vocabulary_id == vocabulary_id && current.parent_id == parent_id;
        let weight = if stays {
            current.weight
        } else {
            tree::next_weight(&scope, parent_id)
        };

        if current.vocabulary_id != vocabulary_id {
            self.detach_children(&current).await?;
        }

        let updated = Taxonomy {
            id: current.id,
            parent_id,
            term_id,
            vocabulary_id,
            weight,
        };
        self.store.update_taxonomy(&updated).await?;
        info!(term_id, vocabulary_id, taxonomy_id, "taxonomy row updated");
        Ok(SaveOutcome::Saved(updated))
    }

    /// Validate the target vocabulary and parent of a placement.
    async fn check_placement(
        &self,
        vocabulary_id: i64,
        parent_id: Option<i64>,
        taxonomy_id: Option<i64>,
    ) -> Result<Option<ValidationErrors>> {
        if self.vocabulary(vocabulary_id).await?.is_none() {
            return Ok(Some(ValidationErrors::single(
                "vocabulary_id",
                "The vocabulary does not exist",
            )));
        }

        let Some(parent_id) = parent_id else {
            return Ok(None);
        };

        let scope = self.store.list_taxonomies(vocabulary_id).await?;
        if !scope.iter().any(|t| t.id == parent_id) {
            return Ok(Some(ValidationErrors::single(
                "parent_id",
                "The parent must belong to the same vocabulary",
            )));
        }

        if let Some(taxonomy_id) = taxonomy_id
            && (parent_id == taxonomy_id
                || tree::descendant_ids(&scope, taxonomy_id).contains(&parent_id))
        {
            return Ok(Some(ValidationErrors::single(
                "parent_id",
                "A term cannot be moved below itself",
            )));
        }

        Ok(None)
    }

    /// Hand a row's children to its parent before the row leaves the
    /// vocabulary.
    async fn detach_children(&self, row: &Taxonomy) -> Result<()> {
        let scope = self.store.list_taxonomies(row.vocabulary_id).await?;
        let mut next = tree::next_weight(&scope, row.parent_id);
        for child in scope.iter().filter(|t| t.parent_id == Some(row.id)) {
            let moved = Taxonomy {
                parent_id: row.parent_id,
                weight: next,
                ..child.clone()
            };
            self.store.update_taxonomy(&moved).await?;
            next += 1;
        }
        Ok(())
    }

    async fn shift(&self, taxonomy_id: i64, up: bool) -> Result<bool> {
        let Some(row) = self.store.find_taxonomy(taxonomy_id).await? else {
            return Ok(false);
        };
        let scope = self.store.list_taxonomies(row.vocabulary_id).await?;
        let mut ordered: Vec<Taxonomy> = tree::siblings(&scope, taxonomy_id)
            .into_iter()
            .cloned()
            .collect();

        let Some(pos) = ordered.iter().position(|t| t.id == taxonomy_id) else {
            return Ok(false);
        };
        let other = if up {
            pos.checked_sub(1)
        } else {
            Some(pos + 1).filter(|&p| p < ordered.len())
        };
        let Some(other) = other else {
            return Ok(false);
        };

        ordered.swap(pos, other);
        for (index, sibling) in ordered.iter_mut().enumerate() {
            let weight = i32::try_from(index)?;
            if sibling.weight != weight {
                sibling.weight = weight;
                self.store.update_taxonomy(sibling).await?;
            }
        }
        debug!(taxonomy_id, up, "taxonomy row moved");
        Ok(true)
    }

    /// Run `Model.beforeSave`. Returns `false` when a listener stopped it.
    fn before_save(&self, draft: &mut TermDraft) -> bool {
        let outcome = self
            .events
            .dispatch(names::MODEL_BEFORE_SAVE, draft, event_data());
        if outcome.stopped {
            debug!(slug = %draft.slug, "term save stopped by listener");
        }
        !outcome.stopped
    }

    fn after_save(&self, draft: &mut TermDraft, created: bool) {
        let mut data = event_data();
        data.insert("created".to_string(), Value::Bool(created));
        self.events.dispatch(names::MODEL_AFTER_SAVE, draft, data);
    }
}

fn event_data() -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("table".to_string(), json!(TERMS_TABLE));
    data
}
