//! Taxonomy: vocabularies, terms and the per-vocabulary trees that place
//! terms into vocabularies.

mod behaviors;
mod memory_store;
mod pg_store;
mod service;
mod store;
mod validation;

pub use behaviors::TimestampBehavior;
pub use memory_store::MemoryTaxonomyStore;
pub use pg_store::PgTaxonomyStore;
pub use service::{FindOptions, SaveOutcome, TaxonomyService, VocabularyOutcome};
pub use store::TaxonomyStore;
pub use validation::{ValidationErrors, validate_term, validate_vocabulary};
