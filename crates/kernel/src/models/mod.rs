//! Database models.

pub mod menu;
pub mod taxonomy;
pub mod term;
pub mod vocabulary;

pub use menu::{CreateLink, CreateMenu, Link, Menu};
pub use taxonomy::{NewTaxonomy, Taxonomy, TaxonomyEntry, TaxonomyFilter, TreeEntry};
pub use term::{AddTerm, EditTerm, Term, TermDraft};
pub use vocabulary::{CreateVocabulary, Vocabulary};
