//! Croogo Kernel Library
//!
//! Taxonomy, hook registry and menu rendering services, exposed for the
//! `croogo` binary and for integration testing.

pub mod config;
pub mod configure;
pub mod db;
pub mod error;
pub mod event;
pub mod hooks;
pub mod menu;
pub mod models;
pub mod plugin;
pub mod routes;
pub mod state;
pub mod taxonomy;
pub mod tree;
pub mod view;

pub use config::Config;
pub use configure::Configure;
pub use error::{AppError, AppResult};
pub use state::AppState;
