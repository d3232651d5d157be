//! Plugin bootstrap.
//!
//! This module handles:
//! - Parsing plugin metadata from `.info.toml` files
//! - Resolving plugin dependencies
//! - Applying each plugin's hook declarations in load order

mod dependency;
mod error;
mod info_parser;
mod loader;

pub use dependency::resolve_load_order;
pub use error::PluginError;
pub use info_parser::{ComponentHook, HookDeclarations, PluginInfo, PropertyHook};
pub use loader::{apply_hooks, bootstrap, bootstrap_dir, discover_plugins};
