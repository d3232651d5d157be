//! Plugin bootstrap error types.
//!
//! Every error names the plugin involved so a broken manifest can be found
//! quickly.

use thiserror::Error;

/// Errors that stop plugins from loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PluginError {
    /// Plugin directory is missing the .info.toml manifest file.
    #[error("plugin directory '{path}': no .info.toml manifest found")]
    MissingManifest { path: String },

    /// Multiple .info.toml files found in plugin directory.
    #[error("plugin directory '{path}': multiple .info.toml files found, expected exactly one")]
    MultipleManifests { path: String },

    /// Manifest name differs from its directory or file name.
    #[error("plugin '{plugin}' must live in '{plugin}/{plugin}.info.toml', found '{path}'")]
    NameMismatch { plugin: String, path: String },

    /// Two directories declare the same plugin name.
    #[error("plugin '{plugin}' is declared by more than one directory")]
    DuplicateName { plugin: String },

    /// Plugin depends on another plugin that isn't present.
    #[error("plugin '{plugin}' depends on '{dependency}' which is not installed")]
    MissingDependency { plugin: String, dependency: String },

    /// Circular dependency detected.
    #[error("circular dependency detected involving plugins: {cycle}")]
    CircularDependency { cycle: String },
}
