//! Parser for plugin `.info.toml` manifest files.
//!
//! Each plugin has a `{name}.info.toml` file that declares metadata:
//! - name, version, description
//! - dependencies (other plugins that must load first)
//! - hooks (components, helpers, behaviors and properties the plugin
//!   attaches to controllers and tables)

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::hooks::{ComponentOptions, DEFAULT_PRIORITY};

/// Plugin metadata parsed from `.info.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginInfo {
    /// Plugin machine name. Discovery skips manifests not stored as
    /// `<name>/<name>.info.toml`.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Semantic version (e.g., "1.0.0").
    pub version: String,

    /// Other plugins this one depends on (loaded first).
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Hook declarations applied at bootstrap.
    #[serde(default)]
    pub hooks: HookDeclarations,
}

/// Everything a plugin hooks onto other code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookDeclarations {
    #[serde(default)]
    pub components: Vec<ComponentHook>,

    #[serde(default)]
    pub api_components: Vec<ComponentHook>,

    #[serde(default)]
    pub helpers: Vec<ComponentHook>,

    /// Behaviors attached to tables.
    #[serde(default)]
    pub behaviors: Vec<ComponentHook>,

    #[serde(default)]
    pub controller_properties: Vec<PropertyHook>,

    #[serde(default)]
    pub table_properties: Vec<PropertyHook>,
}

impl HookDeclarations {
    /// Total number of declarations.
    pub fn len(&self) -> usize {
        self.components.len()
            + self.api_components.len()
            + self.helpers.len()
            + self.behaviors.len()
            + self.controller_properties.len()
            + self.table_properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A component, helper or behavior attached to a target.
///
/// ```toml
/// [[hooks.api_components]]
/// target = "Example"
/// name = "Example.ExampleApi"
/// priority = 2
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentHook {
    /// Controller or table name, or `*`.
    pub target: String,

    /// Plugin-qualified name (`Plugin.Name`).
    pub name: String,

    #[serde(default)]
    pub priority: Option<i32>,

    /// Settings handed to the component.
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl ComponentHook {
    /// Options to register, at the default priority unless one was given.
    pub fn options(&self) -> ComponentOptions {
        ComponentOptions {
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            config: self.config.clone(),
        }
    }
}

/// A property set on a controller or table.
///
/// ```toml
/// [[hooks.table_properties]]
/// target = "Shops.Orders"
/// property = "monitored"
/// value = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyHook {
    pub target: String,
    pub property: String,
    pub value: Value,
}

impl PluginInfo {
    /// Parse a plugin info file from the given path.
    pub fn parse(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plugin info file: {}", path.display()))?;

        Self::parse_str(&content, path)
    }

    /// Parse plugin info from a TOML string.
    pub fn parse_str(content: &str, path: &Path) -> Result<Self> {
        let info: PluginInfo = toml::from_str(content)
            .with_context(|| format!("failed to parse plugin info TOML at {}", path.display()))?;

        info.validate(path)?;
        Ok(info)
    }

    /// Validate the parsed plugin info.
    fn validate(&self, path: &Path) -> Result<()> {
        if self.name.is_empty() {
            bail!("plugin info at {} has empty 'name' field", path.display());
        }

        if self.version.is_empty() {
            bail!(
                "plugin '{}' at {} has empty 'version' field",
                self.name,
                path.display()
            );
        }

        let hooks = &self.hooks;
        let components = hooks
            .components
            .iter()
            .chain(&hooks.api_components)
            .chain(&hooks.helpers)
            .chain(&hooks.behaviors);
        for hook in components {
            if hook.target.is_empty() || hook.name.is_empty() {
                bail!(
                    "plugin '{}' declares a hook with empty 'target' or 'name'",
                    self.name
                );
            }
        }

        for hook in hooks.controller_properties.iter().chain(&hooks.table_properties) {
            if hook.target.is_empty() || hook.property.is_empty() {
                bail!(
                    "plugin '{}' declares a property hook with empty 'target' or 'property'",
                    self.name
                );
            }
        }

        Ok(())
    }
}
