//! Plugin discovery and bootstrap.
//!
//! Plugins live one per directory under the plugins directory, each with a
//! single `{name}.info.toml`. Bootstrap resolves load order and applies
//! every plugin's hook declarations to a [`HookRegistry`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use super::dependency::resolve_load_order;
use super::error::PluginError;
use super::info_parser::PluginInfo;
use crate::hooks::{ComponentSpec, HookRegistry};

/// Scan `plugins_dir` for plugin manifests.
///
/// A missing directory yields no plugins. Directories without exactly one
/// manifest, and manifests that fail to parse, are skipped with a warning.
pub fn discover_plugins(plugins_dir: &Path) -> Result<HashMap<String, (PluginInfo, PathBuf)>> {
    let mut discovered = HashMap::new();

    if !plugins_dir.exists() {
        info!(
            ?plugins_dir,
            "plugins directory does not exist, nothing to discover"
        );
        return Ok(discovered);
    }

    let entries = match std::fs::read_dir(plugins_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "failed to read plugins directory");
            return Ok(discovered);
        }
    };

    let mut dirs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    dirs.sort_by_key(|e| e.file_name());

    for entry in dirs {
        let plugin_dir = entry.path();
        let info_path = match find_manifest(&plugin_dir) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "skipping plugin directory");
                continue;
            }
        };

        match PluginInfo::parse(&info_path) {
            Ok(info) => {
                if let Err(e) = check_location(&info.name, &plugin_dir, &info_path) {
                    warn!(error = %e, "skipping plugin");
                    continue;
                }
                let name = info.name.clone();
                if discovered.contains_key(&name) {
                    return Err(PluginError::DuplicateName { plugin: name }.into());
                }
                discovered.insert(name, (info, plugin_dir));
            }
            Err(e) => {
                warn!(path = %info_path.display(), error = %e, "failed to parse plugin info");
            }
        }
    }

    Ok(discovered)
}

fn find_manifest(plugin_dir: &Path) -> Result<PathBuf, PluginError> {
    let path = plugin_dir.display().to_string();
    let mut manifests: Vec<PathBuf> = std::fs::read_dir(plugin_dir)
        .map_err(|_| PluginError::MissingManifest { path: path.clone() })?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".info.toml"))
        })
        .collect();

    match manifests.len() {
        0 => Err(PluginError::MissingManifest { path }),
        1 => Ok(manifests.remove(0)),
        _ => Err(PluginError::MultipleManifests { path }),
    }
}

/// The manifest of plugin `name` is `<name>/<name>.info.toml`.
fn check_location(name: &str, plugin_dir: &Path, info_path: &Path) -> Result<(), PluginError> {
    let dir_name = plugin_dir.file_name().and_then(|n| n.to_str());
    let file_name = info_path.file_name().and_then(|n| n.to_str());
    let expected_file = format!("{name}.info.toml");
    if dir_name == Some(name) && file_name == Some(expected_file.as_str()) {
        Ok(())
    } else {
        Err(PluginError::NameMismatch {
            plugin: name.to_string(),
            path: info_path.display().to_string(),
        })
    }
}

/// Apply one plugin's hook declarations.
pub fn apply_hooks(info: &PluginInfo, hooks: &HookRegistry) {
    let declared = &info.hooks;

    for hook in &declared.components {
        hooks.hook_component(&hook.target, single(&hook.name, hook.options()));
    }
    for hook in &declared.api_components {
        hooks.hook_api_component(&hook.target, single(&hook.name, hook.options()));
    }
    for hook in &declared.helpers {
        hooks.hook_helper(&hook.target, single(&hook.name, hook.options()));
    }
    for hook in &declared.behaviors {
        hooks.hook_behavior(&hook.target, single(&hook.name, hook.options()));
    }
    for hook in &declared.controller_properties {
        hooks.hook_controller_property(&hook.target, &hook.property, hook.value.clone());
    }
    for hook in &declared.table_properties {
        hooks.hook_table_property(&hook.target, &hook.property, hook.value.clone());
    }

    debug!(plugin = %info.name, count = declared.len(), "plugin hooks applied");
}

fn single(name: &str, options: crate::hooks::ComponentOptions) -> ComponentSpec {
    ComponentSpec::new().with(name, options)
}

/// Apply hooks of every plugin, dependencies first. Returns the load order.
pub fn bootstrap(plugins: &HashMap<String, PluginInfo>, hooks: &HookRegistry) -> Result<Vec<String>> {
    let order = resolve_load_order(plugins)?;
    for name in &order {
        if let Some(info) = plugins.get(name) {
            apply_hooks(info, hooks);
        }
    }
    info!(count = order.len(), order = ?order, "plugins bootstrapped");
    Ok(order)
}

/// Discover plugins under `plugins_dir` and bootstrap them.
pub fn bootstrap_dir(plugins_dir: &Path, hooks: &HookRegistry) -> Result<Vec<String>> {
    let plugins: HashMap<String, PluginInfo> = discover_plugins(plugins_dir)?
        .into_iter()
        .map(|(name, (info, _))| (name, info))
        .collect();
    bootstrap(&plugins, hooks)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(toml: &str) -> PluginInfo {
        PluginInfo::parse_str(toml, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn dependent_plugin_overrides_dependency() {
        let base = parse(
            r#"
name = "users"
version = "1.0.0"

[[hooks.api_components]]
target = "Example"
name = "Users.UserApi"
priority = 2
"#,
        );
        let dependent = parse(
            r#"
name = "example"
version = "1.0.0"
dependencies = ["users"]

[[hooks.api_components]]
target = "Example"
name = "Example.ExampleApi"

[[hooks.api_components]]
target = "Example"
name = "Users.UserApi"
priority = 5
"#,
        );

        let plugins = HashMap::from([
            ("users".to_string(), base),
            ("example".to_string(), dependent),
        ]);
        let hooks = HookRegistry::new();
        let order = bootstrap(&plugins, &hooks).unwrap();

        assert_eq!(order, ["users", "example"]);
        assert_eq!(
            hooks.controller_properties(),
            json!({ "Example": { "_apiComponents": {
                "Users.UserApi": { "priority": 5 },
                "Example.ExampleApi": { "priority": 8 },
            } } })
        );
    }

    #[test]
    fn missing_dependency_fails_bootstrap() {
        let plugin = parse(
            r#"
name = "shops"
version = "1.0.0"
dependencies = ["suppliers"]
"#,
        );
        let plugins = HashMap::from([("shops".to_string(), plugin)]);
        let err = bootstrap(&plugins, &HookRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("suppliers"));
    }

    #[test]
    fn manifest_must_match_directory() {
        let err = check_location(
            "shops",
            Path::new("/plugins/store"),
            Path::new("/plugins/store/shops.info.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, PluginError::NameMismatch { ref plugin, .. } if plugin == "shops"));

        assert!(check_location(
            "shops",
            Path::new("/plugins/shops"),
            Path::new("/plugins/shops/shop.info.toml"),
        )
        .is_err());
        assert!(check_location(
            "shops",
            Path::new("/plugins/shops"),
            Path::new("/plugins/shops/shops.info.toml"),
        )
        .is_ok());
    }

    #[test]
    fn missing_directory_is_empty() {
        let found = discover_plugins(Path::new("/nonexistent/plugins")).unwrap();
        assert!(found.is_empty());
    }
}
