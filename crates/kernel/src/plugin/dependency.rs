//! Plugin dependency resolution using topological sort.
//!
//! Ensures plugins are loaded in the correct order based on their dependencies.
//! Uses Kahn's algorithm for topological sorting with cycle detection.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::error::PluginError;
use super::info_parser::PluginInfo;

/// Resolve plugin load order based on dependencies.
///
/// Returns plugin names sorted so that dependencies come before dependents.
/// Plugins that are free to load at the same time load in name order, so
/// the result is stable across runs.
///
/// # Errors
/// Returns error if:
/// - A plugin declares a dependency that doesn't exist
/// - There is a circular dependency
pub fn resolve_load_order(
    plugins: &HashMap<String, PluginInfo>,
) -> Result<Vec<String>, PluginError> {
    // in_degree[p] = number of plugins p waits for
    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for name in plugins.keys() {
        in_degree.insert(name, 0);
    }

    for (name, info) in plugins {
        for dep in &info.dependencies {
            if !plugins.contains_key(dep) {
                return Err(PluginError::MissingDependency {
                    plugin: name.clone(),
                    dependency: dep.clone(),
                });
            }

            *in_degree.entry(name.as_str()).or_default() += 1;
            dependents.entry(dep.as_str()).or_default().push(name);
        }
    }

    // Kahn's algorithm, always taking the smallest ready name
    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(&name, _)| name)
        .collect();
    let mut result = Vec::with_capacity(plugins.len());

    while let Some(plugin) = ready.pop_first() {
        result.push(plugin.to_string());

        for dependent in dependents.get(plugin).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if result.len() != plugins.len() {
        let loaded: BTreeSet<&str> = result.iter().map(String::as_str).collect();
        let in_cycle: Vec<&str> = in_degree
            .keys()
            .copied()
            .filter(|k| !loaded.contains(k))
            .collect();

        return Err(PluginError::CircularDependency {
            cycle: in_cycle.join(", "),
        });
    }

    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::plugin::info_parser::HookDeclarations;

    fn make_plugin(name: &str, deps: Vec<&str>) -> PluginInfo {
        PluginInfo {
            name: name.to_string(),
            description: format!("{name} plugin"),
            version: "1.0.0".to_string(),
            dependencies: deps.into_iter().map(String::from).collect(),
            hooks: HookDeclarations::default(),
        }
    }

    fn plugins(list: Vec<(&str, Vec<&str>)>) -> HashMap<String, PluginInfo> {
        list.into_iter()
            .map(|(name, deps)| (name.to_string(), make_plugin(name, deps)))
            .collect()
    }

    #[test]
    fn no_dependencies_sorted_by_name() {
        let order = resolve_load_order(&plugins(vec![("c", vec![]), ("a", vec![]), ("b", vec![])]))
            .unwrap();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn simple_chain() {
        let order = resolve_load_order(&plugins(vec![
            ("a", vec!["b"]),
            ("b", vec!["c"]),
            ("c", vec![]),
        ]))
        .unwrap();
        assert_eq!(order, ["c", "b", "a"]);
    }

    #[test]
    fn diamond_dependency() {
        // a depends on b and c, both depend on d
        let order = resolve_load_order(&plugins(vec![
            ("d", vec![]),
            ("b", vec!["d"]),
            ("c", vec!["d"]),
            ("a", vec!["b", "c"]),
        ]))
        .unwrap();

        let pos = |name: &str| order.iter().position(|x| x == name).unwrap();
        assert!(pos("d") < pos("b"));
        assert!(pos("d") < pos("c"));
        assert!(pos("b") < pos("a"));
        assert!(pos("c") < pos("a"));
    }

    #[test]
    fn missing_dependency() {
        let result = resolve_load_order(&plugins(vec![("a", vec!["missing"])]));
        assert_eq!(
            result.unwrap_err(),
            PluginError::MissingDependency {
                plugin: "a".to_string(),
                dependency: "missing".to_string(),
            }
        );
    }

    #[test]
    fn circular_dependency_indirect() {
        let result = resolve_load_order(&plugins(vec![
            ("a", vec!["b"]),
            ("b", vec!["c"]),
            ("c", vec!["a"]),
            ("d", vec![]),
        ]));
        assert_eq!(
            result.unwrap_err(),
            PluginError::CircularDependency {
                cycle: "a, b, c".to_string()
            }
        );
    }
}
