//! Hook registry writing into the shared configuration tree.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::debug;

use super::spec::{ComponentOptions, ComponentSpec};
use crate::configure::Configure;

/// Configuration key holding controller hooks.
pub const CONTROLLER_PROPERTIES: &str = "Hook.controller_properties";

/// Configuration key holding table hooks.
pub const TABLE_PROPERTIES: &str = "Hook.table_properties";

/// Target name whose hooks apply to every controller or table.
pub const WILDCARD: &str = "*";

const COMPONENTS: &str = "_components";
const API_COMPONENTS: &str = "_apiComponents";
const HELPERS: &str = "_helpers";
const BEHAVIORS: &str = "behaviors";

/// Entry point for plugins attaching behavior to other plugins' code.
///
/// Cheap to clone; all clones share one [`Configure`].
#[derive(Debug, Clone)]
pub struct HookRegistry {
    config: Arc<Configure>,
}

impl HookRegistry {
    /// Registry over its own configuration map.
    pub fn new() -> Self {
        Self::with_config(Arc::new(Configure::new()))
    }

    /// Registry over a shared configuration map.
    pub fn with_config(config: Arc<Configure>) -> Self {
        Self { config }
    }

    /// The underlying configuration map.
    pub fn config(&self) -> &Configure {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Controller hooks
    // -------------------------------------------------------------------------

    /// Attach components to a controller.
    pub fn hook_component(&self, controller: &str, spec: impl Into<ComponentSpec>) {
        self.merge_spec(CONTROLLER_PROPERTIES, controller, COMPONENTS, spec.into());
    }

    /// Attach API components to a controller.
    pub fn hook_api_component(&self, controller: &str, spec: impl Into<ComponentSpec>) {
        self.merge_spec(CONTROLLER_PROPERTIES, controller, API_COMPONENTS, spec.into());
    }

    /// Attach view helpers to a controller.
    pub fn hook_helper(&self, controller: &str, spec: impl Into<ComponentSpec>) {
        self.merge_spec(CONTROLLER_PROPERTIES, controller, HELPERS, spec.into());
    }

    /// Set an arbitrary controller property, merging objects.
    pub fn hook_controller_property(&self, controller: &str, property: &str, value: Value) {
        self.merge_property(CONTROLLER_PROPERTIES, controller, property, value);
    }

    // -------------------------------------------------------------------------
    // Table hooks
    // -------------------------------------------------------------------------

    /// Attach behaviors to a table.
    pub fn hook_behavior(&self, table: &str, spec: impl Into<ComponentSpec>) {
        self.merge_spec(TABLE_PROPERTIES, table, BEHAVIORS, spec.into());
    }

    /// Set an arbitrary table property, merging objects.
    pub fn hook_table_property(&self, table: &str, property: &str, value: Value) {
        self.merge_property(TABLE_PROPERTIES, table, property, value);
    }

    // -------------------------------------------------------------------------
    // Readers
    // -------------------------------------------------------------------------

    /// Merged map of every controller hook.
    pub fn controller_properties(&self) -> Value {
        self.config
            .read(CONTROLLER_PROPERTIES)
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Merged map of every table hook.
    pub fn table_properties(&self) -> Value {
        self.config
            .read(TABLE_PROPERTIES)
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Components hooked onto `controller`, in load order.
    pub fn components(&self, controller: &str) -> Vec<(String, ComponentOptions)> {
        self.sorted(CONTROLLER_PROPERTIES, controller, COMPONENTS)
    }

    /// API components hooked onto `controller`, in load order.
    pub fn api_components(&self, controller: &str) -> Vec<(String, ComponentOptions)> {
        self.sorted(CONTROLLER_PROPERTIES, controller, API_COMPONENTS)
    }

    /// Helpers hooked onto `controller`, in load order.
    pub fn helpers(&self, controller: &str) -> Vec<(String, ComponentOptions)> {
        self.sorted(CONTROLLER_PROPERTIES, controller, HELPERS)
    }

    /// Behaviors hooked onto `table`, in load order.
    pub fn behaviors(&self, table: &str) -> Vec<(String, ComponentOptions)> {
        self.sorted(TABLE_PROPERTIES, table, BEHAVIORS)
    }

    /// A single hooked table property.
    pub fn table_property(&self, table: &str, property: &str) -> Option<Value> {
        self.config
            .read(&format!("{TABLE_PROPERTIES}.{table}.{property}"))
    }

    /// A single hooked controller property.
    pub fn controller_property(&self, controller: &str, property: &str) -> Option<Value> {
        self.config
            .read(&format!("{CONTROLLER_PROPERTIES}.{controller}.{property}"))
    }

    fn merge_spec(&self, root: &str, target: &str, bucket: &str, spec: ComponentSpec) {
        if spec.is_empty() {
            return;
        }
        debug!(
            root = %root,
            target = %target,
            bucket = %bucket,
            components = spec.entries().len(),
            "hooking components"
        );
        self.config
            .merge(&format!("{root}.{target}"), json!({ bucket: spec.to_json() }));
    }

    fn merge_property(&self, root: &str, target: &str, property: &str, value: Value) {
        debug!(root = %root, target = %target, property = %property, "hooking property");
        self.config
            .merge(&format!("{root}.{target}"), json!({ property: value }));
    }

    /// Wildcard entries first, target entries override, then sorted by
    /// priority and name.
    fn sorted(&self, root: &str, target: &str, bucket: &str) -> Vec<(String, ComponentOptions)> {
        let mut merged = Map::new();
        for name in [WILDCARD, target] {
            if let Some(Value::Object(entries)) =
                self.config.read(&format!("{root}.{name}.{bucket}"))
            {
                merged.extend(entries);
            }
        }

        let spec = ComponentSpec::from_json(&Value::Object(merged));
        let mut entries = spec.entries().to_vec();
        entries.sort_by(|(a_name, a), (b_name, b)| {
            a.priority.cmp(&b.priority).then_with(|| a_name.cmp(b_name))
        });
        entries
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn api_component_shorthand_and_explicit_merge() {
        let hooks = HookRegistry::new();
        hooks.hook_api_component("Example", "Example.ExampleApi");
        hooks.hook_api_component("Example", [("Users.UserApi", ComponentOptions::priority(2))]);

        assert_eq!(
            hooks.controller_properties(),
            json!({
                "Example": {
                    "_apiComponents": {
                        "Example.ExampleApi": {"priority": 8},
                        "Users.UserApi": {"priority": 2},
                    }
                }
            })
        );
    }

    #[test]
    fn readers_sort_by_priority() {
        let hooks = HookRegistry::new();
        hooks.hook_component("Nodes", "Comments.Comments");
        hooks.hook_component("Nodes", [("Acl.Filter", ComponentOptions::priority(1))]);
        hooks.hook_component("Nodes", [("Zed.Late", ComponentOptions::priority(20))]);

        let names: Vec<_> = hooks
            .components("Nodes")
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["Acl.Filter", "Comments.Comments", "Zed.Late"]);
    }

    #[test]
    fn wildcard_applies_to_every_controller() {
        let hooks = HookRegistry::new();
        hooks.hook_helper("*", "Croogo.Layout");
        hooks.hook_helper("Nodes", [("Menus.Menus", ComponentOptions::priority(3))]);

        let helpers = hooks.helpers("Nodes");
        assert_eq!(helpers.len(), 2);
        assert_eq!(helpers[0].0, "Menus.Menus");
        assert_eq!(hooks.helpers("Users").len(), 1);
    }

    #[test]
    fn later_registration_overrides_priority() {
        let hooks = HookRegistry::new();
        hooks.hook_api_component("Example", "Example.ExampleApi");
        hooks.hook_api_component(
            "Example",
            [("Example.ExampleApi", ComponentOptions::priority(1))],
        );

        let components = hooks.api_components("Example");
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].1.priority, 1);
    }

    #[test]
    fn table_properties_and_behaviors() {
        let hooks = HookRegistry::new();
        hooks.hook_behavior("Shops.Orders", "Suppliers.Monitor");
        hooks.hook_table_property("Shops.Orders", "monitored", json!(true));

        assert_eq!(hooks.table_property("Shops.Orders", "monitored"), Some(json!(true)));
        assert_eq!(hooks.behaviors("Shops.Orders")[0].0, "Suppliers.Monitor");
        assert!(hooks.table_property("Shops.Items", "monitored").is_none());
    }

    #[test]
    fn empty_spec_writes_nothing() {
        let hooks = HookRegistry::new();
        hooks.hook_component("Nodes", ComponentSpec::new());
        assert_eq!(hooks.controller_properties(), json!({}));
    }
}
