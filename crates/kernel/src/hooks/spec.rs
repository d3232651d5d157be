//! Component specifications accepted by the hook functions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Priority given to components registered without one.
pub const DEFAULT_PRIORITY: i32 = 8;

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// Options attached to one hooked component.
///
/// Serialises flat: `{"priority": 2, "someOption": true}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentOptions {
    /// Load order (lower = earlier).
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Any further settings handed to the component.
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl ComponentOptions {
    /// Options with the given priority and no extra settings.
    pub fn priority(priority: i32) -> Self {
        Self {
            priority,
            config: Map::new(),
        }
    }

    /// Add a setting.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.config.insert(key.to_string(), value);
        self
    }
}

impl Default for ComponentOptions {
    fn default() -> Self {
        Self::priority(DEFAULT_PRIORITY)
    }
}

/// One or more plugin-qualified component names with their options.
///
/// A bare name (`"Example.ExampleApi"`) converts to a single entry at
/// [`DEFAULT_PRIORITY`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentSpec {
    entries: Vec<(String, ComponentOptions)>,
}

impl ComponentSpec {
    /// An empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component with explicit options.
    pub fn with(mut self, name: impl Into<String>, options: ComponentOptions) -> Self {
        self.entries.push((name.into(), options));
        self
    }

    /// Parse the JSON form used in configuration files.
    ///
    /// Accepts a string, an array of strings, or an object mapping names to
    /// option objects. Anything else yields an empty spec.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(name) => Self::from(name.as_str()),
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .fold(Self::new(), |spec, name| {
                    spec.with(name, ComponentOptions::default())
                }),
            Value::Object(map) => map.iter().fold(Self::new(), |spec, (name, options)| {
                let options = serde_json::from_value(options.clone()).unwrap_or_default();
                spec.with(name.clone(), options)
            }),
            _ => Self::new(),
        }
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[(String, ComponentOptions)] {
        &self.entries
    }

    /// Whether the spec names no component.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON object keyed by component name, ready for merging.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, options)| {
                let options = serde_json::to_value(options).unwrap_or(Value::Null);
                (name.clone(), options)
            })
            .collect();
        Value::Object(map)
    }
}

impl From<&str> for ComponentSpec {
    fn from(name: &str) -> Self {
        Self::new().with(name, ComponentOptions::default())
    }
}

impl From<String> for ComponentSpec {
    fn from(name: String) -> Self {
        Self::new().with(name, ComponentOptions::default())
    }
}

impl<const N: usize> From<[(&str, ComponentOptions); N]> for ComponentSpec {
    fn from(entries: [(&str, ComponentOptions); N]) -> Self {
        entries
            .into_iter()
            .fold(Self::new(), |spec, (name, options)| spec.with(name, options))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_name_gets_default_priority() {
        let spec = ComponentSpec::from("Example.ExampleApi");
        assert_eq!(spec.to_json(), json!({"Example.ExampleApi": {"priority": 8}}));
    }

    #[test]
    fn options_serialize_flat() {
        let options = ComponentOptions::priority(2).with("cache", json!(true));
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"priority": 2, "cache": true})
        );
    }

    #[test]
    fn json_object_without_priority_defaults() {
        let spec = ComponentSpec::from_json(&json!({"Users.UserApi": {"scope": "admin"}}));
        let (name, options) = &spec.entries()[0];
        assert_eq!(name, "Users.UserApi");
        assert_eq!(options.priority, DEFAULT_PRIORITY);
        assert_eq!(options.config.get("scope"), Some(&json!("admin")));
    }

    #[test]
    fn json_array_of_names() {
        let spec = ComponentSpec::from_json(&json!(["A.One", "B.Two"]));
        assert_eq!(spec.entries().len(), 2);
        assert!(spec.entries().iter().all(|(_, o)| o.priority == 8));
    }

    #[test]
    fn json_scalar_is_empty() {
        assert!(ComponentSpec::from_json(&json!(42)).is_empty());
    }
}
