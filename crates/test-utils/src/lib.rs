//! Croogo test utilities.
//!
//! Helpers for integration testing: request payload builders, plugin
//! manifest fixtures, and assertion utilities.

use std::path::{Path, PathBuf};

use serde_json::{Value as JsonValue, json};

/// Create a test term with a slug derived from the title.
pub fn test_term(title: &str) -> TestTerm {
    TestTerm {
        title: title.to_string(),
        slug: slugify(title),
        description: None,
        parent_id: None,
    }
}

/// Lowercase, with runs of non-alphanumerics collapsed to `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// A term payload builder for `POST /api/vocabularies/{id}/terms`.
#[derive(Debug, Clone)]
pub struct TestTerm {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
}

impl TestTerm {
    /// Set a custom slug.
    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = slug.to_string();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Nest under a taxonomy row.
    pub fn under(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// JSON body.
    pub fn to_json(&self) -> JsonValue {
        json!({
            "title": self.title,
            "slug": self.slug,
            "description": self.description,
            "parent_id": self.parent_id,
        })
    }
}

/// Create a vocabulary payload for `POST /api/vocabularies`.
pub fn test_vocabulary(alias: &str) -> JsonValue {
    let mut title = alias.replace(['-', '_'], " ");
    if let Some(first) = title.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    json!({ "title": title, "alias": alias })
}

/// A plugin manifest builder writing `{name}.info.toml` files.
#[derive(Debug, Clone)]
pub struct PluginManifest {
    name: String,
    version: String,
    dependencies: Vec<String>,
    sections: Vec<String>,
}

impl PluginManifest {
    /// Manifest for version 1.0.0 with no dependencies or hooks.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            dependencies: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Add a dependency.
    pub fn depends_on(mut self, plugin: &str) -> Self {
        self.dependencies.push(plugin.to_string());
        self
    }

    /// Declare a component-like hook (`components`, `api_components`,
    /// `helpers` or `behaviors`).
    pub fn hook(mut self, kind: &str, target: &str, name: &str, priority: Option<i32>) -> Self {
        let mut section = format!("[[hooks.{kind}]]\ntarget = {target:?}\nname = {name:?}\n");
        if let Some(priority) = priority {
            section.push_str(&format!("priority = {priority}\n"));
        }
        self.sections.push(section);
        self
    }

    /// Declare a property hook (`controller_properties` or
    /// `table_properties`). `value` is a TOML literal.
    pub fn property(mut self, kind: &str, target: &str, property: &str, value: &str) -> Self {
        self.sections.push(format!(
            "[[hooks.{kind}]]\ntarget = {target:?}\nproperty = {property:?}\nvalue = {value}\n"
        ));
        self
    }

    /// Manifest text.
    pub fn to_toml(&self) -> String {
        let dependencies: Vec<String> = self
            .dependencies
            .iter()
            .map(|d| format!("{d:?}"))
            .collect();
        let mut toml = format!(
            "name = {:?}\ndescription = \"{} test plugin\"\nversion = {:?}\ndependencies = [{}]\n",
            self.name,
            self.name,
            self.version,
            dependencies.join(", ")
        );
        for section in &self.sections {
            toml.push('\n');
            toml.push_str(section);
        }
        toml
    }

    /// Write `<plugins_dir>/<name>/<name>.info.toml`, returning the plugin
    /// directory.
    pub fn write_to(&self, plugins_dir: &Path) -> std::io::Result<PathBuf> {
        let dir = plugins_dir.join(&self.name);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(format!("{}.info.toml", self.name)), self.to_toml())?;
        Ok(dir)
    }
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert the `field` array of an array of objects, in order.
    pub fn field_values(items: &Value, field: &str, expected: &[&str]) {
        let actual: Vec<&str> = items
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(field).and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(actual, expected, "unexpected '{field}' values in {items}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_term_builder() {
        let term = test_term("Rust & Tokio!").with_description("Async").under(4);
        let body = term.to_json();

        assert_eq!(body["slug"], "rust-tokio");
        assert_eq!(body["description"], "Async");
        assert_eq!(body["parent_id"], 4);
    }

    #[test]
    fn test_vocabulary_payload() {
        let body = test_vocabulary("blog_tags");
        assert_eq!(body["title"], "Blog tags");
        assert_eq!(body["alias"], "blog_tags");
    }

    #[test]
    fn manifest_toml() {
        let toml = PluginManifest::new("shops")
            .depends_on("suppliers")
            .hook("api_components", "Shops", "Shops.OrdersApi", Some(3))
            .property("table_properties", "Shops.Orders", "monitored", "true")
            .to_toml();

        assert::contains(&toml, "dependencies = [\"suppliers\"]");
        assert::contains(&toml, "[[hooks.api_components]]");
        assert::contains(&toml, "priority = 3");
        assert::contains(&toml, "value = true");
    }

    #[test]
    fn test_assertions() {
        let json = serde_json::json!([{"name": "a"}, {"name": "b"}]);
        assert::field_values(&json, "name", &["a", "b"]);
        assert::has_key(&json[0], "name");
        assert::not_contains("hello world", "foo");
    }
}
