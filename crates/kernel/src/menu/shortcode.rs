//! `[menu:alias]` shortcode parsing.
//!
//! Grammar: `[menu:ALIAS attr="value" ...]` or the short form `[m:ALIAS]`.
//! The keyword is case-insensitive; aliases are `[A-Za-z0-9_-]*`. Attribute
//! values may be double-quoted, single-quoted or bare.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

#[allow(clippy::expect_used)]
static SHORTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(?:menu|m):([A-Za-z0-9_\-]*)(.*?)\]").expect("valid shortcode regex")
});

#[allow(clippy::expect_used)]
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][A-Za-z0-9_\-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"']+))"#)
        .expect("valid attribute regex")
});

/// One parsed shortcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcode {
    pub alias: String,
    pub attributes: BTreeMap<String, String>,
}

impl Shortcode {
    fn from_captures(caps: &Captures<'_>) -> Self {
        let alias = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let attributes = caps
            .get(2)
            .map(|m| parse_attributes(m.as_str()))
            .unwrap_or_default();
        Self { alias, attributes }
    }

    /// Attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parse `key="value"` pairs.
pub fn parse_attributes(input: &str) -> BTreeMap<String, String> {
    ATTRIBUTE
        .captures_iter(input)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_string();
            let value = caps.get(2).or(caps.get(3)).or(caps.get(4))?.as_str();
            Some((key, value.to_string()))
        })
        .collect()
}

/// Every shortcode in `content`, in order of appearance.
pub fn parse_shortcodes(content: &str) -> Vec<Shortcode> {
    SHORTCODE
        .captures_iter(content)
        .map(|caps| Shortcode::from_captures(&caps))
        .collect()
}

/// Distinct menu aliases referenced by `content`, first appearance first.
pub fn aliases_in(content: &str) -> Vec<String> {
    let mut aliases: Vec<String> = Vec::new();
    for shortcode in parse_shortcodes(content) {
        if !shortcode.alias.is_empty() && !aliases.contains(&shortcode.alias) {
            aliases.push(shortcode.alias);
        }
    }
    aliases
}

/// Replace every shortcode with the string `render` returns for it.
pub fn replace_shortcodes<F>(content: &str, mut render: F) -> String
where
    F: FnMut(&Shortcode) -> String,
{
    SHORTCODE
        .replace_all(content, |caps: &Captures<'_>| {
            render(&Shortcode::from_captures(caps))
        })
        .into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_alias_and_attributes() {
        let codes = parse_shortcodes(r#"<p>[menu:main tag="ol" class='nav' dropdown=true]</p>"#);
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].alias, "main");
        assert_eq!(codes[0].attribute("tag"), Some("ol"));
        assert_eq!(codes[0].attribute("class"), Some("nav"));
        assert_eq!(codes[0].attribute("dropdown"), Some("true"));
    }

    #[test]
    fn short_form_and_case() {
        let codes = parse_shortcodes("[m:footer] [MENU:Main-2]");
        let aliases: Vec<_> = codes.iter().map(|c| c.alias.as_str()).collect();
        assert_eq!(aliases, ["footer", "Main-2"]);
    }

    #[test]
    fn aliases_are_distinct() {
        assert_eq!(
            aliases_in("[menu:main] text [m:main] [menu:blogroll]"),
            ["main", "blogroll"]
        );
    }

    #[test]
    fn other_brackets_untouched() {
        let out = replace_shortcodes("[b]bold[/b] [menu:x]", |_| "X".to_string());
        assert_eq!(out, "[b]bold[/b] X");
    }
}
