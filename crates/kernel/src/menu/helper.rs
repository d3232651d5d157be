//! Menu view helper: expands `[menu:alias]` shortcodes into navigation
//! markup during `Helper.Layout.beforeFilter`.

use std::fmt::Write;

use anyhow::{Context, Result};
use tera::Tera;
use tracing::{debug, warn};

use super::LayoutMenu;
use super::shortcode::{Shortcode, replace_shortcodes};
use crate::event::{Event, EventBinding, EventListener, names};
use crate::models::Link;
use crate::tree::Threaded;
use crate::view::View;

const MENU_TEMPLATE_NAME: &str = "menu.html";
const MENU_TEMPLATE: &str = concat!(
    r#"<div id="menu-{{ menu.id }}" class="menu{% if menu.class %} {{ menu.class }}{% endif %}">"#,
    r#"{{ links | safe }}</div>"#,
);

/// Rendering options, from shortcode attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOptions {
    /// List element, `ul` or `ol`.
    pub tag: String,
    /// Class on the top-level list.
    pub class: Option<String>,
    /// Class given to links matching the current path.
    pub selected: String,
    pub dropdown: bool,
    /// Class added to the top-level list when `dropdown` is set.
    pub dropdown_class: String,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            tag: "ul".to_string(),
            class: None,
            selected: "selected".to_string(),
            dropdown: false,
            dropdown_class: "sf-menu".to_string(),
        }
    }
}

impl MenuOptions {
    /// Options from shortcode attributes; unknown keys are ignored.
    pub fn from_shortcode(shortcode: &Shortcode) -> Self {
        let mut options = Self::default();
        if let Some(tag) = shortcode.attribute("tag") {
            let tag = tag.to_ascii_lowercase();
            if LIST_TAGS.contains(&tag.as_str()) {
                options.tag = tag;
            }
        }
        if let Some(class) = shortcode.attribute("class") {
            options.class = Some(class.to_string());
        }
        if let Some(selected) = shortcode.attribute("selected") {
            options.selected = selected.to_string();
        }
        if let Some(dropdown) = shortcode.attribute("dropdown") {
            options.dropdown = matches!(dropdown.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(class) = shortcode.attribute("dropdownClass") {
            options.dropdown_class = class.to_string();
        }
        options
    }
}

/// List elements a shortcode may ask for.
const LIST_TAGS: &[&str] = &["ul", "ol"];

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Renders menus and listens for layout filtering.
pub struct MenusHelper {
    tera: Tera,
}

impl MenusHelper {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(MENU_TEMPLATE_NAME, MENU_TEMPLATE)
            .context("failed to register menu template")?;
        Ok(Self { tera })
    }

    /// Markup for one menu.
    pub fn menu(&self, menu: &LayoutMenu, options: &MenuOptions, path: &str) -> Result<String> {
        let links = self.nested_links(&menu.threaded, options, path);

        let mut context = tera::Context::new();
        context.insert("menu", &menu.menu);
        context.insert("links", &links);
        self.tera
            .render(MENU_TEMPLATE_NAME, &context)
            .with_context(|| format!("failed to render menu '{}'", menu.menu.alias))
    }

    /// Nested lists for a link tree. Empty trees render nothing.
    pub fn nested_links(&self, links: &[Threaded<Link>], options: &MenuOptions, path: &str) -> String {
        let mut out = String::new();
        write_list(&mut out, links, options, path, 0);
        out
    }

    /// Replace every menu shortcode in `content`.
    ///
    /// Aliases missing from `view` expand to an empty string.
    pub fn expand(&self, content: &str, view: &View) -> String {
        replace_shortcodes(content, |shortcode| {
            let Some(menu) = view.vars.menus_for_layout.get(&shortcode.alias) else {
                debug!(alias = %shortcode.alias, "menu shortcode for unloaded menu");
                return String::new();
            };
            let options = MenuOptions::from_shortcode(shortcode);
            match self.menu(menu, &options, &view.request_path) {
                Ok(html) => html,
                Err(e) => {
                    warn!(alias = %shortcode.alias, error = %e, "menu render failed");
                    String::new()
                }
            }
        })
    }
}

impl EventListener<View> for MenusHelper {
    fn name(&self) -> &str {
        "Menus"
    }

    fn implemented_events(&self) -> Vec<EventBinding> {
        vec![EventBinding::new(names::LAYOUT_BEFORE_FILTER)]
    }

    fn handle(&self, event: &mut Event<'_, View>) -> anyhow::Result<()> {
        let Some(content) = event.data_str("content") else {
            return Ok(());
        };
        let expanded = self.expand(content, &*event.subject);
        event
            .data
            .insert("content".to_string(), serde_json::Value::String(expanded));
        Ok(())
    }
}

fn write_list(
    out: &mut String,
    links: &[Threaded<Link>],
    options: &MenuOptions,
    path: &str,
    depth: usize,
) {
    if links.is_empty() {
        return;
    }

    let mut classes: Vec<&str> = Vec::new();
    if depth == 0 {
        if let Some(class) = options.class.as_deref() {
            classes.push(class);
        }
        if options.dropdown {
            classes.push(&options.dropdown_class);
        }
    }

    let _ = write!(out, "<{}", options.tag);
    write_class(out, &classes);
    out.push('>');

    for node in links {
        let link = &node.node;
        let mut link_classes: Vec<&str> = link.class.as_deref().into_iter().collect();
        if same_path(&link.link, path) {
            link_classes.push(&options.selected);
        }

        out.push_str("<li>");
        let _ = write!(
            out,
            r#"<a href="{}" id="link-{}""#,
            escape_html(&link.link),
            link.id
        );
        write_class(out, &link_classes);
        if let Some(description) = link.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(out, r#" title="{}""#, escape_html(description));
        }
        if let Some(rel) = link.rel.as_deref() {
            let _ = write!(out, r#" rel="{}""#, escape_html(rel));
        }
        if let Some(target) = link.target.as_deref() {
            let _ = write!(out, r#" target="{}""#, escape_html(target));
        }
        let _ = write!(out, ">{}</a>", escape_html(&link.title));
        write_list(out, &node.children, options, path, depth + 1);
        out.push_str("</li>");
    }

    let _ = write!(out, "</{}>", options.tag);
}

fn write_class(out: &mut String, classes: &[&str]) {
    if !classes.is_empty() {
        let _ = write!(out, r#" class="{}""#, escape_html(&classes.join(" ")));
    }
}

/// Paths match ignoring a trailing slash.
fn same_path(link: &str, path: &str) -> bool {
    fn trim(p: &str) -> &str {
        let trimmed = p.trim_end_matches('/');
        if trimmed.is_empty() { "/" } else { trimmed }
    }
    !path.is_empty() && trim(link) == trim(path)
}
