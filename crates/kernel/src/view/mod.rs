//! Views and the layout filter pipeline.
//!
//! A [`View`] carries what a render needs (loaded menus, the request path).
//! [`Layout::filter`] passes content through the `Helper.Layout.*` events so
//! helpers such as the menu helper can rewrite it.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::event::{EventListener, EventManager, names};
use crate::menu::MenusForLayout;

/// Variables handed to a view.
#[derive(Debug, Clone, Default)]
pub struct ViewVars {
    pub menus_for_layout: MenusForLayout,
}

/// The subject of layout events.
#[derive(Debug, Clone, Default)]
pub struct View {
    pub vars: ViewVars,
    /// Path of the current request, for marking selected links.
    pub request_path: String,
}

impl View {
    pub fn new(request_path: &str) -> Self {
        Self {
            vars: ViewVars::default(),
            request_path: request_path.to_string(),
        }
    }

    /// Attach loaded menus.
    pub fn with_menus(mut self, menus: MenusForLayout) -> Self {
        self.vars.menus_for_layout = menus;
        self
    }
}

/// Layout filter pipeline.
#[derive(Default)]
pub struct Layout {
    events: EventManager<View>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a helper.
    pub fn on(&mut self, listener: Arc<dyn EventListener<View>>) {
        self.events.on(listener);
    }

    /// Run `content` through `beforeFilter` then `afterFilter`.
    pub fn filter(&self, view: &mut View, content: &str) -> String {
        let mut content = content.to_string();
        for event in [names::LAYOUT_BEFORE_FILTER, names::LAYOUT_AFTER_FILTER] {
            let mut data = Map::new();
            data.insert("content".to_string(), Value::String(content.clone()));
            let outcome = self.events.dispatch(event, view, data);
            if let Some(filtered) = outcome.data_str("content") {
                content = filtered.to_string();
            }
        }
        content
    }
}
