//! Menu and link models.
//!
//! A menu is a named container ("main", "footer", "blogroll"); its links
//! form a tree ordered by weight.

use serde::{Deserialize, Serialize};

use crate::tree::TreeNode;

/// A stored menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Menu {
    pub id: i64,
    pub title: String,
    /// Unique machine name used by `[menu:alias]`.
    pub alias: String,
    pub class: Option<String>,
    pub description: Option<String>,
    /// Only active menus render.
    pub status: bool,
    pub weight: i32,
}

/// A stored menu link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Link {
    pub id: i64,
    pub menu_id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    /// Destination URL or path.
    pub link: String,
    pub description: Option<String>,
    pub class: Option<String>,
    pub rel: Option<String>,
    pub target: Option<String>,
    pub status: bool,
    pub weight: i32,
}

impl TreeNode for Link {
    fn node_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn weight(&self) -> i32 {
        self.weight
    }
}

/// Input for creating a menu.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMenu {
    pub title: String,
    pub alias: String,
    pub class: Option<String>,
    pub description: Option<String>,
    pub status: Option<bool>,
    pub weight: Option<i32>,
}

impl CreateMenu {
    /// Active menu with no class or description.
    pub fn new(title: &str, alias: &str) -> Self {
        Self {
            title: title.to_string(),
            alias: alias.to_string(),
            class: None,
            description: None,
            status: None,
            weight: None,
        }
    }
}

/// Input for creating a link.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLink {
    #[serde(default)]
    pub menu_id: i64,
    pub parent_id: Option<i64>,
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub class: Option<String>,
    pub rel: Option<String>,
    pub target: Option<String>,
    pub status: Option<bool>,
    pub weight: Option<i32>,
}

impl CreateLink {
    /// Active root link.
    pub fn new(menu_id: i64, title: &str, link: &str) -> Self {
        Self {
            menu_id,
            parent_id: None,
            title: title.to_string(),
            link: link.to_string(),
            description: None,
            class: None,
            rel: None,
            target: None,
            status: None,
            weight: None,
        }
    }

    /// Nest under another link.
    pub fn under(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}
