//! Loads the menus a layout needs.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MenuStore;
use crate::models::{CreateLink, CreateMenu, Link, Menu};
use crate::tree::{self, Threaded};

/// A menu with its active links nested, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMenu {
    pub menu: Menu,
    #[serde(default)]
    pub threaded: Vec<Threaded<Link>>,
}

/// Menus keyed by alias, as handed to views.
pub type MenusForLayout = BTreeMap<String, LayoutMenu>;

/// Menu loading for layouts.
pub struct MenusComponent {
    store: Arc<dyn MenuStore>,
}

impl MenusComponent {
    pub fn new(store: Arc<dyn MenuStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn MenuStore> {
        &self.store
    }

    /// Load active menus by alias with their active links threaded.
    ///
    /// Unknown and inactive aliases are skipped.
    pub async fn menus_for_layout(&self, aliases: &[String]) -> Result<MenusForLayout> {
        let mut menus = MenusForLayout::new();
        for alias in aliases {
            if menus.contains_key(alias) {
                continue;
            }
            let Some(menu) = self.store.find_menu_by_alias(alias).await? else {
                debug!(alias = %alias, "menu not found");
                continue;
            };
            if !menu.status {
                continue;
            }

            let links: Vec<Link> = self
                .store
                .list_links(menu.id)
                .await?
                .into_iter()
                .filter(|l| l.status)
                .collect();
            let threaded = tree::thread(links);
            menus.insert(alias.clone(), LayoutMenu { menu, threaded });
        }
        Ok(menus)
    }

    /// All menus.
    pub async fn menus(&self) -> Result<Vec<Menu>> {
        self.store.list_menus().await
    }

    pub async fn create_menu(&self, input: &CreateMenu) -> Result<Menu> {
        self.store.insert_menu(input).await
    }

    pub async fn create_link(&self, input: &CreateLink) -> Result<Link> {
        self.store.insert_link(input).await
    }
}
