//! In-process implementation of MenuStore.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use parking_lot::RwLock;

use super::MenuStore;
use crate::models::{CreateLink, CreateMenu, Link, Menu};
use crate::tree;

#[derive(Debug, Default)]
struct Tables {
    menus: BTreeMap<i64, Menu>,
    links: BTreeMap<i64, Link>,
    next_id: i64,
}

/// Menu storage held in memory.
#[derive(Debug, Default)]
pub struct MemoryMenuStore {
    tables: RwLock<Tables>,
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MenuStore for MemoryMenuStore {
    async fn find_menu_by_alias(&self, alias: &str) -> Result<Option<Menu>> {
        Ok(self
            .tables
            .read()
            .menus
            .values()
            .find(|m| m.alias == alias)
            .cloned())
    }

    async fn list_menus(&self) -> Result<Vec<Menu>> {
        let mut menus: Vec<Menu> = self.tables.read().menus.values().cloned().collect();
        menus.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.title.cmp(&b.title)));
        Ok(menus)
    }

    async fn insert_menu(&self, input: &CreateMenu) -> Result<Menu> {
        let mut tables = self.tables.write();
        if tables.menus.values().any(|m| m.alias == input.alias) {
            bail!("duplicate menu alias '{}'", input.alias);
        }

        tables.next_id += 1;
        let menu = Menu {
            id: tables.next_id,
            title: input.title.clone(),
            alias: input.alias.clone(),
            class: input.class.clone(),
            description: input.description.clone(),
            status: input.status.unwrap_or(true),
            weight: input.weight.unwrap_or(0),
        };
        tables.menus.insert(menu.id, menu.clone());
        Ok(menu)
    }

    async fn list_links(&self, menu_id: i64) -> Result<Vec<Link>> {
        let mut links: Vec<Link> = self
            .tables
            .read()
            .links
            .values()
            .filter(|l| l.menu_id == menu_id)
            .cloned()
            .collect();
        links.sort_by_key(|l| (l.weight, l.id));
        Ok(links)
    }

    async fn insert_link(&self, input: &CreateLink) -> Result<Link> {
        let mut tables = self.tables.write();
        if !tables.menus.contains_key(&input.menu_id) {
            bail!("link references missing menu {}", input.menu_id);
        }
        if let Some(parent_id) = input.parent_id
            && tables
                .links
                .get(&parent_id)
                .is_none_or(|p| p.menu_id != input.menu_id)
        {
            bail!("link parent {parent_id} is not in menu {}", input.menu_id);
        }

        let weight = match input.weight {
            Some(w) => w,
            None => {
                let siblings: Vec<Link> = tables
                    .links
                    .values()
                    .filter(|l| l.menu_id == input.menu_id)
                    .cloned()
                    .collect();
                tree::next_weight(&siblings, input.parent_id)
            }
        };

        tables.next_id += 1;
        let link = Link {
            id: tables.next_id,
            menu_id: input.menu_id,
            parent_id: input.parent_id,
            title: input.title.clone(),
            link: input.link.clone(),
            description: input.description.clone(),
            class: input.class.clone(),
            rel: input.rel.clone(),
            target: input.target.clone(),
            status: input.status.unwrap_or(true),
            weight,
        };
        tables.links.insert(link.id, link.clone());
        Ok(link)
    }
}
