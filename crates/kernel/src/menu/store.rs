//! Storage abstraction for menus and their links.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CreateLink, CreateMenu, Link, Menu};

/// Row-level storage used by [`MenusComponent`](super::MenusComponent).
#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn find_menu_by_alias(&self, alias: &str) -> Result<Option<Menu>>;

    /// Every menu, ordered by weight then title.
    async fn list_menus(&self) -> Result<Vec<Menu>>;

    /// Insert a menu. Fails when the alias is taken.
    async fn insert_menu(&self, input: &CreateMenu) -> Result<Menu>;

    /// Links of a menu ordered by weight then id, inactive ones included.
    async fn list_links(&self, menu_id: i64) -> Result<Vec<Link>>;

    /// Insert a link. Missing weights append after the current siblings.
    async fn insert_link(&self, input: &CreateLink) -> Result<Link>;
}
