//! PostgreSQL implementation of MenuStore.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::MenuStore;
use crate::models::{CreateLink, CreateMenu, Link, Menu};

const MENU_COLUMNS: &str = "id, title, alias, class, description, status, weight";
const LINK_COLUMNS: &str =
    "id, menu_id, parent_id, title, link, description, class, rel, target, status, weight";

/// Menu storage backed by the `menus` and `links` tables.
#[derive(Clone)]
pub struct PgMenuStore {
    pool: PgPool,
}

impl PgMenuStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuStore for PgMenuStore {
    async fn find_menu_by_alias(&self, alias: &str) -> Result<Option<Menu>> {
        let menu = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE alias = $1"
        ))
        .bind(alias)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch menu by alias")?;

        Ok(menu)
    }

    async fn list_menus(&self) -> Result<Vec<Menu>> {
        let menus = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus ORDER BY weight, title"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list menus")?;

        Ok(menus)
    }

    async fn insert_menu(&self, input: &CreateMenu) -> Result<Menu> {
        let menu = sqlx::query_as::<_, Menu>(&format!(
            r#"
            INSERT INTO menus (title, alias, class, description, status, weight)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MENU_COLUMNS}
            "#
        ))
        .bind(&input.title)
        .bind(&input.alias)
        .bind(&input.class)
        .bind(&input.description)
        .bind(input.status.unwrap_or(true))
        .bind(input.weight.unwrap_or(0))
        .fetch_one(&self.pool)
        .await
        .context("failed to insert menu")?;

        Ok(menu)
    }

    async fn list_links(&self, menu_id: i64) -> Result<Vec<Link>> {
        let links = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE menu_id = $1 ORDER BY weight, id"
        ))
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list links")?;

        Ok(links)
    }

    async fn insert_link(&self, input: &CreateLink) -> Result<Link> {
        // Missing weight appends after the last sibling.
        let link = sqlx::query_as::<_, Link>(&format!(
            r#"
            INSERT INTO links
                (menu_id, parent_id, title, link, description, class, rel, target, status, weight)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                COALESCE($10, (
                    SELECT COALESCE(MAX(weight) + 1, 0) FROM links
                    WHERE menu_id = $1 AND parent_id IS NOT DISTINCT FROM $2
                )))
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(input.menu_id)
        .bind(input.parent_id)
        .bind(&input.title)
        .bind(&input.link)
        .bind(&input.description)
        .bind(&input.class)
        .bind(&input.rel)
        .bind(&input.target)
        .bind(input.status.unwrap_or(true))
        .bind(input.weight)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert link")?;

        Ok(link)
    }
}
