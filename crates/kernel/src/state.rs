//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::configure::Configure;
use crate::db;
use crate::hooks::HookRegistry;
use crate::menu::{MemoryMenuStore, MenuStore, MenusComponent, MenusHelper, PgMenuStore};
use crate::plugin;
use crate::taxonomy::{MemoryTaxonomyStore, PgTaxonomyStore, TaxonomyService, TaxonomyStore};
use crate::view::Layout;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool, absent when running in memory.
    db: Option<PgPool>,

    /// Term and vocabulary service.
    taxonomy: Arc<TaxonomyService>,

    /// Menu loading for layouts.
    menus: Arc<MenusComponent>,

    /// Hook registry, populated from plugin manifests at startup.
    hooks: HookRegistry,

    /// Layout filter pipeline with the menu helper attached.
    layout: Layout,

    /// Plugins in the order their hooks were applied.
    plugins: Vec<String>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Connects to PostgreSQL and runs migrations when `DATABASE_URL` is
    /// set; otherwise keeps every row in memory. Plugins found under the
    /// plugins directory are bootstrapped into the hook registry.
    pub async fn new(config: &Config) -> Result<Self> {
        let (db, taxonomy_store, menu_store): (
            Option<PgPool>,
            Arc<dyn TaxonomyStore>,
            Arc<dyn MenuStore>,
        ) = match &config.database_url {
            Some(url) => {
                let pool = db::create_pool(url, config.database_max_connections)
                    .await
                    .context("failed to create database pool")?;
                db::run_migrations(&pool)
                    .await
                    .context("failed to run migrations")?;
                info!("using PostgreSQL storage");
                (
                    Some(pool.clone()),
                    Arc::new(PgTaxonomyStore::new(pool.clone())),
                    Arc::new(PgMenuStore::new(pool)),
                )
            }
            None => {
                info!("DATABASE_URL not set, using in-memory storage");
                (
                    None,
                    Arc::new(MemoryTaxonomyStore::new()),
                    Arc::new(MemoryMenuStore::new()),
                )
            }
        };

        let hooks = HookRegistry::with_config(Arc::new(Configure::new()));
        let plugins = plugin::bootstrap_dir(&config.plugins_dir, &hooks)
            .context("failed to bootstrap plugins")?;

        Self::from_parts(db, taxonomy_store, menu_store, hooks, plugins)
    }

    /// State over in-memory stores with an empty hook registry.
    pub fn in_memory() -> Result<Self> {
        Self::from_parts(
            None,
            Arc::new(MemoryTaxonomyStore::new()),
            Arc::new(MemoryMenuStore::new()),
            HookRegistry::new(),
            Vec::new(),
        )
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        db: Option<PgPool>,
        taxonomy_store: Arc<dyn TaxonomyStore>,
        menu_store: Arc<dyn MenuStore>,
        hooks: HookRegistry,
        plugins: Vec<String>,
    ) -> Result<Self> {
        let mut layout = Layout::new();
        layout.on(Arc::new(
            MenusHelper::new().context("failed to create menu helper")?,
        ));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                taxonomy: TaxonomyService::new(taxonomy_store),
                menus: MenusComponent::new(menu_store),
                hooks,
                layout,
                plugins,
            }),
        })
    }

    /// Get the database pool, if one is configured.
    pub fn db(&self) -> Option<&PgPool> {
        self.inner.db.as_ref()
    }

    /// Get the taxonomy service.
    pub fn taxonomy(&self) -> &Arc<TaxonomyService> {
        &self.inner.taxonomy
    }

    /// Get the menus component.
    pub fn menus(&self) -> &Arc<MenusComponent> {
        &self.inner.menus
    }

    /// Get the hook registry.
    pub fn hooks(&self) -> &HookRegistry {
        &self.inner.hooks
    }

    /// Get the layout pipeline.
    pub fn layout(&self) -> &Layout {
        &self.inner.layout
    }

    /// Loaded plugins, in load order.
    pub fn plugins(&self) -> &[String] {
        &self.inner.plugins
    }

    /// Check storage health.
    pub async fn storage_healthy(&self) -> bool {
        self.inner.taxonomy.store().ping().await
    }
}
