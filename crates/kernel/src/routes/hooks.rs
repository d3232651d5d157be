//! Hook registry API routes.
//!
//! Read-only views of what plugins attached to controllers and tables.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::hooks::ComponentOptions;
use crate::state::AppState;

/// Create the hooks router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/hooks", get(all_hooks))
        .route("/api/hooks/{controller}/api-components", get(api_components))
}

#[derive(Serialize)]
struct HooksResponse {
    controller_properties: Value,
    table_properties: Value,
}

#[derive(Serialize)]
struct ComponentResponse {
    name: String,
    priority: i32,
    #[serde(skip_serializing_if = "Map::is_empty")]
    config: Map<String, Value>,
}

impl From<(String, ComponentOptions)> for ComponentResponse {
    fn from((name, options): (String, ComponentOptions)) -> Self {
        Self {
            name,
            priority: options.priority,
            config: options.config,
        }
    }
}

async fn all_hooks(State(state): State<AppState>) -> Json<HooksResponse> {
    let hooks = state.hooks();
    Json(HooksResponse {
        controller_properties: hooks.controller_properties(),
        table_properties: hooks.table_properties(),
    })
}

/// API components of a controller in load order.
async fn api_components(
    State(state): State<AppState>,
    Path(controller): Path<String>,
) -> Json<Vec<ComponentResponse>> {
    Json(
        state
            .hooks()
            .api_components(&controller)
            .into_iter()
            .map(ComponentResponse::from)
            .collect(),
    )
}
