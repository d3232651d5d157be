//! Content rendering through the layout filter pipeline.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::menu::aliases_in;
use crate::state::AppState;
use crate::view::View;

/// Create the render router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/render", post(render))
}

#[derive(Deserialize)]
struct RenderRequest {
    content: String,
    /// Current request path, for selected links.
    #[serde(default = "default_path")]
    path: String,
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Serialize)]
struct RenderResponse {
    content: String,
}

/// Expand shortcodes in `content`, loading only the menus it names.
async fn render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> AppResult<Json<RenderResponse>> {
    let aliases = aliases_in(&request.content);
    let menus = state.menus().menus_for_layout(&aliases).await?;

    let mut view = View::new(&request.path).with_menus(menus);
    let content = state.layout().filter(&mut view, &request.content);
    Ok(Json(RenderResponse { content }))
}
