//! Menu API routes.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};

use crate::error::{AppError, AppResult};
use crate::models::{CreateLink, CreateMenu, Link, Menu};
use crate::state::AppState;

/// Create the menu router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/menus", get(list_menus).post(create_menu))
        .route("/api/menus/{id}/links", post(create_link))
}

async fn list_menus(State(state): State<AppState>) -> AppResult<Json<Vec<Menu>>> {
    Ok(Json(state.menus().menus().await?))
}

async fn create_menu(
    State(state): State<AppState>,
    Json(input): Json<CreateMenu>,
) -> AppResult<(StatusCode, Json<Menu>)> {
    if input.title.trim().is_empty() || input.alias.trim().is_empty() {
        return Err(AppError::BadRequest(
            "title and alias are required".to_string(),
        ));
    }
    if state
        .menus()
        .store()
        .find_menu_by_alias(&input.alias)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "menu alias '{}' is already taken",
            input.alias
        )));
    }

    let menu = state.menus().create_menu(&input).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

/// The path's menu id wins over any `menu_id` in the body.
async fn create_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut input): Json<CreateLink>,
) -> AppResult<(StatusCode, Json<Link>)> {
    let menus = state.menus().menus().await?;
    if !menus.iter().any(|m| m.id == id) {
        return Err(AppError::NotFound);
    }
    if let Some(parent_id) = input.parent_id {
        let links = state.menus().store().list_links(id).await?;
        if !links.iter().any(|l| l.id == parent_id) {
            return Err(AppError::BadRequest(
                "parent link must belong to the same menu".to_string(),
            ));
        }
    }

    input.menu_id = id;
    let link = state.menus().create_link(&input).await?;
    Ok((StatusCode::CREATED, Json(link)))
}
