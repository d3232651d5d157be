//! HTTP route handlers.

pub mod health;
pub mod hooks;
pub mod menu;
pub mod render;
pub mod taxonomy;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Every kernel route with tracing, bound to `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(taxonomy::router())
        .merge(hooks::router())
        .merge(menu::router())
        .merge(render::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
