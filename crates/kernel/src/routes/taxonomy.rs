//! Taxonomy API routes.
//!
//! REST endpoints for vocabularies and the terms placed in them.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{AddTerm, CreateVocabulary, EditTerm, Taxonomy, Term, TreeEntry, Vocabulary};
use crate::state::AppState;
use crate::taxonomy::{FindOptions, SaveOutcome, ValidationErrors, VocabularyOutcome};

/// Create the taxonomy router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Vocabulary routes
        .route(
            "/api/vocabularies",
            get(list_vocabularies).post(create_vocabulary),
        )
        .route(
            "/api/vocabularies/{id}",
            get(get_vocabulary).delete(delete_vocabulary),
        )
        .route("/api/vocabularies/{id}/tree", get(vocabulary_tree))
        // Term placement routes
        .route(
            "/api/vocabularies/{id}/terms",
            get(list_terms).post(add_term),
        )
        .route(
            "/api/vocabularies/{id}/terms/{term_id}",
            delete(remove_term).put(edit_term),
        )
        .route("/api/vocabularies/{id}/terms/{term_id}/move-up", post(move_up))
        .route(
            "/api/vocabularies/{id}/terms/{term_id}/move-down",
            post(move_down),
        )
        // Term routes
        .route("/api/terms/{id}", delete(delete_term))
}

// -------------------------------------------------------------------------
// Request/response types
// -------------------------------------------------------------------------

/// Body of `PUT /api/vocabularies/{id}/terms/{term_id}`.
#[derive(Deserialize)]
struct EditTermRequest {
    title: String,
    slug: String,
    description: Option<String>,
    parent_id: Option<i64>,
    /// Move the term into this vocabulary instead.
    vocabulary_id: Option<i64>,
}

#[derive(Serialize)]
struct RemovedResponse {
    /// Whether the term itself was deleted after leaving the vocabulary.
    term_deleted: bool,
}

#[derive(Serialize)]
struct MovedResponse {
    moved: bool,
}

// -------------------------------------------------------------------------
// Vocabulary handlers
// -------------------------------------------------------------------------

async fn list_vocabularies(State(state): State<AppState>) -> AppResult<Json<Vec<Vocabulary>>> {
    Ok(Json(state.taxonomy().vocabularies().await?))
}

async fn create_vocabulary(
    State(state): State<AppState>,
    Json(input): Json<CreateVocabulary>,
) -> AppResult<(StatusCode, Json<Vocabulary>)> {
    match state.taxonomy().create_vocabulary(input).await? {
        VocabularyOutcome::Created(vocabulary) => Ok((StatusCode::CREATED, Json(vocabulary))),
        VocabularyOutcome::Invalid(errors) => Err(AppError::Validation(errors)),
    }
}

async fn get_vocabulary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vocabulary>> {
    Ok(Json(find_vocabulary(&state, id).await?))
}

async fn delete_vocabulary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if state.taxonomy().delete_vocabulary(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn vocabulary_tree(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<TreeEntry>>> {
    let vocabulary = find_vocabulary(&state, id).await?;
    Ok(Json(state.taxonomy().tree(&vocabulary.alias).await?))
}

// -------------------------------------------------------------------------
// Term handlers
// -------------------------------------------------------------------------

async fn list_terms(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Term>>> {
    find_vocabulary(&state, id).await?;
    let terms = state
        .taxonomy()
        .find_by_vocabulary(&FindOptions::vocabulary(id))
        .await?;
    Ok(Json(terms))
}

async fn add_term(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<AddTerm>,
) -> AppResult<(StatusCode, Json<Taxonomy>)> {
    find_vocabulary(&state, id).await?;
    let outcome = state.taxonomy().add(&input, id).await?;
    saved(outcome).map(|taxonomy| (StatusCode::CREATED, Json(taxonomy)))
}

async fn edit_term(
    State(state): State<AppState>,
    Path((id, term_id)): Path<(i64, i64)>,
    Json(request): Json<EditTermRequest>,
) -> AppResult<Json<Taxonomy>> {
    let taxonomy = find_placement(&state, id, term_id).await?;
    let input = EditTerm {
        term_id,
        taxonomy_id: taxonomy.id,
        title: request.title,
        slug: request.slug,
        description: request.description,
        parent_id: request.parent_id,
    };
    let target = request.vocabulary_id.unwrap_or(id);

    let outcome = state.taxonomy().edit(&input, target).await?;
    saved(outcome).map(Json)
}

async fn remove_term(
    State(state): State<AppState>,
    Path((id, term_id)): Path<(i64, i64)>,
) -> AppResult<Json<RemovedResponse>> {
    find_placement(&state, id, term_id).await?;
    let term_deleted = state.taxonomy().remove(term_id, id).await?;
    Ok(Json(RemovedResponse { term_deleted }))
}

async fn move_up(
    State(state): State<AppState>,
    Path((id, term_id)): Path<(i64, i64)>,
) -> AppResult<Json<MovedResponse>> {
    let taxonomy = find_placement(&state, id, term_id).await?;
    let moved = state.taxonomy().move_up(taxonomy.id).await?;
    Ok(Json(MovedResponse { moved }))
}

async fn move_down(
    State(state): State<AppState>,
    Path((id, term_id)): Path<(i64, i64)>,
) -> AppResult<Json<MovedResponse>> {
    let taxonomy = find_placement(&state, id, term_id).await?;
    let moved = state.taxonomy().move_down(taxonomy.id).await?;
    Ok(Json(MovedResponse { moved }))
}

async fn delete_term(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    if state.taxonomy().term(id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    if state.taxonomy().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Conflict(
            "term is still placed in a vocabulary".to_string(),
        ))
    }
}

// -------------------------------------------------------------------------
// Helpers
// -------------------------------------------------------------------------

async fn find_vocabulary(state: &AppState, id: i64) -> AppResult<Vocabulary> {
    state
        .taxonomy()
        .vocabulary(id)
        .await?
        .ok_or(AppError::NotFound)
}

async fn find_placement(state: &AppState, id: i64, term_id: i64) -> AppResult<Taxonomy> {
    state
        .taxonomy()
        .taxonomy_for(term_id, id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Map a save outcome onto the written row or an HTTP error.
fn saved(outcome: SaveOutcome) -> AppResult<Taxonomy> {
    match outcome {
        SaveOutcome::Saved(taxonomy) => Ok(taxonomy),
        SaveOutcome::AlreadyInVocabulary { term_id } => Err(AppError::Conflict(format!(
            "term {term_id} is already in this vocabulary"
        ))),
        SaveOutcome::SlugTaken => Err(AppError::Validation(ValidationErrors::single(
            "slug",
            "That slug is already taken",
        ))),
        SaveOutcome::Invalid(errors) => Err(AppError::Validation(errors)),
        SaveOutcome::NotFound => Err(AppError::NotFound),
        SaveOutcome::Aborted => Err(AppError::Conflict("save was aborted".to_string())),
    }
}
