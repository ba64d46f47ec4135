//! `/api/todos`: the caller's to-do list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::AppState;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{TodoDraft, TodoItem, TodoPatch};
use crate::services::todos;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(draft): Json<TodoDraft>,
) -> Result<(StatusCode, Json<TodoItem>)> {
    let item = todos::create(&state.storage, caller.id(), draft)?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn list(State(state): State<AppState>, caller: AuthUser) -> Result<Json<Vec<TodoItem>>> {
    todos::list(&state.storage, caller.id()).map(Json)
}

async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TodoItem>> {
    todos::get(&state.storage, caller.id(), &id).map(Json)
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<TodoPatch>,
) -> Result<Json<TodoItem>> {
    todos::update(&state.storage, caller.id(), &id, patch).map(Json)
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    todos::delete(&state.storage, caller.id(), &id)?;
    Ok(StatusCode::NO_CONTENT)
}
