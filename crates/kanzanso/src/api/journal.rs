//! `/api/journal`: the caller's journal.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{AppState, RangeQuery};
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{JournalDraft, JournalEntry, JournalPatch};
use crate::services::journal;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/mood/{mood}", get(by_mood))
        .route("/date-range", get(in_range))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(draft): Json<JournalDraft>,
) -> Result<(StatusCode, Json<JournalEntry>)> {
    let entry = journal::create(&state.storage, caller.id(), draft)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn list(State(state): State<AppState>, caller: AuthUser) -> Result<Json<Vec<JournalEntry>>> {
    journal::list(&state.storage, caller.id()).map(Json)
}

async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<JournalEntry>> {
    journal::get(&state.storage, caller.id(), &id).map(Json)
}

async fn by_mood(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(mood): Path<String>,
) -> Result<Json<Vec<JournalEntry>>> {
    journal::by_mood(&state.storage, caller.id(), &mood).map(Json)
}

async fn in_range(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<JournalEntry>>> {
    journal::in_range(&state.storage, caller.id(), range.start, range.end).map(Json)
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<JournalPatch>,
) -> Result<Json<JournalEntry>> {
    journal::update(&state.storage, caller.id(), &id, patch).map(Json)
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    journal::delete(&state.storage, caller.id(), &id)?;
    Ok(StatusCode::NO_CONTENT)
}
