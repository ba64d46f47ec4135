//! `/api/moods`: daily mood entries.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{non_blank, AppState, UserQuery, UserRangeQuery};
use crate::error::Result;
use crate::models::{MoodDraft, MoodEntry, MoodPatch};
use crate::services::moods;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(record))
        .route("/range", get(in_range))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<MoodEntry>>> {
    non_blank("userId", &query.user_id)?;
    moods::list(&state.storage, &query.user_id).map(Json)
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<MoodEntry>> {
    moods::get(&state.storage, &id).map(Json)
}

async fn in_range(
    State(state): State<AppState>,
    Query(query): Query<UserRangeQuery>,
) -> Result<Json<Vec<MoodEntry>>> {
    moods::in_range(&state.storage, &query.user_id, query.start, query.end).map(Json)
}

/// A second mood on the same day replaces the first and answers 200.
async fn record(
    State(state): State<AppState>,
    Json(draft): Json<MoodDraft>,
) -> Result<(StatusCode, Json<MoodEntry>)> {
    let (entry, created) = moods::record(&state.storage, draft)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(entry)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<MoodPatch>,
) -> Result<Json<MoodEntry>> {
    moods::update(&state.storage, &id, patch).map(Json)
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    moods::delete(&state.storage, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
