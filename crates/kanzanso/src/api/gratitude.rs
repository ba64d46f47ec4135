//! `/api/gratitude`: gratitude log.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{non_blank, AppState, UserQuery, UserRangeQuery};
use crate::error::Result;
use crate::models::{GratitudeDraft, GratitudeEntry, GratitudePatch, GratitudeStats};
use crate::services::gratitude;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/range", get(in_range))
        .route("/tag/{tag}", get(by_tag))
        .route("/stats", get(stats))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<GratitudeEntry>>> {
    non_blank("userId", &query.user_id)?;
    gratitude::list(&state.storage, &query.user_id).map(Json)
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GratitudeEntry>> {
    gratitude::get(&state.storage, &id).map(Json)
}

async fn in_range(
    State(state): State<AppState>,
    Query(query): Query<UserRangeQuery>,
) -> Result<Json<Vec<GratitudeEntry>>> {
    gratitude::in_range(&state.storage, &query.user_id, query.start, query.end).map(Json)
}

async fn by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<GratitudeEntry>>> {
    gratitude::by_tag(&state.storage, &query.user_id, &tag).map(Json)
}

async fn stats(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<GratitudeStats>> {
    gratitude::stats(&state.storage, &query.user_id).map(Json)
}

async fn create(
    State(state): State<AppState>,
    Json(draft): Json<GratitudeDraft>,
) -> Result<(StatusCode, Json<GratitudeEntry>)> {
    let entry = gratitude::create(&state.storage, draft)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<GratitudePatch>,
) -> Result<Json<GratitudeEntry>> {
    gratitude::update(&state.storage, &id, patch).map(Json)
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    gratitude::delete(&state.storage, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
