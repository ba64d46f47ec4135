//! `/api/playlists`: the caller's mood playlists.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::{non_blank, AppState};
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{Playlist, PlaylistDraft};
use crate::services::playlists;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/moods", get(moods))
        .route("/mood", post(create_for_mood))
        .route("/mood/{mood}", get(by_mood))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct MoodQuery {
    mood: String,
    name: Option<String>,
}

async fn moods() -> Json<Vec<&'static str>> {
    Json(playlists::moods())
}

async fn list(State(state): State<AppState>, caller: AuthUser) -> Result<Json<Vec<Playlist>>> {
    playlists::list(&state.storage, caller.id()).map(Json)
}

async fn by_mood(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(mood): Path<String>,
) -> Result<Json<Vec<Playlist>>> {
    playlists::by_mood(&state.storage, caller.id(), &mood).map(Json)
}

async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Playlist>> {
    playlists::get(&state.storage, caller.id(), &id).map(Json)
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(draft): Json<PlaylistDraft>,
) -> Result<(StatusCode, Json<Playlist>)> {
    let playlist = playlists::create(&state.storage, caller.id(), draft)?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

async fn create_for_mood(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<MoodQuery>,
) -> Result<(StatusCode, Json<Playlist>)> {
    non_blank("mood", &query.mood)?;
    let playlist = playlists::create_for_mood(
        &state.storage,
        state.music.as_ref(),
        caller.id(),
        &query.mood,
        query.name,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(draft): Json<PlaylistDraft>,
) -> Result<Json<Playlist>> {
    playlists::update(&state.storage, caller.id(), &id, draft).map(Json)
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    playlists::delete(&state.storage, caller.id(), &id)?;
    Ok(StatusCode::NO_CONTENT)
}
