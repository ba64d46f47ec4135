//! `/api/quotes` and `/api/favorite-quotes`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::{non_blank, AppState, UserQuery};
use crate::error::Result;
use crate::models::{FavoriteDraft, FavoriteQuote, Quote, QuoteDraft};
use crate::services::{favorites, quotes};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/random", get(random))
        .route("/external/random", get(external_random))
        .route("/category/{category}", get(by_category))
        .route("/{id}", get(show).put(update).delete(remove))
}

pub(super) fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_favorites).post(add_favorite).delete(remove_favorite),
        )
        .route("/check", get(check_favorite))
        .route("/{id}", get(show_favorite).delete(delete_favorite))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Quote>>> {
    quotes::list(&state.storage).map(Json)
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Quote>> {
    quotes::get(&state.storage, &id).map(Json)
}

async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Quote>>> {
    quotes::by_category(&state.storage, &category).map(Json)
}

async fn random(State(state): State<AppState>) -> Result<Json<Quote>> {
    quotes::random(
        &state.storage,
        state.quotes.as_ref(),
        state.quotes_external_enabled,
    )
    .await
    .map(Json)
}

async fn external_random(State(state): State<AppState>) -> Result<Json<Quote>> {
    quotes::external_random(state.quotes.as_ref()).await.map(Json)
}

async fn create(
    State(state): State<AppState>,
    Json(draft): Json<QuoteDraft>,
) -> Result<(StatusCode, Json<Quote>)> {
    let quote = quotes::create(&state.storage, draft)?;
    Ok((StatusCode::CREATED, Json(quote)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<QuoteDraft>,
) -> Result<Json<Quote>> {
    quotes::update(&state.storage, &id, draft).map(Json)
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    quotes::delete(&state.storage, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteQuery {
    user_id: String,
    quote_id: String,
}

async fn list_favorites(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<FavoriteQuote>>> {
    non_blank("userId", &query.user_id)?;
    favorites::list(&state.storage, &query.user_id).map(Json)
}

async fn show_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FavoriteQuote>> {
    favorites::get(&state.storage, &id).map(Json)
}

async fn check_favorite(
    State(state): State<AppState>,
    Query(query): Query<FavoriteQuery>,
) -> Result<Json<bool>> {
    favorites::is_favorite(&state.storage, &query.user_id, &query.quote_id).map(Json)
}

async fn add_favorite(
    State(state): State<AppState>,
    Json(draft): Json<FavoriteDraft>,
) -> Result<(StatusCode, Json<FavoriteQuote>)> {
    let (favorite, created) = favorites::add(&state.storage, draft)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(favorite)))
}

async fn remove_favorite(
    State(state): State<AppState>,
    Query(query): Query<FavoriteQuery>,
) -> Result<StatusCode> {
    favorites::remove(&state.storage, &query.user_id, &query.quote_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    favorites::delete(&state.storage, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
