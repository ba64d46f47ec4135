//! `/api/users`: registration, login and account management.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::AppState;
use crate::auth::AuthUser;
use crate::error::{Error, Result};
use crate::models::{LoginRequest, LoginResponse, NewUser, UserUpdate, UserView};
use crate::services::users;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(register))
        .route("/login", post(login))
        .route("/email/{email}", get(by_email))
        .route("/exists/{email}", get(exists))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn register(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<UserView>)> {
    let user = state
        .blocking(move |storage| users::register(storage, &new_user))
        .await?;
    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let tokens = Arc::clone(&state.tokens);
    state
        .blocking(move |storage| users::login(storage, &tokens, &request))
        .await
        .map(Json)
}

async fn list(State(state): State<AppState>, _caller: AuthUser) -> Result<Json<Vec<UserView>>> {
    users::list(&state.storage).map(Json)
}

async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserView>> {
    caller.ensure_is(&id)?;
    let user = users::get(&state.storage, &id)?;
    Ok(Json(UserView::from(&user)))
}

async fn by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserView>> {
    let user = users::find_by_email(&state.storage, &email)?
        .ok_or_else(|| Error::not_found("user", email))?;
    Ok(Json(UserView::from(&user)))
}

async fn exists(State(state): State<AppState>, Path(email): Path<String>) -> Result<Json<bool>> {
    users::exists(&state.storage, &email).map(Json)
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<UserView>> {
    caller.ensure_is(&id)?;
    let user = state
        .blocking(move |storage| users::update(storage, &id, &update))
        .await?;
    Ok(Json(UserView::from(&user)))
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    caller.ensure_is(&id)?;
    users::delete(&state.storage, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
