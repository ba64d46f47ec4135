//! `/api/daily-boost`: daily challenges, insights and activity.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use super::AppState;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{BoostStats, DailyChallenge, Insight, ProgressUpdate, UserActivity};
use crate::services::boost;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/challenges", get(challenges))
        .route("/complete/{id}", post(complete))
        .route("/progress", post(progress))
        .route("/insights", get(insights))
        .route("/stats", get(stats))
        .route("/activity", get(activity))
}

async fn challenges(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<DailyChallenge>>> {
    let AuthUser(user_id) = caller;
    state
        .blocking(move |storage| boost::challenges(storage, &user_id))
        .await
        .map(Json)
}

async fn complete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DailyChallenge>> {
    let AuthUser(user_id) = caller;
    state
        .blocking(move |storage| boost::complete(storage, &user_id, &id))
        .await
        .map(Json)
}

async fn progress(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(update): Json<ProgressUpdate>,
) -> Result<Json<DailyChallenge>> {
    boost::validate_progress(&update)?;
    let AuthUser(user_id) = caller;
    state
        .blocking(move |storage| boost::update_progress(storage, &user_id, &update))
        .await
        .map(Json)
}

async fn insights(State(state): State<AppState>, caller: AuthUser) -> Result<Json<Vec<Insight>>> {
    boost::insights(&state.storage, caller.id()).map(Json)
}

async fn stats(State(state): State<AppState>, caller: AuthUser) -> Result<Json<BoostStats>> {
    let AuthUser(user_id) = caller;
    state
        .blocking(move |storage| boost::stats(storage, &user_id))
        .await
        .map(Json)
}

async fn activity(State(state): State<AppState>, caller: AuthUser) -> Result<Json<UserActivity>> {
    let AuthUser(user_id) = caller;
    state
        .blocking(move |storage| boost::activity(storage, &user_id, Utc::now()))
        .await
        .map(Json)
}
