//! `/api/streaks`: the caller's habit streaks.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::AppState;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{Streak, StreakDraft};
use crate::services::streaks;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/type/{kind}", get(by_type))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/complete", post(complete))
}

async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(draft): Json<StreakDraft>,
) -> Result<(StatusCode, Json<Streak>)> {
    let streak = streaks::create(&state.storage, caller.id(), draft)?;
    Ok((StatusCode::CREATED, Json(streak)))
}

async fn list(State(state): State<AppState>, caller: AuthUser) -> Result<Json<Vec<Streak>>> {
    streaks::list(&state.storage, caller.id()).map(Json)
}

async fn by_type(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Streak>>> {
    streaks::by_type(&state.storage, caller.id(), &kind).map(Json)
}

async fn show(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Streak>> {
    streaks::get(&state.storage, caller.id(), &id).map(Json)
}

async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(draft): Json<StreakDraft>,
) -> Result<Json<Streak>> {
    streaks::update(&state.storage, caller.id(), &id, draft).map(Json)
}

async fn remove(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    streaks::delete(&state.storage, caller.id(), &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn complete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Streak>> {
    streaks::complete(&state.storage, caller.id(), &id).map(Json)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_streak_flow() {
        let app = TestApp::new();
        let (_, token) = app.user("habits@example.com");

        let (status, streak) = app
            .call(
                "POST",
                "/api/streaks",
                Some(&token),
                Some(json!({"name": "Stretch", "type": "exercise"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(streak["currentCount"], 0);
        let id = streak["id"].as_str().unwrap().to_string();

        let uri = format!("/api/streaks/{id}/complete");
        let (_, done) = app.call("POST", &uri, Some(&token), None).await;
        assert_eq!(done["currentCount"], 1);
        let (status, again) = app.call("POST", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["currentCount"], 1);
        assert_eq!(again["streakDates"].as_array().unwrap().len(), 1);

        let (_, typed) = app
            .call("GET", "/api/streaks/type/exercise", Some(&token), None)
            .await;
        assert_eq!(typed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_account_cannot_create() {
        let app = TestApp::new();
        let (user_id, token) = app.user("gone@example.com");
        let (status, _) = app
            .call("DELETE", &format!("/api/users/{user_id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app
            .call(
                "POST",
                "/api/streaks",
                Some(&token),
                Some(json!({"name": "Stretch", "type": "exercise"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
