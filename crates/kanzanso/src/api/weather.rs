//! `/api/weather-moods`: mood suggestions for weather conditions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::AppState;
use crate::error::Result;
use crate::models::{WeatherMood, WeatherMoodDraft};
use crate::services::weather;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/weather/{weather}", get(for_weather))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<WeatherMood>>> {
    weather::list(&state.storage).map(Json)
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<WeatherMood>> {
    weather::get(&state.storage, &id).map(Json)
}

async fn for_weather(
    State(state): State<AppState>,
    Path(condition): Path<String>,
) -> Result<Json<WeatherMood>> {
    weather::for_weather(&state.storage, &condition).map(Json)
}

async fn create(
    State(state): State<AppState>,
    Json(draft): Json<WeatherMoodDraft>,
) -> Result<(StatusCode, Json<WeatherMood>)> {
    let mood = weather::create(&state.storage, draft)?;
    Ok((StatusCode::CREATED, Json(mood)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<WeatherMoodDraft>,
) -> Result<Json<WeatherMood>> {
    weather::update(&state.storage, &id, draft).map(Json)
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    weather::delete(&state.storage, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_condition_lookup() {
        let app = TestApp::new();
        let (status, _) = app
            .call(
                "POST",
                "/api/weather-moods",
                None,
                Some(json!({"weather": "light rain", "mood": "cozy", "activities": ["Read a book"]})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, mood) = app
            .call("GET", "/api/weather-moods/weather/light_rain_night", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mood["mood"], "cozy");

        let (status, _) = app
            .call("GET", "/api/weather-moods/weather/hail", None, None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
