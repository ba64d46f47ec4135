//! `/api/spotify`: user authorization with the music catalog, and search and
//! recommendations made with the user's own catalog token.

use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, LOCATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::AppState;
use crate::error::{Error, Result};
use crate::validate;

/// Frontend page that finishes the authorization flow.
const CALLBACK_PAGE: &str = "playlist/callback.html";

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/token", post(token))
        .route("/refresh-token", post(refresh_token))
        .route("/recommendations", get(recommendations))
        .route("/search", get(search))
        .route("/callback", get(callback))
}

#[derive(Debug, Deserialize)]
struct CodeQuery {
    code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshQuery {
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    seed_artists: Option<String>,
    seed_genres: Option<String>,
    seed_tracks: Option<String>,
    #[serde(default = "default_limit")]
    limit: u32,
    target_energy: Option<f64>,
    target_valence: Option<f64>,
    min_tempo: Option<f64>,
    max_tempo: Option<f64>,
    target_instrumentalness: Option<f64>,
    target_acousticness: Option<f64>,
}

impl RecommendationQuery {
    /// Parameters to forward, skipping the ones not given.
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.limit.to_string())];
        for (name, value) in [
            ("seed_artists", &self.seed_artists),
            ("seed_genres", &self.seed_genres),
            ("seed_tracks", &self.seed_tracks),
        ] {
            if let Some(value) = value {
                params.push((name, value.clone()));
            }
        }
        for (name, value) in [
            ("target_energy", self.target_energy),
            ("target_valence", self.target_valence),
            ("min_tempo", self.min_tempo),
            ("max_tempo", self.max_tempo),
            ("target_instrumentalness", self.target_instrumentalness),
            ("target_acousticness", self.target_acousticness),
        ] {
            if let Some(value) = value {
                params.push((name, value.to_string()));
            }
        }
        params
    }
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
    #[serde(rename = "type", default = "default_search_type")]
    kind: String,
    #[serde(default = "default_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
}

fn default_limit() -> u32 {
    20
}

fn default_search_type() -> String {
    "track".to_string()
}

/// The caller's own catalog token, passed through untouched.
fn catalog_authorization(headers: &HeaderMap) -> Result<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::unauthorized("missing catalog Authorization header"))
}

async fn login(State(state): State<AppState>) -> Result<Json<Value>> {
    let url = state.music_account.authorize_url()?;
    Ok(Json(json!({ "authUrl": url })))
}

async fn token(
    State(state): State<AppState>,
    Query(query): Query<CodeQuery>,
) -> Result<Json<Value>> {
    validate::required("code", &query.code, 1000)?;
    state.music_account.exchange_code(&query.code).await.map(Json)
}

async fn refresh_token(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<Value>> {
    validate::required("refreshToken", &query.refresh_token, 1000)?;
    state.music_account.refresh(&query.refresh_token).await.map(Json)
}

async fn recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Value>> {
    let authorization = catalog_authorization(&headers)?;
    validate::in_range("limit", query.limit, 1, 100)?;
    state
        .music_account
        .get_as_user("recommendations", &query.params(), authorization)
        .await
        .map(Json)
}

async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let authorization = catalog_authorization(&headers)?;
    validate::required("q", &query.q, 500)?;
    validate::in_range("limit", query.limit, 1, 50)?;
    let params = [
        ("q", query.q),
        ("type", query.kind),
        ("limit", query.limit.to_string()),
    ];
    state
        .music_account
        .get_as_user("search", &params, authorization)
        .await
        .map(Json)
}

/// Where the catalog sends the browser after the user decides. Forwards the
/// code, or the error, to the frontend.
async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    let page = format!("{}/{CALLBACK_PAGE}", state.frontend_url);
    let param = match (query.code, query.error) {
        (Some(code), _) if !code.is_empty() => Some(("code", code)),
        (_, Some(error)) if !error.is_empty() => {
            warn!(%error, "catalog authorization refused");
            Some(("error", error))
        }
        _ => None,
    };

    let url = match param {
        Some(param) => Url::parse_with_params(&page, [param]),
        None => Url::parse(&page),
    }
    .map_err(|e| Error::internal(format!("invalid frontend URL: {e}")))?;

    debug!(location = %url, "forwarding authorization callback");
    Ok((StatusCode::FOUND, [(LOCATION, String::from(url))]).into_response())
}
