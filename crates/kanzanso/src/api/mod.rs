//! HTTP API.
//!
//! Every resource lives under `/api`. Handlers are thin: they pull the
//! caller and payload out of the request and hand them to [`crate::services`].
//! Errors render through [`Error`]'s `IntoResponse` implementation.

mod boost;
mod gratitude;
mod health;
mod journal;
mod moods;
mod playlists;
mod quiz;
mod quotes;
mod spotify;
mod streaks;
mod todos;
mod users;
mod weather;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::TokenService;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::external::{self, MusicAccount, MusicCatalog, QuoteSource};
use crate::storage::Storage;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Document store.
    pub storage: Arc<Storage>,
    /// Issues and checks bearer tokens.
    pub tokens: Arc<TokenService>,
    /// External random quotes.
    pub quotes: Arc<dyn QuoteSource>,
    /// Music catalog for mood playlists.
    pub music: Arc<dyn MusicCatalog>,
    /// User authorization and pass-through catalog calls.
    pub music_account: Arc<dyn MusicAccount>,
    /// Frontend base URL for the authorization callback.
    pub frontend_url: String,
    /// Whether `/api/quotes/random` tries the external source first.
    pub quotes_external_enabled: bool,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.storage.path())
            .field("quotes_external_enabled", &self.quotes_external_enabled)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire up state from configuration and an opened store.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: &Config, storage: Storage) -> Result<Self> {
        let (music, music_account) = external::music(config)?;
        Ok(Self {
            storage: Arc::new(storage),
            tokens: Arc::new(TokenService::from_config(config)),
            quotes: external::quote_source(config)?,
            music,
            music_account,
            frontend_url: config.music.frontend_url.trim_end_matches('/').to_string(),
            quotes_external_enabled: config.quotes.external_enabled,
        })
    }

    /// Run storage work on the blocking thread pool.
    ///
    /// Used by handlers that hash passwords or hold the store across
    /// several statements.
    pub(crate) async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Storage) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || f(&storage))
            .await
            .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.tokens)
    }
}

/// `?userId=` for endpoints that take the user from the query string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserQuery {
    pub user_id: String,
}

/// `?userId=&start=&end=` for date range lookups.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRangeQuery {
    pub user_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// `?start=&end=` for date range lookups scoped by token.
#[derive(Debug, Deserialize)]
pub(crate) struct RangeQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn cors(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60))
}

/// Build the application router.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .merge(health::routes())
        .nest("/users", users::routes())
        .nest("/todos", todos::routes())
        .nest("/journal", journal::routes())
        .nest("/moods", moods::routes())
        .nest("/gratitude", gratitude::routes())
        .nest("/quotes", quotes::routes())
        .nest("/favorite-quotes", quotes::favorite_routes())
        .nest("/weather-moods", weather::routes())
        .nest("/playlists", playlists::routes())
        .nest("/spotify", spotify::routes())
        .merge(quiz::routes())
        .nest("/quiz-results", quiz::result_routes())
        .nest("/streaks", streaks::routes())
        .nest("/daily-boost", boost::routes());

    Router::new()
        .nest("/api", api)
        .layer(cors(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on the configured address until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let app = router(state, &config.server.cors_origins);
    let address = config.bind_address();

    let listener = TcpListener::bind(&address).await?;
    info!(%address, "kanzanso listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl-C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("received SIGTERM, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Reject an empty path or query value.
pub(crate) fn non_blank(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Helpers for driving the router in tests.

    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Map, Value};
    use tower::ServiceExt;

    use super::{router, AppState};
    use crate::auth::TokenService;
    use crate::error::{Error, Result};
    use crate::external::{CatalogPlaylist, DisabledQuoteSource, MusicAccount, MusicCatalog};
    use crate::models::{NewUser, Track};
    use crate::services::users;
    use crate::storage::Storage;

    #[derive(Debug)]
    pub struct FakeCatalog;

    #[async_trait]
    impl MusicCatalog for FakeCatalog {
        async fn playlist(&self, playlist_id: &str) -> Result<CatalogPlaylist> {
            Ok(CatalogPlaylist {
                id: playlist_id.to_string(),
                name: "Curated".to_string(),
                tracks: vec![Track {
                    track_id: "t1".to_string(),
                    name: "Weightless".to_string(),
                    artist: "Marconi Union".to_string(),
                    ..Track::default()
                }],
            })
        }
    }

    /// Answers account calls locally. Only `Bearer user-token` is accepted
    /// for pass-through calls, which echo the path and query they were given.
    #[derive(Debug)]
    pub struct FakeAccount;

    #[async_trait]
    impl MusicAccount for FakeAccount {
        fn authorize_url(&self) -> Result<String> {
            Ok("https://accounts.example/authorize?client_id=test".to_string())
        }

        async fn exchange_code(&self, code: &str) -> Result<Value> {
            Ok(json!({"access_token": format!("access-{code}"), "refresh_token": "r1"}))
        }

        async fn refresh(&self, refresh_token: &str) -> Result<Value> {
            Ok(json!({"access_token": format!("fresh-{refresh_token}")}))
        }

        async fn get_as_user(
            &self,
            path: &str,
            query: &[(&'static str, String)],
            authorization: &str,
        ) -> Result<Value> {
            if authorization != "Bearer user-token" {
                return Err(Error::unauthorized("music catalog rejected the access token"));
            }
            let query: Map<String, Value> = query
                .iter()
                .map(|(k, v)| ((*k).to_string(), Value::String(v.clone())))
                .collect();
            Ok(json!({"path": path, "query": query}))
        }
    }

    pub struct TestApp {
        pub state: AppState,
        pub app: Router,
    }

    impl TestApp {
        pub fn new() -> Self {
            let state = AppState {
                storage: Arc::new(Storage::open_in_memory().unwrap()),
                tokens: Arc::new(TokenService::new(
                    b"test-secret-test-secret-test-secret!",
                    chrono::Duration::hours(1),
                )),
                quotes: Arc::new(DisabledQuoteSource),
                music: Arc::new(FakeCatalog),
                music_account: Arc::new(FakeAccount),
                frontend_url: "http://localhost:3000".to_string(),
                quotes_external_enabled: false,
            };
            let app = router(state.clone(), &[]);
            Self { state, app }
        }

        /// Register a user and return its id and a bearer token.
        pub fn user(&self, email: &str) -> (String, String) {
            let new_user = NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password: "password123".to_string(),
            };
            let user = users::register(&self.state.storage, &new_user).unwrap();
            let token = self.state.tokens.issue(&user.id, &user.email).unwrap();
            (user.id, token)
        }

        pub async fn call(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header("authorization", format!("Bearer {token}"));
            }
            let request = match body {
                Some(json) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }
    }
}
