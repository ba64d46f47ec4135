//! The Spotify Web API.
//!
//! Curated playlists are read with the client-credentials flow; that token is
//! kept until shortly before it expires. Users can also authorize the app
//! with the authorization-code flow, after which the frontend calls search
//! and recommendations through this server with its own token.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::Track;

const SERVICE: &str = "music catalog";

/// Tokens are refreshed this long before their stated expiry.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Permissions requested when a user authorizes the app.
pub const USER_SCOPES: &str = "streaming user-read-email user-read-private \
user-modify-playback-state user-read-playback-state user-library-read \
user-library-modify playlist-read-private playlist-read-collaborative";

/// A playlist as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPlaylist {
    /// Catalog id of the playlist.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Tracks in catalog order.
    pub tracks: Vec<Track>,
}

/// A source of curated playlists.
#[async_trait]
pub trait MusicCatalog: Send + Sync + Debug {
    /// Fetch a playlist with its tracks.
    async fn playlist(&self, playlist_id: &str) -> Result<CatalogPlaylist>;
}

/// Calls made for a user who authorizes the app with the catalog.
///
/// Token and API responses are passed back to the frontend unchanged.
#[async_trait]
pub trait MusicAccount: Send + Sync + Debug {
    /// The page that asks the user to authorize the app.
    ///
    /// # Errors
    ///
    /// Fails when user authorization is not configured.
    fn authorize_url(&self) -> Result<String>;

    /// Trade an authorization code for access and refresh tokens.
    async fn exchange_code(&self, code: &str) -> Result<Value>;

    /// Get a fresh access token.
    async fn refresh(&self, refresh_token: &str) -> Result<Value>;

    /// `GET {api_url}/{path}` with the caller's `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] when the catalog rejects the
    /// caller's token.
    async fn get_as_user(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        authorization: &str,
    ) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    id: String,
    name: String,
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    // Null for removed or local tracks.
    track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    id: Option<String>,
    name: String,
    uri: String,
    #[serde(default)]
    artists: Vec<Named>,
    album: Option<Album>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Album {
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

impl From<TrackObject> for Track {
    fn from(t: TrackObject) -> Self {
        Self {
            track_id: t.id.unwrap_or_default(),
            name: t.name,
            artist: t.artists.into_iter().next().map(|a| a.name).unwrap_or_default(),
            album_art: t
                .album
                .and_then(|a| a.images.into_iter().next())
                .map(|i| i.url)
                .unwrap_or_default(),
            spotify_uri: t.uri,
        }
    }
}

impl From<PlaylistResponse> for CatalogPlaylist {
    fn from(p: PlaylistResponse) -> Self {
        Self {
            id: p.id,
            name: p.name,
            tracks: p
                .tracks
                .items
                .into_iter()
                .filter_map(|item| item.track)
                .map(Track::from)
                .collect(),
        }
    }
}

/// Spotify Web API client.
pub struct SpotifyClient {
    http: reqwest::Client,
    api_url: String,
    token_url: String,
    authorize_url: String,
    redirect_uri: Option<String>,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl Debug for SpotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("api_url", &self.api_url)
            .field("token_url", &self.token_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl SpotifyClient {
    /// Create a client from the `music` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are missing or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (Some(client_id), Some(client_secret)) =
            (&config.music.client_id, &config.music.client_secret)
        else {
            return Err(Error::ConfigValidation {
                message: "music.client_id and music.client_secret are required".to_string(),
            });
        };

        Ok(Self {
            http: super::http_client(config.music_timeout())?,
            api_url: config.music.api_url.trim_end_matches('/').to_string(),
            token_url: config.music.token_url.clone(),
            authorize_url: config.music.authorize_url.clone(),
            redirect_uri: config.music.redirect_uri.clone(),
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
            token: Mutex::new(None),
        })
    }

    /// Return a valid access token, fetching a new one if needed.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() {
                return Ok(token.value.clone());
            }
        }

        debug!("requesting catalog access token");
        let token: TokenResponse = self
            .token_request(&[("grant_type", "client_credentials")])
            .await?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in - EXPIRY_MARGIN_SECS);
        info!(%expires_at, "obtained catalog access token");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }

    /// POST a form to the token endpoint with the app's credentials.
    async fn token_request<T: DeserializeOwned>(&self, form: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await?;
        json_body(response, "token request").await
    }
}

async fn json_body<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::upstream(
            SERVICE,
            format!("{what} failed with status {status}"),
        ));
    }
    response
        .json()
        .await
        .map_err(|e| Error::upstream(SERVICE, format!("invalid {what} response: {e}")))
}

#[async_trait]
impl MusicCatalog for SpotifyClient {
    async fn playlist(&self, playlist_id: &str) -> Result<CatalogPlaylist> {
        let token = self.access_token().await?;
        let url = format!("{}/playlists/{playlist_id}", self.api_url);

        debug!(%url, "fetching catalog playlist");
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let playlist: PlaylistResponse =
            json_body(response, &format!("playlist {playlist_id}")).await?;
        Ok(playlist.into())
    }
}

#[async_trait]
impl MusicAccount for SpotifyClient {
    fn authorize_url(&self) -> Result<String> {
        let redirect_uri = self
            .redirect_uri
            .as_deref()
            .ok_or_else(|| Error::upstream(SERVICE, "no redirect URI configured"))?;
        let url = Url::parse_with_params(
            &self.authorize_url,
            [
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", redirect_uri),
                ("scope", USER_SCOPES),
                ("show_dialog", "true"),
            ],
        )
        .map_err(|e| Error::internal(format!("invalid authorize URL: {e}")))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<Value> {
        let redirect_uri = self
            .redirect_uri
            .as_deref()
            .ok_or_else(|| Error::upstream(SERVICE, "no redirect URI configured"))?;
        debug!("exchanging authorization code");
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Value> {
        debug!("refreshing user access token");
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn get_as_user(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        authorization: &str,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.api_url, path.trim_start_matches('/'));
        debug!(%url, "forwarding catalog request");
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .query(query)
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::unauthorized("music catalog rejected the access token"));
        }
        json_body(response, path).await
    }
}

/// Used when no catalog credentials are configured.
#[derive(Debug, Default)]
pub struct DisabledMusicCatalog;

#[async_trait]
impl MusicCatalog for DisabledMusicCatalog {
    async fn playlist(&self, _playlist_id: &str) -> Result<CatalogPlaylist> {
        Err(disabled())
    }
}

#[async_trait]
impl MusicAccount for DisabledMusicCatalog {
    fn authorize_url(&self) -> Result<String> {
        Err(disabled())
    }

    async fn exchange_code(&self, _code: &str) -> Result<Value> {
        Err(disabled())
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<Value> {
        Err(disabled())
    }

    async fn get_as_user(
        &self,
        _path: &str,
        _query: &[(&'static str, String)],
        _authorization: &str,
    ) -> Result<Value> {
        Err(disabled())
    }
}

fn disabled() -> Error {
    Error::upstream(SERVICE, "no catalog credentials configured")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYLIST_JSON: &str = r#"{
        "id": "37i9dQZF1DX1s9knjP51Oa",
        "name": "Calm Vibes",
        "tracks": {
            "items": [
                {
                    "track": {
                        "id": "t1",
                        "name": "Weightless",
                        "uri": "spotify:track:t1",
                        "artists": [{"name": "Marconi Union"}, {"name": "Other"}],
                        "album": {"images": [{"url": "https://img/large"}, {"url": "https://img/small"}]}
                    }
                },
                {"track": null},
                {
                    "track": {
                        "id": null,
                        "name": "Local file",
                        "uri": "spotify:local:x",
                        "artists": [],
                        "album": {"images": []}
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn test_playlist_mapping() {
        let response: PlaylistResponse = serde_json::from_str(PLAYLIST_JSON).unwrap();
        let playlist = CatalogPlaylist::from(response);

        assert_eq!(playlist.name, "Calm Vibes");
        assert_eq!(playlist.tracks.len(), 2);

        let first = &playlist.tracks[0];
        assert_eq!(first.track_id, "t1");
        assert_eq!(first.artist, "Marconi Union");
        assert_eq!(first.album_art, "https://img/large");
        assert_eq!(first.spotify_uri, "spotify:track:t1");

        let local = &playlist.tracks[1];
        assert!(local.track_id.is_empty());
        assert!(local.artist.is_empty());
        assert!(local.album_art.is_empty());
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = Config::default();
        assert!(SpotifyClient::from_config(&config).is_err());

        let mut config = Config::default();
        config.music.client_id = Some("id".to_string());
        config.music.client_secret = Some("secret".to_string());
        let client = SpotifyClient::from_config(&config).unwrap();
        assert!(!format!("{client:?}").contains("secret\""));
    }

    #[tokio::test]
    async fn test_disabled_catalog() {
        let err = DisabledMusicCatalog.playlist("x").await.unwrap_err();
        assert!(err.to_string().contains("music catalog"));
    }

    mod against_local_server {
        use std::collections::HashMap;

        use axum::extract::{Form, Query};
        use axum::http::{HeaderMap, StatusCode};
        use axum::routing::{get, post};
        use axum::{Json, Router};
        use serde_json::json;

        use super::*;

        /// Serve a token endpoint that echoes its form and a search endpoint
        /// that only accepts `Bearer user-token`. Returns the base URL.
        async fn serve() -> String {
            let app = Router::new()
                .route(
                    "/token",
                    post(
                        |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| async move {
                            let basic = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .is_some_and(|v| v.starts_with("Basic "));
                            if !basic {
                                return Err(StatusCode::UNAUTHORIZED);
                            }
                            Ok(Json(json!({
                                "access_token": "app-token",
                                "expires_in": 3600,
                                "form": form,
                            })))
                        },
                    ),
                )
                .route(
                    "/v1/search",
                    get(
                        |headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                            match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                                Some("Bearer user-token") => Ok(Json(json!({ "query": query }))),
                                _ => Err(StatusCode::UNAUTHORIZED),
                            }
                        },
                    ),
                );

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let address = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            format!("http://{address}")
        }

        fn client(base: &str, redirect_uri: Option<&str>) -> SpotifyClient {
            let mut config = Config::default();
            config.music.client_id = Some("app-id".to_string());
            config.music.client_secret = Some("app-secret".to_string());
            config.music.api_url = format!("{base}/v1");
            config.music.token_url = format!("{base}/token");
            config.music.redirect_uri = redirect_uri.map(ToString::to_string);
            SpotifyClient::from_config(&config).unwrap()
        }

        #[test]
        fn test_authorize_url() {
            let callback = "http://localhost:8080/api/spotify/callback";
            let authorized = client("http://127.0.0.1:1", Some(callback));
            let url = Url::parse(&authorized.authorize_url().unwrap()).unwrap();
            assert_eq!(url.host_str(), Some("accounts.spotify.com"));

            let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
            assert_eq!(params["client_id"], "app-id");
            assert_eq!(params["response_type"], "code");
            assert_eq!(params["redirect_uri"], callback);
            assert_eq!(params["show_dialog"], "true");
            assert!(params["scope"].contains("playlist-read-private"));
            assert!(!params["scope"].contains("  "));

            let unconfigured = client("http://127.0.0.1:1", None);
            assert!(unconfigured.authorize_url().is_err());
        }

        #[tokio::test]
        async fn test_code_exchange_and_refresh() {
            let base = serve().await;
            let client = client(&base, Some("http://localhost:8080/api/spotify/callback"));

            let tokens = client.exchange_code("the-code").await.unwrap();
            assert_eq!(tokens["form"]["grant_type"], "authorization_code");
            assert_eq!(tokens["form"]["code"], "the-code");
            assert_eq!(
                tokens["form"]["redirect_uri"],
                "http://localhost:8080/api/spotify/callback"
            );

            let refreshed = client.refresh("r-1").await.unwrap();
            assert_eq!(refreshed["form"]["grant_type"], "refresh_token");
            assert_eq!(refreshed["form"]["refresh_token"], "r-1");
        }

        #[tokio::test]
        async fn test_client_credentials_token_is_cached() {
            let base = serve().await;
            let client = client(&base, None);
            assert_eq!(client.access_token().await.unwrap(), "app-token");
            assert!(client.token.lock().await.is_some());
            assert_eq!(client.access_token().await.unwrap(), "app-token");
        }

        #[tokio::test]
        async fn test_get_as_user_forwards_token_and_query() {
            let base = serve().await;
            let client = client(&base, None);
            let query = [("q", "rain sounds".to_string()), ("limit", "5".to_string())];

            let found = client
                .get_as_user("search", &query, "Bearer user-token")
                .await
                .unwrap();
            assert_eq!(found["query"]["q"], "rain sounds");
            assert_eq!(found["query"]["limit"], "5");

            let err = client
                .get_as_user("search", &query, "Bearer expired")
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Unauthorized(_)));

            let err = client
                .get_as_user("missing", &query, "Bearer user-token")
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Upstream { .. }));
        }
    }
}
