//! Clients for third-party services.
//!
//! Each service sits behind a trait so the HTTP layer can be given a fake in
//! tests, or a disabled implementation when the service is not configured.

pub mod music;
pub mod quotes;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::error::Result;

pub use music::{CatalogPlaylist, DisabledMusicCatalog, MusicAccount, MusicCatalog, SpotifyClient};
pub use quotes::{DisabledQuoteSource, QuotableClient, QuoteSource};

/// Build an HTTP client with a request timeout.
fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// The quote source selected by the `quotes` section.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn quote_source(config: &Config) -> Result<Arc<dyn QuoteSource>> {
    if config.quotes.external_enabled {
        Ok(Arc::new(QuotableClient::from_config(config)?))
    } else {
        info!("external quotes disabled");
        Ok(Arc::new(DisabledQuoteSource))
    }
}

/// The music catalog and user account access selected by the `music`
/// section. Both share one client.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn music(config: &Config) -> Result<(Arc<dyn MusicCatalog>, Arc<dyn MusicAccount>)> {
    if !config.music_enabled() {
        info!("music catalog credentials not set, mood playlists disabled");
        return Ok((Arc::new(DisabledMusicCatalog), Arc::new(DisabledMusicCatalog)));
    }
    if !config.music_login_enabled() {
        info!("music.redirect_uri not set, user authorization disabled");
    }
    let client = Arc::new(SpotifyClient::from_config(config)?);
    let catalog: Arc<dyn MusicCatalog> = client.clone();
    let account: Arc<dyn MusicAccount> = client;
    Ok((catalog, account))
}
