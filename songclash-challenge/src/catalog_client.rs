//! Catalog API client
//!
//! Resolves track ids against a Spotify Web API compatible catalog:
//! `GET {base_url}/tracks/{id}` with bearer authentication.
//!
//! Requests are rate limited per client. The limit is shared by every
//! concurrent lookup made through the same client, so an enrichment of N
//! rounds is paced here and not in the enricher.

use crate::config::CatalogSettings;
use crate::lookup::{LookupError, TrackLookup};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header, Client, StatusCode, Url};
use serde::Deserialize;
use songclash_common::{TrackId, TrackMetadata};
use std::num::NonZeroU32;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("SongClash/", env!("CARGO_PKG_VERSION"));

/// Catalog client construction errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP client setup failed: {0}")]
    ClientBuild(String),

    #[error("Invalid catalog token: {0}")]
    InvalidToken(String),

    #[error("Invalid catalog base URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Deserialize)]
struct CatalogTrack {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<CatalogArtist>,
    album: CatalogAlbum,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CatalogArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CatalogAlbum {
    name: String,
    #[serde(default)]
    images: Vec<CatalogImage>,
}

#[derive(Debug, Deserialize)]
struct CatalogImage {
    url: String,
    #[serde(default)]
    width: Option<u32>,
}

impl From<CatalogTrack> for TrackMetadata {
    fn from(track: CatalogTrack) -> Self {
        // Largest artwork; images without a width rank last
        let artwork_url = track
            .album
            .images
            .iter()
            .max_by_key(|image| image.width.unwrap_or(0))
            .map(|image| image.url.clone());

        TrackMetadata {
            id: TrackId::new(track.id),
            title: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            album: track.album.name,
            artwork_url,
            preview_url: track.preview_url,
            duration_ms: track.duration_ms,
        }
    }
}

/// Catalog API client
pub struct CatalogClient {
    http_client: Client,
    base_url: Url,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl CatalogClient {
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = &settings.api_token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|e| CatalogError::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| CatalogError::ClientBuild(e.to_string()))?;

        let base_url = Url::parse(settings.base_url.trim_end_matches('/'))
            .map_err(|e| CatalogError::InvalidBaseUrl(format!("{}: {}", settings.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(settings.base_url.clone()));
        }

        let rate_limiter = NonZeroU32::new(settings.requests_per_second)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Ok(Self {
            http_client,
            base_url,
            rate_limiter,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base_url}/tracks/{id}` with the id as one encoded path segment
    fn track_url(&self, track_id: &TrackId) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Network(format!("Catalog URL has no path: {}", self.base_url)))?
            .pop_if_empty()
            .push("tracks")
            .push(track_id.as_str());
        Ok(url)
    }

    /// Fetch one track by catalog id
    pub async fn fetch_track(&self, track_id: &TrackId) -> Result<TrackMetadata, LookupError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.track_url(track_id)?;
        debug!(track_id = %track_id, url = %url, "Querying catalog");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(track_id.clone()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::Api(status.as_u16(), error_text));
        }

        let track: CatalogTrack = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        let metadata = TrackMetadata::from(track);
        debug!(
            track_id = %track_id,
            title = %metadata.title,
            artist = %metadata.artist_line(),
            "Retrieved track from catalog"
        );

        Ok(metadata)
    }
}

#[async_trait]
impl TrackLookup for CatalogClient {
    async fn lookup(&self, track_id: &TrackId) -> Result<TrackMetadata, LookupError> {
        self.fetch_track(track_id).await
    }
}
