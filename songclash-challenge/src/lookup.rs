//! Track lookup capability
//!
//! The enricher resolves track ids through a [`TrackLookup`]. Implementations
//! must tolerate concurrent calls for distinct ids; each call may fail on its
//! own. Caching, retry and rate limiting belong to the implementation, never to
//! the enricher.

use async_trait::async_trait;
use songclash_common::{TrackId, TrackMetadata};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Lookup failure for a single track
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Track not found: {0}")]
    NotFound(TrackId),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Lookup for {0} timed out after {1:?}")]
    Timeout(TrackId, Duration),
}

/// Resolves a track id into display metadata
///
/// # Example
/// ```rust,ignore
/// use songclash_challenge::lookup::{TrackLookup, LookupError};
///
/// struct Fixed(TrackMetadata);
///
/// #[async_trait::async_trait]
/// impl TrackLookup for Fixed {
///     async fn lookup(&self, _id: &TrackId) -> Result<TrackMetadata, LookupError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait TrackLookup: Send + Sync {
    async fn lookup(&self, track_id: &TrackId) -> Result<TrackMetadata, LookupError>;
}

#[async_trait]
impl<L: TrackLookup + ?Sized> TrackLookup for Arc<L> {
    async fn lookup(&self, track_id: &TrackId) -> Result<TrackMetadata, LookupError> {
        (**self).lookup(track_id).await
    }
}

/// Adapter turning an async closure into a [`TrackLookup`]
pub struct FnLookup<F>(pub F);

#[async_trait]
impl<F, Fut> TrackLookup for FnLookup<F>
where
    F: Fn(TrackId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<TrackMetadata, LookupError>> + Send,
{
    async fn lookup(&self, track_id: &TrackId) -> Result<TrackMetadata, LookupError> {
        (self.0)(track_id.clone()).await
    }
}

/// Bounds every lookup of the wrapped capability
///
/// The enricher imposes no deadline of its own. A lookup that never settles
/// keeps the enrichment loading forever unless the capability is wrapped.
pub struct TimeoutLookup<L> {
    inner: L,
    timeout: Duration,
}

impl<L: TrackLookup> TimeoutLookup<L> {
    pub fn new(inner: L, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<L: TrackLookup> TrackLookup for TimeoutLookup<L> {
    async fn lookup(&self, track_id: &TrackId) -> Result<TrackMetadata, LookupError> {
        match tokio::time::timeout(self.timeout, self.inner.lookup(track_id)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(track_id = %track_id, timeout = ?self.timeout, "Track lookup timed out");
                Err(LookupError::Timeout(track_id.clone(), self.timeout))
            }
        }
    }
}
