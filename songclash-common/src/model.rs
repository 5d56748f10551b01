//! Round result and track metadata model
//!
//! Results are produced by the guessing game and are immutable here. JSON field
//! names match the game's result documents (`trackId`, `score`, `timeTaken`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Opaque identifier of a track in the external catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One player's outcome for a single round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    /// Catalog track the round was played on
    pub track_id: TrackId,
    /// Points scored in this round
    pub score: u32,
    /// Elapsed time to answer, in seconds
    pub time_taken: f64,
}

impl RoundResult {
    pub fn new(track_id: impl Into<TrackId>, score: u32, time_taken: f64) -> Self {
        Self {
            track_id: track_id.into(),
            score,
            time_taken,
        }
    }
}

/// Ordered sequence of one player's round results
///
/// Each set carries an identity. Two sets with equal rounds but different
/// identities are different requests as far as enrichment is concerned.
#[derive(Debug, Clone)]
pub struct ResultSet {
    id: Uuid,
    rounds: Vec<RoundResult>,
}

impl ResultSet {
    /// Create a result set with a fresh identity
    pub fn new(rounds: Vec<RoundResult>) -> Self {
        Self {
            id: Uuid::new_v4(),
            rounds,
        }
    }

    /// Parse a JSON array of round results
    pub fn from_json(json: &str) -> Result<Self> {
        let rounds: Vec<RoundResult> = serde_json::from_str(json)?;
        Ok(Self::new(rounds))
    }

    /// Read a JSON array of round results from disk
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| Error::Parse(format!("{}: {}", path.display(), e)))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoundResult> {
        self.rounds.iter()
    }

    /// Track ids in round order
    pub fn track_ids(&self) -> impl Iterator<Item = &TrackId> {
        self.rounds.iter().map(|r| &r.track_id)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a RoundResult;
    type IntoIter = std::slice::Iter<'a, RoundResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.rounds.iter()
    }
}

/// Display metadata for a catalog track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    pub id: TrackId,
    pub title: String,
    /// Credited artists, in catalog order
    pub artists: Vec<String>,
    pub album: String,
    #[serde(default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl TrackMetadata {
    /// Artists joined for display ("A, B")
    pub fn artist_line(&self) -> String {
        if self.artists.is_empty() {
            "Unknown".to_string()
        } else {
            self.artists.join(", ")
        }
    }
}
