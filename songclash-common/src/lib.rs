//! # SongClash Common Library
//!
//! Shared code for the SongClash crates:
//! - Round result and track metadata model
//! - Configuration loading
//! - Error types
//! - Human-readable time formatting

pub mod config;
pub mod error;
pub mod human_time;
pub mod model;

pub use error::{Error, Result};
pub use model::{ResultSet, RoundResult, TrackId, TrackMetadata};
