//! # Error Module
//!
//! Typed failures for catalog loading and recommendation selection.
//!
//! The binary wraps these in `anyhow::Error` with extra context; the library
//! keeps them concrete so callers can tell "no such song" apart from an empty
//! but valid mood result.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between loading the catalog and producing
/// a recommendation list.
///
/// Album art failures are not represented here: the artwork fetcher downgrades
/// them to [`crate::artwork::Artwork::Unavailable`].
#[derive(Debug, Error)]
pub enum RecommendError {
    /// One or more of the required data files does not exist.
    #[error("required data files are missing: {}", display_paths(.paths))]
    MissingArtifact { paths: Vec<PathBuf> },

    /// A data file exists but could not be parsed.
    #[error("could not parse {}: {reason}", .path.display())]
    MalformedArtifact { path: PathBuf, reason: String },

    /// The similarity matrix does not line up with the track list.
    #[error("similarity matrix is {rows}x{columns} but the catalog has {tracks} tracks")]
    ShapeMismatch {
        rows: usize,
        columns: usize,
        tracks: usize,
    },

    /// The seed track is not in the catalog.
    #[error("song not found in catalog: '{0}'")]
    NotFound(String),

    /// Mood label outside Happy, Sad, Energetic, Relaxed.
    #[error("unknown mood '{0}' (expected one of: Happy, Sad, Energetic, Relaxed)")]
    InvalidMood(String),

    /// Playlist name outside Workout, Study, Chill.
    #[error("unknown playlist '{0}' (expected one of: Workout, Study, Chill)")]
    InvalidPlaylist(String),

    /// Fewer distinct candidates than requested picks.
    #[error("need {needed} distinct candidates for sampling but only {available} are available")]
    InsufficientCandidates { needed: usize, available: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shorthand used across the library.
pub type Result<T, E = RecommendError> = std::result::Result<T, E>;
