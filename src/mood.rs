//! Mood profiles and playlist presets.
//!
//! A mood is a minimum threshold on three audio features. A playlist preset
//! is just a named mood.

use crate::catalog::Catalog;
use crate::error::RecommendError;
use crate::song::Track;
use std::fmt;
use std::str::FromStr;

/// Minimum danceability, energy and valence for a mood (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodProfile {
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
}

impl MoodProfile {
    /// Whether `track` clears all three thresholds.
    /// A missing feature never clears its threshold.
    #[must_use]
    pub fn admits(&self, track: &Track) -> bool {
        let clears = |value: Option<f64>, min: f64| value.is_some_and(|v| v >= min);
        clears(track.danceability, self.danceability)
            && clears(track.energy, self.energy)
            && clears(track.valence, self.valence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Relaxed,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Sad, Mood::Energetic, Mood::Relaxed];

    /// Fixed threshold table.
    #[must_use]
    pub const fn profile(self) -> MoodProfile {
        let (danceability, energy, valence) = match self {
            Mood::Happy => (0.8, 0.7, 0.9),
            Mood::Sad => (0.3, 0.2, 0.2),
            Mood::Energetic => (0.9, 0.9, 0.7),
            Mood::Relaxed => (0.5, 0.3, 0.8),
        };
        MoodProfile {
            danceability,
            energy,
            valence,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Energetic => "Energetic",
            Mood::Relaxed => "Relaxed",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mood {
    type Err = RecommendError;

    /// Case-insensitive; a trailing emoji like `"Happy 😃"` is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = leading_word(s);
        Mood::ALL
            .into_iter()
            .find(|mood| mood.label().eq_ignore_ascii_case(word))
            .ok_or_else(|| RecommendError::InvalidMood(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Playlist {
    Workout,
    Study,
    Chill,
}

impl Playlist {
    pub const ALL: [Playlist; 3] = [Playlist::Workout, Playlist::Study, Playlist::Chill];

    /// Mood each preset draws from.
    #[must_use]
    pub const fn mood(self) -> Mood {
        match self {
            Playlist::Workout => Mood::Energetic,
            Playlist::Study | Playlist::Chill => Mood::Relaxed,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Playlist::Workout => "Workout",
            Playlist::Study => "Study",
            Playlist::Chill => "Chill",
        }
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Playlist {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = leading_word(s);
        Playlist::ALL
            .into_iter()
            .find(|playlist| playlist.label().eq_ignore_ascii_case(word))
            .ok_or_else(|| RecommendError::InvalidPlaylist(s.to_string()))
    }
}

fn leading_word(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or("")
}

/// Every track that fits `mood`, in catalog order. May be empty.
#[must_use]
pub fn filter_by_mood(catalog: &Catalog, mood: Mood) -> Vec<&Track> {
    let profile = mood.profile();
    catalog
        .tracks()
        .iter()
        .filter(|track| profile.admits(track))
        .collect()
}

/// Tracks for a playlist preset; same as filtering by its mood.
#[must_use]
pub fn create_playlist(catalog: &Catalog, playlist: Playlist) -> Vec<&Track> {
    filter_by_mood(catalog, playlist.mood())
}
