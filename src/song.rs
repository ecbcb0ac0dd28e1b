//! A track, as it sits in the catalog after the metadata join.

use serde::{Deserialize, Serialize};

const TRACK_URI_PREFIX: &str = "spotify:track:";
const TRACK_URL_PREFIX: &str = "https://open.spotify.com/track/";

/// A song together with its joined metadata.
///
/// Every attribute except `name` comes from the metadata file, so each one is
/// `None` when the left join found no matching row.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Natural key. Not unique: a catalog may hold two rows with the same name.
    pub name: String,
    /// Display string, possibly several artists joined by commas.
    pub artists: Option<String>,
    /// `spotify:track:<id>`
    pub uri: Option<String>,
    pub album_art_url: Option<String>,
    /// Nonnegative in well-formed data. Drives the weighted sampler.
    pub popularity: Option<f64>,
    /// Audio features, normalized to `[0, 1]`.
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
}

impl Track {
    /// Bare track with only a name; everything else missing.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Open-web link for this track, if it has a URI.
    #[must_use]
    pub fn web_url(&self) -> Option<String> {
        self.uri.as_deref().map(convert_uri_to_url)
    }

    /// Popularity usable as a sampling weight.
    /// Missing, negative and non-finite values count as zero.
    #[must_use]
    pub fn popularity_weight(&self) -> f64 {
        match self.popularity {
            Some(p) if p.is_finite() && p > 0.0 => p,
            _ => 0.0,
        }
    }

    /// Artist line for display.
    #[must_use]
    pub fn artists_or_unknown(&self) -> &str {
        self.artists.as_deref().unwrap_or("Unknown artist")
    }
}

/// Turn a `spotify:track:<id>` URI into its `https://open.spotify.com/track/<id>` URL.
///
/// Plain substitution of the scheme prefix. Anything without the prefix,
/// including an already converted URL, comes back unchanged.
///
/// ```
/// use mixtape::song::convert_uri_to_url;
///
/// assert_eq!(
///     convert_uri_to_url("spotify:track:abc123"),
///     "https://open.spotify.com/track/abc123"
/// );
/// ```
#[must_use]
pub fn convert_uri_to_url(uri: &str) -> String {
    uri.replace(TRACK_URI_PREFIX, TRACK_URL_PREFIX)
}
