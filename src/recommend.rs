//! # Recommendation Strategies
//!
//! Each way of recommending songs is a [`RecommendStrategy`]:
//!
//! - [`ContentStrategy`] - 50 nearest neighbours of a seed song, diversified
//!   down to 6 picks by popularity-weighted sampling
//! - [`MoodStrategy`] - every song matching a mood profile
//! - [`PlaylistStrategy`] - a named preset that maps onto a mood
//!
//! [`Recommender`] holds the shared, read-only catalog handle and runs them.

use crate::algorithm::{self, SelectionContext};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::mood::{self, Mood, Playlist};
use crate::song::Track;
use log::info;
use rand::RngCore;
use std::sync::Arc;

/// One recommended track. `score` is the similarity to the seed when the
/// strategy has one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick<'a> {
    pub track: &'a Track,
    pub score: Option<f64>,
}

/// A titled list of picks, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation<'a> {
    pub title: String,
    pub picks: Vec<Pick<'a>>,
}

impl<'a> Recommendation<'a> {
    fn unscored(title: String, tracks: Vec<&'a Track>) -> Self {
        Self {
            title,
            picks: tracks.into_iter().map(|track| Pick { track, score: None }).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Names of the picked tracks, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'a str> {
        self.picks.iter().map(|pick| pick.track.name.as_str()).collect()
    }
}

/// A way of turning the catalog into a recommendation list.
pub trait RecommendStrategy {
    /// # Errors
    ///
    /// Strategy-specific; see the implementors.
    fn recommend<'a>(&self, catalog: &'a Catalog, rng: &mut dyn RngCore) -> Result<Recommendation<'a>>;
}

/// Nearest neighbours of `seed`, sampled by popularity.
#[derive(Debug, Clone)]
pub struct ContentStrategy {
    seed: String,
    context: SelectionContext,
}

impl ContentStrategy {
    #[must_use]
    pub fn new(seed: impl Into<String>, context: SelectionContext) -> Self {
        Self {
            seed: seed.into(),
            context,
        }
    }
}

impl RecommendStrategy for ContentStrategy {
    /// Each pick carries the first catalog row with the drawn name, which
    /// differs from the drawn neighbour only when names repeat.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown seed, `InsufficientCandidates` when the
    /// neighbourhood has fewer distinct names than picks.
    fn recommend<'a>(&self, catalog: &'a Catalog, rng: &mut dyn RngCore) -> Result<Recommendation<'a>> {
        let ranked = algorithm::rank_similar(catalog, &self.seed, self.context.neighbours)?;
        let chosen = algorithm::sample_by_popularity(
            ranked.iter().map(|scored| scored.track),
            self.context.picks,
            rng,
        )?;

        // A sampled name is shown as the catalog's first row of that name,
        // scored as the neighbour that was drawn.
        let picks = chosen
            .into_iter()
            .map(|drawn| Pick {
                track: catalog.find(&drawn.name).unwrap_or(drawn),
                score: ranked
                    .iter()
                    .find(|scored| std::ptr::eq(scored.track, drawn))
                    .map(|scored| scored.score),
            })
            .collect();

        Ok(Recommendation {
            title: format!("Recommended songs based on {}", self.seed),
            picks,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MoodStrategy(pub Mood);

impl RecommendStrategy for MoodStrategy {
    fn recommend<'a>(&self, catalog: &'a Catalog, _rng: &mut dyn RngCore) -> Result<Recommendation<'a>> {
        let tracks = mood::filter_by_mood(catalog, self.0);
        Ok(Recommendation::unscored(format!("Songs for mood: {}", self.0), tracks))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlaylistStrategy(pub Playlist);

impl RecommendStrategy for PlaylistStrategy {
    fn recommend<'a>(&self, catalog: &'a Catalog, _rng: &mut dyn RngCore) -> Result<Recommendation<'a>> {
        let tracks = mood::create_playlist(catalog, self.0);
        Ok(Recommendation::unscored(
            format!("Recommended songs for {} playlist", self.0),
            tracks,
        ))
    }
}

/// Entry point for all strategies over one shared catalog.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    context: SelectionContext,
}

impl Recommender {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, context: SelectionContext) -> Self {
        Self { catalog, context }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run any strategy against the catalog.
    ///
    /// # Errors
    ///
    /// Propagates the strategy's error.
    pub fn run(&self, strategy: &dyn RecommendStrategy, rng: &mut dyn RngCore) -> Result<Recommendation<'_>> {
        let recommendation = strategy.recommend(&self.catalog, rng)?;
        info!("{}: {} tracks", recommendation.title, recommendation.len());
        Ok(recommendation)
    }

    /// Content similarity followed by popularity sampling.
    ///
    /// # Errors
    ///
    /// `NotFound` or `InsufficientCandidates`.
    pub fn by_content(&self, seed: &str, rng: &mut dyn RngCore) -> Result<Recommendation<'_>> {
        self.run(&ContentStrategy::new(seed, self.context), rng)
    }

    /// # Errors
    ///
    /// Never fails today; the signature matches the other strategies.
    pub fn by_mood(&self, mood: Mood) -> Result<Recommendation<'_>> {
        self.run(&MoodStrategy(mood), &mut rand::thread_rng())
    }

    /// # Errors
    ///
    /// Never fails today; the signature matches the other strategies.
    pub fn by_playlist(&self, playlist: Playlist) -> Result<Recommendation<'_>> {
        self.run(&PlaylistStrategy(playlist), &mut rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommendError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn sample_catalog(size: usize) -> Arc<Catalog> {
        let tracks = (0..size)
            .map(|i| Track {
                popularity: Some(10.0 + i as f64),
                danceability: Some(0.95),
                energy: Some(if i % 2 == 0 { 0.95 } else { 0.4 }),
                valence: Some(0.85),
                ..Track::named(format!("song{i}"))
            })
            .collect();
        let matrix = (0..size)
            .map(|i| {
                (0..size)
                    .map(|j| if i == j { 1.0 } else { 1.0 / (1.0 + (i as f64 - j as f64).abs()) })
                    .collect()
            })
            .collect();
        Arc::new(Catalog::new(tracks, matrix).unwrap())
    }

    #[test]
    fn test_by_content_picks_six_distinct_neighbours() {
        let recommender = Recommender::new(sample_catalog(20), SelectionContext::default());
        let mut rng = StdRng::seed_from_u64(9);

        let recommendation = recommender.by_content("song4", &mut rng).unwrap();
        assert_eq!(recommendation.len(), 6);
        assert_eq!(recommendation.title, "Recommended songs based on song4");

        let names: HashSet<_> = recommendation.names().into_iter().collect();
        assert_eq!(names.len(), 6);
        assert!(!names.contains("song4"));
        assert!(recommendation.picks.iter().all(|pick| pick.score.is_some()));
    }

    #[test]
    fn test_by_content_small_neighbourhood() {
        let context = SelectionContext {
            neighbours: 3,
            picks: 6,
        };
        let recommender = Recommender::new(sample_catalog(20), context);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(matches!(
            recommender.by_content("song0", &mut rng),
            Err(RecommendError::InsufficientCandidates { needed: 6, available: 3 })
        ));
    }

    #[test]
    fn test_by_content_unknown_seed() {
        let recommender = Recommender::new(sample_catalog(8), SelectionContext::default());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            recommender.by_content("missing", &mut rng),
            Err(RecommendError::NotFound(_))
        ));
    }

    #[test]
    fn test_by_mood_and_playlist_agree() {
        let recommender = Recommender::new(sample_catalog(10), SelectionContext::default());

        let energetic = recommender.by_mood(Mood::Energetic).unwrap();
        let workout = recommender.by_playlist(Playlist::Workout).unwrap();
        assert_eq!(energetic.names(), workout.names());
        assert_eq!(energetic.names(), ["song0", "song2", "song4", "song6", "song8"]);
        assert_eq!(workout.title, "Recommended songs for Workout playlist");

        let relaxed = recommender.by_mood(Mood::Relaxed).unwrap();
        assert_eq!(relaxed.len(), 10);
        assert_eq!(recommender.by_playlist(Playlist::Chill).unwrap().names(), relaxed.names());
    }

    #[test]
    fn test_empty_mood_result_is_ok() {
        let recommender = Recommender::new(sample_catalog(4), SelectionContext::default());
        let happy = recommender.by_mood(Mood::Happy).unwrap();
        assert!(happy.is_empty());
        assert_eq!(happy.title, "Songs for mood: Happy");
    }

    #[test]
    fn test_by_content_shows_first_catalog_row_of_a_name() {
        // "twin" at 0 is far from the seed, "twin" at 2 is its nearest neighbour
        let tracks = vec![
            Track {
                artists: Some("Original".to_string()),
                popularity: Some(1.0),
                ..Track::named("twin")
            },
            Track::named("seed"),
            Track {
                artists: Some("Cover".to_string()),
                popularity: Some(1.0),
                ..Track::named("twin")
            },
        ];
        let matrix = vec![
            vec![1.0, 0.1, 0.5],
            vec![0.1, 1.0, 0.9],
            vec![0.5, 0.9, 1.0],
        ];
        let catalog = Arc::new(Catalog::new(tracks, matrix).unwrap());
        let context = SelectionContext {
            neighbours: 1,
            picks: 1,
        };
        let recommender = Recommender::new(Arc::clone(&catalog), context);
        let mut rng = StdRng::seed_from_u64(2);

        let recommendation = recommender.by_content("seed", &mut rng).unwrap();
        assert_eq!(recommendation.picks[0].track.artists.as_deref(), Some("Original"));
        assert!(std::ptr::eq(recommendation.picks[0].track, &catalog.tracks()[0]));
        assert_eq!(recommendation.picks[0].score, Some(0.9));
    }
}
