//! Recommendation selection algorithms.
//!
//! Nearest-neighbour ranking over the similarity matrix, and
//! popularity-weighted sampling to diversify the final picks.

use crate::catalog::Catalog;
use crate::error::{RecommendError, Result};
use crate::song::Track;
use log::{debug, trace, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Sizes used by the content-similarity strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionContext {
    /// How many nearest neighbours become sampling candidates.
    pub neighbours: usize,
    /// How many distinct tracks the sampler returns.
    pub picks: usize,
}

impl Default for SelectionContext {
    fn default() -> Self {
        Self {
            neighbours: 50,
            picks: 6,
        }
    }
}

/// A catalog track together with its similarity to the seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredTrack<'a> {
    /// Row in the catalog (and the matrix).
    pub position: usize,
    pub score: f64,
    pub track: &'a Track,
}

/// Rank the catalog by similarity to `seed` and return the `limit` nearest
/// neighbours.
///
/// The seed is looked up by exact name; with duplicate names the first row
/// is used. Scores are sorted descending, ties go to the lower catalog
/// position, NaN sorts last. The seed's own row is never part of the result.
///
/// # Errors
///
/// Returns [`RecommendError::NotFound`] if no track is named `seed`.
///
/// # Examples
///
/// ```
/// use mixtape::algorithm::rank_similar;
/// use mixtape::catalog::Catalog;
/// use mixtape::song::Track;
///
/// let tracks = vec![Track::named("A"), Track::named("B"), Track::named("C")];
/// let matrix = vec![
///     vec![1.0, 0.2, 0.7],
///     vec![0.2, 1.0, 0.4],
///     vec![0.7, 0.4, 1.0],
/// ];
/// let catalog = Catalog::new(tracks, matrix)?;
///
/// let ranked = rank_similar(&catalog, "A", 50)?;
/// let names: Vec<_> = ranked.iter().map(|s| s.track.name.as_str()).collect();
/// assert_eq!(names, ["C", "B"]);
/// # Ok::<(), mixtape::error::RecommendError>(())
/// ```
pub fn rank_similar<'a>(catalog: &'a Catalog, seed: &str, limit: usize) -> Result<Vec<ScoredTrack<'a>>> {
    let mut positions = catalog.positions_of(seed);
    let seed_position = positions
        .next()
        .ok_or_else(|| RecommendError::NotFound(seed.to_string()))?;

    let duplicates = positions.count();
    if duplicates > 0 {
        warn!("'{seed}' appears {} times in the catalog; using row {seed_position}", duplicates + 1);
    }

    let mut ranked: Vec<(usize, f64)> = catalog
        .similarity()
        .row(seed_position)
        .iter()
        .copied()
        .enumerate()
        .filter(|&(position, _)| position != seed_position)
        .collect();

    ranked.sort_by(|&(pa, a), &(pb, b)| compare_scores(a, b).then(pa.cmp(&pb)));
    ranked.truncate(limit);
    trace!("Ranked {} neighbours for '{seed}'", ranked.len());

    Ok(ranked
        .into_iter()
        .map(|(position, score)| ScoredTrack {
            position,
            score,
            track: &catalog.tracks()[position],
        })
        .collect())
}

/// Descending order with NaN last.
fn compare_scores(a: f64, b: f64) -> Ordering {
    let key = |score: f64| if score.is_nan() { f64::NEG_INFINITY } else { score };
    key(b).total_cmp(&key(a))
}

/// Draw `picks` distinct tracks, each with probability proportional to its
/// popularity among the tracks not yet drawn.
///
/// Candidates sharing a name are one entry whose weight is the sum of their
/// popularity, and the first such candidate represents it in the output.
/// This matches drawing from the raw list with replacement and discarding
/// repeated names, without the unbounded retry loop. If every remaining
/// weight is zero the draw is uniform.
///
/// # Errors
///
/// Returns [`RecommendError::InsufficientCandidates`] when there are fewer
/// than `picks` distinct names.
pub fn sample_by_popularity<'a, I, R>(candidates: I, picks: usize, rng: &mut R) -> Result<Vec<&'a Track>>
where
    I: IntoIterator<Item = &'a Track>,
    R: Rng + ?Sized,
{
    let mut pool = group_by_name(candidates);
    if pool.len() < picks {
        return Err(RecommendError::InsufficientCandidates {
            needed: picks,
            available: pool.len(),
        });
    }

    let mut chosen = Vec::with_capacity(picks);
    while chosen.len() < picks {
        let index = match WeightedIndex::new(pool.iter().map(|(_, weight)| *weight)) {
            Ok(distribution) => distribution.sample(rng),
            Err(err) => {
                debug!("Falling back to uniform draw: {err}");
                rng.gen_range(0..pool.len())
            }
        };
        let (track, _) = pool.remove(index);
        chosen.push(track);
    }

    Ok(chosen)
}

/// Distinct names in first-seen order with their summed popularity.
///
/// Weights are divided by [`weight_scale`] so that neither a group nor the
/// whole pool sums to infinity.
fn group_by_name<'a, I>(candidates: I) -> Vec<(&'a Track, f64)>
where
    I: IntoIterator<Item = &'a Track>,
{
    let candidates: Vec<&'a Track> = candidates.into_iter().collect();
    let scale = weight_scale(&candidates);

    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut pool: Vec<(&'a Track, f64)> = Vec::new();

    for track in candidates {
        let weight = track.popularity_weight() / scale;
        match slots.get(track.name.as_str()) {
            Some(&slot) => pool[slot].1 += weight,
            None => {
                slots.insert(&track.name, pool.len());
                pool.push((track, weight));
            }
        }
    }

    pool
}

/// 1 unless the raw weights overflow when summed, then the largest weight.
fn weight_scale(candidates: &[&Track]) -> f64 {
    let total: f64 = candidates.iter().map(|track| track.popularity_weight()).sum();
    if total.is_finite() {
        return 1.0;
    }
    warn!("Popularity weights overflow when summed; rescaling");
    candidates
        .iter()
        .map(|track| track.popularity_weight())
        .fold(f64::MIN_POSITIVE, f64::max)
}
