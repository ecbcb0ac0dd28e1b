//! # Integration Tests for Mixtape
//!
//! End-to-end tests from a user perspective: catalog artifacts are written to
//! a temporary directory, loaded through the library, and driven through the
//! `mixtape` binary.

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const TRACKS: usize = 10;

/// Write a ten-song catalog. Song `i` is `1 - 0.1 * |i - j|` similar to
/// song `j`, so "Song 0" ranks the rest in name order.
fn create_test_catalog() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    let songs: Vec<serde_json::Value> = (0..TRACKS)
        .map(|i| serde_json::json!({ "Track Name": format!("Song {i}"), "Popularity": 1 }))
        .collect();
    fs::write(dir.join("music.json"), serde_json::to_string(&songs)?)?;

    let matrix: Vec<Vec<f64>> = (0..TRACKS)
        .map(|i| {
            (0..TRACKS)
                .map(|j| 1.0 - 0.1 * (i as f64 - j as f64).abs())
                .collect()
        })
        .collect();
    fs::write(dir.join("similarity.json"), serde_json::to_string(&matrix)?)?;

    let mut csv = String::from(
        "Track URI,Track Name,Artist Name(s),Album Image URL,Popularity,Danceability,Energy,Valence\n",
    );
    for i in 0..TRACKS {
        let (danceability, energy, valence) = match i {
            2 => (0.95, 0.95, 0.75),
            3 => (0.85, 0.75, 0.95),
            _ => (0.2, 0.5, 0.5),
        };
        csv.push_str(&format!(
            "spotify:track:id{i},Song {i},Artist {i},,{},{danceability},{energy},{valence}\n",
            10 * (i + 1)
        ));
    }
    fs::write(dir.join("spotify.csv"), csv)?;

    Ok(temp_dir)
}

/// Run the binary against `data_dir` with an empty config file and no art.
fn run_mixtape(data_dir: &Path, args: &[&str]) -> Result<Output> {
    let config = data_dir.join("config.toml");
    if !config.exists() {
        fs::write(&config, "")?;
    }

    let output = Command::new(env!("CARGO_BIN_EXE_mixtape"))
        .args(args)
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--config")
        .arg(&config)
        .arg("--no-art")
        .env_remove("MIXTAPE_DATA_DIR")
        .env_remove("MIXTAPE_CONFIG")
        .output()?;
    Ok(output)
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_cli_help_displays_correctly() -> Result<()> {
        let output = Command::new(env!("CARGO_BIN_EXE_mixtape")).arg("--help").output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("mixtape"));
        assert!(stdout.contains("similar"));
        assert!(stdout.contains("mood"));
        assert!(stdout.contains("playlist"));
        assert!(stdout.contains("export"));
        assert!(!stdout.contains("complete-songs"));
        Ok(())
    }

    #[test]
    fn test_completion_generation() -> Result<()> {
        let output = Command::new(env!("CARGO_BIN_EXE_mixtape"))
            .args(["completion", "bash"])
            .output()?;

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("_mixtape"));
        assert!(stdout.contains("complete"));
        Ok(())
    }

    #[test]
    fn test_songs_lists_catalog() -> Result<()> {
        let catalog = create_test_catalog()?;
        let output = run_mixtape(catalog.path(), &["songs"])?;

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let names: Vec<&str> = stdout.lines().collect();
        assert_eq!(names.len(), TRACKS);
        assert_eq!(names[0], "Song 0");
        Ok(())
    }

    #[test]
    fn test_complete_songs_is_quiet_without_catalog() -> Result<()> {
        let empty = TempDir::new()?;
        let output = run_mixtape(empty.path(), &["complete-songs"])?;

        assert!(output.status.success());
        assert!(output.stdout.is_empty());
        Ok(())
    }
}

#[cfg(test)]
mod recommendation_tests {
    use super::*;

    fn cell_count(stdout: &str) -> usize {
        stdout.matches('♫').count()
    }

    #[test]
    fn test_similar_prints_six_songs() -> Result<()> {
        let catalog = create_test_catalog()?;
        let output = run_mixtape(catalog.path(), &["similar", "Song 0", "--seed", "3"])?;

        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Recommended songs based on Song 0"));
        assert_eq!(cell_count(&stdout), 6);
        assert!(!stdout.contains("♫ Song 0\n"));
        assert!(stdout.contains("album art unavailable"));
        Ok(())
    }

    #[test]
    fn test_similar_with_seed_is_repeatable() -> Result<()> {
        let catalog = create_test_catalog()?;
        let first = run_mixtape(catalog.path(), &["similar", "Song 5", "--seed", "11", "-v"])?;
        let second = run_mixtape(catalog.path(), &["similar", "Song 5", "--seed", "11", "-v"])?;

        assert!(first.status.success());
        assert_eq!(first.stdout, second.stdout);
        assert!(String::from_utf8_lossy(&first.stdout).contains("similarity"));
        Ok(())
    }

    #[test]
    fn test_similar_unknown_song_fails() -> Result<()> {
        let catalog = create_test_catalog()?;
        let output = run_mixtape(catalog.path(), &["similar", "Nope"])?;

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("song not found"));
        Ok(())
    }

    #[test]
    fn test_mood_and_playlist() -> Result<()> {
        let catalog = create_test_catalog()?;

        let happy = run_mixtape(catalog.path(), &["mood", "happy"])?;
        assert!(happy.status.success());
        let stdout = String::from_utf8_lossy(&happy.stdout);
        assert!(stdout.contains("Songs for mood: Happy"));
        assert!(stdout.contains("Song 3"));
        assert_eq!(cell_count(&stdout), 1);

        let workout = run_mixtape(catalog.path(), &["playlist", "Workout"])?;
        let stdout = String::from_utf8_lossy(&workout.stdout);
        assert!(stdout.contains("Recommended songs for Workout playlist"));
        assert!(stdout.contains("Song 2"));
        assert_eq!(cell_count(&stdout), 1);
        Ok(())
    }

    #[test]
    fn test_invalid_mood_and_playlist_fail() -> Result<()> {
        let catalog = create_test_catalog()?;

        let mood = run_mixtape(catalog.path(), &["mood", "grumpy"])?;
        assert!(!mood.status.success());
        assert!(String::from_utf8_lossy(&mood.stderr).contains("unknown mood"));

        let playlist = run_mixtape(catalog.path(), &["playlist", "party"])?;
        assert!(!playlist.status.success());
        assert!(String::from_utf8_lossy(&playlist.stderr).contains("unknown playlist"));
        Ok(())
    }

    #[test]
    fn test_missing_catalog_fails_with_hint() -> Result<()> {
        let empty = TempDir::new()?;
        let output = run_mixtape(empty.path(), &["songs"])?;

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("--data-dir"));
        assert!(stderr.contains("music.json"));
        Ok(())
    }

    #[test]
    fn test_export_writes_joined_catalog() -> Result<()> {
        let catalog = create_test_catalog()?;
        let target = catalog.path().join("out.csv");
        let output = run_mixtape(catalog.path(), &["export", "-o", target.to_str().unwrap()])?;

        assert!(output.status.success());
        let text = fs::read_to_string(&target)?;
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Track Name,Track URI,Artist Name(s),Album Image URL,Popularity,Danceability,Energy,Valence")
        );
        assert_eq!(lines.count(), TRACKS);
        // cells are exported as read, so integer popularity stays an integer
        assert!(text.contains("Song 3,spotify:track:id3,Artist 3,,40,0.85,0.75,0.95"));
        Ok(())
    }
}

#[cfg(test)]
mod library_tests {
    use super::*;
    use mixtape::algorithm::{rank_similar, sample_by_popularity, SelectionContext};
    use mixtape::catalog::{Catalog, CatalogPaths};
    use mixtape::error::RecommendError;
    use mixtape::recommend::Recommender;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn load() -> Result<(TempDir, Catalog)> {
        let dir = create_test_catalog()?;
        let catalog = Catalog::load(&CatalogPaths::in_dir(dir.path()))?;
        Ok((dir, catalog))
    }

    #[test]
    fn test_loaded_catalog_matches_matrix() -> Result<()> {
        let (_dir, catalog) = load()?;
        assert_eq!(catalog.len(), TRACKS);
        assert_eq!(catalog.similarity().dim(), TRACKS);

        // metadata popularity replaces the feature table's
        assert_eq!(catalog.tracks()[4].popularity, Some(50.0));
        assert_eq!(catalog.tracks()[4].artists.as_deref(), Some("Artist 4"));
        assert_eq!(catalog.tracks()[4].album_art_url, None);
        Ok(())
    }

    #[test]
    fn test_ranking_follows_similarity() -> Result<()> {
        let (_dir, catalog) = load()?;
        let ranked = rank_similar(&catalog, "Song 0", 50)?;

        let names: Vec<_> = ranked.iter().map(|s| s.track.name.as_str()).collect();
        let expected: Vec<String> = (1..TRACKS).map(|i| format!("Song {i}")).collect();
        assert_eq!(names, expected);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        Ok(())
    }

    #[test]
    fn test_recommendations_are_distinct_neighbours() -> Result<()> {
        let (_dir, catalog) = load()?;
        let recommender = Recommender::new(Arc::new(catalog), SelectionContext::default());

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picks = recommender.by_content("Song 7", &mut rng)?;
            let names: HashSet<_> = picks.names().into_iter().collect();
            assert_eq!(names.len(), 6);
            assert!(!names.contains("Song 7"));
        }
        Ok(())
    }

    #[test]
    fn test_sampling_favours_popular_tracks() -> Result<()> {
        let (_dir, catalog) = load()?;
        let mut rng = StdRng::seed_from_u64(5);
        let mut top_hits = 0;
        let mut bottom_hits = 0;

        for _ in 0..2000 {
            let picked = sample_by_popularity(catalog.tracks(), 1, &mut rng)?;
            match picked[0].name.as_str() {
                "Song 9" => top_hits += 1,
                "Song 0" => bottom_hits += 1,
                _ => {}
            }
        }
        // weights 100 vs 10
        assert!(top_hits > bottom_hits * 5);
        Ok(())
    }

    #[test]
    fn test_missing_artifacts_are_reported() -> Result<()> {
        let dir = create_test_catalog()?;
        fs::remove_file(dir.path().join("similarity.json"))?;

        match Catalog::load(&CatalogPaths::in_dir(dir.path())) {
            Err(RecommendError::MissingArtifact { paths }) => {
                assert_eq!(paths, [dir.path().join("similarity.json")]);
            }
            other => panic!("expected MissingArtifact, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_shape_mismatch_is_rejected() -> Result<()> {
        let dir = create_test_catalog()?;
        fs::write(dir.path().join("similarity.json"), "[[1.0, 0.5], [0.5, 1.0]]")?;

        assert!(matches!(
            Catalog::load(&CatalogPaths::in_dir(dir.path())),
            Err(RecommendError::ShapeMismatch { rows: 2, columns: 2, tracks: 10 })
        ));
        Ok(())
    }
}
