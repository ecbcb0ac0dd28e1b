//! # Mixtape - Song Recommendations
//!
//! Command-line front end over the `mixtape` library: loads the catalog
//! artifacts, runs one recommendation strategy and prints the result.
//!
//! ## Usage
//!
//! ```bash
//! # Six songs in the neighbourhood of a seed
//! mixtape similar "Blinding Lights"
//!
//! # Everything that fits a mood or preset playlist
//! mixtape mood energetic
//! mixtape playlist chill --no-art
//!
//! # Dump the joined catalog
//! mixtape export -o catalog.csv
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use mixtape::artwork::{ArtworkFetcher, HttpArtworkFetcher, NoArtwork};
use mixtape::catalog::Catalog;
use mixtape::cli::{self, Args, Command};
use mixtape::completion;
use mixtape::config::RuntimeConfig;
use mixtape::display::{self, DisplayOptions};
use mixtape::error::RecommendError;
use mixtape::mood::{Mood, Playlist};
use mixtape::recommend::{Recommendation, Recommender};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;

/// Resolve configuration: file layer first, then `--data-dir`.
fn resolve_config(args: &Args) -> Result<RuntimeConfig> {
    let config = RuntimeConfig::load(args.config.as_deref())?;
    Ok(match &args.data_dir {
        Some(dir) => config.with_data_dir(dir.clone()),
        None => config,
    })
}

fn load_catalog(config: &RuntimeConfig) -> Result<Arc<Catalog>> {
    let paths = config.catalog_paths();
    match Catalog::load(&paths) {
        Ok(catalog) => {
            info!("Catalog loaded: {} tracks", catalog.len());
            Ok(Arc::new(catalog))
        }
        Err(err @ RecommendError::MissingArtifact { .. }) => Err(anyhow::Error::new(err).context(format!(
            "No catalog in {}. Put music.json, similarity.json and spotify.csv there, \
             or pass --data-dir",
            config.data_dir.display()
        ))),
        Err(err) => Err(anyhow::Error::new(err).context("Failed to load catalog")),
    }
}

fn show(recommendation: &Recommendation<'_>, fetcher: &dyn ArtworkFetcher, options: &DisplayOptions) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    display::render(&mut out, recommendation, fetcher, options)?;
    out.flush()?;
    Ok(())
}

/// Main entry point for Mixtape.
///
/// # Logging
///
/// Controlled via `RUST_LOG`:
/// - `RUST_LOG=debug mixtape similar "Song"` - Enable debug logging
/// - `RUST_LOG=mixtape::artwork=warn mixtape mood happy` - Retry warnings only
fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    // Commands that do not need a catalog
    match &args.command {
        Command::Completion { shell } => {
            let mut cmd = Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
            return Ok(());
        }
        Command::CompletionEnhanced { shell } => {
            let script = completion::enhanced_completion_script(*shell)
                .ok_or_else(|| anyhow::anyhow!("Enhanced completions only supported for bash and fish"))?;
            print!("{script}");
            return Ok(());
        }
        Command::CompleteSongs => {
            // Used by the completion scripts; a broken config just yields no songs
            let paths = match resolve_config(&args) {
                Ok(config) => config.catalog_paths(),
                Err(err) => {
                    debug!("No song completions: {err:#}");
                    return Ok(());
                }
            };
            completion::print_song_completions(&paths)?;
            return Ok(());
        }
        _ => {}
    }

    let config = resolve_config(&args)?;
    debug!("Using data directory {}", config.data_dir.display());
    let recommender = Recommender::new(load_catalog(&config)?, config.selection);

    let fetcher: Box<dyn ArtworkFetcher> = if args.no_art {
        Box::new(NoArtwork)
    } else {
        Box::new(HttpArtworkFetcher::new(&config.artwork)?)
    };
    let mut options = DisplayOptions {
        verbose: false,
        save_art: args.save_art.clone(),
    };

    match args.command {
        Command::Similar { song, verbose, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let recommendation = recommender.by_content(&song, &mut rng)?;
            options.verbose = verbose;
            show(&recommendation, fetcher.as_ref(), &options)?;
        }
        Command::Mood { mood } => {
            let mood: Mood = mood.parse()?;
            show(&recommender.by_mood(mood)?, fetcher.as_ref(), &options)?;
        }
        Command::Playlist { playlist } => {
            let playlist: Playlist = playlist.parse()?;
            show(&recommender.by_playlist(playlist)?, fetcher.as_ref(), &options)?;
        }
        Command::Songs => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for name in recommender.catalog().track_names() {
                writeln!(out, "{name}")?;
            }
        }
        Command::Export { output } => match output {
            Some(path) => {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                recommender.catalog().export_csv(BufWriter::new(file))?;
                info!("Exported {} tracks to {}", recommender.catalog().len(), path.display());
            }
            None => recommender.catalog().export_csv(io::stdout().lock())?,
        },
        Command::Completion { .. } | Command::CompletionEnhanced { .. } | Command::CompleteSongs => {
            unreachable!("handled before the catalog is loaded")
        }
    }

    Ok(())
}
