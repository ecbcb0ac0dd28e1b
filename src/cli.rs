//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for Mixtape using Clap derive macros.
//!
//! ## Commands
//!
//! - `similar`: 6 popularity-weighted picks from the 50 songs most similar to a seed
//! - `mood`: every song matching a mood (Happy, Sad, Energetic, Relaxed)
//! - `playlist`: a preset playlist (Workout, Study, Chill)
//! - `songs`: list the song names the catalog knows
//! - `export`: write the joined catalog as CSV
//!
//! ## Examples
//!
//! ```bash
//! mixtape similar "Blinding Lights"
//! mixtape mood happy --no-art
//! mixtape playlist workout --save-art ./covers
//! mixtape export -o spotify.csv
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// Catalog location and album art behaviour are global so they can be given
/// before or after the subcommand.
#[derive(Parser, Debug)]
#[command(name = "mixtape")]
#[command(about = "Mixtape: song recommendations by similarity, mood & playlist")]
#[command(version)]
pub struct Args {
    /// Directory containing music.json, similarity.json and spotify.csv
    #[arg(long, global = true, env = "MIXTAPE_DATA_DIR", value_hint = clap::ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// TOML configuration file
    ///
    /// Defaults to mixtape/config.toml in the platform config directory,
    /// if it exists.
    #[arg(long, global = true, env = "MIXTAPE_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Do not download album art
    #[arg(long, global = true)]
    pub no_art: bool,

    /// Save downloaded album art as PNG files in this directory
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub save_art: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recommend songs similar to a given song
    ///
    /// Takes the 50 songs whose audio features are closest to SONG and
    /// draws 6 of them at random, favouring popular tracks. Run it twice
    /// for a different mix.
    Similar {
        /// Exact track name, as printed by `mixtape songs`
        #[arg(value_hint = clap::ValueHint::Other)]
        song: String,

        /// Show the similarity score of every pick
        #[arg(short, long)]
        verbose: bool,

        /// Seed the random draw for a repeatable result
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Recommend songs that fit a mood
    ///
    /// Lists every song whose danceability, energy and valence reach the
    /// mood's thresholds.
    Mood {
        /// One of: happy, sad, energetic, relaxed
        mood: String,
    },

    /// Build a preset playlist
    ///
    /// Workout uses the energetic mood; study and chill use relaxed.
    Playlist {
        /// One of: workout, study, chill
        playlist: String,
    },

    /// List all song names in the catalog
    Songs,

    /// Export the joined catalog as CSV
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    ///
    /// Usage: mixtape completion bash > ~/.local/share/bash-completion/completions/mixtape
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// Generate enhanced completion with song name completion
    ///
    /// Usage: mixtape completion-enhanced bash > ~/.local/share/bash-completion/completions/mixtape
    /// Usage: mixtape completion-enhanced fish > ~/.config/fish/completions/mixtape.fish
    CompletionEnhanced {
        /// Shell to generate enhanced completions for (currently bash and fish supported)
        shell: Shell,
    },

    /// List available songs for completion (hidden command)
    #[command(hide = true)]
    CompleteSongs,
}
