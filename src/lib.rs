//! Song recommendations from content similarity, popularity, mood and preset
//! playlists.
//!
//! Core modules:
//! - [`catalog`] - Loading and joining the catalog artifacts
//! - [`algorithm`] - Similarity ranking and popularity-weighted sampling
//! - [`mood`] - Mood thresholds and playlist presets
//! - [`recommend`] - Strategies over one shared catalog
//!
//! ### Supporting Modules
//!
//! - [`song`] - The joined track record
//! - [`artwork`] - Album art download with bounded retry
//! - [`display`] - Terminal grid rendering
//! - [`config`] - Configuration and data directory management
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`error`] - Typed errors for the recommendation core
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use mixtape::catalog::{Catalog, CatalogPaths};
//! use mixtape::recommend::Recommender;
//! use mixtape::algorithm::SelectionContext;
//! use mixtape::mood::Mood;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let catalog = Catalog::load(&CatalogPaths::in_dir(Path::new("data")))?;
//! let recommender = Recommender::new(Arc::new(catalog), SelectionContext::default());
//!
//! // Six popularity-weighted picks among the 50 nearest neighbours
//! let picks = recommender.by_content("Blinding Lights", &mut rand::thread_rng())?;
//! for name in picks.names() {
//!     println!("{name}");
//! }
//!
//! // Every track above the happy thresholds, in catalog order
//! let happy = recommender.by_mood(Mood::Happy)?;
//! println!("{} happy songs", happy.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Selection Details
//!
//! ### Content similarity
//! - Looks up the seed's row in the precomputed similarity matrix
//! - Ranks every other track by score, ties broken by catalog position
//! - Keeps the top 50 as the neighbourhood
//!
//! ### Popularity sampling
//! - Draws 6 distinct track names from the neighbourhood
//! - Each draw is weighted by popularity; tracks without one weigh nothing
//! - Falls back to a uniform draw when every remaining weight is zero
//!
//! ### Moods and playlists
//! - A mood is a set of minimum danceability, energy and valence values
//! - Workout maps to Energetic; Study and Chill map to Relaxed
//!
//! ## Error Handling
//!
//! The core returns [`error::RecommendError`]; the binary wraps it in
//! `anyhow` with context. Album art failures never surface as errors, only
//! as an "unavailable" cell in the grid.

pub mod algorithm;
pub mod artwork;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod display;
pub mod error;
pub mod mood;
pub mod recommend;
pub mod song;
