//! # Display Module
//!
//! Terminal presentation of a [`Recommendation`]: a two-column grid where
//! each cell shows the track, its artists, the open-web link and whether its
//! album art could be loaded.
//!
//! Album art is requested through an [`ArtworkFetcher`] one track at a time.
//! A cover that cannot be fetched only changes that cell's status line.

use crate::artwork::{Artwork, ArtworkFetcher};
use crate::recommend::{Pick, Recommendation};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const COLUMNS: usize = 2;
const CELL_WIDTH: usize = 44;
const GUTTER: &str = "   ";

/// Presentation switches from the command line.
#[derive(Debug, Clone, Default)]
pub struct DisplayOptions {
    /// Show similarity scores where available.
    pub verbose: bool,
    /// Write each fetched cover as PNG into this directory.
    pub save_art: Option<PathBuf>,
}

/// Print `recommendation` as a two-column grid.
///
/// # Errors
///
/// Fails on write errors to `out`, or if the `save_art` directory cannot be
/// created. Individual covers that fail to save are only logged.
pub fn render<W: Write>(
    out: &mut W,
    recommendation: &Recommendation<'_>,
    fetcher: &dyn ArtworkFetcher,
    options: &DisplayOptions,
) -> Result<()> {
    writeln!(out, "🎵 {}", recommendation.title)?;
    writeln!(out, "{}", "═".repeat(recommendation.title.chars().count() + 3))?;

    if recommendation.is_empty() {
        writeln!(out, "No songs match.")?;
        return Ok(());
    }

    if let Some(dir) = &options.save_art {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create album art directory {}", dir.display()))?;
    }

    let mut unavailable = 0;
    let cells: Vec<Vec<String>> = recommendation
        .picks
        .iter()
        .enumerate()
        .map(|(index, pick)| {
            let artwork = pick
                .track
                .album_art_url
                .as_deref()
                .map_or(Artwork::Unavailable, |url| fetcher.fetch(url));
            if !artwork.is_available() {
                unavailable += 1;
            }

            if let (Some(dir), Artwork::Image(image)) = (&options.save_art, &artwork) {
                let path = art_path(dir, index, &pick.track.name);
                if let Err(err) = image.save(&path) {
                    warn!("Could not save album art to {}: {err}", path.display());
                }
            }

            cell_lines(index, pick, &artwork, options.verbose)
        })
        .collect();

    if unavailable > 0 {
        debug!("{unavailable} of {} covers unavailable", recommendation.len());
    }
    write_grid(out, &cells)?;
    Ok(())
}

fn cell_lines(index: usize, pick: &Pick<'_>, artwork: &Artwork, verbose: bool) -> Vec<String> {
    let track = pick.track;
    let mut lines = vec![
        format!("{}. ♫ {}", index + 1, track.name),
        format!("   Artist: {}", track.artists_or_unknown()),
        format!(
            "   {}",
            track.web_url().unwrap_or_else(|| "(no link)".to_string())
        ),
        match artwork {
            Artwork::Image(image) => format!("   [art {}x{}]", image.width(), image.height()),
            Artwork::Unavailable => "   ❌ album art unavailable".to_string(),
        },
    ];

    if verbose {
        if let Some(score) = pick.score {
            lines.push(format!("   similarity {score:.3}"));
        }
    }

    lines
}

fn write_grid<W: Write>(out: &mut W, cells: &[Vec<String>]) -> Result<()> {
    for row in cells.chunks(COLUMNS) {
        writeln!(out)?;
        let height = row.iter().map(Vec::len).max().unwrap_or(0);
        for line in 0..height {
            let rendered: Vec<String> = row
                .iter()
                .map(|cell| fit_width(cell.get(line).map_or("", String::as_str), CELL_WIDTH))
                .collect();
            writeln!(out, "{}", rendered.join(GUTTER).trim_end())?;
        }
    }
    Ok(())
}

/// Pad or cut `text` to exactly `width` characters.
fn fit_width(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{text}{}", " ".repeat(width - count))
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// `03-track-name.png`, keeping only filesystem-safe characters.
fn art_file_name(index: usize, name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    format!("{:02}-{}.png", index + 1, if slug.is_empty() { "track" } else { slug })
}

/// Where `save_art` would place the cover of the pick at `index`.
#[must_use]
pub fn art_path(dir: &Path, index: usize, name: &str) -> PathBuf {
    dir.join(art_file_name(index, name))
}
