//! # Album Art Module
//!
//! Fetches cover images for display. Network and decode failures are retried
//! under a fixed [`RetryPolicy`] and then reported as
//! [`Artwork::Unavailable`]; nothing here returns an error, so a missing
//! cover never blocks a listing.
//!
//! The selection code never touches this module. Callers hand a fetcher to
//! the display layer, which makes it easy to swap in [`NoArtwork`] or a test
//! double.

use crate::config::ArtworkConfig;
use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use log::{debug, warn};
use reqwest::blocking::Client;
use std::fmt::Display;
use std::thread;
use std::time::Duration;

/// Outcome of an album art lookup.
#[derive(Debug, Clone)]
pub enum Artwork {
    Image(DynamicImage),
    Unavailable,
}

impl Artwork {
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Artwork::Image(_))
    }
}

/// Turns an image URL into an image, or gives up.
pub trait ArtworkFetcher {
    fn fetch(&self, url: &str) -> Artwork;
}

/// Fixed-delay bounded retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Run `operation` until it succeeds or the attempts run out.
    ///
    /// Sleeps `delay` between attempts, never after the last one. Zero
    /// attempts is treated as one.
    pub fn run<T, E, F>(&self, what: &str, mut operation: F) -> Option<T>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let attempts = self.attempts.max(1);
        for attempt in 1..=attempts {
            match operation() {
                Ok(value) => return Some(value),
                Err(err) => {
                    warn!("{what}: attempt {attempt}/{attempts} failed: {err}");
                    if attempt < attempts {
                        thread::sleep(self.delay);
                    }
                }
            }
        }
        None
    }
}

/// Downloads covers over HTTP with a per-request timeout.
pub struct HttpArtworkFetcher {
    client: Client,
    policy: RetryPolicy,
    size: u32,
}

impl HttpArtworkFetcher {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built (e.g. TLS backend init).
    pub fn new(config: &ArtworkConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("mixtape/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for album art")?;

        Ok(Self {
            client,
            policy: RetryPolicy {
                attempts: config.attempts,
                delay: config.delay(),
            },
            size: config.size,
        })
    }

    fn download(&self, url: &str) -> Result<DynamicImage> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()?;
        let bytes = response.bytes().context("failed to read response body")?;
        decode(&bytes)
    }
}

impl ArtworkFetcher for HttpArtworkFetcher {
    fn fetch(&self, url: &str) -> Artwork {
        debug!("Fetching album art from {url}");
        match self.policy.run(url, || self.download(url)) {
            Some(image) => Artwork::Image(fit(&image, self.size)),
            None => Artwork::Unavailable,
        }
    }
}

/// Fetcher that never does I/O. Used with `--no-art`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoArtwork;

impl ArtworkFetcher for NoArtwork {
    fn fetch(&self, _url: &str) -> Artwork {
        Artwork::Unavailable
    }
}

/// Decode image bytes in any enabled format.
///
/// # Errors
///
/// Fails if the bytes are not a supported image.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).context("response is not a decodable image")
}

/// Resize to a `size`x`size` square, ignoring aspect ratio.
#[must_use]
pub fn fit(image: &DynamicImage, size: u32) -> DynamicImage {
    image.resize_exact(size, size, FilterType::Triangle)
}
