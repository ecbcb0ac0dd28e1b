//! # Catalog Module
//!
//! Loads the three data files that make up a catalog and joins them into one
//! immutable structure:
//!
//! - `music.json` - the song-feature table the similarity matrix was built from
//! - `similarity.json` - square matrix of pairwise similarity scores
//! - `spotify.csv` - raw per-track metadata (artists, URI, art, audio features)
//!
//! Row `i` of the matrix belongs to row `i` of the feature table. [`Catalog`]
//! owns both halves and never reorders them, so that correspondence holds for
//! the whole session.

use crate::error::{RecommendError, Result};
use crate::song::Track;
use csv::StringRecord;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_SONGS_FILE: &str = "music.json";
pub const DEFAULT_SIMILARITY_FILE: &str = "similarity.json";
pub const DEFAULT_METADATA_FILE: &str = "spotify.csv";

/// Locations of the three catalog artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub songs: PathBuf,
    pub similarity: PathBuf,
    pub metadata: PathBuf,
}

impl CatalogPaths {
    /// Default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            songs: dir.join(DEFAULT_SONGS_FILE),
            similarity: dir.join(DEFAULT_SIMILARITY_FILE),
            metadata: dir.join(DEFAULT_METADATA_FILE),
        }
    }

    fn missing(&self) -> Vec<PathBuf> {
        [&self.songs, &self.similarity, &self.metadata]
            .into_iter()
            .filter(|path| !path.exists())
            .cloned()
            .collect()
    }
}

const TRACK_NAME: &str = "Track Name";
const POPULARITY: &str = "Popularity";

/// One row of the song-feature table. Columns not named here are kept in
/// `extra` for export.
#[derive(Debug, Clone, Deserialize)]
struct FeatureRow {
    #[serde(rename = "Track Name")]
    track_name: String,
    #[serde(rename = "Popularity", default)]
    popularity: Option<f64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// One row of the metadata CSV. Unparseable numbers become `None`.
#[derive(Debug, Clone, Deserialize)]
struct MetadataRow {
    #[serde(rename = "Track Name")]
    track_name: String,
    #[serde(rename = "Artist Name(s)", default)]
    artists: Option<String>,
    #[serde(rename = "Track URI", default)]
    uri: Option<String>,
    #[serde(rename = "Album Image URL", default)]
    album_art_url: Option<String>,
    #[serde(rename = "Popularity", default, deserialize_with = "csv::invalid_option")]
    popularity: Option<f64>,
    #[serde(rename = "Danceability", default, deserialize_with = "csv::invalid_option")]
    danceability: Option<f64>,
    #[serde(rename = "Energy", default, deserialize_with = "csv::invalid_option")]
    energy: Option<f64>,
    #[serde(rename = "Valence", default, deserialize_with = "csv::invalid_option")]
    valence: Option<f64>,
}

/// Parsed metadata rows next to the records they came from.
struct MetadataTable {
    headers: StringRecord,
    rows: Vec<(MetadataRow, StringRecord)>,
}

impl MetadataTable {
    /// Whether the file carries its own `Popularity` column.
    fn has_popularity(&self) -> bool {
        self.headers.iter().any(|header| header == POPULARITY)
    }
}

/// The joined table with every source column, cells kept as read.
#[derive(Debug, Clone, Default, PartialEq)]
struct JoinedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Column layout of the CSV export. Mirrors the metadata file's names.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Track Name")]
    track_name: &'a str,
    #[serde(rename = "Artist Name(s)")]
    artists: Option<&'a str>,
    #[serde(rename = "Track URI")]
    uri: Option<&'a str>,
    #[serde(rename = "Album Image URL")]
    album_art_url: Option<&'a str>,
    #[serde(rename = "Popularity")]
    popularity: Option<f64>,
    #[serde(rename = "Danceability")]
    danceability: Option<f64>,
    #[serde(rename = "Energy")]
    energy: Option<f64>,
    #[serde(rename = "Valence")]
    valence: Option<f64>,
}

impl<'a> From<&'a Track> for ExportRow<'a> {
    fn from(track: &'a Track) -> Self {
        Self {
            track_name: &track.name,
            artists: track.artists.as_deref(),
            uri: track.uri.as_deref(),
            album_art_url: track.album_art_url.as_deref(),
            popularity: track.popularity,
            danceability: track.danceability,
            energy: track.energy,
            valence: track.valence,
        }
    }
}

/// Square matrix of similarity scores, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dim: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Number of rows (and columns).
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Scores of `position` against every catalog position.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    #[must_use]
    pub fn row(&self, position: usize) -> &[f64] {
        let start = position * self.dim;
        &self.scores[start..start + self.dim]
    }
}

/// Tracks and their similarity matrix, bundled so they cannot drift apart.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
    similarity: SimilarityMatrix,
    /// Present when loaded from files; row `i` belongs to track `i`.
    table: Option<JoinedTable>,
}

impl Catalog {
    /// Pair `tracks` with a matrix given as rows.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::ShapeMismatch`] unless the matrix is square
    /// with exactly one row per track.
    pub fn new(tracks: Vec<Track>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let tracks_len = tracks.len();
        if rows.len() != tracks_len {
            return Err(RecommendError::ShapeMismatch {
                rows: rows.len(),
                columns: rows.first().map_or(0, Vec::len),
                tracks: tracks_len,
            });
        }
        if let Some(bad) = rows.iter().find(|row| row.len() != tracks_len) {
            return Err(RecommendError::ShapeMismatch {
                rows: rows.len(),
                columns: bad.len(),
                tracks: tracks_len,
            });
        }

        let similarity = SimilarityMatrix {
            dim: tracks_len,
            scores: rows.into_iter().flatten().collect(),
        };
        Ok(Self {
            tracks,
            similarity,
            table: None,
        })
    }

    /// Load, join and validate the three catalog artifacts.
    ///
    /// The feature table is left-joined against the metadata on track name.
    /// Each feature row produces exactly one track; when the metadata holds
    /// several rows with the same name the first one wins, which keeps the
    /// track count equal to the matrix dimension. Popularity comes from the
    /// metadata whenever the metadata file has a `Popularity` column.
    ///
    /// # Errors
    ///
    /// - [`RecommendError::MissingArtifact`] if any file is absent
    /// - [`RecommendError::MalformedArtifact`] if a file cannot be parsed
    /// - [`RecommendError::ShapeMismatch`] if the matrix does not fit
    pub fn load(paths: &CatalogPaths) -> Result<Self> {
        let missing = paths.missing();
        if !missing.is_empty() {
            return Err(RecommendError::MissingArtifact { paths: missing });
        }

        let features = read_feature_table(&paths.songs)?;
        let rows = read_similarity_rows(&paths.similarity)?;
        let metadata = read_metadata(&paths.metadata)?;
        info!(
            "Read {} feature rows, {} similarity rows, {} metadata rows",
            features.len(),
            rows.len(),
            metadata.rows.len()
        );

        let (tracks, table) = left_join(features, &metadata);
        let mut catalog = Self::new(tracks, rows)?;
        catalog.table = Some(table);
        Ok(catalog)
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[must_use]
    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Positions of every row named `name`, in catalog order.
    pub fn positions_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.tracks
            .iter()
            .enumerate()
            .filter(move |(_, track)| track.name == name)
            .map(|(position, _)| position)
    }

    /// First row whose name equals `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|track| track.name == name)
    }

    /// Unique track names in first-seen order.
    #[must_use]
    pub fn track_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.tracks
            .iter()
            .map(|track| track.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Write the whole catalog as CSV, one row per track, catalog order.
    ///
    /// A loaded catalog exports every column of both source files, with
    /// cells exactly as read: `Track Name` first, then columns only the
    /// feature table has, then the metadata columns in file order. A
    /// catalog built with [`Catalog::new`] exports the [`Track`] fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        match &self.table {
            Some(table) => {
                csv_writer.write_record(&table.headers).map_err(csv_error)?;
                for row in &table.rows {
                    csv_writer.write_record(row).map_err(csv_error)?;
                }
            }
            None => {
                for track in &self.tracks {
                    csv_writer.serialize(ExportRow::from(track)).map_err(csv_error)?;
                }
            }
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn csv_error(err: csv::Error) -> RecommendError {
    RecommendError::Io(err.into())
}

fn malformed(path: &Path, reason: impl ToString) -> RecommendError {
    RecommendError::MalformedArtifact {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn read_feature_table(path: &Path) -> Result<Vec<FeatureRow>> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| malformed(path, e))
}

fn read_similarity_rows(path: &Path) -> Result<Vec<Vec<f64>>> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| malformed(path, e))
}

fn read_metadata(path: &Path) -> Result<MetadataTable> {
    // Only headers are trimmed: names must match the feature table exactly.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| malformed(path, e))?;

    let headers = reader.headers().map_err(|e| malformed(path, e))?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(path, e))?;
        let row: MetadataRow = record
            .deserialize(Some(&headers))
            .map_err(|e| malformed(path, e))?;
        rows.push((row, record));
    }

    Ok(MetadataTable { headers, rows })
}

/// Left join on track name, first metadata match per name.
fn left_join(features: Vec<FeatureRow>, metadata: &MetadataTable) -> (Vec<Track>, JoinedTable) {
    let mut by_name: HashMap<&str, &(MetadataRow, StringRecord)> = HashMap::new();
    for entry in &metadata.rows {
        by_name.entry(entry.0.track_name.as_str()).or_insert(entry);
    }

    let has_popularity = metadata.has_popularity();
    let columns = joined_columns(&features, metadata);
    let mut tracks = Vec::with_capacity(features.len());
    let mut rows = Vec::with_capacity(features.len());

    for feature in features {
        let matched = by_name.get(feature.track_name.as_str()).copied();
        if matched.is_none() {
            debug!("No metadata for '{}'", feature.track_name);
        }

        rows.push(
            columns
                .iter()
                .map(|column| column.cell(&feature, matched.map(|(_, record)| record)))
                .collect(),
        );

        let meta = matched.map(|(row, _)| row);
        let popularity = if has_popularity {
            meta.and_then(|m| m.popularity)
        } else {
            feature.popularity
        };

        tracks.push(Track {
            artists: meta.and_then(|m| m.artists.clone()),
            uri: meta.and_then(|m| m.uri.clone()),
            album_art_url: meta.and_then(|m| m.album_art_url.clone()),
            popularity,
            danceability: meta.and_then(|m| m.danceability),
            energy: meta.and_then(|m| m.energy),
            valence: meta.and_then(|m| m.valence),
            name: feature.track_name,
        });
    }

    let table = JoinedTable {
        headers: columns.iter().map(|column| column.header().to_string()).collect(),
        rows,
    };
    (tracks, table)
}

/// Where a column of the joined table takes its cells from.
enum Column {
    Name,
    FeaturePopularity,
    Feature(String),
    /// Header and its index in the metadata records.
    Metadata(String, usize),
}

impl Column {
    fn header(&self) -> &str {
        match self {
            Column::Name => TRACK_NAME,
            Column::FeaturePopularity => POPULARITY,
            Column::Feature(header) | Column::Metadata(header, _) => header.as_str(),
        }
    }

    fn cell(&self, feature: &FeatureRow, record: Option<&StringRecord>) -> String {
        match self {
            Column::Name => feature.track_name.clone(),
            Column::FeaturePopularity => feature.popularity.map(|p| p.to_string()).unwrap_or_default(),
            Column::Feature(key) => feature.extra.get(key).map(json_cell).unwrap_or_default(),
            Column::Metadata(_, index) => record
                .and_then(|record| record.get(*index))
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Union of both files' columns. A column present in both is taken from
/// the metadata, like `Popularity`.
fn joined_columns(features: &[FeatureRow], metadata: &MetadataTable) -> Vec<Column> {
    let mut seen: HashSet<&str> = HashSet::from([TRACK_NAME]);
    let metadata_headers: HashSet<&str> = metadata.headers.iter().collect();
    let mut columns = vec![Column::Name];

    if !metadata_headers.contains(POPULARITY) && features.iter().any(|f| f.popularity.is_some()) {
        seen.insert(POPULARITY);
        columns.push(Column::FeaturePopularity);
    }
    for key in features.iter().flat_map(|f| f.extra.keys()) {
        if !metadata_headers.contains(key.as_str()) && seen.insert(key) {
            columns.push(Column::Feature(key.clone()));
        }
    }
    for (index, header) in metadata.headers.iter().enumerate() {
        if seen.insert(header) {
            columns.push(Column::Metadata(header.to_string(), index));
        }
    }

    columns
}

fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
