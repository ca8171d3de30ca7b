pub mod track;

pub use track::{Bug, Difficulty, LineNo, Track};

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

static TRACKS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/tracks");

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown track `{0}`")]
    UnknownTrack(String),
    #[error("catalog file `{0}` not found")]
    MissingFile(String),
    #[error("catalog file `{path}` is malformed: {reason}")]
    Malformed { path: String, reason: String },
    #[error("track `{track}` lists line {line} as a bug more than once")]
    DuplicateBugLine { track: String, line: LineNo },
    #[error("track `{track}` marks line {line} as a bug but its sample has {line_count} lines")]
    BugLineOutOfRange {
        track: String,
        line: LineNo,
        line_count: usize,
    },
}

#[derive(Deserialize)]
struct Index {
    tracks: Vec<String>,
}

#[derive(Deserialize)]
struct TrackManifest {
    id: String,
    language: String,
    title: String,
    difficulty: Difficulty,
    sample: String,
    bugs: Vec<Bug>,
}

/// Read-only lookup table of tracks keyed by id
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    order: Vec<String>,
    tracks: HashMap<String, Arc<Track>>,
    rejected: HashMap<String, CatalogError>,
}

impl Catalog {
    /// Load the tracks compiled into the binary
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_dir(&TRACKS_DIR)
    }

    /// Load a catalog from an `index.json` + per-track directory layout.
    ///
    /// Fails only when the index itself cannot be read; individual broken
    /// tracks are recorded and reported by [`Catalog::lookup`].
    pub fn from_dir(dir: &Dir<'_>) -> Result<Self, CatalogError> {
        let index: Index = parse_json(dir, INDEX_FILE)?;
        let mut catalog = Catalog::default();

        for id in index.tracks {
            if catalog.knows(&id) {
                warn!(track = %id, "duplicate id in catalog index, skipping");
                continue;
            }

            match load_track(dir, &id) {
                Ok(track) => {
                    debug!(track = %id, bugs = track.bugs().len(), "track loaded");
                    catalog.order.push(id.clone());
                    catalog.tracks.insert(id, Arc::new(track));
                }
                Err(err) => {
                    warn!(track = %id, error = %err, "track rejected");
                    catalog.rejected.insert(id, err);
                }
            }
        }

        Ok(catalog)
    }

    /// Build a catalog from already validated tracks, keeping their order
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let mut catalog = Catalog::default();
        for track in tracks {
            let id = track.id().to_string();
            if catalog.knows(&id) {
                continue;
            }
            catalog.order.push(id.clone());
            catalog.tracks.insert(id, Arc::new(track));
        }
        catalog
    }

    fn knows(&self, id: &str) -> bool {
        self.tracks.contains_key(id) || self.rejected.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Track>> {
        self.tracks.get(id).cloned()
    }

    /// Like [`Catalog::get`] but explains why a track is unavailable
    pub fn lookup(&self, id: &str) -> Result<Arc<Track>, CatalogError> {
        if let Some(track) = self.get(id) {
            return Ok(track);
        }
        Err(self
            .rejected
            .get(id)
            .cloned()
            .unwrap_or_else(|| CatalogError::UnknownTrack(id.to_string())))
    }

    /// Playable tracks in display order
    pub fn tracks(&self) -> impl Iterator<Item = &Arc<Track>> {
        self.order.iter().filter_map(|id| self.tracks.get(id))
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn rejected(&self) -> impl Iterator<Item = (&str, &CatalogError)> {
        self.rejected.iter().map(|(id, err)| (id.as_str(), err))
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Arc<Track>> {
        self.order.choose(rng).and_then(|id| self.get(id))
    }
}

fn load_track(dir: &Dir<'_>, id: &str) -> Result<Track, CatalogError> {
    let manifest_path = format!("{id}/track.json");
    let manifest: TrackManifest = parse_json(dir, &manifest_path)?;

    if manifest.id != id {
        return Err(CatalogError::Malformed {
            path: manifest_path,
            reason: format!("declares id `{}`", manifest.id),
        });
    }

    let sample_path = format!("{id}/{}", manifest.sample);
    let code = read_utf8(dir, &sample_path)?;

    Track::new(
        manifest.id,
        manifest.language,
        manifest.title,
        code,
        manifest.bugs,
        manifest.difficulty,
    )
}

fn read_utf8<'a>(dir: &'a Dir<'_>, path: &str) -> Result<&'a str, CatalogError> {
    let file = dir
        .get_file(path)
        .ok_or_else(|| CatalogError::MissingFile(path.to_string()))?;

    file.contents_utf8().ok_or_else(|| CatalogError::Malformed {
        path: path.to_string(),
        reason: "not valid UTF-8".to_string(),
    })
}

fn parse_json<T: for<'de> Deserialize<'de>>(dir: &Dir<'_>, path: &str) -> Result<T, CatalogError> {
    let text = read_utf8(dir, path)?;
    serde_json::from_str(text).map_err(|e| CatalogError::Malformed {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
