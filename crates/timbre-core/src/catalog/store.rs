use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Track;

use super::load;

/// Default upper bound on catalog size.
///
/// Similarity indexing is quadratic in the number of tracks, so larger
/// catalogs are rejected with [`Error::CapacityExceeded`].
pub const DEFAULT_MAX_TRACKS: usize = 10_000;

/// Options applied while building a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub max_tracks: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_tracks: DEFAULT_MAX_TRACKS,
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub const fn with_max_tracks(mut self, max_tracks: usize) -> Self {
        self.max_tracks = max_tracks;
        self
    }
}

/// An immutable, ordered collection of tracks.
///
/// Tracks are addressable by position and by name. Names are unique and
/// every track carries finite audio features; both are checked when the
/// catalog is built.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from in-memory tracks using default options.
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self> {
        Self::from_tracks_with(tracks, &LoadOptions::default())
    }

    /// Build a catalog from in-memory tracks.
    ///
    /// # Errors
    ///
    /// - [`Error::DataLoad`] if `tracks` is empty.
    /// - [`Error::CapacityExceeded`] if there are more than `max_tracks`.
    /// - [`Error::Schema`] for a non-finite feature or a duplicate name.
    pub fn from_tracks_with(tracks: Vec<Track>, options: &LoadOptions) -> Result<Self> {
        if tracks.is_empty() {
            return Err(Error::DataLoad {
                source_name: String::from("tracks"),
                message: String::from("catalog contains no tracks"),
            });
        }
        if tracks.len() > options.max_tracks {
            return Err(Error::CapacityExceeded {
                size: tracks.len(),
                limit: options.max_tracks,
            });
        }

        let mut by_name = HashMap::with_capacity(tracks.len());
        for (index, track) in tracks.iter().enumerate() {
            let row = index + 1;
            if !track.features.is_finite() {
                return Err(Error::Schema {
                    row,
                    message: format!("track {:?} has a non-finite feature value", track.name),
                });
            }
            if let Some(first) = by_name.insert(track.name.clone(), index) {
                return Err(Error::Schema {
                    row,
                    message: format!(
                        "duplicate track name {:?} (first seen at row {})",
                        track.name,
                        first + 1
                    ),
                });
            }
        }

        Ok(Self { tracks, by_name })
    }

    /// Load a catalog from a CSV or JSON file using default options.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &LoadOptions::default())
    }

    /// Load a catalog from a CSV or JSON file.
    ///
    /// The format is chosen by file extension (`.csv` or `.json`).
    pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let tracks = load::read_tracks(path, options)?;
        let catalog = Self::from_tracks_with(tracks, options)?;
        log::info!(
            "Loaded {} tracks from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// All tracks, in catalog order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Position of the track with the given name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Look up a track by its exact name.
    pub fn lookup_by_name(&self, name: &str) -> Result<&Track> {
        self.index_of(name)
            .map(|index| &self.tracks[index])
            .ok_or_else(|| Error::NotFound {
                entity: "track",
                name: name.to_string(),
            })
    }

    /// Track names, in catalog order.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.name.as_str())
    }

    /// Tracks whose genre equals `genre`, in catalog order.
    pub fn by_genre<'a>(&'a self, genre: &'a str) -> impl Iterator<Item = &'a Track> {
        self.tracks.iter().filter(move |t| t.genre == genre)
    }

    /// Tracks whose artist equals `artist`, in catalog order.
    pub fn by_artist<'a>(&'a self, artist: &'a str) -> impl Iterator<Item = &'a Track> {
        self.tracks.iter().filter(move |t| t.artist == artist)
    }

    /// Distinct genres, sorted.
    #[must_use]
    pub fn genres(&self) -> Vec<&str> {
        distinct(self.tracks.iter().map(|t| t.genre.as_str()))
    }

    /// Distinct artists, sorted.
    #[must_use]
    pub fn artists(&self) -> Vec<&str> {
        distinct(self.tracks.iter().map(|t| t.artist.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AudioFeatures;

    fn track(name: &str, artist: &str, genre: &str) -> Track {
        Track::new(name, AudioFeatures::new(0.5, 0.5, 0.5))
            .with_artist(artist)
            .with_genre(genre)
    }

    fn sample() -> Catalog {
        Catalog::from_tracks(vec![
            track("Song A", "Alpha", "pop"),
            track("Song B", "Beta", "rock"),
            track("Song C", "Alpha", "rock"),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = sample();
        assert_eq!(catalog.lookup_by_name("Song B").unwrap().artist, "Beta");
        assert_eq!(catalog.index_of("Song C"), Some(2));
    }

    #[test]
    fn test_lookup_missing_name() {
        let catalog = sample();
        let err = catalog.lookup_by_name("Song Z").unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "track", .. }));
    }

    #[test]
    fn test_all_names_in_catalog_order() {
        let catalog = sample();
        let names: Vec<&str> = catalog.all_names().collect();
        assert_eq!(names, vec!["Song A", "Song B", "Song C"]);
    }

    #[test]
    fn test_browse_by_genre_and_artist() {
        let catalog = sample();
        let rock: Vec<&str> = catalog.by_genre("rock").map(|t| t.name.as_str()).collect();
        assert_eq!(rock, vec!["Song B", "Song C"]);

        let alpha: Vec<&str> = catalog.by_artist("Alpha").map(|t| t.name.as_str()).collect();
        assert_eq!(alpha, vec!["Song A", "Song C"]);

        assert_eq!(catalog.by_genre("jazz").count(), 0);
    }

    #[test]
    fn test_distinct_genres_and_artists() {
        let catalog = sample();
        assert_eq!(catalog.genres(), vec!["pop", "rock"]);
        assert_eq!(catalog.artists(), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Catalog::from_tracks(vec![
            track("Song A", "Alpha", "pop"),
            track("Song A", "Beta", "rock"),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Schema { row: 2, .. }));
    }

    #[test]
    fn test_non_finite_feature_rejected() {
        let bad = Track::new("Broken", AudioFeatures::new(0.5, f64::NAN, 0.5));
        let err = Catalog::from_tracks(vec![track("Song A", "Alpha", "pop"), bad]).unwrap_err();
        assert!(matches!(err, Error::Schema { row: 2, .. }));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = Catalog::from_tracks(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }

    #[test]
    fn test_capacity_exceeded() {
        let tracks = vec![
            track("Song A", "Alpha", "pop"),
            track("Song B", "Beta", "rock"),
            track("Song C", "Alpha", "rock"),
        ];
        let options = LoadOptions::default().with_max_tracks(2);
        let err = Catalog::from_tracks_with(tracks, &options).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { size: 3, limit: 2 }));
        assert!(!err.is_fatal());
    }
}
