use serde::{Deserialize, Serialize};

/// The numeric audio attributes of a track.
///
/// Values are typically in `0.0..=1.0` but any finite value is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
}

impl AudioFeatures {
    #[must_use]
    pub const fn new(energy: f64, danceability: f64, valence: f64) -> Self {
        Self {
            energy,
            danceability,
            valence,
        }
    }

    /// Returns `true` when every attribute is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.energy.is_finite() && self.danceability.is_finite() && self.valence.is_finite()
    }
}

/// A catalog entry.
///
/// The name identifies the track; artist and genre are carried through
/// for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub artist: String,
    pub genre: String,
    pub features: AudioFeatures,
}

impl Track {
    #[must_use]
    pub fn new(name: impl Into<String>, features: AudioFeatures) -> Self {
        Self {
            name: name.into(),
            artist: String::new(),
            genre: String::new(),
            features,
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_builder() {
        let track = Track::new("Song A", AudioFeatures::new(0.8, 0.6, 0.5))
            .with_artist("Artist")
            .with_genre("pop");

        assert_eq!(track.name, "Song A");
        assert_eq!(track.artist, "Artist");
        assert_eq!(track.genre, "pop");
    }

    #[test]
    fn test_audio_features_finite() {
        assert!(AudioFeatures::new(0.1, 2.5, -1.0).is_finite());
        assert!(!AudioFeatures::new(f64::NAN, 0.5, 0.5).is_finite());
        assert!(!AudioFeatures::new(0.5, f64::INFINITY, 0.5).is_finite());
    }
}
