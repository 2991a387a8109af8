//! Catalog sources.
//!
//! Two tabular formats are understood, chosen by file extension:
//!
//! - `.csv`: a header row followed by one track per record.
//! - `.json`: an array of row objects keyed by column name.
//!
//! Required columns are the track name, artist, genre and one column per
//! [`Feature`]. Column names follow the source dataset (`track_name`,
//! `artists`, `track_genre`) with the shorter `name`, `artist` and `genre`
//! accepted as aliases. Extra columns are ignored.

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::{AudioFeatures, Feature, Track};

use super::store::LoadOptions;

const NAME_COLUMNS: &[&str] = &["track_name", "name"];
const ARTIST_COLUMNS: &[&str] = &["artists", "artist"];
const GENRE_COLUMNS: &[&str] = &["track_genre", "genre"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(data_load(
                path,
                "unsupported catalog format (expected a .csv or .json file)",
            )),
        }
    }
}

/// Read every track row from `path`.
///
/// Row-level validation happens here; catalog-level invariants (unique
/// names) are checked by [`super::Catalog::from_tracks_with`].
pub(crate) fn read_tracks(path: &Path, options: &LoadOptions) -> Result<Vec<Track>> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Csv => read_csv(path, options),
        SourceFormat::Json => read_json(path, options),
    }
}

fn data_load(path: &Path, message: impl Into<String>) -> Error {
    Error::DataLoad {
        source_name: path.display().to_string(),
        message: message.into(),
    }
}

// CSV

/// Field positions of the required columns within a CSV header.
#[derive(Debug)]
struct CsvLayout {
    name: usize,
    artist: usize,
    genre: usize,
    energy: usize,
    danceability: usize,
    valence: usize,
}

impl CsvLayout {
    /// Locate the required columns, or list the ones that are missing.
    fn from_headers(headers: &csv::StringRecord) -> std::result::Result<Self, Vec<&'static str>> {
        let locate = |aliases: &[&str]| {
            headers
                .iter()
                .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
        };

        let missing = missing_columns(|aliases| locate(aliases).is_some());
        if !missing.is_empty() {
            return Err(missing);
        }

        let position = |aliases: &[&str]| locate(aliases).unwrap_or(0);
        Ok(Self {
            name: position(NAME_COLUMNS),
            artist: position(ARTIST_COLUMNS),
            genre: position(GENRE_COLUMNS),
            energy: position(&[Feature::Energy.column()]),
            danceability: position(&[Feature::Danceability.column()]),
            valence: position(&[Feature::Valence.column()]),
        })
    }

    const fn position(&self, feature: Feature) -> usize {
        match feature {
            Feature::Energy => self.energy,
            Feature::Danceability => self.danceability,
            Feature::Valence => self.valence,
        }
    }

    fn track(&self, row: usize, record: &csv::StringRecord) -> Result<Track> {
        let field = |position: usize| record.get(position).unwrap_or("").trim();

        let name = field(self.name);
        if name.is_empty() {
            return Err(missing_value(row, NAME_COLUMNS[0]));
        }
        let features =
            audio_features(|feature| parse_feature(row, feature, Some(field(self.position(feature)))))?;

        Ok(Track::new(name, features)
            .with_artist(field(self.artist))
            .with_genre(field(self.genre)))
    }
}

fn read_csv(path: &Path, options: &LoadOptions) -> Result<Vec<Track>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| data_load(path, e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| data_load(path, e.to_string()))?
        .clone();
    let layout = CsvLayout::from_headers(&headers).map_err(|missing| {
        data_load(
            path,
            format!("missing required column(s): {}", missing.join(", ")),
        )
    })?;

    let mut tracks = Vec::new();
    let mut records = reader.records().enumerate();
    while let Some((index, record)) = records.next() {
        let row = index + 1;
        if row > options.max_tracks {
            // Count the rest so the error reports the real catalog size.
            return Err(Error::CapacityExceeded {
                size: row + records.count(),
                limit: options.max_tracks,
            });
        }
        let record = record.map_err(|e| data_load(path, format!("row {row}: {e}")))?;
        tracks.push(layout.track(row, &record)?);
    }

    Ok(tracks)
}

// JSON

fn read_json(path: &Path, options: &LoadOptions) -> Result<Vec<Track>> {
    let content = std::fs::read_to_string(path).map_err(|e| data_load(path, e.to_string()))?;
    let rows: Vec<Map<String, Value>> = serde_json::from_str(&content)
        .map_err(|e| data_load(path, format!("expected a JSON array of row objects: {e}")))?;

    if rows.len() > options.max_tracks {
        return Err(Error::CapacityExceeded {
            size: rows.len(),
            limit: options.max_tracks,
        });
    }

    if !rows.is_empty() {
        let keys: HashSet<&str> = rows
            .iter()
            .flat_map(|object| object.keys().map(String::as_str))
            .collect();
        let missing = missing_columns(|aliases| aliases.iter().any(|a| keys.contains(*a)));
        if !missing.is_empty() {
            return Err(data_load(
                path,
                format!("missing required column(s): {}", missing.join(", ")),
            ));
        }
    }

    rows.iter()
        .enumerate()
        .map(|(index, object)| json_track(index + 1, object))
        .collect()
}

fn json_field<'a>(object: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| object.get(*alias))
        .filter(|value| !value.is_null())
}

fn json_text(object: &Map<String, Value>, aliases: &[&str]) -> String {
    match json_field(object, aliases) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn json_track(row: usize, object: &Map<String, Value>) -> Result<Track> {
    let name = json_text(object, NAME_COLUMNS);
    if name.is_empty() {
        return Err(missing_value(row, NAME_COLUMNS[0]));
    }

    let features = audio_features(|feature| match json_field(object, &[feature.column()]) {
        Some(Value::Number(n)) => {
            let value = n.as_f64().ok_or_else(|| non_numeric(row, feature, &n.to_string()))?;
            finite(row, feature, value)
        }
        Some(Value::String(s)) => parse_feature(row, feature, Some(s.as_str())),
        Some(other) => Err(non_numeric(row, feature, &other.to_string())),
        None => parse_feature(row, feature, None),
    })?;

    Ok(Track::new(name, features)
        .with_artist(json_text(object, ARTIST_COLUMNS))
        .with_genre(json_text(object, GENRE_COLUMNS)))
}

// Shared validation

/// Primary names of the required columns for which `has_column` finds none
/// of the accepted aliases.
fn missing_columns(has_column: impl Fn(&[&'static str]) -> bool) -> Vec<&'static str> {
    let feature_columns = Feature::ALL.map(|feature| [feature.column()]);
    let mut groups: Vec<&[&'static str]> = vec![NAME_COLUMNS, ARTIST_COLUMNS, GENRE_COLUMNS];
    groups.extend(feature_columns.iter().map(|column| column.as_slice()));

    groups
        .into_iter()
        .filter(|aliases| !has_column(aliases))
        .map(|aliases| aliases[0])
        .collect()
}

fn audio_features(mut value_of: impl FnMut(Feature) -> Result<f64>) -> Result<AudioFeatures> {
    Ok(AudioFeatures::new(
        value_of(Feature::Energy)?,
        value_of(Feature::Danceability)?,
        value_of(Feature::Valence)?,
    ))
}

fn parse_feature(row: usize, feature: Feature, raw: Option<&str>) -> Result<f64> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Err(missing_value(row, feature.column()));
    }
    let value: f64 = raw.parse().map_err(|_| non_numeric(row, feature, raw))?;
    finite(row, feature, value)
}

fn finite(row: usize, feature: Feature, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::Schema {
            row,
            message: format!("non-finite value {value} in column {feature}"),
        })
    }
}

fn missing_value(row: usize, column: &str) -> Error {
    Error::Schema {
        row,
        message: format!("missing value in column {column}"),
    }
}

fn non_numeric(row: usize, feature: Feature, raw: &str) -> Error {
    Error::Schema {
        row,
        message: format!("non-numeric value {raw:?} in column {feature}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, file_name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(file_name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const CSV: &str = "\
track_name,artists,track_genre,popularity,energy,danceability,valence
Song A,Alpha,pop,50,0.8,0.6,0.5
Song B,Beta,rock,12,0.82,0.58,0.52
";

    #[test]
    fn test_read_csv() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tracks.csv", CSV);

        let tracks = read_tracks(&path, &LoadOptions::default()).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].name, "Song A");
        assert_eq!(tracks[0].artist, "Alpha");
        assert_eq!(tracks[1].genre, "rock");
        assert!((tracks[1].features.energy - 0.82).abs() < 1e-12);
    }

    #[test]
    fn test_read_csv_with_aliases() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "tracks.csv",
            "Name,Artist,Genre,Valence,Energy,Danceability\nSong A,Alpha,pop,0.5,0.8,0.6\n",
        );

        let tracks = read_tracks(&path, &LoadOptions::default()).unwrap();
        assert_eq!(tracks[0].features, AudioFeatures::new(0.8, 0.6, 0.5));
    }

    #[test]
    fn test_csv_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "tracks.csv",
            "track_name,artists,track_genre,energy\nSong A,Alpha,pop,0.8\n",
        );

        let err = read_tracks(&path, &LoadOptions::default()).unwrap_err();
        match err {
            Error::DataLoad { message, .. } => {
                assert!(message.contains("danceability"));
                assert!(message.contains("valence"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_csv_non_numeric_value() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "tracks.csv",
            "track_name,artists,track_genre,energy,danceability,valence\n\
             Song A,Alpha,pop,0.8,0.6,0.5\n\
             Song B,Beta,rock,loud,0.6,0.5\n",
        );

        let err = read_tracks(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Schema { row: 2, .. }));
    }

    #[test]
    fn test_csv_missing_and_non_finite_values() {
        let dir = TempDir::new().unwrap();
        let blank = write(
            &dir,
            "blank.csv",
            "track_name,artists,track_genre,energy,danceability,valence\nSong A,Alpha,pop,0.8,,0.5\n",
        );
        let nan = write(
            &dir,
            "nan.csv",
            "track_name,artists,track_genre,energy,danceability,valence\nSong A,Alpha,pop,0.8,NaN,0.5\n",
        );

        for path in [blank, nan] {
            let err = read_tracks(&path, &LoadOptions::default()).unwrap_err();
            assert!(matches!(err, Error::Schema { row: 1, .. }), "{err}");
        }
    }

    #[test]
    fn test_csv_capacity_exceeded() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tracks.csv", CSV);

        let options = LoadOptions::default().with_max_tracks(1);
        let err = read_tracks(&path, &options).unwrap_err();
        assert!(matches!(
            err,
            Error::CapacityExceeded { size: 2, limit: 1 }
        ));
    }

    #[test]
    fn test_read_json() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "tracks.json",
            r#"[
                {"track_name": "Song A", "artists": "Alpha", "track_genre": "pop",
                 "energy": 0.8, "danceability": 0.6, "valence": 0.5},
                {"name": "Song B", "artist": "Beta", "genre": "rock",
                 "energy": "0.82", "danceability": 0.58, "valence": 0.52}
            ]"#,
        );

        let tracks = read_tracks(&path, &LoadOptions::default()).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].artist, "Beta");
        assert!((tracks[1].features.energy - 0.82).abs() < 1e-12);
    }

    #[test]
    fn test_json_null_feature() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "tracks.json",
            r#"[{"track_name": "Song A", "artists": "Alpha", "track_genre": "pop",
                 "energy": 0.8, "danceability": null, "valence": 0.5}]"#,
        );

        let err = read_tracks(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Schema { row: 1, .. }));
    }

    #[test]
    fn test_json_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "tracks.json",
            r#"[
                {"track_name": "Song A", "danceability": 0.6, "valence": 0.5},
                {"track_name": "Song B", "danceability": 0.58, "valence": 0.52}
            ]"#,
        );

        let err = read_tracks(&path, &LoadOptions::default()).unwrap_err();
        match err {
            Error::DataLoad { message, .. } => {
                assert_eq!(
                    message,
                    "missing required column(s): artists, track_genre, energy"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_json_column_present_in_any_row() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "tracks.json",
            r#"[
                {"track_name": "Song A", "artist": "Alpha", "genre": "pop",
                 "energy": 0.8, "danceability": 0.6, "valence": 0.5},
                {"track_name": "Song B", "energy": 0.82, "danceability": 0.58, "valence": 0.52}
            ]"#,
        );

        let tracks = read_tracks(&path, &LoadOptions::default()).unwrap();
        assert_eq!(tracks[1].artist, "");

        let blank_feature = write(
            &dir,
            "blank.json",
            r#"[{"track_name": "Song A", "artists": "Alpha", "track_genre": "pop",
                 "energy": 0.8, "danceability": 0.6, "valence": 0.5},
                {"track_name": "Song B", "artists": "Beta", "track_genre": "rock",
                 "danceability": 0.58, "valence": 0.52}]"#,
        );
        let err = read_tracks(&blank_feature, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Schema { row: 2, .. }), "{err}");
    }

    #[test]
    fn test_json_not_an_array() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tracks.json", r#"{"track_name": "Song A"}"#);

        let err = read_tracks(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }

    #[test]
    fn test_unreadable_source() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.csv");

        let err = read_tracks(&missing, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tracks.parquet", "");

        let err = read_tracks(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }
}
