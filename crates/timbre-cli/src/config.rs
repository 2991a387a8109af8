use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use timbre_core::{Feature, LoadOptions, DEFAULT_MAX_TRACKS};
use timbre_search::{RecommenderOptions, DEFAULT_CONFIDENCE_THRESHOLD};

/// Number of recommendations returned when `--top-n` is not given.
pub const DEFAULT_TOP_N: usize = 10;

/// Configuration for timbre.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (TIMBRE_* prefix)
/// 3. Config file (~/.config/timbre/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the track catalog, CSV or JSON.
    ///
    /// Can be set via:
    /// - CLI: --catalog /path/to/tracks.csv
    /// - ENV: TIMBRE_CATALOG_PATH
    /// - Config: catalog_path = "/path/to/tracks.csv"
    /// - Default: ~/.local/share/timbre/tracks.csv
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Features compared when measuring similarity, in dimension order.
    #[serde(default = "default_features")]
    pub features: Vec<Feature>,

    /// Minimum fuzzy-match score (0-100) for a query to count as found.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u8,

    /// Catalogs with more tracks than this are refused.
    #[serde(default = "default_max_tracks")]
    pub max_tracks: usize,

    /// Recommendations returned when `--top-n` is absent.
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Logger settings.
    #[serde(default)]
    pub logging: twyg::Opts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            features: default_features(),
            confidence_threshold: default_confidence_threshold(),
            max_tracks: default_max_tracks(),
            default_top_n: default_top_n(),
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/timbre/config.toml
    /// Reads environment variables with TIMBRE_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if a loaded value is out of range.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `config_path` (if it exists) and the
    /// environment.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("timbre");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;
        config.validate()?;

        Ok(config)
    }

    /// Override the catalog path, as the --catalog flag does.
    #[must_use]
    pub fn with_catalog_path(mut self, catalog_path: PathBuf) -> Self {
        self.catalog_path = catalog_path;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            anyhow::bail!("features must name at least one of: energy, danceability, valence");
        }
        if let Some(feature) = repeated_feature(&self.features) {
            anyhow::bail!("features lists {feature} more than once");
        }
        if self.confidence_threshold > 100 {
            anyhow::bail!(
                "confidence_threshold must be between 0 and 100 (got {})",
                self.confidence_threshold
            );
        }
        if self.max_tracks == 0 {
            anyhow::bail!("max_tracks must be greater than zero");
        }
        if self.default_top_n == 0 {
            anyhow::bail!("default_top_n must be greater than zero");
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default().with_max_tracks(self.max_tracks)
    }

    pub fn recommender_options(&self) -> RecommenderOptions {
        RecommenderOptions {
            features: self.features.clone(),
            confidence_threshold: self.confidence_threshold,
        }
    }
}

/// Get the default catalog path.
///
/// Returns: ~/.local/share/timbre/tracks.csv (or platform equivalent)
fn default_catalog_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timbre")
        .join("tracks.csv")
}

fn default_features() -> Vec<Feature> {
    Feature::ALL.to_vec()
}

const fn default_confidence_threshold() -> u8 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

const fn default_max_tracks() -> usize {
    DEFAULT_MAX_TRACKS
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// The first feature that appears more than once in `features`.
pub fn repeated_feature(features: &[Feature]) -> Option<Feature> {
    features
        .iter()
        .enumerate()
        .find(|(i, feature)| features[..*i].contains(feature))
        .map(|(_, feature)| *feature)
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/timbre/config.toml
/// - macOS: ~/Library/Application Support/timbre/config.toml
/// - Windows: %APPDATA%\timbre\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timbre")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Timbre Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (TIMBRE_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the track catalog
#
# A CSV file with a header row, or a JSON array of objects. Required columns:
# track_name, artists, track_genre, energy, danceability, valence
#
# Can also be set via:
# - CLI: timbre --catalog /path/to/tracks.csv recommend "Song"
# - Environment: TIMBRE_CATALOG_PATH=/path/to/tracks.csv
#
# Default: Platform-specific data directory
#catalog_path = "/path/to/tracks.csv"

# Audio features compared when measuring similarity
features = ["energy", "danceability", "valence"]

# Minimum fuzzy-match score (0-100) for a query to count as found
confidence_threshold = 70

# Catalogs with more tracks than this are refused
max_tracks = 10000

# Recommendations returned when --top-n is not given
default_top_n = 10

# Logger settings
#
# Default: twyg's defaults
#[logging]
#level = "debug"
#coloured = true
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    ensure_config_file_at(&config_file_path())
}

pub fn ensure_config_file_at(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
