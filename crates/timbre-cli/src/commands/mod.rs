pub mod browse;
pub mod config;
pub mod recommend;
pub mod shell;
mod table;

use anyhow::{Context, Result};
use timbre_core::Catalog;
use timbre_search::Recommender;

use crate::config::Config;

pub use browse::{list_artists, list_genres, show_artist, show_genre, show_songs};
pub use recommend::{resolve_query, run_recommend};
pub use shell::run_shell;

/// Load the configured catalog.
pub fn load_catalog(config: &Config) -> Result<Catalog> {
    let path = &config.catalog_path;
    log::debug!("Loading catalog from {}", path.display());
    Catalog::load_with(path, &config.load_options())
        .with_context(|| format!("Failed to load catalog from {}", path.display()))
}

/// Load the configured catalog and build a recommender over it.
pub fn load_recommender(config: &Config) -> Result<Recommender> {
    let catalog = load_catalog(config)?;
    Recommender::new(catalog, config.recommender_options())
        .context("Failed to build the similarity index")
}
