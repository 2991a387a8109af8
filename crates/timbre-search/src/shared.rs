//! Atomic replacement of a live recommender.
//!
//! Readers take a snapshot (`Arc<Recommender>`) and query it without
//! holding any lock. A reload builds the replacement completely before
//! publishing it, so readers see either the old engine or the new one and
//! in-flight queries keep using the snapshot they started with.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use timbre_core::{Catalog, LoadOptions};

use crate::error::SearchResult;
use crate::recommend::{Recommender, RecommenderOptions};

/// A swappable handle to the current [`Recommender`].
#[derive(Debug)]
pub struct SharedRecommender {
    current: RwLock<Arc<Recommender>>,
}

impl SharedRecommender {
    #[must_use]
    pub fn new(recommender: Recommender) -> Self {
        Self {
            current: RwLock::new(Arc::new(recommender)),
        }
    }

    /// The recommender currently being served.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Recommender> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Publish `recommender`, returning the one it replaces.
    pub fn replace(&self, recommender: Recommender) -> Arc<Recommender> {
        let next = Arc::new(recommender);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, next)
    }

    /// Rebuild from `catalog` with the current options and publish it.
    ///
    /// On error the current recommender stays in place.
    pub fn reload(&self, catalog: Catalog) -> SearchResult<()> {
        self.reload_with(catalog, self.snapshot().options().clone())
    }

    /// Rebuild from `catalog` with new options and publish it.
    pub fn reload_with(&self, catalog: Catalog, options: RecommenderOptions) -> SearchResult<()> {
        let tracks = catalog.len();
        let next = Recommender::new(catalog, options)?;
        self.replace(next);
        log::info!("Published recommender for {} tracks", tracks);
        Ok(())
    }

    /// Load a catalog from `path`, rebuild and publish it.
    pub fn reload_from_path(&self, path: impl AsRef<Path>, load: &LoadOptions) -> SearchResult<()> {
        let catalog = Catalog::load_with(path, load)?;
        self.reload(catalog)
    }
}
