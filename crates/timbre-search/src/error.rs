//! Error types for the similarity engine.

use thiserror::Error;
use timbre_core::Feature;

/// Errors raised while building or querying the similarity engine.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A feature has the same value for every track, so it cannot be
    /// standardised.
    #[error("feature {feature} has zero variance across the catalog")]
    DegenerateFeature { feature: Feature },

    #[error("no features selected for similarity")]
    EmptyFeatureSet,

    #[error("feature {feature} selected more than once")]
    DuplicateFeature { feature: Feature },

    /// A track position outside the catalog was passed to the index.
    #[error("track index {index} out of range for a catalog of {len} tracks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("top_n must be a positive integer")]
    InvalidTopN,

    #[error("catalog is empty")]
    EmptyCatalog,

    /// An error propagated from catalog loading.
    #[error("catalog error: {0}")]
    Catalog(#[from] timbre_core::Error),
}

impl SearchError {
    /// Returns `true` when the engine cannot serve queries after this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidTopN => false,
            Self::Catalog(e) => e.is_fatal(),
            _ => true,
        }
    }
}

/// Convenience alias for engine results.
pub type SearchResult<T> = std::result::Result<T, SearchError>;
