//! The recommendation service.
//!
//! [`Recommender`] owns a catalog together with the index derived from it
//! and answers free-text queries: resolve the name, then rank the rest of
//! the catalog by similarity. It holds no mutable state, so a shared
//! reference can serve any number of callers.

use serde::Serialize;
use timbre_core::{Catalog, Feature, Track};

use crate::error::{SearchError, SearchResult};
use crate::fuzzy::{self, MatchResult, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::index::SimilarityIndex;
use crate::normalize::standardize;

/// Settings that shape how a [`Recommender`] is built and queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommenderOptions {
    /// Features used for similarity, in dimension order.
    pub features: Vec<Feature>,
    /// Minimum fuzzy-match confidence (0–100) for a query to resolve.
    pub confidence_threshold: u8,
}

impl Default for RecommenderOptions {
    fn default() -> Self {
        Self {
            features: Feature::ALL.to_vec(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// A recommended track and its similarity to the query track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
    #[serde(flatten)]
    pub track: &'a Track,
    /// Cosine similarity, -1.0 to 1.0.
    pub similarity: f64,
}

/// The answer to a recommendation query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Recommendations<'a> {
    /// The query matched a track confidently.
    Resolved {
        matched_name: &'a str,
        confidence: u8,
        recommendations: Vec<Recommendation<'a>>,
    },
    /// No track matched well enough; carries the closest candidate.
    Unresolved { best_guess: MatchResult },
}

impl Recommendations<'_> {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Content-based recommender over an immutable catalog.
#[derive(Debug)]
pub struct Recommender {
    catalog: Catalog,
    index: SimilarityIndex,
    options: RecommenderOptions,
}

impl Recommender {
    /// Standardise the catalog's features and build the similarity index.
    ///
    /// # Errors
    ///
    /// Fails if the feature list is invalid or a feature has zero variance;
    /// nothing can be served from such a catalog.
    pub fn new(catalog: Catalog, options: RecommenderOptions) -> SearchResult<Self> {
        let matrix = standardize(&catalog, &options.features)?;
        for stats in matrix.stats() {
            log::debug!(
                "Feature {}: mean {:.4}, std dev {:.4}",
                stats.feature,
                stats.mean,
                stats.std_dev
            );
        }
        let index = SimilarityIndex::build(&matrix);
        Ok(Self {
            catalog,
            index,
            options,
        })
    }

    /// Build with default options.
    pub fn with_defaults(catalog: Catalog) -> SearchResult<Self> {
        Self::new(catalog, RecommenderOptions::default())
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn options(&self) -> &RecommenderOptions {
        &self.options
    }

    /// Resolve `query` against the catalog's track names.
    pub fn resolve(&self, query: &str) -> SearchResult<MatchResult> {
        fuzzy::resolve(query, self.catalog.all_names()).ok_or(SearchError::EmptyCatalog)
    }

    /// Recommend up to `top_n` tracks similar to the one named by `query`.
    ///
    /// The query is fuzzy-matched against track names first. A match below
    /// the confidence threshold yields [`Recommendations::Unresolved`].
    /// `top_n` larger than the rest of the catalog returns every other
    /// track.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidTopN`] if `top_n` is zero.
    pub fn recommend(&self, query: &str, top_n: usize) -> SearchResult<Recommendations<'_>> {
        if top_n == 0 {
            return Err(SearchError::InvalidTopN);
        }

        let (position, confidence) = fuzzy::best_match(query, self.catalog.all_names())
            .ok_or(SearchError::EmptyCatalog)?;
        let matched = self
            .catalog
            .get(position)
            .ok_or(SearchError::IndexOutOfRange {
                index: position,
                len: self.catalog.len(),
            })?;

        if confidence < self.options.confidence_threshold {
            log::warn!(
                "No confident match for {:?} (closest: {:?} at {})",
                query,
                matched.name,
                confidence
            );
            return Ok(Recommendations::Unresolved {
                best_guess: MatchResult {
                    matched_name: matched.name.clone(),
                    confidence,
                },
            });
        }
        log::debug!(
            "Resolved {:?} to {:?} with confidence {}",
            query,
            matched.name,
            confidence
        );

        let recommendations = self
            .index
            .top_k(position, top_n)?
            .into_iter()
            .filter_map(|neighbor| {
                self.catalog.get(neighbor.index).map(|track| Recommendation {
                    track,
                    similarity: neighbor.score,
                })
            })
            .collect();

        Ok(Recommendations::Resolved {
            matched_name: &matched.name,
            confidence,
            recommendations,
        })
    }
}
