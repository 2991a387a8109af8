//! Similarity and fuzzy search for timbre.
//!
//! Standardises the audio features of a catalog, precomputes pairwise
//! cosine similarity, resolves free-text track names and assembles ranked
//! recommendations.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod cosine;
pub mod error;
pub mod fuzzy;
pub mod index;
pub mod normalize;
pub mod recommend;
pub mod shared;

pub use error::{SearchError, SearchResult};
pub use fuzzy::{resolve, MatchResult, DEFAULT_CONFIDENCE_THRESHOLD};
pub use index::{Neighbor, SimilarityIndex};
pub use normalize::{standardize, FeatureMatrix, FeatureStats};
pub use recommend::{Recommendation, Recommendations, Recommender, RecommenderOptions};
pub use shared::SharedRecommender;
