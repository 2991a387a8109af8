//! Pairwise similarity index.
//!
//! The index stores the cosine similarity of every pair of standardised
//! feature vectors. The matrix is symmetric, so only the upper triangle
//! (diagonal included) is kept: `n * (n + 1) / 2` entries for `n` tracks.
//! Building is `O(n² · d)` in time and `O(n²)` in memory, which is why the
//! catalog size is capped at load time.

use std::time::Instant;

use serde::Serialize;

use crate::cosine::{cosine_similarity_with_magnitude, magnitude};
use crate::error::{SearchError, SearchResult};
use crate::normalize::FeatureMatrix;

/// A track position paired with its similarity to a query track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub index: usize,
    pub score: f64,
}

/// Precomputed cosine similarities between all tracks of a catalog.
///
/// Read-only once built; a catalog change means building a new index.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    len: usize,
    upper: Vec<f64>,
}

impl SimilarityIndex {
    /// Compute the similarity of every pair of rows in `matrix`.
    #[must_use]
    pub fn build(matrix: &FeatureMatrix) -> Self {
        let started = Instant::now();
        let len = matrix.len();
        let rows: Vec<&[f64]> = matrix.rows().collect();
        let magnitudes: Vec<f64> = rows.iter().map(|r| magnitude(r)).collect();

        let mut upper = Vec::with_capacity(len * (len + 1) / 2);
        for i in 0..len {
            upper.push(1.0);
            for j in (i + 1)..len {
                upper.push(cosine_similarity_with_magnitude(
                    rows[i],
                    rows[j],
                    magnitudes[i],
                    magnitudes[j],
                ));
            }
        }

        log::info!(
            "Built similarity index for {} tracks ({} pairs) in {:?}",
            len,
            upper.len(),
            started.elapsed()
        );
        Self { len, upper }
    }

    /// Number of tracks covered by the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Similarity between the tracks at positions `i` and `j`.
    ///
    /// Self-similarity is always 1.0.
    pub fn similarity(&self, i: usize, j: usize) -> SearchResult<f64> {
        self.check(i)?;
        self.check(j)?;
        Ok(self.upper[self.offset(i.min(j), i.max(j))])
    }

    /// The `k` tracks most similar to the track at `index`.
    ///
    /// The query track itself is never included. Results are sorted by
    /// descending score; equal scores keep catalog order. Asking for more
    /// than `len - 1` neighbours returns all of them.
    pub fn top_k(&self, index: usize, k: usize) -> SearchResult<Vec<Neighbor>> {
        self.check(index)?;

        let mut neighbors: Vec<Neighbor> = (0..self.len)
            .filter(|&j| j != index)
            .map(|j| Neighbor {
                index: j,
                score: self.upper[self.offset(index.min(j), index.max(j))],
            })
            .collect();

        // Stable: ties stay in ascending catalog order.
        neighbors.sort_by(|a, b| b.score.total_cmp(&a.score));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn check(&self, index: usize) -> SearchResult<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(SearchError::IndexOutOfRange {
                index,
                len: self.len,
            })
        }
    }

    /// Position of `(i, j)` in the packed upper triangle; requires `i <= j`.
    const fn offset(&self, i: usize, j: usize) -> usize {
        i * self.len - i * (i + 1) / 2 + j
    }
}
