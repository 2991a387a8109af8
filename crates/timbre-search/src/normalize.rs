//! Feature standardisation.
//!
//! Each selected feature is rescaled to zero mean and unit variance across
//! the whole catalog, so the vectors are catalog-relative: adding or
//! removing a track changes every vector. The population standard
//! deviation is used.

use std::collections::HashSet;

use timbre_core::{Catalog, Feature};

use crate::error::{SearchError, SearchResult};

/// Standard deviations below this are treated as zero variance.
const MIN_STD_DEV: f64 = 1e-12;

/// Mean and standard deviation of one feature across the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStats {
    pub feature: Feature,
    pub mean: f64,
    pub std_dev: f64,
}

/// Standardised feature vectors, one row per track in catalog order.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    stats: Vec<FeatureStats>,
    values: Vec<f64>,
}

impl FeatureMatrix {
    /// Number of rows (tracks).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.dimensions()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of columns (selected features).
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.stats.len()
    }

    /// The standardised vector of the track at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let d = self.dimensions();
        self.values.get(index * d..(index + 1) * d)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.dimensions())
    }

    /// Per-feature statistics, in dimension order.
    #[must_use]
    pub fn stats(&self) -> &[FeatureStats] {
        &self.stats
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.stats.iter().map(|s| s.feature)
    }
}

/// Standardise the selected features of every track in `catalog`.
///
/// Dimension order follows `features`.
///
/// # Errors
///
/// - [`SearchError::EmptyFeatureSet`] or [`SearchError::DuplicateFeature`]
///   for an invalid feature list.
/// - [`SearchError::EmptyCatalog`] if there are no tracks.
/// - [`SearchError::DegenerateFeature`] if a feature has zero variance.
pub fn standardize(catalog: &Catalog, features: &[Feature]) -> SearchResult<FeatureMatrix> {
    if features.is_empty() {
        return Err(SearchError::EmptyFeatureSet);
    }
    let mut seen = HashSet::with_capacity(features.len());
    for &feature in features {
        if !seen.insert(feature) {
            return Err(SearchError::DuplicateFeature { feature });
        }
    }
    if catalog.is_empty() {
        return Err(SearchError::EmptyCatalog);
    }

    let n = catalog.len() as f64;
    let stats = features
        .iter()
        .map(|&feature| {
            let values = catalog.tracks().iter().map(|t| feature.value(&t.features));
            let mean = values.clone().sum::<f64>() / n;
            let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std_dev = variance.sqrt();
            if std_dev < MIN_STD_DEV {
                return Err(SearchError::DegenerateFeature { feature });
            }
            Ok(FeatureStats {
                feature,
                mean,
                std_dev,
            })
        })
        .collect::<SearchResult<Vec<_>>>()?;

    let mut values = Vec::with_capacity(catalog.len() * stats.len());
    for track in catalog.tracks() {
        values.extend(
            stats
                .iter()
                .map(|s| (s.feature.value(&track.features) - s.mean) / s.std_dev),
        );
    }

    Ok(FeatureMatrix { stats, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use timbre_core::{AudioFeatures, Track};

    fn catalog(rows: &[(&str, f64, f64, f64)]) -> Catalog {
        Catalog::from_tracks(
            rows.iter()
                .map(|&(name, e, d, v)| Track::new(name, AudioFeatures::new(e, d, v)))
                .collect(),
        )
        .unwrap()
    }

    fn sample() -> Catalog {
        catalog(&[
            ("Song A", 0.8, 0.6, 0.5),
            ("Song B", 0.82, 0.58, 0.52),
            ("Song C", 0.1, 0.1, 0.1),
            ("Song D", 0.45, 0.9, 0.33),
            ("Song E", 0.3, 0.25, 0.95),
        ])
    }

    #[test]
    fn test_standardized_columns_have_zero_mean_unit_variance() {
        let matrix = standardize(&sample(), &Feature::ALL).unwrap();
        assert_eq!(matrix.len(), 5);
        assert_eq!(matrix.dimensions(), 3);

        for dim in 0..matrix.dimensions() {
            let column: Vec<f64> = matrix.rows().map(|r| r[dim]).collect();
            let n = column.len() as f64;
            let mean = column.iter().sum::<f64>() / n;
            let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            assert!(mean.abs() < 1e-9, "mean of dim {dim} was {mean}");
            assert!((variance - 1.0).abs() < 1e-9, "variance of dim {dim} was {variance}");
        }
    }

    #[test]
    fn test_dimension_order_follows_feature_list() {
        let features = [Feature::Valence, Feature::Energy];
        let matrix = standardize(&sample(), &features).unwrap();
        let order: Vec<Feature> = matrix.features().collect();
        assert_eq!(order, features);
        assert_eq!(matrix.row(0).unwrap().len(), 2);
        assert!(matrix.row(5).is_none());
    }

    #[test]
    fn test_stats_use_population_std_dev() {
        let matrix = standardize(
            &catalog(&[("A", 0.0, 0.0, 0.2), ("B", 1.0, 0.5, 0.4)]),
            &[Feature::Energy],
        )
        .unwrap();
        let stats = matrix.stats()[0];
        assert!((stats.mean - 0.5).abs() < 1e-12);
        assert!((stats.std_dev - 0.5).abs() < 1e-12);
        assert!((matrix.row(0).unwrap()[0] + 1.0).abs() < 1e-12);
        assert!((matrix.row(1).unwrap()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_rejected() {
        let flat = catalog(&[
            ("A", 0.5, 0.1, 0.2),
            ("B", 0.5, 0.3, 0.4),
            ("C", 0.5, 0.6, 0.9),
        ]);
        let err = standardize(&flat, &Feature::ALL).unwrap_err();
        assert!(matches!(
            err,
            SearchError::DegenerateFeature {
                feature: Feature::Energy
            }
        ));

        // The constant feature is fine once it is left out.
        assert!(standardize(&flat, &[Feature::Danceability, Feature::Valence]).is_ok());
    }

    #[test]
    fn test_single_track_is_degenerate() {
        let single = catalog(&[("Only", 0.5, 0.5, 0.5)]);
        assert!(matches!(
            standardize(&single, &Feature::ALL),
            Err(SearchError::DegenerateFeature { .. })
        ));
    }

    #[test]
    fn test_invalid_feature_lists() {
        let catalog = sample();
        assert!(matches!(
            standardize(&catalog, &[]),
            Err(SearchError::EmptyFeatureSet)
        ));
        assert!(matches!(
            standardize(&catalog, &[Feature::Energy, Feature::Energy]),
            Err(SearchError::DuplicateFeature {
                feature: Feature::Energy
            })
        ));
    }
}
