use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::track::AudioFeatures;

/// A numeric audio attribute that can take part in similarity scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Energy,
    Danceability,
    Valence,
}

impl Feature {
    /// Every feature, in canonical dimension order.
    pub const ALL: [Self; 3] = [Self::Energy, Self::Danceability, Self::Valence];

    /// Column name used by catalog sources.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Danceability => "danceability",
            Self::Valence => "valence",
        }
    }

    /// Read this feature's value from a track's attributes.
    #[must_use]
    pub const fn value(self, features: &AudioFeatures) -> f64 {
        match self {
            Self::Energy => features.energy,
            Self::Danceability => features.danceability,
            Self::Valence => features.valence,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "energy" => Ok(Self::Energy),
            "danceability" => Ok(Self::Danceability),
            "valence" => Ok(Self::Valence),
            other => Err(format!(
                "unknown feature {other:?} (expected energy, danceability or valence)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_value() {
        let features = AudioFeatures::new(0.8, 0.6, 0.5);
        assert!((Feature::Energy.value(&features) - 0.8).abs() < f64::EPSILON);
        assert!((Feature::Danceability.value(&features) - 0.6).abs() < f64::EPSILON);
        assert!((Feature::Valence.value(&features) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_feature_from_str() {
        assert_eq!("Energy".parse::<Feature>(), Ok(Feature::Energy));
        assert_eq!(" valence ".parse::<Feature>(), Ok(Feature::Valence));
        assert!("tempo".parse::<Feature>().is_err());
    }

    #[test]
    fn test_feature_serde_lowercase() {
        let json = serde_json::to_string(&Feature::ALL).unwrap();
        assert_eq!(json, r#"["energy","danceability","valence"]"#);
    }
}
