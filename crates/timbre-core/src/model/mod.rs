pub mod feature;
pub mod track;

pub use feature::Feature;
pub use track::{AudioFeatures, Track};
