//! Core domain model for timbre.
//!
//! This crate defines tracks and their audio features, and the immutable
//! catalog they live in: loading from CSV or JSON sources, validation,
//! name lookup and browsing.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod model;

pub use catalog::{Catalog, LoadOptions, DEFAULT_MAX_TRACKS};
pub use error::{Error, Result};
pub use model::{AudioFeatures, Feature, Track};
