mod load;
pub mod store;

pub use store::{Catalog, LoadOptions, DEFAULT_MAX_TRACKS};
