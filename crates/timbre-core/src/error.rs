use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load catalog from {source_name}: {message}")]
    DataLoad {
        source_name: String,
        message: String,
    },

    #[error("schema error at row {row}: {message}")]
    Schema { row: usize, message: String },

    #[error("catalog exceeds the limit of {limit} tracks (it has {size})")]
    CapacityExceeded { size: usize, limit: usize },

    #[error("not found: {entity} named {name:?}")]
    NotFound { entity: &'static str, name: String },
}

impl Error {
    /// Returns `true` when the error means the catalog must not be served.
    ///
    /// A capacity rejection is recoverable: the caller may retry with a
    /// smaller source or a higher limit.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::CapacityExceeded { .. } | Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
