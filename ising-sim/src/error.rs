use std::path::PathBuf;

use thiserror::Error;

/// Errors raised outside the Metropolis loop.
///
/// The engine and lattice never produce these on their own; they surface from
/// settings loading, output preparation, export and pool construction.
#[derive(Error, Debug)]
pub enum IsingError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid settings: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),

    /// The saves folder cannot be created or written to.
    #[error("output location {} is not writable: {source}", path.display())]
    OutputLocation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("position needs {expected} coordinates, got {got}")]
    InvalidPosition { expected: usize, got: usize },

    /// A lattice axis shorter than 2 would make a site its own neighbor.
    #[error("extent along axis {axis} is {extent}, expected at least 2")]
    InvalidExtent { axis: usize, extent: i64 },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, IsingError>;

impl IsingError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn output_location(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputLocation {
            path: path.into(),
            source,
        }
    }
}
