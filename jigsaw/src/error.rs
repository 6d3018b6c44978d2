use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a picture asset or the edge catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid texture header: {0}")]
    Header(String),

    #[error("texture pixel {index} has invalid colour {token:?} (expected rrggbb hex)")]
    Color { index: usize, token: String },

    #[error("texture declares {expected} pixels but contains {found}")]
    PixelCount { expected: usize, found: usize },

    #[error("invalid edge catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("edge catalog is empty")]
    EmptyCatalog,

    #[error("edge shape {index} has an invalid profile: {reason}")]
    Profile { index: usize, reason: &'static str },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure to build a puzzle.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("a puzzle needs at least one row and one column")]
    EmptyGrid,

    #[error("picture is {width}x{height}, too small for a {cols}x{rows} grid")]
    PictureTooSmall {
        width: u32,
        height: u32,
        cols: u32,
        rows: u32,
    },

    #[error("no picture at menu index {0}")]
    UnknownPicture(usize),
}
