//! Error kinds raised while compiling a book.
//!
//! Everything in the crate propagates [`anyhow::Error`] and layers context as
//! it unwinds (`failed to process chapter ...: failed to process file ...`).
//! The root cause is always one of the [`BookError`] kinds below, so callers
//! that need to react to a specific failure can recover it with
//! `err.downcast_ref::<BookError>()`, which looks through the context layers.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookError {
    /// Empty or missing input directory, unknown font, empty output path.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The root holds no `Episode*` directory with at least one Markdown file.
    #[error("no chapters found in {}", .0.display())]
    NoChapters(PathBuf),

    #[error("chapter {} has no markdown files", .0.display())]
    EmptyChapter(PathBuf),

    #[error("no body element found in the parsed document")]
    NoBody,

    #[error("failed to parse document: {0}")]
    Parse(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Only JPEG images can be placed in the body of the book.
    #[error("unsupported image format: {}", .0.display())]
    UnsupportedImageFormat(PathBuf),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("invalid table: {0}")]
    InvalidTable(String),

    #[error("table has no columns")]
    EmptyTable,

    #[error("render error: {0}")]
    Render(String),

    #[error("compilation cancelled")]
    Cancelled,
}

impl BookError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> BookError {
        BookError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Recover the [`BookError`] at the root of an error chain, if there is one.
pub fn kind_of(err: &anyhow::Error) -> Option<&BookError> {
    err.downcast_ref::<BookError>()
}
