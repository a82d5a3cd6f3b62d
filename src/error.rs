//! Error types for the snp library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for snp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that stop a run.
///
/// Structural problems in the source (an `e` with nothing open, an unknown
/// frame kind) are not errors; they are reported as
/// [`Diagnostic`](crate::model::Diagnostic)s and the scan carries on.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source file does not exist.
    #[error("Specified file ({0}) not found")]
    InputNotFound(PathBuf),

    /// No source file was given and none could be found.
    #[error("No .sn source file found in {0}")]
    NoSourceFile(PathBuf),

    /// A `g` directive names a graphic that resolves to no file.
    #[error("Graphics file {0} does not exist")]
    GraphicNotFound(String),

    /// The year in the `Z` directive is not the current year.
    #[error("The source file indicates that the year is {declared} but the system says that it's {actual}")]
    YearMismatch {
        /// Year as written in the source
        declared: String,
        /// Year from the system clock
        actual: i32,
    },

    /// A notes-only scope was requested inside a slides-only one, or vice versa.
    #[error("Line {line}: notes-only and slides-only scopes are both active")]
    ScopeConflict {
        /// Source line (1-indexed)
        line: usize,
    },

    /// The `D` directive value is not a number.
    #[error("Line {line}: could not interpret '{value}' as a debug level")]
    InvalidDebugLevel {
        /// Source line (1-indexed)
        line: usize,
        /// The offending value
        value: String,
    },

    /// Malformed configuration file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error while producing an output document.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Source line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::ScopeConflict { line } | Error::InvalidDebugLevel { line, .. } => Some(*line),
            _ => None,
        }
    }
}
