//! Local mirror error types.

use thiserror::Error;

/// Errors that can occur reading or writing the local mirror.
///
/// Mirror failures never abort a mutation; callers log them and continue
/// with the in-memory state.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The mirror group directory could not be created.
    #[error("Failed to create mirror directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A field file could not be read.
    #[error("Failed to read mirror field '{field}': {source}")]
    ReadField {
        /// Field file name
        field: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A field file could not be written.
    #[error("Failed to write mirror field '{field}': {source}")]
    WriteField {
        /// Field file name
        field: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Injected failure from a test double.
    #[error("Mirror unavailable: {0}")]
    Unavailable(String),
}
