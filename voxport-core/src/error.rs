//! Error types for the Voxport import core.
//!
//! Uses `thiserror` for the structured pipeline error variants. Format
//! readers are external collaborators and return `anyhow::Result`, so
//! whatever error type a reader produces rides along as the failure cause.

/// Errors raised by import handlers while driving a pipeline branch.
///
/// Each variant terminates exactly one branch; sibling branches are never
/// affected (see [`crate::pipeline::Pipeline::run_all`]).
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not open archive '{name}': {message}")]
    ArchiveOpen { name: String, message: String },

    #[error("could not read entry '{entry}' in archive '{name}': {message}")]
    ArchiveEntry {
        name: String,
        entry: String,
        message: String,
    },

    #[error("reader for '{name}' failed: {cause}")]
    Reader { name: String, cause: anyhow::Error },

    #[error("reader for '{name}' produced an unsupported dataset kind: {kind}")]
    UnsupportedKind { name: String, kind: String },

    #[error("data source '{name}' carries no byte payload")]
    MissingBytes { name: String },

    #[error("reader already registered for file type '{file_type}'")]
    ReaderAlreadyRegistered { file_type: String },

    #[error("no reader registered for file type '{file_type}'")]
    ReaderNotFound { file_type: String },
}

/// A type alias for results using [`ImportError`].
pub type Result<T> = std::result::Result<T, ImportError>;
