use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("required input file not found: '{}'", path.display())]
    MissingInputFile { path: PathBuf },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed XML in {origin} (near byte {position}): {details}")]
    Xml {
        origin: String,
        position: u64,
        details: String,
    },

    #[error("invalid material library '{}': {details}", path.display())]
    MaterialLibrary { path: PathBuf, details: String },

    #[error("failed to write '{}': {source}", path.display())]
    OutputWriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    pub fn xml(origin: impl Into<String>, position: u64, details: impl Into<String>) -> Self {
        Self::Xml {
            origin: origin.into(),
            position,
            details: details.into(),
        }
    }

    /// Re-labels an XML error raised while parsing an in-memory string with
    /// the file it was read from.
    pub(crate) fn with_origin(self, origin: impl Into<String>) -> Self {
        match self {
            Self::Xml {
                position, details, ..
            } => Self::Xml {
                origin: origin.into(),
                position,
                details,
            },
            other => other,
        }
    }
}
