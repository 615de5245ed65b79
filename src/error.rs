//! Error types for scanning.
//!
//! Most failures during a scan are isolated to a single location and end up
//! in a [`ScanReporter`](crate::report::ScanReporter) rather than being
//! returned. The variants that do escape public entry points are the
//! configuration ones: [`ScanError::InvalidPattern`] and [`ScanError::Config`].

use std::path::PathBuf;

/// Errors produced while configuring or running a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A file or directory could not be read.
    #[error("io error: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An archive could not be opened or one of its entries could not be read.
    #[error("archive error: {}: {source}", path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// A location identifier could not be turned into a filesystem path.
    #[error("malformed location '{location}': {reason}")]
    MalformedLocation { location: String, reason: String },

    /// A location identifier points somewhere other than the local filesystem.
    #[error("unsupported scheme '{scheme}' in location '{location}'")]
    UnsupportedScheme { location: String, scheme: String },

    /// A name pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Configuration could not be loaded or is inconsistent.
    #[error("config error: {field}: {reason}")]
    Config { field: String, reason: String },
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        ScanError::Zip {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ScanError> = std::result::Result<T, E>;
