//! Error types for pcopy
//!
//! Every failure carries enough context (path, byte offset, underlying OS
//! error) to diagnose a failed copy without rerunning it.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pcopy operations
#[derive(Error, Debug)]
pub enum PcopyError {
    /// I/O error outside a positioned transfer (open, create, metadata, sync)
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// File the operation targeted
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Positioned read failed inside a range copy
    #[error("read error at '{path}' offset {offset}: {source}")]
    Read {
        /// File being read
        path: PathBuf,
        /// Byte offset of the failed transfer
        offset: u64,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Positioned write failed inside a range copy
    #[error("write error at '{path}' offset {offset}: {source}")]
    Write {
        /// File being written
        path: PathBuf,
        /// Byte offset of the failed transfer
        offset: u64,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// File or directory not found
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Source is not a regular file
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// Source and destination are the same
    #[error("Source and destination are the same: {0}")]
    SameSourceAndDestination(PathBuf),

    /// Hash verification failed
    #[error("Integrity check failed for '{path}': expected {expected}, got {actual}")]
    IntegrityMismatch {
        /// Destination that failed verification
        path: PathBuf,
        /// Source digest
        expected: String,
        /// Destination digest
        actual: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Thread pool error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

impl PcopyError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a positioned read error
    pub fn read(path: impl Into<PathBuf>, offset: u64, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            offset,
            source,
        }
    }

    /// Create a positioned write error
    pub fn write(path: impl Into<PathBuf>, offset: u64, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            offset,
            source,
        }
    }

    /// Create an integrity mismatch error
    pub fn integrity_mismatch(
        path: impl Into<PathBuf>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::IntegrityMismatch {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Byte offset at which a transfer failed, if the error came from one
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Read { offset, .. } | Self::Write { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::NotFound(path)
            | Self::NotAFile(path)
            | Self::SameSourceAndDestination(path)
            | Self::IntegrityMismatch { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for pcopy operations
pub type Result<T> = std::result::Result<T, PcopyError>;

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| PcopyError::io(path, e))
    }
}

/// Waits out a batch of results and returns the first failure, if any.
///
/// Every result is inspected before returning so the caller learns how many
/// entries failed; the count is returned alongside the first error.
pub fn first_error<T>(results: Vec<Result<T>>) -> std::result::Result<Vec<T>, (PcopyError, usize)> {
    let mut successes = Vec::with_capacity(results.len());
    let mut first = None;
    let mut failed = 0usize;

    for result in results {
        match result {
            Ok(value) => successes.push(value),
            Err(e) => {
                failed += 1;
                if first.is_none() {
                    first = Some(e);
                }
            }
        }
    }

    match first {
        None => Ok(successes),
        Some(e) => Err((e, failed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = PcopyError::io("/test/path", io_err);
        assert!(err.path().is_some());
        assert_eq!(err.path().unwrap(), &PathBuf::from("/test/path"));
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn test_range_error_reports_offset() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = PcopyError::write("/dst", 16384, io_err);
        assert_eq!(err.offset(), Some(16384));

        let msg = err.to_string();
        assert!(msg.contains("/dst"));
        assert!(msg.contains("16384"));
        assert!(msg.contains("disk on fire"));
    }

    #[test]
    fn test_first_error() {
        let results: Vec<Result<u64>> = vec![Ok(1), Ok(2), Ok(3)];
        assert_eq!(first_error(results).unwrap(), vec![1, 2, 3]);

        let results: Vec<Result<u64>> = vec![
            Ok(1),
            Err(PcopyError::config("first")),
            Err(PcopyError::config("second")),
        ];
        let (err, failed) = first_error(results).unwrap_err();
        assert_eq!(failed, 2);
        assert!(err.to_string().contains("first"));
    }
}
