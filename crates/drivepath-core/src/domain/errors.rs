//! Domain error types
//!
//! This module defines two error families:
//! - [`DomainError`] for validation of domain values (paths, ids, names)
//! - [`FsError`] for the outcome of filesystem operations against the cache
//!   and the remote store

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while validating domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote path format
    #[error("Invalid remote path: {0}")]
    InvalidRemotePath(String),

    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Invalid leaf name for a remote object
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// Outcome of a failed filesystem operation
///
/// `NotFound` and `PreconditionFailed` are raised before any remote mutation
/// and leave both the cache and the remote store untouched. `Remote` carries
/// transport, auth and quota failures from the remote store unchanged.
#[derive(Debug, Error)]
pub enum FsError {
    /// Nothing is known at the given path, even after resolution
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation's preconditions do not hold
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// The remote store reported an error
    #[error("Remote store failure: {0:#}")]
    Remote(#[source] anyhow::Error),

    /// A download stopped part-way; the partial local file is left in place
    #[error("Transfer to {path} interrupted after {bytes_written} bytes: {source:#}")]
    PartialTransfer {
        /// Local target that holds the partial content
        path: PathBuf,
        /// Bytes written before the failure
        bytes_written: u64,
        /// Underlying cause
        #[source]
        source: anyhow::Error,
    },

    /// Reading or writing a local file failed
    #[error("Local I/O error on {path}: {source}")]
    LocalIo {
        /// Local file involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A value received or supplied failed validation
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl FsError {
    /// Returns true for failures detected before touching the remote store
    pub fn is_precondition(&self) -> bool {
        matches!(self, FsError::NotFound(_) | FsError::PreconditionFailed(_))
    }

    /// Returns true if the path in question does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }
}
