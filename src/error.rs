//! Error types for fitcopy.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur while scanning, selecting and copying, and the [`Result`]
//! type alias.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | IO | [`Error::CreateDir`], [`Error::Read`], [`Error::Write`], [`Error::AvailableSpace`] |
//! | Validation | [`Error::SourceNotFound`], [`Error::IndexOutOfRange`], [`Error::NotSelecting`] |
//! | Safety | [`Error::SymlinkLoop`] |
//! | Control | [`Error::ScanCancelled`], [`Error::Cancelled`] |
//!
//! Errors raised by the copier never travel to the completion callback
//! as-is: [`Error::outcome`] folds them into an [`Outcome`].

use crate::session::{Outcome, Phase};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for fitcopy operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates "no space left on device".
///
/// The scan only guarantees that the selection fitted when it was measured;
/// another writer can still fill the volume during the copy. This helper
/// lets callers tell that case apart from other write failures.
///
/// # Platform Support
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | Unix | `ENOSPC` (errno 28) |
/// | Windows | `ERROR_DISK_FULL` (0x70) |
///
/// # Example
///
/// ```no_run
/// use std::io;
/// use fitcopy::is_no_space_error;
///
/// let error = io::Error::new(io::ErrorKind::StorageFull, "disk full");
/// assert!(is_no_space_error(&error));
/// ```
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ENOSPC: i32 = 28;
            return raw_error == ENOSPC;
        }
    }

    #[cfg(windows)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ERROR_DISK_FULL: i32 = 112;
            return raw_error == ERROR_DISK_FULL;
        }
    }

    false
}

/// Errors that can occur during a copy session.
///
/// All IO-related errors include the path they concern.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Source path does not exist (anymore) when it is about to be copied
    #[error("Source path does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// Failed to create a destination directory
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to list or read a source entry
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Source path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to open, write or sync a destination file
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to query the free space of the destination volume
    #[error("Failed to query available space on {path}: {source}")]
    AvailableSpace {
        /// Volume root that was queried
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Symlink loop detected (would cause infinite recursion)
    #[error("Symlink loop detected: {0}")]
    SymlinkLoop(PathBuf),

    /// The scan was cancelled before it measured every item
    #[error("Scan cancelled")]
    ScanCancelled,

    /// The copy was cancelled
    ///
    /// Carries partial statistics so the caller knows what was completed
    /// before cancellation. The file being written when the request was
    /// observed is left incomplete on disk.
    #[error("Operation cancelled ({files_copied} files copied, {bytes_copied} bytes)")]
    Cancelled {
        /// Number of files fully copied before cancellation
        files_copied: u64,
        /// Total bytes written before cancellation, including the partial file
        bytes_copied: u64,
        /// Number of directories created before cancellation
        dirs_created: u64,
    },

    /// Selection index does not name an entry
    #[error("Selection index {index} out of range ({len} entries)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of entries in the selection
        len: usize,
    },

    /// A selection call was made while no selection is pending
    #[error("No selection pending (session phase: {phase:?})")]
    NotSelecting {
        /// Phase the session was in
        phase: Phase,
    },
}

impl Error {
    /// Whether this error stems from a cancellation request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::ScanCancelled | Error::Cancelled { .. })
    }

    /// Terminal outcome a session resolves to when it fails with this error.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if self.is_cancelled() {
            Outcome::Cancelled
        } else {
            Outcome::CopyError
        }
    }

    /// The underlying IO error, if any.
    pub(crate) fn io_source(&self) -> Option<&io::Error> {
        match self {
            Error::CreateDir { source, .. }
            | Error::Read { source, .. }
            | Error::Write { source, .. }
            | Error::AvailableSpace { source, .. } => Some(source),
            _ => None,
        }
    }
}
