//! Data model shared by every phase of a copy session.

use std::fmt;
use std::path::{Path, PathBuf};

/// One requested source/destination pair.
///
/// The source may be a file or a directory; a directory is copied
/// recursively so that `destination` becomes its copy. Items are identified
/// by their position in the submitted list for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyItem {
    /// File or directory to copy
    pub source: PathBuf,
    /// Path the source is copied to
    pub destination: PathBuf,
}

impl CopyItem {
    /// Create an item from any pair of paths.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
        }
    }
}

/// Measured size of one [`CopyItem`], produced by the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanEntry {
    /// The measured item
    pub item: CopyItem,
    /// Sum of the sizes of every file below the item
    pub size_bytes: u64,
    /// Item source relative to its parent directory, for display
    pub label: String,
}

/// Lifecycle phase of the controller's single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// No session
    #[default]
    Idle,
    /// Measuring required and available bytes
    Scanning,
    /// Waiting for the caller to reduce the item set
    Selecting,
    /// Copying the (possibly reduced) item set
    Copying,
    /// The last session reached its outcome; its state has been cleared
    Done,
}

impl Phase {
    /// Whether a new session may start in this phase.
    #[must_use]
    pub fn accepts_new_session(self) -> bool {
        matches!(self, Phase::Idle | Phase::Done)
    }
}

/// Terminal value closing a session.
///
/// Exactly one outcome is delivered per accepted `execute_copy` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Outcome {
    /// Every item was copied completely
    Success,
    /// The caller cancelled the scan, the selection or the copy
    Cancelled,
    /// An IO failure stopped the copy
    CopyError,
    /// A single item does not fit on the destination volume
    NoSpaceError,
    /// The caller confirmed an empty selection
    NoFileSelected,
}

impl Outcome {
    /// Stable snake_case name, used in machine-readable output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Cancelled => "cancelled",
            Outcome::CopyError => "copy_error",
            Outcome::NoSpaceError => "no_space_error",
            Outcome::NoFileSelected => "no_file_selected",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of the active session, guarded by the controller's lock.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub items: Vec<CopyItem>,
    pub phase: Phase,
    pub total_required_bytes: u64,
    pub available_bytes: u64,
    pub selected_bytes: u64,
    /// Incremented for every accepted session; stale tasks compare against it.
    pub generation: u64,
}

impl SessionState {
    /// Drop everything but the generation counter.
    pub fn clear(&mut self) {
        self.items.clear();
        self.phase = Phase::Idle;
        self.total_required_bytes = 0;
        self.available_bytes = 0;
        self.selected_bytes = 0;
    }

    /// Clear the finished session and mark it [`Phase::Done`].
    pub fn close(&mut self) {
        self.clear();
        self.phase = Phase::Done;
    }
}
