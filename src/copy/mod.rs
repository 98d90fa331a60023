//! Copy phase: stream the selected items to their destinations.
//!
//! Items are copied one after the other, depth-first, one chunk at a time.
//! The first failure stops the whole run without touching the remaining
//! siblings or items; nothing is retried. Cancellation is polled before every
//! item, every directory entry and every chunk, and is reported as
//! [`Error::Cancelled`] at the point where it was observed, so a deliberate
//! stop is never confused with an IO failure.
//!
//! Partial destination files and directories are left on disk after a
//! failure or cancellation.

mod dir;
mod file;

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::options::CopyOptions;
use crate::progress::{CopyProgress, ProgressTracker};
use crate::session::CopyItem;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Statistics from a copy run.
///
/// # Example
///
/// ```no_run
/// use fitcopy::{copy_items, CopyItem, CopyOptions, LocalFs};
/// use std::sync::atomic::AtomicBool;
///
/// let items = [CopyItem::new("/media/card/photos", "/home/me/photos")];
/// let stats = copy_items(
///     &LocalFs::new(),
///     &items,
///     0,
///     &CopyOptions::default(),
///     &AtomicBool::new(false),
///     &|_| {},
/// )?;
/// println!("Copied {} files ({} bytes)", stats.files_copied, stats.bytes_copied);
/// # Ok::<(), fitcopy::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyStats {
    /// Number of files copied completely
    pub files_copied: u64,
    /// Number of directories created
    pub dirs_created: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Duration of the copy run
    pub duration: Duration,
}

/// Copy every item in order.
///
/// `total_bytes` is the size measured by the scan and drives the overall
/// percentage reported to `on_progress`.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if `cancel` is observed, otherwise the first
/// IO failure ([`Error::SourceNotFound`], [`Error::CreateDir`],
/// [`Error::Read`], [`Error::Write`], [`Error::SymlinkLoop`]).
pub fn copy_items(
    fs: &dyn FileSystem,
    items: &[CopyItem],
    total_bytes: u64,
    options: &CopyOptions,
    cancel: &AtomicBool,
    on_progress: &dyn Fn(&CopyProgress),
) -> Result<CopyStats> {
    let start_time = Instant::now();
    let mut run = CopyRun {
        fs,
        options,
        cancel,
        tracker: ProgressTracker::new(total_bytes, on_progress),
        root: PathBuf::new(),
        ancestors: Vec::new(),
        stats: CopyStats::default(),
    };

    for item in items {
        run.check_cancelled()?;
        run.root.clone_from(&item.source);
        run.copy_entry(&item.source, &item.destination)?;
    }

    run.tracker.finish();
    run.stats.duration = start_time.elapsed();
    Ok(run.stats)
}

/// State of one copy run, threaded through the recursion.
struct CopyRun<'a> {
    fs: &'a dyn FileSystem,
    options: &'a CopyOptions,
    cancel: &'a AtomicBool,
    tracker: ProgressTracker<'a>,
    /// Source of the item being copied, for display paths
    root: PathBuf,
    /// Identities of the directories being walked, for loop detection
    ancestors: Vec<(u64, u64)>,
    stats: CopyStats,
}

impl CopyRun<'_> {
    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.load(Ordering::Relaxed) {
            Err(self.cancelled())
        } else {
            Ok(())
        }
    }

    fn cancelled(&self) -> Error {
        Error::Cancelled {
            files_copied: self.stats.files_copied,
            bytes_copied: self.tracker.bytes_done(),
            dirs_created: self.stats.dirs_created,
        }
    }
}
