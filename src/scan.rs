//! Scan phase: measure what a session needs and what the volume offers.
//!
//! The scan walks every item depth-first and sums file sizes. Entries that
//! cannot be read contribute 0 instead of failing the scan; a missing source
//! is simply absent from the total. Cancellation is polled before every item
//! and every directory entry.

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::options::CopyOptions;
use crate::session::{CopyItem, ScanEntry};
use crate::utils::path::item_label;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Result of scanning a session's items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// One entry per item, in submission order
    pub entries: Vec<ScanEntry>,
    /// Sum of every entry's size
    pub total_required_bytes: u64,
    /// Free bytes on the destination volume
    pub available_bytes: u64,
}

/// What the controller does after a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDecision {
    /// Everything fits: copy the full item list
    CopyAll,
    /// A single item does not fit: nothing can be selected
    NoSpace,
    /// Several items, not all of them fit: let the caller choose
    Select,
}

impl ScanReport {
    /// Compare required and available bytes.
    #[must_use]
    pub fn decision(&self) -> ScanDecision {
        if self.available_bytes >= self.total_required_bytes {
            ScanDecision::CopyAll
        } else if self.entries.len() == 1 {
            ScanDecision::NoSpace
        } else {
            ScanDecision::Select
        }
    }
}

/// Scan every item, then query the free space on `volume_root`.
///
/// # Errors
///
/// - [`Error::ScanCancelled`] if `cancel` is raised before the walk completes
/// - [`Error::AvailableSpace`] if the volume cannot be queried
pub fn scan_items(
    fs: &dyn FileSystem,
    items: &[CopyItem],
    volume_root: &Path,
    cancel: &AtomicBool,
    options: &CopyOptions,
) -> Result<ScanReport> {
    let mut entries = Vec::with_capacity(items.len());
    let mut total_required_bytes: u64 = 0;

    for item in items {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::ScanCancelled);
        }
        let size_bytes = scan_size(fs, &item.source, cancel, options)?;
        total_required_bytes = total_required_bytes.saturating_add(size_bytes);
        entries.push(ScanEntry {
            item: item.clone(),
            size_bytes,
            label: item_label(&item.source),
        });
    }

    let available_bytes =
        fs.available_bytes(volume_root)
            .map_err(|source| Error::AvailableSpace {
                path: volume_root.to_path_buf(),
                source,
            })?;

    Ok(ScanReport {
        entries,
        total_required_bytes,
        available_bytes,
    })
}

/// Total size of the files below `path` (or of `path` itself if a file).
///
/// # Errors
///
/// Returns [`Error::ScanCancelled`] if `cancel` is raised during the walk.
pub fn scan_size(
    fs: &dyn FileSystem,
    path: &Path,
    cancel: &AtomicBool,
    options: &CopyOptions,
) -> Result<u64> {
    let mut ancestors = Vec::new();
    SizeWalk {
        fs,
        cancel,
        options,
    }
    .size_of(path, &mut ancestors)
}

struct SizeWalk<'a> {
    fs: &'a dyn FileSystem,
    cancel: &'a AtomicBool,
    options: &'a CopyOptions,
}

impl SizeWalk<'_> {
    fn size_of(&self, path: &Path, ancestors: &mut Vec<(u64, u64)>) -> Result<u64> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(Error::ScanCancelled);
        }
        if self.fs.is_file(path) {
            return Ok(self.fs.file_size(path));
        }

        let children = match self.fs.list_children(path) {
            Ok(children) => children,
            Err(_) => return Ok(0),
        };

        let key = self.fs.dir_key(path);
        if let Some(key) = key {
            if ancestors.contains(&key) {
                self.options.warn(&format!(
                    "Skipping {} while scanning: directory loop",
                    path.display()
                ));
                return Ok(0);
            }
            ancestors.push(key);
        }

        let mut total: u64 = 0;
        let mut walked = Ok(());
        for child in &children {
            match self.size_of(child, ancestors) {
                Ok(size) => total = total.saturating_add(size),
                Err(e) => {
                    walked = Err(e);
                    break;
                }
            }
        }

        if key.is_some() {
            ancestors.pop();
        }
        walked.map(|()| total)
    }
}
