//! Builder API for configuring a [`Controller`].
//!
//! The builder collects the destination volume, the filesystem capability,
//! the copy options and the completion callback, then hands them to a new
//! controller.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use fitcopy::{ControllerBuilder, CopyItem};
//!
//! let controller = ControllerBuilder::new("/mnt/card").build();
//! controller.execute_copy(vec![CopyItem::new("photos", "/mnt/card/photos")]);
//! ```
//!
//! ## With Options
//!
//! ```no_run
//! use fitcopy::ControllerBuilder;
//!
//! let controller = ControllerBuilder::new("/mnt/card")
//!     .chunk_size(64 * 1024)  // Larger chunks, coarser cancellation
//!     .no_fsync()             // Skip fsync for speed
//!     .on_complete(|outcome| println!("done: {}", outcome))
//!     .build();
//! ```

use crate::controller::{CompletionHandler, Controller};
use crate::fs::{FileSystem, LocalFs};
use crate::options::CopyOptions;
use crate::session::Outcome;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A builder for [`Controller`].
///
/// # Example
///
/// ```no_run
/// use fitcopy::{ControllerBuilder, Outcome};
///
/// let controller = ControllerBuilder::new("/mnt/card")
///     .quota(4 << 30)
///     .on_warning(|msg| eprintln!("Warning: {}", msg))
///     .on_complete(|outcome| assert_ne!(outcome, Outcome::CopyError))
///     .build();
/// ```
pub struct ControllerBuilder {
    volume_root: PathBuf,
    fs: Option<Arc<dyn FileSystem>>,
    quota: Option<u64>,
    options: CopyOptions,
    on_complete: Option<CompletionHandler>,
}

impl std::fmt::Debug for ControllerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerBuilder")
            .field("volume_root", &self.volume_root)
            .field("quota", &self.quota)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ControllerBuilder {
    /// Create a builder whose free space is measured on `volume_root`.
    ///
    /// Uses [`LocalFs`] and default [`CopyOptions`].
    pub fn new<P: AsRef<Path>>(volume_root: P) -> Self {
        Self {
            volume_root: volume_root.as_ref().to_path_buf(),
            fs: None,
            quota: None,
            options: CopyOptions::default(),
            on_complete: None,
        }
    }

    /// Use a custom filesystem capability instead of [`LocalFs`].
    ///
    /// [`quota`](Self::quota) has no effect on a custom filesystem.
    #[must_use]
    pub fn filesystem<F: FileSystem + 'static>(mut self, fs: F) -> Self {
        self.fs = Some(Arc::new(fs));
        self
    }

    /// Never report more than `bytes` free on the destination volume.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fitcopy::ControllerBuilder;
    ///
    /// // Leave the rest of the card alone
    /// let controller = ControllerBuilder::new("/mnt/card")
    ///     .quota(512 * 1024 * 1024)
    ///     .build();
    /// ```
    #[must_use]
    pub fn quota(mut self, bytes: u64) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Set the copy chunk size in bytes.
    #[must_use]
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.options = self.options.with_chunk_size(bytes);
        self
    }

    /// Disable fsync after each file.
    ///
    /// Faster, but a crash shortly after the copy can lose data.
    #[must_use]
    pub fn no_fsync(mut self) -> Self {
        self.options = self.options.without_fsync();
        self
    }

    /// Don't preserve file timestamps.
    #[must_use]
    pub fn no_timestamps(mut self) -> Self {
        self.options = self.options.without_timestamps();
        self
    }

    /// Set a handler for warning messages.
    ///
    /// Warnings cover IO failures that end a session, a full destination
    /// volume, directory loops skipped by the scan and timestamps that could
    /// not be preserved.
    #[must_use]
    pub fn on_warning(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_warn_handler(handler);
        self
    }

    /// Enable verbose output for detailed file operation information.
    ///
    /// The handler is called with messages for each file operation:
    /// - Copied files (src -> dst, bytes)
    /// - Created directories
    #[must_use]
    pub fn verbose(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_verbose_handler(handler);
        self
    }

    /// Replace all copy options at once.
    #[must_use]
    pub fn options(mut self, options: CopyOptions) -> Self {
        self.options = options;
        self
    }

    /// Register the completion callback.
    ///
    /// Called exactly once per accepted session, with its [`Outcome`],
    /// after the session state has been cleared. It runs on whichever thread
    /// resolved the session.
    #[must_use]
    pub fn on_complete<F>(mut self, handler: F) -> Self
    where
        F: Fn(Outcome) + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(handler));
        self
    }

    /// Build the controller.
    #[must_use]
    pub fn build(self) -> Controller {
        let fs = self.fs.unwrap_or_else(|| {
            let local = match self.quota {
                Some(bytes) => LocalFs::new().with_quota(bytes),
                None => LocalFs::new(),
            };
            Arc::new(local)
        });
        Controller::new(fs, self.volume_root, self.options, self.on_complete)
    }
}
