//! Configuration options for copy sessions.
//!
//! This module provides [`CopyOptions`], which tunes how the copier streams
//! files and where diagnostics go.
//!
//! # Example
//!
//! ```
//! use fitcopy::CopyOptions;
//!
//! let options = CopyOptions::default()
//!     .with_chunk_size(64 * 1024)
//!     .without_fsync();
//! ```

/// Default copy chunk in bytes.
///
/// Cancellation is polled once per chunk, so this also bounds how much is
/// written after a cancellation request.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Options for copy sessions.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `chunk_size` | 1024 | Bytes per read/write |
/// | `fsync` | `true` | Sync each file to disk after its last chunk |
/// | `preserve_timestamps` | `true` | Copy file timestamps (mtime/atime) |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyOptions {
    /// Number of bytes read and written per step (default: 1024)
    pub chunk_size: usize,

    /// Whether to sync files to disk after writing (default: true)
    pub fsync: bool,

    /// Whether to preserve file timestamps (default: true)
    ///
    /// Applied after a file has been copied completely. Failures are
    /// reported as warnings and never fail the copy.
    pub preserve_timestamps: bool,

    /// Callback for warnings (optional)
    ///
    /// If not set and `tracing` feature is enabled, warnings are logged via tracing.
    /// Otherwise, warnings are silently ignored.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,

    /// Callback for per-entry progress lines (optional)
    ///
    /// Receives `copied <src> -> <dst> (<n> bytes)` and `created <dir>` lines.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub verbose_handler: Option<fn(&str)>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            fsync: true,
            preserve_timestamps: true,
            warn_handler: None,
            verbose_handler: None,
        }
    }
}

impl CopyOptions {
    /// Set the copy chunk size
    ///
    /// Value is clamped to at least 1 byte.
    #[must_use]
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    /// Disable fsync for faster (but less durable) copies
    #[must_use]
    pub fn without_fsync(mut self) -> Self {
        self.fsync = false;
        self
    }

    /// Disable timestamp preservation
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.preserve_timestamps = false;
        self
    }

    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Create options with a verbose handler
    #[must_use]
    pub fn with_verbose_handler(mut self, handler: fn(&str)) -> Self {
        self.verbose_handler = Some(handler);
        self
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }

    pub(crate) fn verbose(&self, msg: &str) {
        if let Some(handler) = self.verbose_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!("{}", msg);
        }
    }
}
