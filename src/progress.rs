//! Progress reporting for the copy phase.
//!
//! The copier never renders anything: it hands [`CopyProgress`] snapshots to
//! a callback (the controller forwards them as session events). Rendering
//! with indicatif is available behind the `progress` feature.

use std::path::PathBuf;

/// Snapshot of copy progress, emitted as a tick.
///
/// Within one run `overall_bytes_done` never decreases, and within one file
/// `current_file_bytes_done` never decreases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyProgress {
    /// File being copied, relative to the parent of its item's source
    pub current_file: PathBuf,
    /// Bytes of the current file written so far
    pub current_file_bytes_done: u64,
    /// Size of the current file when it was opened
    pub current_file_total_bytes: u64,
    /// Bytes written across the whole run
    pub overall_bytes_done: u64,
    /// Bytes the run is expected to write
    pub overall_total_bytes: u64,
}

impl CopyProgress {
    /// Whole percent of the current file, in `0..=100`.
    #[must_use]
    pub fn file_percent(&self) -> u8 {
        percent(self.current_file_bytes_done, self.current_file_total_bytes)
    }

    /// Whole percent of the run, in `0..=100`.
    #[must_use]
    pub fn overall_percent(&self) -> u8 {
        percent(self.overall_bytes_done, self.overall_total_bytes)
    }
}

/// `floor(done * 100 / total)` clamped to 100. A zero total is complete.
#[must_use]
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (u128::from(done) * 100 / u128::from(total)).min(100);
    // Clamped to 100 above
    pct as u8
}

/// Accumulates byte counts and decides when a tick is worth emitting.
///
/// A tick goes out when a file starts and whenever the whole-percent pair
/// (file, overall) changes, which coalesces per-chunk updates.
pub(crate) struct ProgressTracker<'a> {
    sink: &'a dyn Fn(&CopyProgress),
    current: CopyProgress,
    last: Option<(u8, u8)>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(total_bytes: u64, sink: &'a dyn Fn(&CopyProgress)) -> Self {
        Self {
            sink,
            current: CopyProgress {
                overall_total_bytes: total_bytes,
                ..CopyProgress::default()
            },
            last: None,
        }
    }

    pub fn start_file(&mut self, display: PathBuf, total_bytes: u64) {
        self.current.current_file = display;
        self.current.current_file_bytes_done = 0;
        self.current.current_file_total_bytes = total_bytes;
        self.last = None;
        self.emit_if_changed();
    }

    pub fn advance(&mut self, bytes: u64) {
        self.current.current_file_bytes_done =
            self.current.current_file_bytes_done.saturating_add(bytes);
        self.current.overall_bytes_done = self.current.overall_bytes_done.saturating_add(bytes);
        self.emit_if_changed();
    }

    /// Close a successful run: the last tick reports 100% overall.
    ///
    /// If sources shrank after the scan, the total is lowered to what was
    /// actually written.
    pub fn finish(&mut self) {
        if self.current.overall_percent() < 100 {
            self.current.overall_total_bytes = self.current.overall_bytes_done;
            (self.sink)(&self.current);
        }
    }

    pub fn bytes_done(&self) -> u64 {
        self.current.overall_bytes_done
    }

    fn emit_if_changed(&mut self) {
        let key = (self.current.file_percent(), self.current.overall_percent());
        if self.last != Some(key) {
            self.last = Some(key);
            (self.sink)(&self.current);
        }
    }
}

#[cfg(feature = "progress")]
pub use bars::ProgressBars;

#[cfg(feature = "progress")]
mod bars {
    use super::CopyProgress;
    use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

    /// Current-file and overall bars driven by [`CopyProgress`] ticks.
    pub struct ProgressBars {
        multi: MultiProgress,
        file: ProgressBar,
        overall: Option<ProgressBar>,
    }

    impl ProgressBars {
        /// Create the bars. The overall bar is only shown when more than
        /// one item is copied.
        #[must_use]
        pub fn new(items: usize) -> Self {
            let multi = MultiProgress::new();
            let file = multi.add(ProgressBar::new(100));
            file.set_style(style("{wide_msg} [{bar:30.cyan/blue}] {pos:>3}%"));
            let overall = (items > 1).then(|| {
                let bar = multi.add(ProgressBar::new(100));
                bar.set_style(style("overall [{bar:30.green/white}] {pos:>3}%"));
                bar
            });
            Self {
                multi,
                file,
                overall,
            }
        }

        /// Render a tick.
        pub fn update(&self, progress: &CopyProgress) {
            self.file
                .set_message(progress.current_file.display().to_string());
            self.file.set_position(u64::from(progress.file_percent()));
            if let Some(ref overall) = self.overall {
                overall.set_position(u64::from(progress.overall_percent()));
            }
        }

        /// Remove the bars from the terminal.
        pub fn finish_and_clear(&self) {
            self.file.finish_and_clear();
            if let Some(ref overall) = self.overall {
                overall.finish_and_clear();
            }
            let _ = self.multi.clear();
        }
    }

    fn style(template: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}
