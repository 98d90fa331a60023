//! # fitcopy
//!
//! Cancellable recursive copying onto volumes that may not hold everything.
//!
//! ## Core Features
//!
//! - **Space-aware sessions**: Measures what a copy needs before writing anything
//! - **Interactive selection**: When the items don't fit, the caller picks a subset;
//!   a selection can never exceed the free space
//! - **Cooperative cancellation**: Observed between items, directory entries and
//!   chunks, and always reported as [`Outcome::Cancelled`], never as an IO failure
//! - **Coalesced progress**: Current-file and overall percentages, monotonic and
//!   bounded, emitted only when a whole percent changes
//! - **Exactly one outcome**: Every accepted session ends with one [`Outcome`]
//! - **Timestamp preserving**: Copies file modification and access times
//!
//! ## Quick Start with the Controller
//!
//! A session runs in three phases: scan, optional selection, copy. The
//! [`Controller`] drives them on a background thread and reports through
//! [`SessionEvent`]s.
//!
//! ```no_run
//! use fitcopy::{ControllerBuilder, CopyItem, SessionEvent};
//!
//! let controller = ControllerBuilder::new("/mnt/card").build();
//! let events = controller.subscribe();
//! controller.execute_copy(vec![CopyItem::new("/home/me/photos", "/mnt/card/photos")]);
//!
//! for event in events {
//!     match event {
//!         SessionEvent::Progress(p) => println!("{} {}%", p.current_file.display(), p.file_percent()),
//!         SessionEvent::Finished(outcome) => {
//!             println!("{}", outcome);
//!             break;
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Phase Functions
//!
//! Each phase is also available on its own, without threads or channels:
//!
//! ```no_run
//! use fitcopy::{copy_items, scan_items, CopyItem, CopyOptions, LocalFs, ScanDecision};
//! use std::path::Path;
//! use std::sync::atomic::AtomicBool;
//!
//! let fs = LocalFs::new();
//! let items = [CopyItem::new("docs", "/mnt/card/docs")];
//! let options = CopyOptions::default();
//! let cancel = AtomicBool::new(false);
//!
//! let report = scan_items(&fs, &items, Path::new("/mnt/card"), &cancel, &options)?;
//! if report.decision() == ScanDecision::CopyAll {
//!     let stats = copy_items(&fs, &items, report.total_required_bytes, &options, &cancel, &|_| {})?;
//!     println!("Copied {} files ({} bytes)", stats.files_copied, stats.bytes_copied);
//! }
//! # Ok::<(), fitcopy::Error>(())
//! ```
//!
//! ## Guarantees
//!
//! ### Space Accounting
//!
//! The required size is measured once per session. During selection the
//! selected total never exceeds the free space measured by the scan; a
//! toggle that would break this is rejected without changing anything.
//!
//! ### No Silent Partial Files
//!
//! Files are streamed directly to their destination. A cancelled or failed
//! copy leaves the file being written incomplete on disk and ends the
//! session with [`Outcome::Cancelled`] or [`Outcome::CopyError`], never
//! [`Outcome::Success`]. Nothing is rolled back.
//!
//! ### Loop Safety
//!
//! Directory loops through symlinks are skipped by the scan and reported as
//! [`Error::SymlinkLoop`] by the copy.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | [`ProgressBars`] rendering with indicatif |
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for options, items, progress and outcomes |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod controller;
mod copy;
mod error;
mod fs;
mod options;
mod progress;
mod scan;
mod select;
mod session;
mod utils;

pub use builder::ControllerBuilder;
pub use controller::{Controller, SessionEvent};
pub use copy::{CopyStats, copy_items};
pub use error::{Error, Result, is_no_space_error};
pub use fs::{FileSystem, LocalFs, ReadStream, WriteStream};
pub use options::{CopyOptions, DEFAULT_CHUNK_SIZE};
pub use progress::{CopyProgress, percent};
pub use scan::{ScanDecision, ScanReport, scan_items, scan_size};
pub use select::{Selection, Selector, Toggle};
pub use session::{CopyItem, Outcome, Phase, ScanEntry};

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::ProgressBars;
