//! Session controller: scan, optional selection, copy, outcome.
//!
//! A [`Controller`] owns at most one active session. [`Controller::execute_copy`]
//! starts it on a background thread; the caller follows along through the
//! [`SessionEvent`] channel returned by [`Controller::subscribe`] and, when
//! the items do not fit, drives the selection with [`Controller::toggle`],
//! [`Controller::confirm_selection`] and [`Controller::cancel_selection`].
//!
//! Every accepted session ends with exactly one [`Outcome`], delivered both
//! as [`SessionEvent::Finished`] and to the completion callback registered
//! with [`ControllerBuilder::on_complete`](crate::ControllerBuilder::on_complete).
//! Session state is cleared before the outcome is delivered, so a new
//! session can be started from inside the callback.
//!
//! # Example
//!
//! ```no_run
//! use fitcopy::{ControllerBuilder, CopyItem, Outcome, SessionEvent};
//!
//! let controller = ControllerBuilder::new("/mnt/card").build();
//! let events = controller.subscribe();
//!
//! controller.execute_copy(vec![
//!     CopyItem::new("/home/me/photos", "/mnt/card/photos"),
//!     CopyItem::new("/home/me/music", "/mnt/card/music"),
//! ]);
//!
//! for event in events {
//!     match event {
//!         SessionEvent::SelectionRequired { .. } => {
//!             // Keep whatever fits, in order
//!             let _ = controller.toggle(0);
//!             let _ = controller.toggle(1);
//!             let _ = controller.confirm_selection();
//!         }
//!         SessionEvent::Finished(outcome) => {
//!             assert_ne!(outcome, Outcome::CopyError);
//!             break;
//!         }
//!         _ => {}
//!     }
//! }
//! ```

use crate::copy::{CopyStats, copy_items};
use crate::error::{Error, Result, is_no_space_error};
use crate::fs::FileSystem;
use crate::options::CopyOptions;
use crate::progress::CopyProgress;
use crate::scan::{ScanDecision, scan_items};
use crate::select::{Selector, Toggle};
use crate::session::{CopyItem, Outcome, Phase, ScanEntry, SessionState};
use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

/// Completion callback, invoked once per accepted session.
pub(crate) type CompletionHandler = Box<dyn Fn(Outcome) + Send + Sync>;

/// Notification about the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The scan started for `items` items
    ScanStarted {
        /// Number of submitted items
        items: usize,
    },
    /// The items do not fit; the caller must select a subset
    SelectionRequired {
        /// Scanned entries, in submission order
        entries: Vec<ScanEntry>,
        /// Bytes needed to copy every entry
        required_bytes: u64,
        /// Free bytes on the destination volume
        available_bytes: u64,
    },
    /// The copy started
    CopyStarted {
        /// Number of items being copied
        items: usize,
        /// Bytes the copy is expected to write
        total_bytes: u64,
    },
    /// Progress tick
    Progress(CopyProgress),
    /// The copy completed without error
    CopyFinished(CopyStats),
    /// The session ended
    Finished(Outcome),
}

/// Handle to the copy session controller.
///
/// Cloning is cheap; every clone drives the same session.
#[derive(Clone)]
pub struct Controller {
    shared: Arc<Shared>,
}

struct Shared {
    fs: Arc<dyn FileSystem>,
    volume_root: PathBuf,
    options: CopyOptions,
    session: Mutex<Session>,
    events: Mutex<Option<Sender<SessionEvent>>>,
    on_complete: Option<CompletionHandler>,
}

#[derive(Default)]
struct Session {
    state: SessionState,
    selector: Option<Selector>,
    cancel: Arc<AtomicBool>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.lock();
        let state = &session.state;
        f.debug_struct("Controller")
            .field("volume_root", &self.shared.volume_root)
            .field("phase", &state.phase)
            .field("items", &state.items.len())
            .field("total_required_bytes", &state.total_required_bytes)
            .field("available_bytes", &state.available_bytes)
            .field("selected_bytes", &state.selected_bytes)
            .finish_non_exhaustive()
    }
}

impl Controller {
    pub(crate) fn new(
        fs: Arc<dyn FileSystem>,
        volume_root: PathBuf,
        options: CopyOptions,
        on_complete: Option<CompletionHandler>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                fs,
                volume_root,
                options,
                session: Mutex::new(Session::default()),
                events: Mutex::new(None),
                on_complete,
            }),
        }
    }

    /// Start a session copying `items`.
    ///
    /// An empty list resolves [`Outcome::Success`] immediately, on the
    /// calling thread, even while another session is active. That outcome
    /// goes through the same event channel and completion callback as the
    /// active session's, so callers that need to tell them apart should not
    /// submit empty lists mid-session.
    ///
    /// Returns `false` without side effects if a session is already active;
    /// otherwise the scan starts in the background and `true` is returned.
    pub fn execute_copy(&self, items: Vec<CopyItem>) -> bool {
        if items.is_empty() {
            self.deliver(Outcome::Success);
            return true;
        }

        let (generation, cancel) = {
            let mut session = self.lock();
            if !session.state.phase.accepts_new_session() {
                #[cfg(feature = "tracing")]
                tracing::debug!(phase = ?session.state.phase, "session busy, ignoring execute_copy");
                return false;
            }
            session.state.clear();
            session.state.generation += 1;
            session.state.items.clone_from(&items);
            session.state.phase = Phase::Scanning;
            session.selector = None;
            session.cancel = Arc::new(AtomicBool::new(false));
            (session.state.generation, Arc::clone(&session.cancel))
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(generation, items = items.len(), "scan started");
        self.emit(SessionEvent::ScanStarted { items: items.len() });

        let controller = self.clone();
        let spawned = thread::Builder::new()
            .name("fitcopy-scan".to_string())
            .spawn(move || controller.run_scan(generation, &items, &cancel));
        if let Err(e) = spawned {
            self.shared
                .options
                .warn(&format!("Failed to start scan thread: {}", e));
            self.finish(generation, Outcome::CopyError);
        }
        true
    }

    /// Current phase of the session.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lock().state.phase
    }

    /// Receive session events from now on.
    ///
    /// Only the most recent subscriber receives events. Outcomes of empty
    /// [`execute_copy`](Self::execute_copy) calls arrive on this channel
    /// too, interleaved with any active session's events.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        *self
            .shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    /// Toggle selection entry `index`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotSelecting`] outside the selection phase
    /// - [`Error::IndexOutOfRange`] if `index` does not name an entry
    pub fn toggle(&self, index: usize) -> Result<Toggle> {
        let mut guard = self.lock();
        let session = &mut *guard;
        let phase = session.state.phase;
        let selector = session
            .selector
            .as_mut()
            .ok_or(Error::NotSelecting { phase })?;
        let toggle = selector.toggle(index)?;
        session.state.selected_bytes = selector.selected_bytes();
        Ok(toggle)
    }

    /// Replace the pending selection with every entry that fits, in order.
    ///
    /// Returns the selected byte count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSelecting`] outside the selection phase.
    pub fn select_fitting(&self) -> Result<u64> {
        let mut guard = self.lock();
        let session = &mut *guard;
        let phase = session.state.phase;
        let selector = session
            .selector
            .as_mut()
            .ok_or(Error::NotSelecting { phase })?;
        *selector = Selector::fit_in_order(selector.entries().to_vec(), selector.available_bytes());
        session.state.selected_bytes = selector.selected_bytes();
        Ok(session.state.selected_bytes)
    }

    /// Read the pending selection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSelecting`] outside the selection phase.
    pub fn inspect_selection<R>(&self, f: impl FnOnce(&Selector) -> R) -> Result<R> {
        let session = self.lock();
        match session.selector {
            Some(ref selector) => Ok(f(selector)),
            None => Err(Error::NotSelecting {
                phase: session.state.phase,
            }),
        }
    }

    /// Copy the selected entries.
    ///
    /// An empty selection ends the session with [`Outcome::NoFileSelected`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSelecting`] outside the selection phase.
    pub fn confirm_selection(&self) -> Result<()> {
        let (generation, selection, cancel) = {
            let mut session = self.lock();
            let phase = session.state.phase;
            let selector = session.selector.take().ok_or(Error::NotSelecting { phase })?;
            let selection = selector.confirm();
            if !selection.items.is_empty() {
                session.state.items.clone_from(&selection.items);
                session.state.selected_bytes = selection.selected_bytes;
                session.state.phase = Phase::Copying;
            }
            (
                session.state.generation,
                selection,
                Arc::clone(&session.cancel),
            )
        };

        if selection.items.is_empty() {
            self.finish(generation, Outcome::NoFileSelected);
            return Ok(());
        }

        let controller = self.clone();
        let spawned = thread::Builder::new()
            .name("fitcopy-copy".to_string())
            .spawn(move || {
                controller.run_copy(
                    generation,
                    &selection.items,
                    selection.selected_bytes,
                    &cancel,
                );
            });
        if let Err(e) = spawned {
            self.shared
                .options
                .warn(&format!("Failed to start copy thread: {}", e));
            self.finish(generation, Outcome::CopyError);
        }
        Ok(())
    }

    /// Abandon the selection; the session ends with [`Outcome::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSelecting`] outside the selection phase.
    pub fn cancel_selection(&self) -> Result<()> {
        let (generation, outcome) = {
            let mut session = self.lock();
            let phase = session.state.phase;
            let selector = session.selector.take().ok_or(Error::NotSelecting { phase })?;
            (session.state.generation, selector.cancel())
        };
        self.finish(generation, outcome);
        Ok(())
    }

    /// Cancel whatever the session is doing.
    ///
    /// A scan or copy is asked to stop and resolves [`Outcome::Cancelled`]
    /// once the background thread observes the request; a pending selection
    /// is cancelled immediately. Returns `false` if no session is active.
    pub fn cancel(&self) -> bool {
        let phase = {
            let session = self.lock();
            let phase = session.state.phase;
            if matches!(phase, Phase::Scanning | Phase::Copying) {
                session.cancel.store(true, Ordering::Relaxed);
            }
            phase
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(?phase, "cancel requested");
        match phase {
            Phase::Scanning | Phase::Copying => true,
            // Lost a race with confirm or completion: nothing left to cancel
            Phase::Selecting => self.cancel_selection().is_ok(),
            Phase::Idle | Phase::Done => false,
        }
    }

    fn run_scan(&self, generation: u64, items: &[CopyItem], cancel: &AtomicBool) {
        let shared = &self.shared;
        let report = match scan_items(
            shared.fs.as_ref(),
            items,
            &shared.volume_root,
            cancel,
            &shared.options,
        ) {
            Ok(report) => report,
            Err(e) => {
                self.fail(generation, &e);
                return;
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            required = report.total_required_bytes,
            available = report.available_bytes,
            "scan finished"
        );

        let decision = report.decision();
        {
            let mut session = self.lock();
            if session.state.generation != generation {
                return;
            }
            // Cancelled between the last poll and the decision
            if cancel.load(Ordering::Relaxed) {
                drop(session);
                self.finish(generation, Outcome::Cancelled);
                return;
            }
            session.state.total_required_bytes = report.total_required_bytes;
            session.state.available_bytes = report.available_bytes;
            match decision {
                ScanDecision::CopyAll => {
                    session.state.selected_bytes = report.total_required_bytes;
                    session.state.phase = Phase::Copying;
                }
                ScanDecision::NoSpace => {}
                ScanDecision::Select => {
                    session.state.phase = Phase::Selecting;
                    session.selector = Some(Selector::new(
                        report.entries.clone(),
                        report.available_bytes,
                    ));
                    // Under the session lock, so no outcome can precede it
                    self.emit(SessionEvent::SelectionRequired {
                        entries: report.entries,
                        required_bytes: report.total_required_bytes,
                        available_bytes: report.available_bytes,
                    });
                    return;
                }
            }
        }

        match decision {
            // Continue on this thread: one background task per session
            ScanDecision::CopyAll => {
                self.run_copy(generation, items, report.total_required_bytes, cancel);
            }
            ScanDecision::NoSpace => self.finish(generation, Outcome::NoSpaceError),
            ScanDecision::Select => {}
        }
    }

    fn run_copy(&self, generation: u64, items: &[CopyItem], total_bytes: u64, cancel: &AtomicBool) {
        self.emit(SessionEvent::CopyStarted {
            items: items.len(),
            total_bytes,
        });

        let shared = &self.shared;
        let on_progress = |progress: &CopyProgress| {
            self.emit(SessionEvent::Progress(progress.clone()));
        };
        match copy_items(
            shared.fs.as_ref(),
            items,
            total_bytes,
            &shared.options,
            cancel,
            &on_progress,
        ) {
            Ok(stats) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    files = stats.files_copied,
                    bytes = stats.bytes_copied,
                    "copy finished"
                );
                self.emit(SessionEvent::CopyFinished(stats));
                self.finish(generation, Outcome::Success);
            }
            Err(e) => self.fail(generation, &e),
        }
    }

    fn fail(&self, generation: u64, error: &Error) {
        if !error.is_cancelled() {
            if error.io_source().is_some_and(is_no_space_error) {
                self.shared
                    .options
                    .warn(&format!("Destination volume full: {}", error));
            } else {
                self.shared.options.warn(&error.to_string());
            }
        }
        self.finish(generation, error.outcome());
    }

    /// Close session `generation` with `outcome`, unless it is already closed.
    fn finish(&self, generation: u64, outcome: Outcome) {
        {
            let mut session = self.lock();
            if session.state.generation != generation
                || session.state.phase.accepts_new_session()
            {
                return;
            }
            session.state.close();
            session.selector = None;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(generation, %outcome, "session finished");
        self.deliver(outcome);
    }

    fn deliver(&self, outcome: Outcome) {
        self.emit(SessionEvent::Finished(outcome));
        if let Some(ref on_complete) = self.shared.on_complete {
            on_complete(outcome);
        }
    }

    fn emit(&self, event: SessionEvent) {
        let events = self
            .shared
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(ref tx) = *events {
            // A dropped receiver only means nobody is listening
            let _ = tx.send(event);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.shared
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
