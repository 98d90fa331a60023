//! Selection phase: reduce the item set until it fits.
//!
//! The [`Selector`] is pure bookkeeping. It tracks which scanned entries are
//! selected and enforces the admission rule: an entry can only be selected
//! if its size fits in the space left by the entries already selected, so
//! the selected total never exceeds the available space.
//!
//! # Example
//!
//! ```
//! use fitcopy::{CopyItem, ScanEntry, Selector, Toggle};
//!
//! let entry = |name: &str, size| ScanEntry {
//!     item: CopyItem::new(name, name),
//!     size_bytes: size,
//!     label: name.to_string(),
//! };
//! let mut selector = Selector::new(vec![entry("a", 10), entry("b", 20), entry("c", 5)], 15);
//!
//! assert_eq!(selector.toggle(2)?, Toggle::Selected);
//! assert_eq!(selector.toggle(0)?, Toggle::Selected);
//! assert_eq!(selector.toggle(1)?, Toggle::Rejected);
//!
//! let selection = selector.confirm();
//! assert_eq!(selection.selected_bytes, 15);
//! assert_eq!(selection.items.len(), 2);
//! # Ok::<(), fitcopy::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::session::{CopyItem, Outcome, ScanEntry};

/// Effect of [`Selector::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The entry was added to the selection
    Selected,
    /// The entry was removed from the selection
    Deselected,
    /// The entry does not fit in the remaining space; nothing changed
    Rejected,
}

/// Items kept by a confirmed selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Selected items, in their original order
    pub items: Vec<CopyItem>,
    /// Sum of the selected entries' sizes
    pub selected_bytes: u64,
}

/// In-memory selection state for one session.
#[derive(Debug, Clone)]
pub struct Selector {
    entries: Vec<ScanEntry>,
    selected: Vec<bool>,
    available_bytes: u64,
    selected_bytes: u64,
}

impl Selector {
    /// Start a selection with nothing selected.
    #[must_use]
    pub fn new(entries: Vec<ScanEntry>, available_bytes: u64) -> Self {
        let selected = vec![false; entries.len()];
        Self {
            entries,
            selected,
            available_bytes,
            selected_bytes: 0,
        }
    }

    /// Start a selection by admitting `indices` in order.
    ///
    /// Indices that do not fit, are out of range or repeat are left
    /// unselected.
    #[must_use]
    pub fn with_preselected(
        entries: Vec<ScanEntry>,
        available_bytes: u64,
        indices: impl IntoIterator<Item = usize>,
    ) -> Self {
        let mut selector = Self::new(entries, available_bytes);
        for index in indices {
            if !selector.is_selected(index) {
                let _ = selector.toggle(index);
            }
        }
        selector
    }

    /// Preselect greedily in list order: every entry that still fits.
    #[must_use]
    pub fn fit_in_order(entries: Vec<ScanEntry>, available_bytes: u64) -> Self {
        let len = entries.len();
        Self::with_preselected(entries, available_bytes, 0..len)
    }

    /// Flip the selection state of entry `index`.
    ///
    /// Deselecting always succeeds. Selecting succeeds only if the entry fits
    /// in [`remaining_bytes`](Self::remaining_bytes); otherwise the state is
    /// left untouched and [`Toggle::Rejected`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index` does not name an entry.
    pub fn toggle(&mut self, index: usize) -> Result<Toggle> {
        let size = self
            .entries
            .get(index)
            .map(|entry| entry.size_bytes)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })?;

        if self.selected[index] {
            self.selected[index] = false;
            self.selected_bytes -= size;
            return Ok(Toggle::Deselected);
        }

        if size > self.remaining_bytes() {
            return Ok(Toggle::Rejected);
        }
        self.selected[index] = true;
        self.selected_bytes += size;
        Ok(Toggle::Selected)
    }

    /// Whether entry `index` is selected (false for unknown indices).
    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    /// Whether toggling entry `index` would take effect.
    ///
    /// Selected entries can always be deselected; unselected ones are
    /// admissible while they fit in the remaining space.
    #[must_use]
    pub fn is_admissible(&self, index: usize) -> bool {
        match self.entries.get(index) {
            Some(entry) => {
                self.selected[index] || entry.size_bytes <= self.remaining_bytes()
            }
            None => false,
        }
    }

    /// Free bytes left after the current selection.
    #[must_use]
    pub fn remaining_bytes(&self) -> u64 {
        self.available_bytes - self.selected_bytes
    }

    /// Sum of the selected entries' sizes.
    #[must_use]
    pub fn selected_bytes(&self) -> u64 {
        self.selected_bytes
    }

    /// Free bytes on the destination volume at scan time.
    #[must_use]
    pub fn available_bytes(&self) -> u64 {
        self.available_bytes
    }

    /// Scanned entries, in submission order.
    #[must_use]
    pub fn entries(&self) -> &[ScanEntry] {
        &self.entries
    }

    /// Commit the selection.
    #[must_use]
    pub fn confirm(self) -> Selection {
        let items = self
            .entries
            .into_iter()
            .zip(self.selected)
            .filter_map(|(entry, selected)| selected.then_some(entry.item))
            .collect();
        Selection {
            items,
            selected_bytes: self.selected_bytes,
        }
    }

    /// Abandon the selection.
    #[must_use]
    pub fn cancel(self) -> Outcome {
        Outcome::Cancelled
    }
}
