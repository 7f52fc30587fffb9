//! Selection model for data grids.
//!
//! [`SelectionModel`] tracks selected rows by [`RowKey`], never by position,
//! so selections survive filtering, sorting and paging. Only an explicit
//! [`clear_selection`](SelectionModel::clear_selection) or a dataset
//! replacement by the owner resets it.
//!
//! # Example
//!
//! ```
//! use gridline::{RowKey, SelectionModel, SelectionSummary};
//!
//! let mut selection = SelectionModel::new();
//! let page: Vec<RowKey> = (1..=5i64).map(RowKey::from).collect();
//!
//! selection.toggle_row(RowKey::Int(1));
//! assert_eq!(selection.summary_for(&page), SelectionSummary::Some);
//!
//! // Header checkbox from a partial state selects the rest of the page.
//! selection.toggle_all_visible(&page);
//! assert_eq!(selection.summary_for(&page), SelectionSummary::All);
//!
//! // Listen for changes
//! selection.selection_changed.connect(|(selected, deselected)| {
//!     println!("Selection changed: +{} -{}", selected.len(), deselected.len());
//! });
//! ```

use std::collections::HashSet;

use gridline_core::Signal;
use gridline_core::logging::targets;
use serde::{Deserialize, Serialize};

use super::value::RowKey;

/// Selection behavior mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// No rows can be selected.
    NoSelection,
    /// At most one row is selected at a time.
    SingleSelection,
    /// Any number of rows can be selected (default).
    #[default]
    MultiSelection,
}

/// Tri-state summary of how much of a visible set is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionSummary {
    /// None of the visible rows are selected (also used for an empty page).
    #[default]
    None,
    /// Some, but not all, visible rows are selected.
    Some,
    /// Every visible row is selected.
    All,
}

/// Check state for the header "select all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    /// Item is unchecked.
    #[default]
    Unchecked,
    /// Item is partially checked (for tri-state checkboxes).
    PartiallyChecked,
    /// Item is checked.
    Checked,
}

impl CheckState {
    /// Returns `true` if the item is checked (fully or partially).
    pub fn is_checked(&self) -> bool {
        !matches!(self, CheckState::Unchecked)
    }

    /// Returns `true` if the item is fully checked.
    pub fn is_fully_checked(&self) -> bool {
        matches!(self, CheckState::Checked)
    }
}

impl From<SelectionSummary> for CheckState {
    fn from(summary: SelectionSummary) -> Self {
        match summary {
            SelectionSummary::None => CheckState::Unchecked,
            SelectionSummary::Some => CheckState::PartiallyChecked,
            SelectionSummary::All => CheckState::Checked,
        }
    }
}

/// Manages the set of selected row keys.
///
/// # Signals
///
/// - `selection_changed`: Emitted when selection changes, with (selected, deselected) keys
pub struct SelectionModel {
    /// Current selection mode.
    mode: SelectionMode,

    /// Set of selected keys for O(1) lookup.
    selected_ids: HashSet<RowKey>,

    /// Selected keys in selection order.
    selected_keys: Vec<RowKey>,

    /// Emitted when selection changes. Args: (selected, deselected)
    pub selection_changed: Signal<(Vec<RowKey>, Vec<RowKey>)>,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SelectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionModel")
            .field("mode", &self.mode)
            .field("selected", &self.selected_keys)
            .finish()
    }
}

impl SelectionModel {
    /// Creates a new selection model in multi-selection mode.
    pub fn new() -> Self {
        Self::with_mode(SelectionMode::default())
    }

    /// Creates a new selection model with the given mode.
    pub fn with_mode(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected_ids: HashSet::new(),
            selected_keys: Vec::new(),
            selection_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Selection Mode
    // =========================================================================

    /// Gets the current selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.mode
    }

    /// Sets the selection mode.
    ///
    /// Switching to `NoSelection` clears the selection. Switching to
    /// `SingleSelection` keeps only the most recently selected key.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        let keep = match mode {
            SelectionMode::NoSelection => 0,
            SelectionMode::SingleSelection => 1,
            SelectionMode::MultiSelection => return,
        };
        if self.selected_keys.len() > keep {
            let split = self.selected_keys.len() - keep;
            let removed: Vec<RowKey> = self.selected_keys.drain(..split).collect();
            for key in &removed {
                self.selected_ids.remove(key);
            }
            self.notify(Vec::new(), removed);
        }
    }

    // =========================================================================
    // Selection Queries
    // =========================================================================

    /// Checks if a row is selected.
    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selected_ids.contains(key)
    }

    /// Returns true if any rows are selected.
    pub fn has_selection(&self) -> bool {
        !self.selected_keys.is_empty()
    }

    /// Returns the number of selected rows.
    pub fn selected_count(&self) -> usize {
        self.selected_keys.len()
    }

    /// Returns the selected keys in selection order.
    pub fn selected_keys(&self) -> &[RowKey] {
        &self.selected_keys
    }

    /// Summarizes how much of a visible set is selected.
    ///
    /// An empty visible set summarizes as `None`.
    pub fn summary_for(&self, visible: &[RowKey]) -> SelectionSummary {
        let selected = visible.iter().filter(|k| self.is_selected(k)).count();
        if selected == 0 {
            SelectionSummary::None
        } else if selected == visible.len() {
            SelectionSummary::All
        } else {
            SelectionSummary::Some
        }
    }

    // =========================================================================
    // Selection Operations
    // =========================================================================

    /// Flips the membership of exactly one key.
    ///
    /// In single-selection mode, selecting a key deselects the previous one.
    pub fn toggle_row(&mut self, key: RowKey) {
        if self.mode == SelectionMode::NoSelection {
            return;
        }

        if self.selected_ids.contains(&key) {
            self.remove_from_selection(&key);
            self.notify(Vec::new(), vec![key]);
            return;
        }

        let mut deselected = Vec::new();
        if self.mode == SelectionMode::SingleSelection {
            deselected = std::mem::take(&mut self.selected_keys);
            self.selected_ids.clear();
        }
        self.add_to_selection(key.clone());
        self.notify(vec![key], deselected);
    }

    /// Header checkbox behavior for the visible page.
    ///
    /// If every visible key is already selected, all of them are deselected.
    /// Otherwise the unselected ones are added and nothing is removed.
    /// Ignored outside multi-selection mode.
    pub fn toggle_all_visible(&mut self, visible: &[RowKey]) {
        if self.mode != SelectionMode::MultiSelection || visible.is_empty() {
            return;
        }

        if self.summary_for(visible) == SelectionSummary::All {
            let removed: Vec<RowKey> = visible.to_vec();
            for key in &removed {
                self.remove_from_selection(key);
            }
            self.notify(Vec::new(), removed);
        } else {
            let added: Vec<RowKey> = visible
                .iter()
                .filter(|k| !self.selected_ids.contains(*k))
                .cloned()
                .collect();
            for key in &added {
                self.add_to_selection(key.clone());
            }
            self.notify(added, Vec::new());
        }
    }

    /// Adds keys to the selection, skipping ones already selected.
    pub fn select(&mut self, keys: impl IntoIterator<Item = RowKey>) {
        match self.mode {
            SelectionMode::NoSelection => {}
            SelectionMode::SingleSelection => {
                if let Some(key) = keys.into_iter().last()
                    && !self.is_selected(&key)
                {
                    self.toggle_row(key);
                }
            }
            SelectionMode::MultiSelection => {
                let mut added = Vec::new();
                for key in keys {
                    if !self.selected_ids.contains(&key) {
                        self.add_to_selection(key.clone());
                        added.push(key);
                    }
                }
                self.notify(added, Vec::new());
            }
        }
    }

    /// Removes keys from the selection.
    pub fn deselect(&mut self, keys: impl IntoIterator<Item = RowKey>) {
        let mut removed = Vec::new();
        for key in keys {
            if self.selected_ids.contains(&key) {
                self.remove_from_selection(&key);
                removed.push(key);
            }
        }
        self.notify(Vec::new(), removed);
    }

    /// Drops selected keys that `keep` rejects.
    pub fn retain(&mut self, mut keep: impl FnMut(&RowKey) -> bool) {
        let removed: Vec<RowKey> = self
            .selected_keys
            .iter()
            .filter(|k| !keep(k))
            .cloned()
            .collect();
        self.deselect(removed);
    }

    /// Clears all selection.
    pub fn clear_selection(&mut self) {
        if self.selected_keys.is_empty() {
            return;
        }
        let removed = std::mem::take(&mut self.selected_keys);
        self.selected_ids.clear();
        self.notify(Vec::new(), removed);
    }

    fn add_to_selection(&mut self, key: RowKey) {
        if self.selected_ids.insert(key.clone()) {
            self.selected_keys.push(key);
        }
    }

    fn remove_from_selection(&mut self, key: &RowKey) {
        if self.selected_ids.remove(key) {
            self.selected_keys.retain(|k| k != key);
        }
    }

    fn notify(&self, selected: Vec<RowKey>, deselected: Vec<RowKey>) {
        if selected.is_empty() && deselected.is_empty() {
            return;
        }
        tracing::debug!(
            target: targets::SELECTION,
            selected = selected.len(),
            deselected = deselected.len(),
            total = self.selected_keys.len(),
            "selection changed"
        );
        self.selection_changed.emit((selected, deselected));
    }
}
