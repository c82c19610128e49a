//! Row selection with tri-state propagation through trees.
//!
//! Selection is tracked by [`RowId`], so it stays attached to a row while the
//! view is re-filtered, re-sorted or re-paged. For rows with descendants the
//! set membership is only a hint: checked and indeterminate states are always
//! recomputed from the descendants.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::RowId;
use crate::tree::Hierarchy;

/// Selection mode for the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// No selection allowed
    #[default]
    None,
    /// Selecting a row replaces the selection
    Single,
    /// Rows toggle independently; trees propagate to descendants and ancestors
    Multiple,
}

/// Emitted after every selection mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    /// The whole selection after the change, in row order.
    pub selected: Vec<RowId>,
    /// The row the user acted on; `None` for select-all and resets.
    pub last_changed: Option<RowId>,
}

/// Tracks selected rows for one grid.
///
/// # Example
///
/// ```
/// use datagrid::model::RowId;
/// use datagrid::selection::{SelectionController, SelectionMode};
///
/// let mut selection = SelectionController::new(SelectionMode::Single);
/// let (a, b) = (RowId::new(0), RowId::new(1));
/// selection.toggle(a, None);
/// selection.toggle(b, None);
/// assert_eq!(selection.selected(), vec![b]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    mode: SelectionMode,
    selected: HashSet<RowId>,
}

impl SelectionController {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: HashSet::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Changes the mode. Leaving multiple mode keeps at most one row.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        match mode {
            SelectionMode::None => self.selected.clear(),
            SelectionMode::Single if self.selected.len() > 1 => {
                let first = self.selected.iter().min().copied();
                self.selected.retain(|id| Some(*id) == first);
            }
            _ => {}
        }
    }

    /// Selected rows, sorted for deterministic ordering.
    pub fn selected(&self) -> Vec<RowId> {
        let mut ids: Vec<_> = self.selected.iter().copied().collect();
        ids.sort();
        ids
    }

    /// Raw set membership.
    pub fn is_selected(&self, id: RowId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Whether a row shows as checked.
    ///
    /// A row with descendants is checked only when it and all of its
    /// descendants are selected. Single mode reports plain membership.
    pub fn is_checked(&self, id: RowId, tree: Option<&dyn Hierarchy>) -> bool {
        if self.mode == SelectionMode::Single {
            return self.is_selected(id);
        }
        let descendants = tree.map(|t| t.descendants(id)).unwrap_or_default();
        self.is_selected(id) && descendants.iter().all(|d| self.is_selected(*d))
    }

    /// Whether some, but not all, of a row's descendants are selected.
    pub fn is_indeterminate(&self, id: RowId, tree: Option<&dyn Hierarchy>) -> bool {
        let Some(tree) = tree.filter(|_| self.mode != SelectionMode::Single) else {
            return false;
        };
        let descendants = tree.descendants(id);
        let count = self.count_selected(&descendants);
        count > 0 && count < descendants.len()
    }

    fn count_selected(&self, ids: &[RowId]) -> usize {
        ids.iter().filter(|id| self.is_selected(**id)).count()
    }

    /// `true` when `visible` is non-empty and every row in it is checked.
    pub fn all_checked(&self, visible: &[RowId], tree: Option<&dyn Hierarchy>) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.is_checked(*id, tree))
    }

    /// `true` when at least one row in `visible` is checked.
    pub fn some_checked(&self, visible: &[RowId], tree: Option<&dyn Hierarchy>) -> bool {
        visible.iter().any(|id| self.is_checked(*id, tree))
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Acts on a user click on a row's selection control.
    ///
    /// Single mode replaces the selection with the row. Multiple mode flips a
    /// leaf, or sets a whole subtree to the opposite of the row's checked
    /// state, then re-derives every ancestor. Returns `None` when selection
    /// is disabled.
    pub fn toggle(&mut self, id: RowId, tree: Option<&dyn Hierarchy>) -> Option<SelectionChange> {
        match self.mode {
            SelectionMode::None => return None,
            SelectionMode::Single => {
                self.selected.clear();
                self.selected.insert(id);
            }
            SelectionMode::Multiple => {
                let descendants = tree.map(|t| t.descendants(id)).unwrap_or_default();
                if descendants.is_empty() {
                    if !self.selected.remove(&id) {
                        self.selected.insert(id);
                    }
                } else {
                    let target = !self.is_checked(id, tree);
                    for row in std::iter::once(id).chain(descendants) {
                        self.set(row, target);
                    }
                }
                if let Some(tree) = tree {
                    self.sync_ancestors(id, tree);
                }
            }
        }
        debug!("Row {} toggled, {} rows selected", id, self.selected.len());
        Some(self.change(Some(id)))
    }

    /// Checks every visible row, or unchecks them all when all are checked.
    ///
    /// With a hierarchy, each visible row's subtree follows the row.
    pub fn toggle_all(
        &mut self,
        visible: &[RowId],
        tree: Option<&dyn Hierarchy>,
    ) -> Option<SelectionChange> {
        if self.mode != SelectionMode::Multiple {
            return None;
        }
        let target = !self.all_checked(visible, tree);
        for id in visible {
            self.set(*id, target);
        }
        if let Some(tree) = tree {
            // Collapsed rows carry their hidden subtrees along.
            for id in visible {
                for descendant in tree.descendants(*id) {
                    self.set(descendant, target);
                }
            }
            for id in visible {
                self.sync_ancestors(*id, tree);
            }
        }
        debug!("Select all visible: {} ({} rows)", target, visible.len());
        Some(self.change(None))
    }

    /// Deselects everything.
    pub fn clear(&mut self) -> Option<SelectionChange> {
        if self.selected.is_empty() {
            return None;
        }
        self.selected.clear();
        Some(self.change(None))
    }

    fn set(&mut self, id: RowId, selected: bool) {
        if selected {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
    }

    /// Walks from the row's parent upward, re-deriving each ancestor's
    /// membership from its descendants.
    fn sync_ancestors(&mut self, id: RowId, tree: &dyn Hierarchy) {
        let mut current = tree.parent(id);
        while let Some(ancestor) = current {
            let descendants = tree.descendants(ancestor);
            let count = self.count_selected(&descendants);
            self.set(ancestor, count > 0 && count == descendants.len());
            current = tree.parent(ancestor);
        }
    }

    fn change(&self, last_changed: Option<RowId>) -> SelectionChange {
        SelectionChange {
            selected: self.selected(),
            last_changed,
        }
    }
}
