//! Tree metadata and flattening of hierarchical views.
//!
//! A [`TreeModel`] is built from the rendered view rows. It records each row's
//! level, parent and expansion flag, and flattens the hierarchy into the list
//! of rows that are visible given the current expansion.
//!
//! All walks use explicit stacks, so arbitrarily deep data is safe.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::model::{RowId, ViewRow};

/// Per-row tree metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeMeta {
    /// Depth of the row, 0 for roots.
    pub level: usize,
    /// Parent row, `None` for roots.
    pub parent: Option<RowId>,
    /// Whether the row has child rows in the view.
    pub has_children: bool,
    /// Whether the row's children are shown.
    pub expanded: bool,
}

/// A row of the flattened, displayed tree.
#[derive(Debug, Clone)]
pub struct VisibleRow<T> {
    pub id: RowId,
    pub data: Arc<T>,
    pub level: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// Read access to parent/child relations, used by selection propagation.
pub trait Hierarchy {
    /// Returns `true` if the row is part of the hierarchy.
    fn contains(&self, id: RowId) -> bool;

    /// Parent of a row, `None` for roots and unknown rows.
    fn parent(&self, id: RowId) -> Option<RowId>;

    /// All descendants of a row in depth-first pre-order.
    fn descendants(&self, id: RowId) -> Vec<RowId>;
}

/// Tree metadata for one rendered view.
///
/// # Example
///
/// ```
/// use datagrid::model::Record;
/// use datagrid::source::{DataSourceConfig, GridDataSource};
/// use datagrid::tree::TreeModel;
///
/// let rows = vec![Record::new()
///     .set("name", "root")
///     .set("children", vec![Record::new().set("name", "leaf")])];
/// let source = GridDataSource::new(rows, DataSourceConfig::default());
///
/// let mut tree = TreeModel::build(source.rendered(), None);
/// assert_eq!(tree.visible().len(), 1);
/// tree.expand_all();
/// assert_eq!(tree.visible().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TreeModel<T> {
    roots: Vec<RowId>,
    /// Every row in pre-order.
    order: Vec<RowId>,
    meta: HashMap<RowId, TreeMeta>,
    children: HashMap<RowId, Vec<RowId>>,
    data: HashMap<RowId, Arc<T>>,
    initial_expand_level: Option<usize>,
}

impl<T> TreeModel<T> {
    /// Builds tree metadata for `rows`.
    ///
    /// A row starts expanded when it has children and its level is below
    /// `initial_expand_level`; with `None` every row starts collapsed.
    pub fn build(rows: &[ViewRow<T>], initial_expand_level: Option<usize>) -> Self {
        let mut model = Self {
            roots: rows.iter().map(|r| r.id).collect(),
            order: Vec::new(),
            meta: HashMap::new(),
            children: HashMap::new(),
            data: HashMap::new(),
            initial_expand_level,
        };

        let mut stack: Vec<(&ViewRow<T>, Option<RowId>, usize)> =
            rows.iter().rev().map(|r| (r, None, 0)).collect();

        while let Some((row, parent, level)) = stack.pop() {
            let children = row.children();
            let has_children = !children.is_empty();
            let expanded = has_children && initial_expand_level.is_some_and(|max| level < max);

            model.order.push(row.id);
            model.meta.insert(
                row.id,
                TreeMeta {
                    level,
                    parent,
                    has_children,
                    expanded,
                },
            );
            model.data.insert(row.id, Arc::clone(&row.data));
            if has_children {
                model
                    .children
                    .insert(row.id, children.iter().map(|c| c.id).collect());
                stack.extend(children.iter().rev().map(|c| (c, Some(row.id), level + 1)));
            }
        }

        debug!(
            "Tree built: {} rows, {} roots, expand level {:?}",
            model.order.len(),
            model.roots.len(),
            initial_expand_level
        );
        model
    }

    /// Copies expansion flags from an earlier model for rows present in both.
    pub fn carry_expansion(&mut self, previous: &TreeModel<T>) {
        for (id, meta) in self.meta.iter_mut() {
            if let Some(old) = previous.meta.get(id) {
                meta.expanded = meta.has_children && old.expanded;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn roots(&self) -> &[RowId] {
        &self.roots
    }

    pub fn initial_expand_level(&self) -> Option<usize> {
        self.initial_expand_level
    }

    pub fn meta(&self, id: RowId) -> Option<&TreeMeta> {
        self.meta.get(&id)
    }

    pub fn data(&self, id: RowId) -> Option<&Arc<T>> {
        self.data.get(&id)
    }

    /// Direct children of a row.
    pub fn children(&self, id: RowId) -> &[RowId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Ancestors of a row, nearest first.
    pub fn ancestors(&self, id: RowId) -> Vec<RowId> {
        let mut ancestors = Vec::new();
        let mut current = self.meta.get(&id).and_then(|m| m.parent);
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.meta.get(&parent).and_then(|m| m.parent);
        }
        ancestors
    }

    pub fn is_expanded(&self, id: RowId) -> bool {
        self.meta.get(&id).is_some_and(|m| m.expanded)
    }

    /// `true` if any expandable root is expanded.
    pub fn any_expanded(&self) -> bool {
        self.expandable_roots().any(|m| m.expanded)
    }

    /// `true` if there is an expandable root and every one is expanded.
    pub fn all_expanded(&self) -> bool {
        let mut roots = self.expandable_roots().peekable();
        roots.peek().is_some() && roots.all(|m| m.expanded)
    }

    fn expandable_roots(&self) -> impl Iterator<Item = &TreeMeta> {
        self.roots
            .iter()
            .filter_map(|id| self.meta.get(id))
            .filter(|m| m.has_children)
    }

    /// Expanded rows in pre-order.
    pub fn expanded_rows(&self) -> Vec<RowId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.is_expanded(*id))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Expansion
    // -------------------------------------------------------------------------

    /// Sets a row's expansion. Returns `true` if the flag changed.
    ///
    /// Unknown rows and rows without children are left alone.
    pub fn set_expanded(&mut self, id: RowId, expanded: bool) -> bool {
        match self.meta.get_mut(&id) {
            Some(meta) if meta.has_children && meta.expanded != expanded => {
                meta.expanded = expanded;
                true
            }
            _ => false,
        }
    }

    /// Flips a row's expansion and returns the new state.
    ///
    /// `None` for unknown rows and rows without children.
    pub fn toggle(&mut self, id: RowId) -> Option<bool> {
        let meta = self.meta.get_mut(&id).filter(|m| m.has_children)?;
        meta.expanded = !meta.expanded;
        debug!("Row {} expanded: {}", id, meta.expanded);
        Some(meta.expanded)
    }

    /// Expands every row that has children.
    pub fn expand_all(&mut self) {
        for meta in self.meta.values_mut() {
            meta.expanded = meta.has_children;
        }
    }

    /// Collapses every row.
    pub fn collapse_all(&mut self) {
        for meta in self.meta.values_mut() {
            meta.expanded = false;
        }
    }

    // -------------------------------------------------------------------------
    // Flattening
    // -------------------------------------------------------------------------

    /// Rows to display, in pre-order, descending only into expanded rows.
    pub fn visible(&self) -> Vec<VisibleRow<T>> {
        let mut visible = Vec::new();
        let mut stack: Vec<RowId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let (Some(meta), Some(data)) = (self.meta.get(&id), self.data.get(&id)) else {
                continue;
            };
            visible.push(VisibleRow {
                id,
                data: Arc::clone(data),
                level: meta.level,
                has_children: meta.has_children,
                expanded: meta.expanded,
            });
            if meta.expanded {
                stack.extend(self.children(id).iter().rev().copied());
            }
        }
        visible
    }
}

impl<T> Hierarchy for TreeModel<T> {
    fn contains(&self, id: RowId) -> bool {
        self.meta.contains_key(&id)
    }

    fn parent(&self, id: RowId) -> Option<RowId> {
        self.meta.get(&id).and_then(|m| m.parent)
    }

    fn descendants(&self, id: RowId) -> Vec<RowId> {
        let mut descendants = Vec::new();
        let mut stack: Vec<RowId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            descendants.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        descendants
    }
}
