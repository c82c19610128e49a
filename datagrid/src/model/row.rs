//! Row identity, the row capability trait and the ingested row store.

use std::sync::Arc;

use super::Value;

/// Trait for host records that can be displayed as grid rows.
///
/// Implement this trait to let the engine read fields, discover child rows and
/// search a row's text. [`Record`](super::Record) implements it for dynamic data.
///
/// # Example
///
/// ```
/// use datagrid::model::{RowData, Value};
///
/// #[derive(Clone, Debug)]
/// struct FileNode {
///     name: Value,
///     children: Vec<FileNode>,
/// }
///
/// impl RowData for FileNode {
///     fn field(&self, name: &str) -> Option<&Value> {
///         (name == "name").then_some(&self.name)
///     }
///
///     fn children(&self, key: &str) -> Option<&[Self]> {
///         (key == "children" && !self.children.is_empty()).then_some(&self.children)
///     }
///
///     fn search_text(&self) -> String {
///         self.name.display()
///     }
/// }
/// ```
pub trait RowData: Clone + Send + Sync + 'static {
    /// Value of a named field, used by the default sort accessor.
    fn field(&self, name: &str) -> Option<&Value>;

    /// Child rows stored under `key`. `None` or an empty slice for leaves.
    fn children(&self, key: &str) -> Option<&[Self]>;

    /// Full serialization of the row, searched by the default filter predicate.
    fn search_text(&self) -> String;
}

/// Identity of an ingested row.
///
/// Ids are assigned in depth-first pre-order when a row set is ingested, so
/// two structurally identical rows are still distinct, and a parent's id is
/// always smaller than the ids of its descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub(crate) usize);

impl RowId {
    /// Creates an id from a raw index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index of this id.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A row of the rendered view.
///
/// `children` holds the child rows that belong to this view: all of them in
/// flat filter mode, only the surviving ones after a recursive filter. It is
/// `None` when there are none, never an empty vec.
#[derive(Debug, Clone)]
pub struct ViewRow<T> {
    pub id: RowId,
    pub data: Arc<T>,
    pub children: Option<Vec<ViewRow<T>>>,
}

impl<T> ViewRow<T> {
    /// Returns the child rows, or an empty slice.
    pub fn children(&self) -> &[ViewRow<T>] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Returns `true` if this row has children in the view.
    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }
}

#[derive(Debug)]
struct StoredRow<T> {
    data: Arc<T>,
    children: Vec<RowId>,
}

/// All rows of one ingested data set, indexed by [`RowId`].
#[derive(Debug)]
pub(crate) struct RowStore<T> {
    nodes: Vec<StoredRow<T>>,
    roots: Vec<RowId>,
}

impl<T: RowData> RowStore<T> {
    /// Ingests `rows`, walking children stored under `children_key`.
    pub fn ingest(rows: Vec<T>, children_key: &str) -> Self {
        let mut nodes: Vec<StoredRow<T>> = Vec::new();
        let mut roots = Vec::with_capacity(rows.len());

        // Explicit stack: depth is controlled by the host data.
        let mut stack: Vec<(T, Option<RowId>)> =
            rows.into_iter().rev().map(|row| (row, None)).collect();

        while let Some((row, parent)) = stack.pop() {
            let id = RowId(nodes.len());
            match parent {
                Some(parent) => nodes[parent.0].children.push(id),
                None => roots.push(id),
            }
            if let Some(children) = row.children(children_key) {
                stack.extend(children.iter().rev().cloned().map(|c| (c, Some(id))));
            }
            nodes.push(StoredRow {
                data: Arc::new(row),
                children: Vec::new(),
            });
        }

        Self { nodes, roots }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn roots(&self) -> &[RowId] {
        &self.roots
    }

    pub fn data(&self, id: RowId) -> Option<&Arc<T>> {
        self.nodes.get(id.0).map(|n| &n.data)
    }

    pub fn children(&self, id: RowId) -> &[RowId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    /// Builds view rows for `roots`, keeping only descendants with `keep[id]`.
    ///
    /// Walks ids in reverse pre-order so every child is built before its parent.
    pub fn build_view(&self, roots: &[RowId], keep: &[bool]) -> Vec<ViewRow<T>> {
        let mut built: Vec<Option<ViewRow<T>>> = Vec::with_capacity(self.nodes.len());
        built.resize_with(self.nodes.len(), || None);

        for index in (0..self.nodes.len()).rev() {
            if !keep.get(index).copied().unwrap_or(false) {
                continue;
            }
            let node = &self.nodes[index];
            let children: Vec<ViewRow<T>> = node
                .children
                .iter()
                .filter_map(|child| built[child.0].take())
                .collect();
            built[index] = Some(ViewRow {
                id: RowId(index),
                data: Arc::clone(&node.data),
                children: (!children.is_empty()).then_some(children),
            });
        }

        roots.iter().filter_map(|id| built[id.0].take()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn tree() -> Vec<Record> {
        let leaf = |name: &str| Record::new().set("name", name);
        vec![
            Record::new()
                .set("name", "a")
                .set("children", vec![leaf("a1"), leaf("a2")]),
            leaf("b"),
        ]
    }

    #[test]
    fn test_ingest_assigns_preorder_ids() {
        let store = RowStore::ingest(tree(), "children");
        assert_eq!(store.len(), 4);
        assert_eq!(store.roots(), &[RowId(0), RowId(3)]);
        assert_eq!(store.children(RowId(0)), &[RowId(1), RowId(2)]);
        assert_eq!(
            store.data(RowId(2)).unwrap().get_str("name"),
            Some("a2")
        );
    }

    #[test]
    fn test_build_view_drops_empty_children() {
        let store = RowStore::ingest(tree(), "children");
        let keep = [true, false, false, true];
        let view = store.build_view(store.roots(), &keep);
        assert_eq!(view.len(), 2);
        assert!(view[0].children.is_none());
    }
}
