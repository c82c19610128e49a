//! Tests for tree metadata, flattening and expansion.

use datagrid::model::{Record, RowId};
use datagrid::source::{DataSourceConfig, FilterSpec, GridDataSource};
use datagrid::tree::{Hierarchy, TreeModel, VisibleRow};

/// ```text
/// a
///   a1
///     a1x
///   a2
/// b
/// c
///   c1
/// ```
fn rows() -> Vec<Record> {
    let leaf = |name: &str| Record::new().set("name", name);
    vec![
        Record::new().set("name", "a").set(
            "children",
            vec![
                Record::new()
                    .set("name", "a1")
                    .set("children", vec![leaf("a1x")]),
                leaf("a2"),
            ],
        ),
        leaf("b"),
        Record::new()
            .set("name", "c")
            .set("children", vec![leaf("c1")]),
    ]
}

fn source() -> GridDataSource<Record> {
    GridDataSource::new(rows(), DataSourceConfig::default().without_paginator())
}

fn names(rows: &[VisibleRow<Record>]) -> Vec<&str> {
    rows.iter()
        .map(|r| r.data.get_str("name").unwrap_or_default())
        .collect()
}

fn id(tree: &TreeModel<Record>, name: &str) -> RowId {
    tree.visible()
        .into_iter()
        .find(|r| r.data.get_str("name") == Some(name))
        .map(|r| r.id)
        .unwrap()
}

#[test]
fn test_build_metadata() {
    let source = source();
    let tree = TreeModel::build(source.rendered(), None);
    assert_eq!(tree.len(), 7);
    assert_eq!(tree.roots().len(), 3);

    // Pre-order ids: a=0, a1=1, a1x=2, a2=3, b=4, c=5, c1=6.
    let a1x = tree.meta(RowId::new(2)).unwrap();
    assert_eq!(a1x.level, 2);
    assert_eq!(a1x.parent, Some(RowId::new(1)));
    assert!(!a1x.has_children);

    let a = tree.meta(RowId::new(0)).unwrap();
    assert_eq!(a.level, 0);
    assert_eq!(a.parent, None);
    assert!(a.has_children);
    assert!(!a.expanded);
}

#[test]
fn test_collapsed_by_default() {
    let source = source();
    let tree = TreeModel::build(source.rendered(), None);
    assert_eq!(names(&tree.visible()), ["a", "b", "c"]);
    assert!(!tree.any_expanded());
    assert!(!tree.all_expanded());
}

#[test]
fn test_initial_expand_level() {
    let source = source();

    let tree = TreeModel::build(source.rendered(), Some(1));
    assert_eq!(names(&tree.visible()), ["a", "a1", "a2", "b", "c", "c1"]);

    let tree = TreeModel::build(source.rendered(), Some(2));
    assert_eq!(
        names(&tree.visible()),
        ["a", "a1", "a1x", "a2", "b", "c", "c1"]
    );

    let tree = TreeModel::build(source.rendered(), Some(0));
    assert_eq!(names(&tree.visible()), ["a", "b", "c"]);
}

#[test]
fn test_toggle_expands_one_level() {
    let source = source();
    let mut tree = TreeModel::build(source.rendered(), None);
    let a = id(&tree, "a");

    assert_eq!(tree.toggle(a), Some(true));
    assert_eq!(names(&tree.visible()), ["a", "a1", "a2", "b", "c"]);
    assert!(tree.any_expanded());
    assert!(!tree.all_expanded());

    assert_eq!(tree.toggle(a), Some(false));
    assert_eq!(names(&tree.visible()), ["a", "b", "c"]);
}

#[test]
fn test_collapsed_parent_hides_expanded_child() {
    let source = source();
    let mut tree = TreeModel::build(source.rendered(), Some(2));
    let a = id(&tree, "a");
    tree.toggle(a);
    assert_eq!(names(&tree.visible()), ["a", "b", "c", "c1"]);
    // a1 keeps its flag and shows its child again once a reopens.
    tree.toggle(a);
    assert_eq!(
        names(&tree.visible()),
        ["a", "a1", "a1x", "a2", "b", "c", "c1"]
    );
}

#[test]
fn test_toggle_leaf_or_unknown_is_noop() {
    let source = source();
    let mut tree = TreeModel::build(source.rendered(), None);
    let b = id(&tree, "b");
    assert_eq!(tree.toggle(b), None);
    assert_eq!(tree.toggle(RowId::new(999)), None);
    assert!(!tree.set_expanded(RowId::new(999), true));
    assert!(tree.expanded_rows().is_empty());
}

#[test]
fn test_expand_and_collapse_all() {
    let source = source();
    let mut tree = TreeModel::build(source.rendered(), None);

    tree.expand_all();
    assert!(tree.all_expanded());
    assert!(tree.any_expanded());
    assert_eq!(tree.visible().len(), 7);
    assert_eq!(tree.expanded_rows().len(), 3);

    tree.collapse_all();
    assert!(!tree.any_expanded());
    assert_eq!(tree.visible().len(), 3);
}

#[test]
fn test_any_and_all_expanded_are_independent() {
    let source = source();
    let mut tree = TreeModel::build(source.rendered(), None);
    let c = id(&tree, "c");
    tree.toggle(c);
    assert!(tree.any_expanded());
    assert!(!tree.all_expanded());
}

#[test]
fn test_all_expanded_without_expandable_roots() {
    let source = GridDataSource::new(
        vec![Record::new().set("name", "x")],
        DataSourceConfig::default(),
    );
    let tree = TreeModel::build(source.rendered(), Some(3));
    assert!(!tree.any_expanded());
    assert!(!tree.all_expanded());
}

#[test]
fn test_hierarchy_queries() {
    let source = source();
    let tree = TreeModel::build(source.rendered(), None);
    let a = RowId::new(0);
    assert_eq!(
        tree.descendants(a),
        [RowId::new(1), RowId::new(2), RowId::new(3)]
    );
    assert_eq!(tree.parent(RowId::new(2)), Some(RowId::new(1)));
    assert_eq!(tree.ancestors(RowId::new(2)), [RowId::new(1), a]);
    assert!(tree.contains(RowId::new(6)));
    assert!(!tree.contains(RowId::new(7)));
    assert!(tree.descendants(RowId::new(4)).is_empty());
}

#[test]
fn test_carry_expansion_across_rederive() {
    let mut source = source();
    let mut tree = TreeModel::build(source.rendered(), None);
    tree.toggle(RowId::new(0));

    source.set_filter(FilterSpec::recursive("a2", None));
    let mut next = TreeModel::build(source.rendered(), None);
    next.carry_expansion(&tree);
    assert_eq!(names(&next.visible()), ["a", "a2"]);
}

#[test]
fn test_tree_follows_recursive_filter() {
    let mut source = source();
    source.set_filter(FilterSpec::recursive("a1x", None));
    let mut tree = TreeModel::build(source.rendered(), None);
    tree.expand_all();
    assert_eq!(names(&tree.visible()), ["a", "a1", "a1x"]);
    assert!(!tree.meta(RowId::new(2)).unwrap().has_children);
}

#[test]
fn test_deep_tree_flattens() {
    let mut node = Record::new().set("name", "leaf");
    for depth in 0..500 {
        node = Record::new()
            .set("name", format!("n{}", depth))
            .set("children", vec![node]);
    }
    let source = GridDataSource::new(vec![node], DataSourceConfig::default());
    let mut tree = TreeModel::build(source.rendered(), None);
    tree.expand_all();
    assert_eq!(tree.visible().len(), 501);
    assert_eq!(tree.descendants(RowId::new(0)).len(), 500);
    assert_eq!(tree.meta(RowId::new(500)).unwrap().level, 500);
}
