//! Tests for the grid orchestrator.

use datagrid::grid::{Grid, GridConfig, GridEvent, TreeConfig};
use datagrid::layout::ColumnSpec;
use datagrid::model::{Record, RowId};
use datagrid::pagination::{PageEvent, PageItem};
use datagrid::selection::SelectionMode;
use datagrid::source::{DataSourceConfig, FilterSpec, SortDirection, SortState};

fn columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("name", "Name").sortable().resizable().frozen(),
        ColumnSpec::new("size", "Size").sortable(),
        ColumnSpec::new("owner", "Owner"),
        ColumnSpec::custom("Actions").fill(),
    ]
}

fn files() -> Vec<Record> {
    let file = |name: &str, size: i64| Record::new().set("name", name).set("size", size);
    vec![
        Record::new().set("name", "src").set("size", 0i64).set(
            "children",
            vec![file("main.rs", 120), file("lib.rs", 80)],
        ),
        file("Cargo.toml", 20),
        Record::new()
            .set("name", "tests")
            .set("size", 0i64)
            .set("children", vec![file("grid.rs", 50)]),
    ]
}

fn numbered(count: usize) -> Vec<Record> {
    (0..count)
        .map(|n| Record::new().set("name", format!("row {:02}", n)).set("size", n as i64))
        .collect()
}

fn names(grid: &Grid<Record>) -> Vec<String> {
    grid.visible_rows()
        .iter()
        .map(|r| r.data.get_str("name").unwrap_or_default().to_string())
        .collect()
}

fn tree_grid() -> Grid<Record> {
    Grid::new(
        files(),
        columns(),
        GridConfig::default()
            .with_selection(SelectionMode::Multiple)
            .with_tree(TreeConfig::default()),
    )
}

// =============================================================================
// Sort
// =============================================================================

#[test]
fn test_header_clicks_cycle_sort() {
    let mut grid = Grid::new(files(), columns(), GridConfig::default());
    let original = names(&grid);

    assert!(grid.toggle_sort(1, false).unwrap());
    assert_eq!(grid.sort_direction(1), Some(SortDirection::Asc));
    assert_eq!(names(&grid), ["src", "tests", "Cargo.toml"]);

    grid.toggle_sort(1, false).unwrap();
    assert_eq!(grid.sort_direction(1), Some(SortDirection::Desc));
    assert_eq!(names(&grid), ["Cargo.toml", "src", "tests"]);

    grid.toggle_sort(1, false).unwrap();
    assert_eq!(grid.sort_direction(1), None);
    assert_eq!(names(&grid), original);

    let sorts: Vec<_> = grid
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            GridEvent::SortChange(sort) => Some(sort),
            _ => None,
        })
        .collect();
    assert_eq!(sorts.len(), 3);
    assert!(sorts[2].is_empty());
}

#[test]
fn test_multi_sort_keeps_other_keys() {
    let mut grid = Grid::new(files(), columns(), GridConfig::default());
    grid.toggle_sort(1, false).unwrap();
    grid.toggle_sort(0, true).unwrap();
    assert_eq!(
        grid.source().sort(),
        &SortState::asc("size").then_asc("name")
    );
    // Ties on size 0 are broken by name.
    assert_eq!(names(&grid), ["src", "tests", "Cargo.toml"]);

    grid.toggle_sort(0, false).unwrap();
    assert_eq!(grid.source().sort(), &SortState::desc("name"));
}

#[test]
fn test_non_sortable_and_custom_columns_ignore_clicks() {
    let mut grid = Grid::new(files(), columns(), GridConfig::default());
    assert!(!grid.toggle_sort(2, false).unwrap());
    assert!(!grid.toggle_sort(3, false).unwrap());
    assert!(grid.source().sort().is_empty());
    assert!(grid.take_events().is_empty());
    assert!(grid.toggle_sort(9, false).is_err());
}

// =============================================================================
// Paging
// =============================================================================

#[test]
fn test_paging_emits_events() {
    let mut grid = Grid::new(numbered(42), columns(), GridConfig::default());
    assert_eq!(grid.visible_rows().len(), 10);

    let event = grid.next_page().unwrap();
    assert_eq!(event, PageEvent { page_index: 1, page_size: 10 });
    assert_eq!(names(&grid)[0], "row 10");
    assert_eq!(grid.pagination().range_label(), "11 - 20 of 42");

    grid.last_page();
    assert_eq!(grid.visible_rows().len(), 2);
    assert_eq!(grid.next_page().unwrap().page_index, 4);

    let pages: Vec<_> = grid
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, GridEvent::PageChange(_)))
        .collect();
    assert_eq!(pages.len(), 3);
}

#[test]
fn test_page_size_change_keeps_first_row() {
    let config = GridConfig::default().with_data_source(DataSourceConfig::default());
    let mut grid = Grid::new(numbered(12), columns(), config);
    grid.set_page_size(5);
    grid.go_to_page(1);
    assert_eq!(names(&grid)[0], "row 05");

    let event = grid.set_page_size(10).unwrap();
    assert_eq!(event.page_index, 0);
    assert_eq!(names(&grid)[0], "row 00");

    assert!(grid.set_page_size(0).is_none());
    assert_eq!(grid.source().page_size(), 10);
}

#[test]
fn test_page_items_follow_filtered_length() {
    let mut grid = Grid::new(numbered(100), columns(), GridConfig::default());
    assert_eq!(grid.page_items().last(), Some(&PageItem::Page(10)));
    grid.set_filter("row 1");
    assert_eq!(grid.source().filtered_length(), 10);
    assert_eq!(grid.page_items(), [PageItem::Page(1)]);
}

#[test]
fn test_filter_pulls_page_back_in_range() {
    let mut grid = Grid::new(numbered(50), columns(), GridConfig::default());
    grid.last_page();
    grid.take_events();
    grid.set_filter("row 0");
    assert_eq!(grid.source().page_index(), 0);
    assert_eq!(
        grid.take_events(),
        [GridEvent::PageChange(PageEvent { page_index: 0, page_size: 10 })]
    );
}

#[test]
fn test_paging_disabled_without_paginator() {
    let config =
        GridConfig::default().with_data_source(DataSourceConfig::default().without_paginator());
    let mut grid = Grid::new(numbered(30), columns(), config);
    assert_eq!(grid.visible_rows().len(), 30);
    assert!(grid.next_page().is_none());
}

// =============================================================================
// Tree and expansion
// =============================================================================

#[test]
fn test_tree_expansion_events() {
    let mut grid = tree_grid();
    assert_eq!(names(&grid), ["src", "Cargo.toml", "tests"]);

    let src = RowId::new(0);
    assert_eq!(grid.toggle_expanded(src), Some(true));
    assert_eq!(names(&grid), ["src", "main.rs", "lib.rs", "Cargo.toml", "tests"]);
    assert!(grid.any_expanded());
    assert!(!grid.all_expanded());

    assert_eq!(
        grid.take_events(),
        [
            GridEvent::RowExpandChange {
                row: src,
                expanded: true
            },
            GridEvent::ExpandedRowsChange(vec![src]),
        ]
    );

    grid.expand_all();
    assert!(grid.all_expanded());
    assert_eq!(grid.visible_rows().len(), 6);
    grid.collapse_all();
    assert!(!grid.any_expanded());
}

#[test]
fn test_expansion_survives_sort_and_filter() {
    let mut grid = tree_grid();
    grid.toggle_expanded(RowId::new(0));
    grid.toggle_sort(0, false).unwrap();
    assert_eq!(
        names(&grid),
        ["Cargo.toml", "src", "main.rs", "lib.rs", "tests"]
    );
    grid.set_filter(FilterSpec::recursive("main", None));
    assert_eq!(names(&grid), ["src", "main.rs"]);
}

#[test]
fn test_new_data_resets_derived_state() {
    let mut grid = tree_grid();
    grid.toggle_expanded(RowId::new(0));
    grid.toggle_row(RowId::new(1));
    grid.take_events();

    grid.set_data(files());
    assert!(!grid.any_expanded());
    assert!(grid.selected().is_empty());
    assert!(matches!(
        grid.take_events().as_slice(),
        [GridEvent::SelectionChange(change)] if change.selected.is_empty()
    ));
}

#[test]
fn test_initial_expand_level() {
    let mut grid = Grid::new(
        files(),
        columns(),
        GridConfig::default().with_tree(TreeConfig::new(Some(1))),
    );
    assert!(grid.all_expanded());
    assert_eq!(grid.visible_rows().len(), 6);

    grid.set_initial_expand_level(None);
    assert_eq!(grid.visible_rows().len(), 3);
}

#[test]
fn test_flat_detail_rows() {
    let mut grid = Grid::new(
        numbered(3),
        columns(),
        GridConfig::default().with_expandable_rows(),
    );
    let first = RowId::new(0);
    assert_eq!(grid.toggle_expanded(first), Some(true));
    assert!(grid.visible_rows()[0].expanded);
    assert_eq!(grid.expanded_rows(), [first]);

    grid.expand_all();
    assert!(grid.all_expanded());
    grid.collapse_all();
    assert!(!grid.any_expanded());

    let mut plain = Grid::new(numbered(3), columns(), GridConfig::default());
    assert_eq!(plain.toggle_expanded(first), None);
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn test_tree_selection_through_grid() {
    let mut grid = tree_grid();
    let src = RowId::new(0);
    let main = RowId::new(1);

    let change = grid.toggle_row(main).unwrap();
    assert_eq!(change.last_changed, Some(main));
    assert!(grid.row_indeterminate(src));
    assert!(!grid.row_checked(src));
    // Only the collapsed roots are visible and none is fully checked.
    assert!(!grid.some_visible_checked());

    grid.toggle_row(src);
    assert!(grid.row_checked(src));
    assert!(grid.row_checked(main));
}

#[test]
fn test_select_all_visible() {
    let mut grid = Grid::new(
        numbered(25),
        columns(),
        GridConfig::default().with_selection(SelectionMode::Multiple),
    );
    let change = grid.toggle_all_visible().unwrap();
    assert_eq!(change.selected.len(), 10);
    assert_eq!(change.last_changed, None);
    assert!(grid.all_visible_checked());

    // The next page is unchecked; selection stays with the rows.
    grid.next_page();
    assert!(!grid.some_visible_checked());
    grid.previous_page();
    assert!(grid.all_visible_checked());

    grid.toggle_all_visible();
    assert!(grid.selected().is_empty());
}

#[test]
fn test_selection_disabled_by_default() {
    let mut grid = Grid::new(numbered(3), columns(), GridConfig::default());
    assert!(grid.toggle_row(RowId::new(0)).is_none());
    assert!(grid.toggle_all_visible().is_none());
    assert!(grid.take_events().is_empty());
}

#[test]
fn test_rows_outside_the_tree_view_ignore_toggles() {
    let parents: Vec<Record> = (0..12)
        .map(|n| {
            Record::new()
                .set("name", format!("parent {:02}", n))
                .set("children", vec![Record::new().set("name", format!("child {:02}", n))])
        })
        .collect();
    let mut grid = Grid::new(
        parents,
        columns(),
        GridConfig::default()
            .with_selection(SelectionMode::Multiple)
            .with_tree(TreeConfig::default()),
    );
    let last_parent = RowId::new(22);
    let last_child = RowId::new(23);

    // Ingested but on page 2.
    assert!(grid.row(last_parent).is_ok());
    assert!(grid.toggle_row(last_parent).is_none());
    assert!(grid.selected().is_empty());
    assert!(grid.take_events().is_empty());

    grid.next_page();
    assert!(grid.toggle_row(last_parent).is_some());
    assert!(grid.row_checked(last_parent));
    assert!(grid.row_checked(last_child));

    // Pruned by the filter.
    grid.clear_selection();
    grid.set_filter(FilterSpec::recursive("child 03", None));
    assert!(grid.toggle_row(RowId::new(8)).is_none());
    assert!(grid.toggle_row(RowId::new(7)).is_some());
    assert!(grid.row_checked(RowId::new(6)));
}

#[test]
fn test_unknown_row() {
    let mut grid = Grid::new(
        numbered(3),
        columns(),
        GridConfig::default().with_selection(SelectionMode::Single),
    );
    assert!(grid.toggle_row(RowId::new(99)).is_none());
    assert!(grid.row(RowId::new(99)).is_err());
    assert!(grid.row(RowId::new(2)).is_ok());
}

// =============================================================================
// Columns
// =============================================================================

#[test]
fn test_lanes_follow_grid_options() {
    let grid = Grid::new(
        numbered(3),
        columns(),
        GridConfig::default()
            .with_row_numbers()
            .with_selection(SelectionMode::Multiple)
            .with_expandable_rows(),
    );
    let sticky = grid.column_layouts()[0].sticky.unwrap();
    assert_eq!(sticky.left, Some(128.0));
    assert_eq!(sticky.z_index, 20);

    let tree = Grid::new(
        files(),
        columns(),
        GridConfig::default()
            .with_row_numbers()
            .with_selection(SelectionMode::Multiple)
            .with_tree(TreeConfig::default()),
    );
    assert_eq!(tree.column_layouts()[0].sticky.unwrap().left, Some(48.0));
}

#[test]
fn test_resize_column_through_grid() {
    let mut grid = Grid::new(numbered(3), columns(), GridConfig::default());
    assert!(grid.resize_column(0, 220.0).unwrap());
    assert_eq!(grid.column_layouts()[0].flex, "0 0 220px");
    assert!(!grid.resize_column(1, 220.0).unwrap());
    assert!(grid.resize_column(7, 220.0).is_err());
    assert!(grid.reset_column_width(0).unwrap());
}

// =============================================================================
// Host access
// =============================================================================

#[test]
fn test_source_guard_syncs_on_drop() {
    let mut grid = tree_grid();
    grid.toggle_expanded(RowId::new(0));
    {
        let mut source = grid.source_mut();
        source.set_filter_predicate(|row: &Record, term: &str| {
            row.get_str("name").is_some_and(|n| n.contains(term))
        });
        source.set_filter(FilterSpec::recursive("lib", None));
    }
    assert_eq!(names(&grid), ["src", "lib.rs"]);
}
