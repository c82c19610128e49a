//! Data grid demo CLI.
//!
//! Loads a JSON array of records, drives the grid engine with the given
//! filter, sort, paging, tree and selection options, and prints the result.

mod cli;
mod error;

use std::fs::File;
use std::path::Path;

use clap::Parser;
use datagrid::prelude::*;
use datagrid::source::SortDescriptor;
use log::{debug, info};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use crate::cli::{Cli, SelectionArg};
use crate::error::{CliError, Result};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.log_level.into(), cli.log_file.as_deref()) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
    if let Err(error) = run(&cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => TermLogger::init(
            level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?,
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let rows = load_records(&cli.file)?;
    info!("Loaded {} records from {}", rows.len(), cli.file.display());

    let fields = if cli.columns.is_empty() {
        default_fields(&rows, &cli.children_key)
    } else {
        cli.columns.clone()
    };
    let columns = build_columns(&fields, cli.freeze.as_deref())?;

    let mut grid = Grid::new(rows, columns, grid_config(cli)?);

    if let Some(text) = &cli.filter {
        if cli.recursive {
            grid.set_filter(FilterSpec::recursive(text, Some(&cli.children_key)));
        } else {
            grid.set_filter(text.as_str());
        }
    }
    if !cli.sort.is_empty() {
        grid.set_sort(SortState::from_descriptors(
            cli.sort.iter().map(String::as_str).map(parse_sort),
        ));
    }
    if !cli.no_paging {
        grid.go_to_page(cli.page);
    }
    if cli.expand_all {
        grid.expand_all();
    }
    for id in &cli.select {
        grid.row(RowId::new(*id))?;
        grid.toggle_row(RowId::new(*id));
    }

    for event in grid.take_events() {
        debug!("Event: {:?}", event);
    }

    print_columns(&grid, cli.width);
    print_rows(&grid, &fields);
    print_footer(&grid);
    Ok(())
}

fn load_records(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    Ok(Record::many_from_json(json)?)
}

fn default_fields(rows: &[Record], children_key: &str) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut fields: Vec<String> = first
        .fields()
        .keys()
        .filter(|k| k.as_str() != children_key)
        .cloned()
        .collect();
    fields.sort();
    fields
}

fn build_columns(fields: &[String], freeze: Option<&str>) -> Result<Vec<ColumnSpec>> {
    let mut columns: Vec<ColumnSpec> = fields
        .iter()
        .map(|f| ColumnSpec::new(f.as_str(), f.as_str()).sortable().resizable())
        .collect();
    if let Some(field) = freeze {
        let index = fields
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| CliError::UnknownField(field.to_string()))?;
        columns[index].freeze = true;
    }
    Ok(columns)
}

fn grid_config(cli: &Cli) -> Result<GridConfig> {
    let mut source = DataSourceConfig::default().with_children_key(cli.children_key.as_str());
    source = if cli.no_paging {
        source.without_paginator()
    } else {
        source.with_paginator(PaginatorState::default().with_page_size(cli.page_size)?)
    };

    let selection = match cli.selection {
        SelectionArg::None => SelectionMode::None,
        SelectionArg::Single => SelectionMode::Single,
        SelectionArg::Multiple => SelectionMode::Multiple,
    };

    let mut config = GridConfig::default()
        .with_selection(selection)
        .with_row_numbers()
        .with_data_source(source);
    if cli.tree {
        config = config.with_tree(TreeConfig::new(cli.expand_level));
    }
    Ok(config)
}

/// Splits `FIELD:DIR`. A missing direction is left for validation to drop.
fn parse_sort(arg: &str) -> SortDescriptor {
    match arg.split_once(':') {
        Some((field, direction)) => SortDescriptor::new(field, direction),
        None => SortDescriptor {
            active: Some(arg.to_string()),
            direction: None,
        },
    }
}

// =============================================================================
// Output
// =============================================================================

fn print_columns(grid: &Grid<Record>, width: f32) {
    let widths = grid.columns().distribute(width);
    for ((spec, layout), px) in grid
        .columns()
        .specs()
        .zip(grid.column_layouts())
        .zip(widths)
    {
        let sort = spec
            .field
            .as_deref()
            .map(|f| sort_badge(grid.source().sort(), f))
            .unwrap_or_default();
        let frozen = match layout.sticky {
            Some(sticky) => match sticky.left {
                Some(left) => format!(" frozen left={left} z={}", sticky.z_index),
                None => format!(" frozen left=? z={}", sticky.z_index),
            },
            None => String::new(),
        };
        println!("{}{sort}: {px}px flex={}{frozen}", spec.title, layout.flex);
    }
    println!();
}

/// Direction arrow, plus the key's precedence when several keys are set.
fn sort_badge(sort: &SortState, field: &str) -> String {
    let arrow = match sort.direction_of(field) {
        Some(SortDirection::Asc) => "^",
        Some(SortDirection::Desc) => "v",
        None => return String::new(),
    };
    match sort.position_of(field) {
        Some(position) if sort.keys().len() > 1 => format!(" {arrow}{}", position + 1),
        _ => format!(" {arrow}"),
    }
}

fn print_rows(grid: &Grid<Record>, fields: &[String]) {
    for row in grid.visible_rows() {
        let marker = if grid.row_checked(row.id) {
            "[x]"
        } else if grid.row_indeterminate(row.id) {
            "[-]"
        } else {
            "[ ]"
        };
        let toggle = match (row.has_children, row.expanded) {
            (true, true) => "- ",
            (true, false) => "+ ",
            _ => "  ",
        };
        let cells: Vec<String> = fields
            .iter()
            .map(|f| row.data.get(f).map(Value::display).unwrap_or_default())
            .collect();
        println!(
            "{:>4} {marker} {}{toggle}{}",
            row.id.index(),
            "  ".repeat(row.level),
            cells.join(" | ")
        );
    }
}

fn print_footer(grid: &Grid<Record>) {
    let pagination = grid.pagination();
    let pages: Vec<String> = pagination
        .items()
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == pagination.page_index() + 1 => format!("[{n}]"),
            other => other.to_string(),
        })
        .collect();
    println!();
    println!("{}  pages: {}", pagination.range_label(), pages.join(" "));
    let selected = grid.selected();
    if !selected.is_empty() {
        let ids: Vec<String> = selected.iter().map(|id| id.index().to_string()).collect();
        println!("selected: {}", ids.join(", "));
    }
}
