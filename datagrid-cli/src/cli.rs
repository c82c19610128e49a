//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use simplelog::LevelFilter;

#[derive(Parser)]
#[command(
    name = "datagrid",
    version,
    about = "Render a page of a JSON data set through the grid engine"
)]
pub struct Cli {
    /// JSON file holding an array of records.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Fields to show, in order (default: every field of the first record).
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Freeze every column up to and including this field.
    #[arg(long, value_name = "FIELD")]
    pub freeze: Option<String>,

    /// Case-insensitive text filter.
    #[arg(long)]
    pub filter: Option<String>,

    /// Keep parents of matching child rows.
    #[arg(long)]
    pub recursive: bool,

    /// Field holding child rows.
    #[arg(long = "children-key", default_value = "children")]
    pub children_key: String,

    /// Sort key as FIELD:asc or FIELD:desc; repeat for tie-breakers.
    #[arg(long, value_name = "FIELD:DIR")]
    pub sort: Vec<String>,

    /// Zero-based page to show.
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    /// Rows per page.
    #[arg(long = "page-size", default_value_t = 10)]
    pub page_size: usize,

    /// Show every row on one page.
    #[arg(long = "no-paging")]
    pub no_paging: bool,

    /// Display child rows as a tree.
    #[arg(long)]
    pub tree: bool,

    /// Levels expanded initially in tree mode.
    #[arg(long = "expand-level", value_name = "LEVEL")]
    pub expand_level: Option<usize>,

    /// Expand every tree row.
    #[arg(long = "expand-all")]
    pub expand_all: bool,

    /// Selection mode.
    #[arg(long, value_enum, default_value = "none")]
    pub selection: SelectionArg,

    /// Row ids to toggle, in order.
    #[arg(long, value_name = "ID")]
    pub select: Vec<usize>,

    /// Width available to the grid, used to size fill columns.
    #[arg(long, default_value_t = 1200.0)]
    pub width: f32,

    /// Log level.
    #[arg(long = "log-level", value_enum, default_value = "warn")]
    pub log_level: LogLevelArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Selection mode choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum SelectionArg {
    None,
    Single,
    Multiple,
}

/// Log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::Error,
            LogLevelArg::Warn => LevelFilter::Warn,
            LogLevelArg::Info => LevelFilter::Info,
            LogLevelArg::Debug => LevelFilter::Debug,
            LogLevelArg::Trace => LevelFilter::Trace,
        }
    }
}
