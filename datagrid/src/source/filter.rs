//! Filter specification and the default row predicate.

use serde::{Deserialize, Serialize};

use crate::model::RowData;

/// Children key used when none is configured.
pub const DEFAULT_CHILDREN_KEY: &str = "children";

/// A text filter applied to the row set.
///
/// The text is always stored trimmed and lower-cased. A flat filter tests
/// top-level rows only; a recursive filter prunes the whole hierarchy found
/// under `children_key`.
///
/// # Example
///
/// ```
/// use datagrid::source::FilterSpec;
///
/// let flat = FilterSpec::from("  Contoso ");
/// assert_eq!(flat.text(), "contoso");
///
/// let tree = FilterSpec::recursive("leaf", None);
/// assert_eq!(tree.children_key(), "children");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    text: String,
    recursive: bool,
    children_key: String,
}

impl FilterSpec {
    /// Creates a flat filter.
    pub fn flat(text: impl AsRef<str>) -> Self {
        Self {
            text: normalize(text.as_ref()),
            recursive: false,
            children_key: DEFAULT_CHILDREN_KEY.to_string(),
        }
    }

    /// Creates a recursive filter over children stored under `key`.
    pub fn recursive(text: impl AsRef<str>, key: Option<&str>) -> Self {
        Self {
            text: normalize(text.as_ref()),
            recursive: true,
            children_key: key.unwrap_or(DEFAULT_CHILDREN_KEY).to_string(),
        }
    }

    /// Returns the normalized filter text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` for a recursive (tree-pruning) filter.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Returns the children key a recursive filter descends through.
    pub fn children_key(&self) -> &str {
        &self.children_key
    }

    /// Returns `true` when the filter lets every row through.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<&str> for FilterSpec {
    fn from(text: &str) -> Self {
        Self::flat(text)
    }
}

impl From<String> for FilterSpec {
    fn from(text: String) -> Self {
        Self::flat(text)
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Default filter predicate: case-insensitive substring match against the
/// row's full serialization. `term` is expected to be normalized already.
pub fn default_filter_predicate<T: RowData>(row: &T, term: &str) -> bool {
    row.search_text().to_lowercase().contains(term)
}
