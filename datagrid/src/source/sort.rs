//! Sort keys, sort state and the multi-key row comparison.

use std::cmp::Ordering;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::model::{RowData, Value};

/// Sort direction for ordering rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(GridError::invalid_sort_direction(other)),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// One key of a sort: the field to compare and the direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub active: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(active: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            active: active.into(),
            direction,
        }
    }

    /// Validates a loosely typed descriptor, e.g. one decoded from host JSON.
    pub fn parse(active: Option<&str>, direction: Option<&str>) -> Result<Self> {
        let active = active
            .filter(|a| !a.is_empty())
            .ok_or(GridError::MissingSortField)?;
        let direction = direction
            .ok_or_else(|| GridError::invalid_sort_direction(""))?
            .parse()?;
        Ok(Self::new(active, direction))
    }
}

/// An unvalidated sort descriptor as supplied by a host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub active: Option<String>,
    pub direction: Option<String>,
}

impl SortDescriptor {
    pub fn new(active: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            active: Some(active.into()),
            direction: Some(direction.into()),
        }
    }
}

/// Ordered list of sort keys. The first key is the primary one.
///
/// An empty state means "no sort". Fields are unique: adding a key for a
/// field that is already present replaces the earlier entry in place.
///
/// # Example
///
/// ```
/// use datagrid::source::SortState;
///
/// let sort = SortState::desc("revenue").then_asc("name");
/// assert_eq!(sort.keys().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortState {
    keys: Vec<SortKey>,
}

impl SortState {
    /// No sorting.
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates an ascending sort on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::none().then_asc(field)
    }

    /// Creates a descending sort on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::none().then_desc(field)
    }

    /// Adds a lower-precedence ascending key.
    pub fn then_asc(mut self, field: impl Into<String>) -> Self {
        self.push(SortKey::new(field, SortDirection::Asc));
        self
    }

    /// Adds a lower-precedence descending key.
    pub fn then_desc(mut self, field: impl Into<String>) -> Self {
        self.push(SortKey::new(field, SortDirection::Desc));
        self
    }

    /// Builds a state from unvalidated descriptors.
    ///
    /// Descriptors without a field or with an unknown direction are dropped;
    /// an all-invalid input yields "no sort".
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = SortDescriptor>) -> Self {
        let mut state = Self::none();
        for descriptor in descriptors {
            match SortKey::parse(descriptor.active.as_deref(), descriptor.direction.as_deref()) {
                Ok(key) => state.push(key),
                Err(e) => warn!("Dropping sort descriptor {:?}: {}", descriptor, e),
            }
        }
        state
    }

    fn push(&mut self, key: SortKey) {
        match self.keys.iter_mut().find(|k| k.active == key.active) {
            Some(existing) => existing.direction = key.direction,
            None => self.keys.push(key),
        }
    }

    /// Returns the keys in precedence order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns `true` when no key is set.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the direction a field is sorted in, if it is sorted at all.
    pub fn direction_of(&self, field: &str) -> Option<SortDirection> {
        self.keys
            .iter()
            .find(|k| k.active == field)
            .map(|k| k.direction)
    }

    /// Returns the precedence position of a field (0 = primary).
    pub fn position_of(&self, field: &str) -> Option<usize> {
        self.keys.iter().position(|k| k.active == field)
    }

    /// Advances a field through `none -> asc -> desc -> none`.
    ///
    /// With `multi` the field's entry is updated in place and the other keys
    /// are left alone. Without it the field becomes the only key.
    pub fn cycle(&mut self, field: &str, multi: bool) {
        let next = match self.direction_of(field) {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };

        if !multi {
            self.keys.clear();
        }
        match next {
            Some(direction) => self.push(SortKey::new(field, direction)),
            None => self.keys.retain(|k| k.active != field),
        }
        debug!("Sort on '{}' cycled to {:?} (multi: {})", field, next, multi);
    }
}

impl From<SortKey> for SortState {
    fn from(key: SortKey) -> Self {
        Self { keys: vec![key] }
    }
}

impl From<Vec<SortKey>> for SortState {
    fn from(keys: Vec<SortKey>) -> Self {
        let mut state = Self::none();
        for key in keys {
            state.push(key);
        }
        state
    }
}

impl From<Option<SortKey>> for SortState {
    fn from(key: Option<SortKey>) -> Self {
        key.map(Self::from).unwrap_or_default()
    }
}

/// A comparable value extracted from a row for one sort key.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    /// Numbers compare numerically, text lexicographically, numbers before text.
    ///
    /// `NaN` sorts after every other number, so the order stays total.
    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.total_cmp(b),
            },
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

impl From<&str> for SortValue {
    fn from(v: &str) -> Self {
        SortValue::Text(v.to_string())
    }
}

impl From<f64> for SortValue {
    fn from(v: f64) -> Self {
        SortValue::Number(v)
    }
}

/// Default sort accessor: reads the field and maps it to a comparable value.
///
/// Missing and null fields sort as the empty string, dates as epoch
/// milliseconds, and structured values by their serialization.
pub fn default_sort_accessor<T: RowData>(row: &T, column: &str) -> SortValue {
    match row.field(column) {
        None | Some(Value::Null) => SortValue::Text(String::new()),
        Some(Value::Bool(b)) => SortValue::Number(if *b { 1.0 } else { 0.0 }),
        Some(Value::Int(n)) => SortValue::Number(*n as f64),
        Some(Value::Float(n)) => SortValue::Number(*n),
        Some(Value::String(s)) => SortValue::Text(s.clone()),
        Some(Value::DateTime(dt)) => SortValue::Number(dt.timestamp_millis() as f64),
        Some(other) => SortValue::Text(serde_json::to_string(other).unwrap_or_default()),
    }
}

/// Compares two pre-extracted key tuples; the first unequal key decides.
pub(crate) fn compare_keys(keys: &[SortKey], a: &[SortValue], b: &[SortValue]) -> Ordering {
    keys.iter()
        .zip(a.iter().zip(b.iter()))
        .map(|(key, (va, vb))| key.direction.apply(va.compare(vb)))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
