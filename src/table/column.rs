//! Column model: how each displayed field is read, labelled, sorted and rendered

use crate::data::compare::{compare_alphanumeric, compare_numbers, compare_text, compare_timestamps};
use crate::data::record::Record;
use crate::data::value::CellValue;
use crate::table::renderer::{CellRenderer, PLACEHOLDER};
use anyhow::Result;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

pub type AccessorFn<T> = Arc<dyn Fn(&T) -> Result<CellValue> + Send + Sync>;
pub type CompareFn = Arc<dyn Fn(&CellValue, &CellValue) -> Ordering + Send + Sync>;

/// How a column reads its value from a row
pub enum Accessor<T> {
    /// Named field looked up through [`Record::field`]
    Key(String),
    /// Computed value; an `Err` degrades the cell instead of failing the table
    Fn(AccessorFn<T>),
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Key(k) => Accessor::Key(k.clone()),
            Accessor::Fn(f) => Accessor::Fn(Arc::clone(f)),
        }
    }
}

/// Comparator family used when the column is sorted
#[derive(Clone, Default)]
pub enum SortingFn {
    Text,
    #[default]
    Alphanumeric,
    /// Parsed timestamps; unparsable values sort last
    Datetime,
    /// Numbers; non-numeric values sort last
    Basic,
    Custom(CompareFn),
}

impl SortingFn {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&CellValue, &CellValue) -> Ordering + Send + Sync + 'static,
    {
        SortingFn::Custom(Arc::new(f))
    }

    /// True when the value has no sortable representation under this comparator.
    /// Such values stay at the end whatever the sort direction.
    pub fn is_unsortable(&self, value: &CellValue) -> bool {
        match self {
            SortingFn::Datetime => value.as_timestamp().is_none(),
            SortingFn::Basic => value.as_f64().is_none(),
            _ => false,
        }
    }

    pub fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
        match self {
            SortingFn::Text => compare_text(a, b),
            SortingFn::Alphanumeric => compare_alphanumeric(a, b),
            SortingFn::Datetime => compare_timestamps(a.as_timestamp(), b.as_timestamp()),
            SortingFn::Basic => compare_numbers(a.as_f64(), b.as_f64()),
            SortingFn::Custom(f) => f(a, b),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SortingFn::Text => "text",
            SortingFn::Alphanumeric => "alphanumeric",
            SortingFn::Datetime => "datetime",
            SortingFn::Basic => "basic",
            SortingFn::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for SortingFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declarative description of one displayable field
pub struct ColumnDescriptor<T> {
    pub id: String,
    pub header: String,
    pub accessor: Accessor<T>,
    pub enable_sorting: bool,
    pub sorting_fn: SortingFn,
    pub renderer: CellRenderer,
    pub enable_hiding: bool,
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            enable_sorting: self.enable_sorting,
            sorting_fn: self.sorting_fn.clone(),
            renderer: self.renderer.clone(),
            enable_hiding: self.enable_hiding,
        }
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("enable_sorting", &self.enable_sorting)
            .field("sorting_fn", &self.sorting_fn)
            .field("renderer", &self.renderer)
            .field("enable_hiding", &self.enable_hiding)
            .finish()
    }
}

impl<T> ColumnDescriptor<T> {
    /// Column reading the field named like its id
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            accessor: Accessor::Key(id.clone()),
            id,
            header: header.into(),
            enable_sorting: true,
            sorting_fn: SortingFn::default(),
            renderer: CellRenderer::default(),
            enable_hiding: true,
        }
    }

    /// Read from a differently named field (e.g. `guest.name`)
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.accessor = Accessor::Key(key.into());
        self
    }

    pub fn with_accessor<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Result<CellValue> + Send + Sync + 'static,
    {
        self.accessor = Accessor::Fn(Arc::new(f));
        self
    }

    pub fn with_sorting(mut self, sorting_fn: SortingFn) -> Self {
        self.sorting_fn = sorting_fn;
        self
    }

    pub fn sortable(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    pub fn hideable(mut self, enabled: bool) -> Self {
        self.enable_hiding = enabled;
        self
    }

    pub fn with_renderer(mut self, renderer: CellRenderer) -> Self {
        self.renderer = renderer;
        self
    }
}

impl<T: Record> ColumnDescriptor<T> {
    /// Raw accessor result
    pub fn try_value(&self, row: &T) -> Result<CellValue> {
        match &self.accessor {
            Accessor::Key(key) => Ok(row.field(key).unwrap_or(CellValue::Null)),
            Accessor::Fn(f) => f(row),
        }
    }

    /// Accessor value with failures degraded to Null
    pub fn value(&self, row: &T) -> CellValue {
        match self.try_value(row) {
            Ok(value) => value,
            Err(e) => {
                trace!(column = %self.id, row = %row.row_key(), "accessor failed: {}", e);
                CellValue::Null
            }
        }
    }

    /// Display text as the grid shows it; failed accessors show the placeholder
    pub fn display(&self, row: &T) -> String {
        match self.try_value(row) {
            Ok(value) => self.renderer.render(&value),
            Err(e) => {
                trace!(column = %self.id, row = %row.row_key(), "accessor failed: {}", e);
                PLACEHOLDER.to_string()
            }
        }
    }

    /// Text used for search matching; None when the accessor failed
    pub fn search_text(&self, row: &T) -> Option<String> {
        self.try_value(row)
            .ok()
            .map(|value| self.renderer.render(&value))
    }
}

/// Ordered, id-unique set of column descriptors
pub struct ColumnModel<T> {
    columns: Vec<ColumnDescriptor<T>>,
}

impl<T> Clone for ColumnModel<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.columns.iter()).finish()
    }
}

impl<T> ColumnModel<T> {
    /// Build the model; a repeated id keeps its first definition
    pub fn new(columns: Vec<ColumnDescriptor<T>>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(columns.len());
        for column in columns {
            if seen.insert(column.id.clone()) {
                unique.push(column);
            } else {
                warn!("Dropping duplicate column id '{}'", column.id);
            }
        }
        Self { columns: unique }
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor<T>> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor<T>> {
        self.columns.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
