use crate::data::record::RowKey;
use crate::table::config::TableConfig;
use crate::table::filter::DateRange;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub column: String,
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub index: usize,
    pub size: usize,
}

impl PageState {
    /// First filtered position shown on this page
    pub fn offset(&self) -> usize {
        self.index.saturating_mul(self.size)
    }
}

/// Every user-controllable table parameter, owned by one engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Trimmed, lowercased search text; empty means no search
    pub global_query: String,
    /// Active option values per filter id; OR within a filter, AND across
    pub active_filters: BTreeMap<String, BTreeSet<String>>,
    pub date_range: DateRange,
    /// Sort priority order, first entry wins
    pub sort: Vec<SortEntry>,
    pub page: PageState,
    /// Explicit visibility overrides; absent columns are visible
    pub column_visibility: BTreeMap<String, bool>,
    pub row_selection: BTreeSet<RowKey>,
    pub is_loading: bool,
}

impl EngineState {
    pub fn initial(config: &TableConfig) -> Self {
        Self {
            global_query: String::new(),
            active_filters: BTreeMap::new(),
            date_range: DateRange::default(),
            sort: Vec::new(),
            page: PageState {
                index: 0,
                size: config.initial_page_size(),
            },
            column_visibility: BTreeMap::new(),
            row_selection: BTreeSet::new(),
            is_loading: config.loading,
        }
    }

    pub fn is_column_visible(&self, column: &str) -> bool {
        self.column_visibility.get(column).copied().unwrap_or(true)
    }

    /// Values currently active for a filter (empty when the filter is off)
    pub fn active_values(&self, filter: &str) -> Option<&BTreeSet<String>> {
        self.active_filters.get(filter).filter(|v| !v.is_empty())
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filters.values().any(|v| !v.is_empty())
    }

    /// Sort position (0 = primary) and direction for a column
    pub fn sort_for(&self, column: &str) -> Option<(usize, SortDirection)> {
        self.sort
            .iter()
            .position(|entry| entry.column == column)
            .map(|pos| (pos, self.sort[pos].direction))
    }

    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.row_selection.contains(key)
    }
}
