//! Row predicates built from the filter registry and engine state
//!
//! The primitive predicates are plain functions so they can be tested on their
//! own; [`RowFilter`] resolves descriptors against the column model once per
//! derivation and then applies them row by row.

use crate::data::record::Record;
use crate::data::value::CellValue;
use crate::table::column::{ColumnDescriptor, ColumnModel};
use crate::table::config::TableConfig;
use crate::table::filter::{DateRange, FilterRegistry};
use crate::table::state::EngineState;
use std::collections::BTreeSet;

/// Exact string match against any active option; no active option passes
pub fn matches_discrete(value_text: &str, active: &BTreeSet<String>) -> bool {
    active.is_empty() || active.contains(value_text)
}

/// Unparsable dates fail only while a bound is active
pub fn matches_date_range(timestamp: Option<i64>, range: &DateRange) -> bool {
    if !range.is_active() {
        return true;
    }
    timestamp.is_some_and(|ts| range.contains(ts))
}

/// Case-insensitive substring test over column texts. `query` must already be
/// lowercased; an empty query passes everything.
pub fn matches_search<I, S>(texts: I, query: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if query.is_empty() {
        return true;
    }
    texts
        .into_iter()
        .any(|text| text.as_ref().to_lowercase().contains(query))
}

/// Normalise user search input the way the engine stores it
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Where a filter or the date range reads its value from
enum ValueSource<'a, T> {
    Column(&'a ColumnDescriptor<T>),
    Field(&'a str),
}

impl<T: Record> ValueSource<'_, T> {
    fn resolve<'a>(columns: &'a ColumnModel<T>, id: &'a str) -> ValueSource<'a, T> {
        match columns.get(id) {
            Some(column) => ValueSource::Column(column),
            None => ValueSource::Field(id),
        }
    }

    fn value(&self, row: &T) -> CellValue {
        match self {
            ValueSource::Column(column) => column.value(row),
            ValueSource::Field(name) => row.field(name).unwrap_or(CellValue::Null),
        }
    }
}

/// Compiled predicates for one derivation pass
pub struct RowFilter<'a, T> {
    discrete: Vec<(ValueSource<'a, T>, &'a BTreeSet<String>)>,
    date: Option<(ValueSource<'a, T>, DateRange)>,
    search_columns: Vec<&'a ColumnDescriptor<T>>,
    query: &'a str,
}

impl<'a, T: Record> RowFilter<'a, T> {
    pub fn new(
        columns: &'a ColumnModel<T>,
        filters: &'a FilterRegistry,
        config: &'a TableConfig,
        state: &'a EngineState,
    ) -> Self {
        // Values for filters that are no longer registered are ignored
        let discrete = state
            .active_filters
            .iter()
            .filter(|(id, values)| !values.is_empty() && filters.contains(id))
            .map(|(id, values)| (ValueSource::resolve(columns, id), values))
            .collect();

        let date = config
            .date_column()
            .filter(|_| state.date_range.is_active())
            .map(|column| (ValueSource::resolve(columns, column), state.date_range));

        let query = if config.enable_global_search {
            state.global_query.as_str()
        } else {
            ""
        };
        let search_columns = if query.is_empty() {
            Vec::new()
        } else {
            columns
                .iter()
                .filter(|c| state.is_column_visible(&c.id))
                .collect()
        };

        Self {
            discrete,
            date,
            search_columns,
            query,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.discrete.is_empty() && self.date.is_none() && self.query.is_empty()
    }

    /// AND across filters, OR within each filter's active values
    pub fn matches_filters(&self, row: &T) -> bool {
        self.discrete
            .iter()
            .all(|(source, active)| matches_discrete(&source.value(row).to_string(), active))
    }

    pub fn matches_date(&self, row: &T) -> bool {
        match &self.date {
            Some((source, range)) => matches_date_range(source.value(row).as_timestamp(), range),
            None => true,
        }
    }

    /// Visible columns only, compared on their display text
    pub fn matches_search(&self, row: &T) -> bool {
        if self.query.is_empty() {
            return true;
        }
        matches_search(
            self.search_columns.iter().filter_map(|c| c.search_text(row)),
            self.query,
        )
    }

    /// Filters, then date range, then search
    pub fn matches(&self, row: &T) -> bool {
        self.matches_filters(row) && self.matches_date(row) && self.matches_search(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_discrete_or_within_filter() {
        let active = set(&["vacant", "cleaning"]);
        assert!(matches_discrete("vacant", &active));
        assert!(matches_discrete("cleaning", &active));
        assert!(!matches_discrete("occupied", &active));
        assert!(!matches_discrete("Vacant", &active));
        assert!(matches_discrete("anything", &BTreeSet::new()));
    }

    #[test]
    fn test_date_range_fail_closed() {
        let range = DateRange::new(Some(10), None);
        assert!(!matches_date_range(None, &range));
        assert!(matches_date_range(Some(10), &range));
        assert!(matches_date_range(None, &DateRange::default()));
    }

    #[test]
    fn test_search_any_column() {
        assert!(matches_search(["Room 101", "Deluxe"], "delux"));
        assert!(!matches_search(["Room 101", "Deluxe"], "suite"));
        assert!(matches_search(Vec::<String>::new(), ""));
        assert!(!matches_search(Vec::<String>::new(), "x"));
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  OCEAN View "), "ocean view");
        assert_eq!(normalize_query("   "), "");
    }
}
