//! The table engine: owns state for one table instance and keeps the derived
//! view in step with it.

use crate::data::record::{Record, RowKey};
use crate::table::action::TableAction;
use crate::table::column::{ColumnDescriptor, ColumnModel};
use crate::table::config::TableConfig;
use crate::table::derive::{derive, DerivedView, TableContext};
use crate::table::filter::{DateRange, FilterRegistry};
use crate::table::reducer::reduce;
use crate::table::state::{EngineState, SortEntry};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Receives the full selected rows, in source order, after every change to
/// the selection
pub type SelectionCallback<T> = Box<dyn FnMut(&[&T]) + Send>;

/// Tri-state of the header selection checkbox for the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Partial,
    Checked,
}

pub struct TableEngine<T> {
    rows: Arc<[T]>,
    columns: ColumnModel<T>,
    filters: FilterRegistry,
    config: TableConfig,
    state: EngineState,
    view: DerivedView,
    on_selection_change: Option<SelectionCallback<T>>,
}

impl<T> fmt::Debug for TableEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEngine")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns.ids())
            .field("state", &self.state)
            .field("view", &self.view)
            .finish()
    }
}

impl<T: Record> TableEngine<T> {
    pub fn new(
        rows: impl Into<Arc<[T]>>,
        columns: ColumnModel<T>,
        filters: FilterRegistry,
        config: TableConfig,
    ) -> Self {
        if config.date_filter_column.is_some() && !config.enable_date_filter {
            warn!("date_filter_column is set but the date filter is disabled");
        }
        for filter in filters.iter() {
            if !columns.contains(&filter.id) {
                debug!(
                    "Filter '{}' has no matching column, reading the record field",
                    filter.id
                );
            }
        }

        let state = EngineState::initial(&config);
        let mut engine = Self {
            rows: rows.into(),
            columns,
            filters,
            config,
            state,
            view: DerivedView::default(),
            on_selection_change: None,
        };
        engine.rederive();
        engine
    }

    /// Register the selection callback
    pub fn on_row_selection_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&[&T]) + Send + 'static,
    {
        self.on_selection_change = Some(Box::new(callback));
        self
    }

    fn context(&self) -> TableContext<'_, T> {
        TableContext {
            rows: &self.rows,
            columns: &self.columns,
            filters: &self.filters,
            config: &self.config,
        }
    }

    /// Apply one transition. Returns true when the state changed.
    pub fn dispatch(&mut self, action: TableAction) -> bool {
        debug!("table action: {:?}", action);
        let next = reduce(&self.state, self.context(), &self.view, action);
        if next == self.state {
            return false;
        }
        self.commit(next);
        true
    }

    /// Replace the row set (after a refresh). Rows are never edited in place.
    pub fn set_rows(&mut self, rows: impl Into<Arc<[T]>>) {
        self.rows = rows.into();
        let state = self.state.clone();
        self.commit(state);
    }

    fn rederive(&mut self) {
        let derivation = derive(self.context(), &self.state);
        self.view = derivation.view;
        self.state = derivation.state;
    }

    fn commit(&mut self, next: EngineState) {
        let previous_selection = self.state.row_selection.clone();
        let derivation = derive(self.context(), &next);
        self.view = derivation.view;
        self.state = derivation.state;

        if self.state.row_selection != previous_selection {
            self.notify_selection();
        }
    }

    fn notify_selection(&mut self) {
        if let Some(callback) = self.on_selection_change.as_mut() {
            let selected: Vec<&T> = self
                .rows
                .iter()
                .filter(|row| self.state.row_selection.contains(&row.row_key()))
                .collect();
            callback(&selected);
        }
    }

    // Engine operations

    pub fn set_global_query(&mut self, query: &str) -> bool {
        self.dispatch(TableAction::SetGlobalQuery(query.to_string()))
    }

    pub fn set_filter_value(&mut self, filter: &str, value: Option<&str>) -> bool {
        self.dispatch(TableAction::SetFilterValue {
            filter: filter.to_string(),
            value: value.map(str::to_string),
        })
    }

    pub fn set_filter_values(&mut self, filter: &str, values: &[&str]) -> bool {
        self.dispatch(TableAction::SetFilterValues {
            filter: filter.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn clear_filters(&mut self) -> bool {
        self.dispatch(TableAction::ClearFilters)
    }

    pub fn set_date_range(&mut self, range: DateRange) -> bool {
        self.dispatch(TableAction::SetDateRange(range))
    }

    pub fn toggle_sort(&mut self, column: &str) -> bool {
        self.dispatch(TableAction::ToggleSort(column.to_string()))
    }

    pub fn set_sort(&mut self, sort: Vec<SortEntry>) -> bool {
        self.dispatch(TableAction::SetSort(sort))
    }

    pub fn clear_sort(&mut self) -> bool {
        self.dispatch(TableAction::ClearSort)
    }

    pub fn set_page(&mut self, index: usize) -> bool {
        self.dispatch(TableAction::SetPage(index))
    }

    pub fn next_page(&mut self) -> bool {
        self.dispatch(TableAction::NextPage)
    }

    pub fn previous_page(&mut self) -> bool {
        self.dispatch(TableAction::PreviousPage)
    }

    pub fn first_page(&mut self) -> bool {
        self.dispatch(TableAction::FirstPage)
    }

    pub fn last_page(&mut self) -> bool {
        self.dispatch(TableAction::LastPage)
    }

    pub fn set_page_size(&mut self, size: usize) -> bool {
        self.dispatch(TableAction::SetPageSize(size))
    }

    pub fn toggle_column_visibility(&mut self, column: &str, visible: bool) -> bool {
        self.dispatch(TableAction::ToggleColumnVisibility {
            column: column.to_string(),
            visible,
        })
    }

    pub fn reset_column_visibility(&mut self) -> bool {
        self.dispatch(TableAction::ResetColumnVisibility)
    }

    pub fn set_row_selection(&mut self, keys: BTreeSet<RowKey>) -> bool {
        self.dispatch(TableAction::SetRowSelection(keys))
    }

    pub fn toggle_row_selected(&mut self, key: RowKey) -> bool {
        self.dispatch(TableAction::ToggleRowSelected(key))
    }

    pub fn toggle_page_selection(&mut self, select: bool) -> bool {
        self.dispatch(TableAction::TogglePageSelection(select))
    }

    pub fn select_all_filtered(&mut self) -> bool {
        self.dispatch(TableAction::SelectAllFiltered)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.dispatch(TableAction::ClearSelection)
    }

    pub fn set_loading(&mut self, loading: bool) -> bool {
        self.dispatch(TableAction::SetLoading(loading))
    }

    /// Back to the caller defaults; rows and the loading flag are kept
    pub fn reset(&mut self) -> bool {
        self.dispatch(TableAction::Reset)
    }

    // Read access

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn columns(&self) -> &ColumnModel<T> {
        &self.columns
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn page_rows(&self) -> Vec<&T> {
        self.view.page_rows(&self.rows)
    }

    /// All rows matching the current filters, sorted, without paging
    pub fn filtered_rows(&self) -> Vec<&T> {
        self.view.filtered_rows(&self.rows)
    }

    /// Visible columns in display order
    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor<T>> {
        self.columns
            .iter()
            .filter(|c| self.state.is_column_visible(&c.id))
            .collect()
    }

    /// Selected rows resolved against the live row set, in source order
    pub fn selected_rows(&self) -> Vec<&T> {
        self.rows
            .iter()
            .filter(|row| self.state.row_selection.contains(&row.row_key()))
            .collect()
    }

    pub fn page_check_state(&self) -> CheckState {
        let page = self.view.page_indices();
        let selected = page
            .iter()
            .filter(|&&i| self.state.is_selected(&self.rows[i].row_key()))
            .count();
        match selected {
            0 => CheckState::Unchecked,
            n if n == page.len() => CheckState::Checked,
            _ => CheckState::Partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::JsonRecord;
    use crate::table::filter::FilterDescriptor;
    use crate::table::state::SortDirection;
    use serde_json::json;
    use std::sync::Mutex;

    fn rooms(n: usize) -> Vec<JsonRecord> {
        (0..n)
            .map(|i| {
                let status = if i % 3 == 0 { "vacant" } else { "occupied" };
                JsonRecord::new(
                    format!("room-{}", i),
                    json!({"roomNumber": format!("{}", 100 + i), "status": status})
                        .as_object()
                        .cloned()
                        .unwrap(),
                )
            })
            .collect()
    }

    fn engine(n: usize) -> TableEngine<JsonRecord> {
        TableEngine::new(
            rooms(n),
            ColumnModel::new(vec![
                ColumnDescriptor::new("roomNumber", "Room").hideable(false),
                ColumnDescriptor::new("status", "Status").sortable(false),
            ]),
            FilterRegistry::new(vec![FilterDescriptor::new("status", "Status")
                .option("vacant", "Vacant")
                .option("occupied", "Occupied")]),
            TableConfig::default(),
        )
    }

    #[test]
    fn test_noop_dispatch_reports_unchanged() {
        let mut engine = engine(5);
        assert!(!engine.set_filter_value("floor", Some("2")));
        assert!(!engine.toggle_sort("status"));
        assert!(!engine.toggle_column_visibility("roomNumber", false));
        assert!(!engine.set_date_range(DateRange::new(Some(0), None)));
    }

    #[test]
    fn test_page_clamped_when_rows_shrink() {
        let mut engine = engine(35);
        engine.set_page(3);
        assert_eq!(engine.state().page.index, 3);
        engine.set_rows(rooms(12));
        assert_eq!(engine.state().page.index, 1);
        assert_eq!(engine.page_rows().len(), 2);
    }

    #[test]
    fn test_callback_fires_on_prune() {
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut engine = engine(4).on_row_selection_change(move |rows| {
            sink.lock().unwrap().push(rows.len());
        });

        engine.toggle_row_selected(RowKey::from("room-3"));
        engine.set_rows(rooms(3));
        assert_eq!(*seen.lock().unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_page_check_state() {
        let mut engine = engine(15);
        assert_eq!(engine.page_check_state(), CheckState::Unchecked);
        engine.toggle_row_selected(RowKey::from("room-0"));
        assert_eq!(engine.page_check_state(), CheckState::Partial);
        engine.toggle_page_selection(true);
        assert_eq!(engine.page_check_state(), CheckState::Checked);
        assert_eq!(engine.selected_rows().len(), 10);
    }

    #[test]
    fn test_set_sort_drops_unsortable_columns() {
        let mut engine = engine(5);
        engine.set_sort(vec![
            SortEntry::new("status", SortDirection::Ascending),
            SortEntry::new("roomNumber", SortDirection::Descending),
        ]);
        assert_eq!(
            engine.state().sort,
            vec![SortEntry::new("roomNumber", SortDirection::Descending)]
        );
        let first = engine.page_rows()[0].row_key();
        assert_eq!(first, RowKey::from("room-4"));
    }
}
