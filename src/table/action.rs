// Transitions the table engine understands.
// Every engine operation is expressed as one of these and applied by the reducer.

use crate::data::record::RowKey;
use crate::table::filter::DateRange;
use crate::table::state::SortEntry;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    // Search and filtering
    SetGlobalQuery(String),
    SetFilterValue {
        filter: String,
        value: Option<String>,
    },
    SetFilterValues {
        filter: String,
        values: Vec<String>,
    },
    ClearFilters,
    SetDateRange(DateRange),

    // Sorting
    ToggleSort(String),
    /// Replace the sort list; unknown or unsortable columns are dropped
    SetSort(Vec<SortEntry>),
    ClearSort,

    // Pagination
    SetPage(usize),
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    SetPageSize(usize),

    // Column visibility
    ToggleColumnVisibility { column: String, visible: bool },
    ResetColumnVisibility,

    // Row selection
    SetRowSelection(BTreeSet<RowKey>),
    ToggleRowSelected(RowKey),
    /// Header checkbox: (de)select the rows on the current page only
    TogglePageSelection(bool),
    /// Explicit opt-in: select every row matching the current filters
    SelectAllFiltered,
    ClearSelection,

    SetLoading(bool),
    /// Back to the configured defaults; rows and the loading flag are kept
    Reset,
}

impl TableAction {
    /// Actions after which the first page is shown again
    pub fn resets_page(&self) -> bool {
        matches!(
            self,
            TableAction::SetGlobalQuery(_)
                | TableAction::SetFilterValue { .. }
                | TableAction::SetFilterValues { .. }
                | TableAction::ClearFilters
                | TableAction::SetDateRange(_)
                | TableAction::SetPageSize(_)
        )
    }
}
