//! Pure state transitions
//!
//! `reduce` never mutates its input; it returns the next state. Configuration
//! mistakes (unknown filter or column ids, disabled features) leave the state
//! unchanged and are only logged.

use crate::data::record::Record;
use crate::table::action::TableAction;
use crate::table::derive::{clamp_page_index, DerivedView, TableContext};
use crate::table::predicate::normalize_query;
use crate::table::state::{EngineState, SortDirection, SortEntry};
use std::collections::BTreeSet;
use tracing::debug;

pub fn reduce<T: Record>(
    state: &EngineState,
    ctx: TableContext<'_, T>,
    view: &DerivedView,
    action: TableAction,
) -> EngineState {
    let resets_page = action.resets_page();
    let mut next = state.clone();

    match action {
        TableAction::SetGlobalQuery(query) => {
            if ctx.config.enable_global_search {
                next.global_query = normalize_query(&query);
            } else {
                debug!("Global search disabled, ignoring query");
            }
        }
        TableAction::SetFilterValue { filter, value } => {
            if ctx.filters.contains(&filter) {
                match value {
                    Some(value) => {
                        next.active_filters.insert(filter, BTreeSet::from([value]));
                    }
                    None => {
                        next.active_filters.remove(&filter);
                    }
                }
            } else {
                debug!("Unknown filter '{}', ignoring", filter);
            }
        }
        TableAction::SetFilterValues { filter, values } => {
            if ctx.filters.contains(&filter) {
                if values.is_empty() {
                    next.active_filters.remove(&filter);
                } else {
                    next.active_filters
                        .insert(filter, values.into_iter().collect());
                }
            } else {
                debug!("Unknown filter '{}', ignoring", filter);
            }
        }
        TableAction::ClearFilters => next.active_filters.clear(),
        TableAction::SetDateRange(range) => {
            if ctx.config.date_column().is_some() {
                // An inverted range is kept as given and simply matches nothing
                next.date_range = range;
            } else {
                debug!("Date filter not configured, ignoring range");
            }
        }
        TableAction::ToggleSort(column) => toggle_sort(&mut next, ctx, &column),
        TableAction::SetSort(entries) => next.sort = sanitize_sort(ctx, entries),
        TableAction::ClearSort => next.sort.clear(),
        TableAction::SetPage(index) => {
            next.page.index = clamp_page_index(index, view.total_filtered_count, next.page.size);
        }
        TableAction::NextPage => {
            next.page.index = clamp_page_index(
                next.page.index.saturating_add(1),
                view.total_filtered_count,
                next.page.size,
            );
        }
        TableAction::PreviousPage => next.page.index = next.page.index.saturating_sub(1),
        TableAction::FirstPage => next.page.index = 0,
        TableAction::LastPage => {
            next.page.index = view.page_count.saturating_sub(1);
        }
        TableAction::SetPageSize(size) => {
            if size > 0 {
                next.page.size = size;
            } else {
                debug!("Ignoring zero page size");
            }
        }
        TableAction::ToggleColumnVisibility { column, visible } => {
            match ctx.columns.get(&column) {
                Some(descriptor)
                    if descriptor.enable_hiding && ctx.config.enable_column_visibility =>
                {
                    if visible {
                        next.column_visibility.remove(&column);
                    } else {
                        next.column_visibility.insert(column, false);
                    }
                }
                Some(_) => debug!("Column '{}' cannot be hidden", column),
                None => debug!("Unknown column '{}', ignoring visibility change", column),
            }
        }
        TableAction::ResetColumnVisibility => next.column_visibility.clear(),
        TableAction::SetRowSelection(keys) => {
            if ctx.config.enable_row_selection {
                next.row_selection = keys;
            }
        }
        TableAction::ToggleRowSelected(key) => {
            if ctx.config.enable_row_selection && !next.row_selection.remove(&key) {
                next.row_selection.insert(key);
            }
        }
        TableAction::TogglePageSelection(select) => {
            if ctx.config.enable_row_selection {
                for &i in view.page_indices() {
                    let key = ctx.rows[i].row_key();
                    if select {
                        next.row_selection.insert(key);
                    } else {
                        next.row_selection.remove(&key);
                    }
                }
            }
        }
        TableAction::SelectAllFiltered => {
            if ctx.config.enable_row_selection {
                next.row_selection
                    .extend(view.filtered.iter().map(|&i| ctx.rows[i].row_key()));
            }
        }
        TableAction::ClearSelection => next.row_selection.clear(),
        TableAction::SetLoading(loading) => next.is_loading = loading,
        TableAction::Reset => {
            let mut fresh = EngineState::initial(ctx.config);
            fresh.is_loading = next.is_loading;
            next = fresh;
        }
    }

    if resets_page && next != *state {
        next.page.index = 0;
    }

    next
}

/// Single sort: unsorted -> ascending -> descending -> unsorted.
/// Multi sort: the same cycle for this column inside the priority list.
fn sanitize_sort<T>(ctx: TableContext<'_, T>, entries: Vec<SortEntry>) -> Vec<SortEntry> {
    let mut sort: Vec<SortEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match ctx.columns.get(&entry.column) {
            Some(descriptor) if descriptor.enable_sorting => {}
            _ => {
                debug!("Column '{}' cannot be sorted, dropping", entry.column);
                continue;
            }
        }
        if sort.iter().any(|e| e.column == entry.column) {
            continue;
        }
        sort.push(entry);
    }
    if !ctx.config.enable_multi_sort {
        sort.truncate(1);
    }
    sort
}

fn toggle_sort<T>(state: &mut EngineState, ctx: TableContext<'_, T>, column: &str) {
    match ctx.columns.get(column) {
        Some(descriptor) if descriptor.enable_sorting => {}
        Some(_) => {
            debug!("Column '{}' is not sortable", column);
            return;
        }
        None => {
            debug!("Unknown column '{}', ignoring sort", column);
            return;
        }
    }

    let current = state.sort_for(column);
    if !ctx.config.enable_multi_sort {
        let only_this = state.sort.len() == 1 && current.is_some();
        state.sort = match current {
            Some((_, SortDirection::Ascending)) if only_this => {
                vec![SortEntry::new(column, SortDirection::Descending)]
            }
            Some((_, SortDirection::Descending)) if only_this => Vec::new(),
            _ => vec![SortEntry::new(column, SortDirection::Ascending)],
        };
        return;
    }

    match current {
        None => state
            .sort
            .push(SortEntry::new(column, SortDirection::Ascending)),
        Some((pos, SortDirection::Ascending)) => {
            state.sort[pos].direction = SortDirection::Descending;
        }
        Some((pos, SortDirection::Descending)) => {
            state.sort.remove(pos);
        }
    }
}
