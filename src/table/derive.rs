//! The derivation pass: rows + column model + filters + state -> visible page
//!
//! Order matters and is fixed: discrete filters, date range, global search,
//! sort, count, page slice, then selection pruning against the full row set.

use crate::data::record::{Record, RowKey};
use crate::data::value::CellValue;
use crate::table::column::{ColumnModel, SortingFn};
use crate::table::config::TableConfig;
use crate::table::filter::FilterRegistry;
use crate::table::predicate::RowFilter;
use crate::table::state::{EngineState, SortDirection};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::Range;
use tracing::trace;

/// Everything the derivation reads besides the state
pub struct TableContext<'a, T> {
    pub rows: &'a [T],
    pub columns: &'a ColumnModel<T>,
    pub filters: &'a FilterRegistry,
    pub config: &'a TableConfig,
}

impl<T> Clone for TableContext<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TableContext<'_, T> {}

/// Result of one derivation. Holds row indices into the source rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedView {
    /// Filtered rows in sorted order
    pub filtered: Vec<usize>,
    /// Window into `filtered` for the current page
    pub page_window: Range<usize>,
    pub total_filtered_count: usize,
    pub total_count: usize,
    pub page_count: usize,
}

impl DerivedView {
    /// Source row indices on the current page
    pub fn page_indices(&self) -> &[usize] {
        &self.filtered[self.page_window.clone()]
    }

    pub fn page_rows<'a, T>(&self, rows: &'a [T]) -> Vec<&'a T> {
        self.page_indices().iter().map(|&i| &rows[i]).collect()
    }

    pub fn filtered_rows<'a, T>(&self, rows: &'a [T]) -> Vec<&'a T> {
        self.filtered.iter().map(|&i| &rows[i]).collect()
    }

    pub fn has_previous_page(&self, page_index: usize) -> bool {
        page_index > 0
    }

    pub fn has_next_page(&self, page_index: usize) -> bool {
        page_index + 1 < self.page_count
    }
}

/// A derived view together with the state corrected during derivation
#[derive(Debug, Clone)]
pub struct Derivation {
    pub view: DerivedView,
    pub state: EngineState,
}

/// Number of pages for a row count; zero rows means zero pages
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Clamp a page index into `[0, page_count - 1]`
pub fn clamp_page_index(index: usize, total: usize, page_size: usize) -> usize {
    index.min(page_count(total, page_size).saturating_sub(1))
}

pub fn derive<T: Record>(ctx: TableContext<'_, T>, state: &EngineState) -> Derivation {
    let mut next = state.clone();

    // Steps 1-4: full row set through filters, date range and search
    let row_filter = RowFilter::new(ctx.columns, ctx.filters, ctx.config, state);
    let mut filtered: Vec<usize> = if row_filter.is_noop() {
        (0..ctx.rows.len()).collect()
    } else {
        (0..ctx.rows.len())
            .filter(|&i| row_filter.matches(&ctx.rows[i]))
            .collect()
    };

    // Step 5: stable multi-key sort
    sort_indices(&mut filtered, ctx, state);

    // Step 6
    let total_filtered_count = filtered.len();

    // Step 7: clamp the page and slice the window
    let size = state.page.size.max(1);
    next.page.size = size;
    next.page.index = clamp_page_index(state.page.index, total_filtered_count, size);
    let start = next.page.offset().min(total_filtered_count);
    let end = (start + size).min(total_filtered_count);

    // Step 8: selection only loses rows that vanished from the source
    if !next.row_selection.is_empty() {
        let live: HashSet<RowKey> = ctx.rows.iter().map(|r| r.row_key()).collect();
        next.row_selection.retain(|key| live.contains(key));
    }

    trace!(
        total = ctx.rows.len(),
        filtered = total_filtered_count,
        page = next.page.index,
        "derived table view"
    );

    Derivation {
        view: DerivedView {
            page_count: page_count(total_filtered_count, size),
            filtered,
            page_window: start..end,
            total_filtered_count,
            total_count: ctx.rows.len(),
        },
        state: next,
    }
}

fn sort_indices<T: Record>(indices: &mut [usize], ctx: TableContext<'_, T>, state: &EngineState) {
    let keys: Vec<(&SortingFn, SortDirection, usize)> = state
        .sort
        .iter()
        .filter_map(|entry| {
            let pos = ctx.columns.index_of(&entry.column)?;
            let column = ctx.columns.iter().nth(pos)?;
            column
                .enable_sorting
                .then_some((&column.sorting_fn, entry.direction, pos))
        })
        .collect();

    if keys.is_empty() || indices.len() < 2 {
        return;
    }

    // Accessors run once per row and key, not once per comparison
    let columns: Vec<_> = ctx.columns.iter().collect();
    let sort_values: Vec<Vec<CellValue>> = indices
        .iter()
        .map(|&i| {
            keys.iter()
                .map(|(_, _, pos)| columns[*pos].value(&ctx.rows[i]))
                .collect()
        })
        .collect();

    let mut order: Vec<usize> = (0..indices.len()).collect();
    order.sort_by(|&a, &b| {
        keys.iter()
            .enumerate()
            .map(|(k, (sorting_fn, direction, _))| {
                compare_sort_values(sorting_fn, *direction, &sort_values[a][k], &sort_values[b][k])
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    let sorted: Vec<usize> = order.iter().map(|&o| indices[o]).collect();
    indices.copy_from_slice(&sorted);
}

/// Direction-aware comparison; unsortable values stay last in both directions
pub fn compare_sort_values(
    sorting_fn: &SortingFn,
    direction: SortDirection,
    a: &CellValue,
    b: &CellValue,
) -> Ordering {
    match (sorting_fn.is_unsortable(a), sorting_fn.is_unsortable(b)) {
        (false, false) => {
            let ord = sorting_fn.compare(a, b);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn test_clamp_page_index() {
        assert_eq!(clamp_page_index(5, 25, 10), 2);
        assert_eq!(clamp_page_index(1, 25, 10), 1);
        assert_eq!(clamp_page_index(3, 0, 10), 0);
    }

    #[test]
    fn test_unsortable_last_in_both_directions() {
        let basic = SortingFn::Basic;
        let num = CellValue::Integer(1);
        let nan = CellValue::from("n/a");
        assert_eq!(
            compare_sort_values(&basic, SortDirection::Ascending, &num, &nan),
            Ordering::Less
        );
        assert_eq!(
            compare_sort_values(&basic, SortDirection::Descending, &num, &nan),
            Ordering::Less
        );
        assert_eq!(
            compare_sort_values(
                &basic,
                SortDirection::Descending,
                &CellValue::Integer(1),
                &CellValue::Integer(2)
            ),
            Ordering::Greater
        );
    }
}
