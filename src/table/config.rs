use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 40, 50];

/// Caller-supplied switches for one table instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub enable_global_search: bool,
    pub enable_export: bool,
    pub enable_column_visibility: bool,
    pub enable_row_selection: bool,
    pub enable_date_filter: bool,

    /// Column (or record field) the date-range filter reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_filter_column: Option<String>,

    /// Base name for exported files, without extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_file_name: Option<String>,

    /// Initial loading flag
    pub loading: bool,

    pub page_size_options: Vec<usize>,
    pub default_page_size: usize,

    /// Header clicks append to the sort list instead of replacing it
    pub enable_multi_sort: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            enable_global_search: true,
            enable_export: true,
            enable_column_visibility: true,
            enable_row_selection: true,
            enable_date_filter: false,
            date_filter_column: None,
            export_file_name: None,
            loading: false,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            default_page_size: DEFAULT_PAGE_SIZE,
            enable_multi_sort: false,
        }
    }
}

impl TableConfig {
    /// The date filter column, only when the filter is switched on
    pub fn date_column(&self) -> Option<&str> {
        if self.enable_date_filter {
            self.date_filter_column.as_deref()
        } else {
            None
        }
    }

    /// Page size used for a fresh state; never zero
    pub fn initial_page_size(&self) -> usize {
        if self.default_page_size > 0 {
            self.default_page_size
        } else {
            self.page_size_options
                .iter()
                .copied()
                .find(|&size| size > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE)
        }
    }

    /// The page size that follows `current` in the options list, wrapping around
    pub fn next_page_size(&self, current: usize) -> usize {
        let options: Vec<usize> = self
            .page_size_options
            .iter()
            .copied()
            .filter(|&size| size > 0)
            .collect();
        if options.is_empty() {
            return current;
        }
        match options.iter().position(|&size| size == current) {
            Some(pos) => options[(pos + 1) % options.len()],
            None => options[0],
        }
    }

    pub fn export_base_name(&self) -> &str {
        self.export_file_name.as_deref().unwrap_or("export")
    }
}
