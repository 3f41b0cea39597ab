// Pure grid rendering from a GridRenderContext snapshot
// Knows nothing about the shell's event loop

use crate::config::config::IconConfig;
use crate::data::record::Record;
use crate::table::engine::{CheckState, TableEngine};
use crate::table::renderer::CellRenderer;
use crate::table::state::SortDirection;
use crate::ui::style_resolver::StyleResolver;
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub label: String,
    pub sort: Option<SortDirection>,
    /// 1-based position in the sort list, shown only for multi-column sorts
    pub sort_priority: Option<usize>,
    pub sortable: bool,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub text: String,
    /// Raw status value, for badge columns
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub cells: Vec<GridCell>,
    pub selected: bool,
}

/// Everything needed to draw the grid for one frame
pub struct GridRenderContext<'a> {
    pub title: String,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<GridRow>,
    pub cursor: Option<usize>,
    pub page_check: CheckState,
    pub selection_enabled: bool,
    pub show_row_numbers: bool,
    /// Row number of the first row on the page
    pub first_row_number: usize,
    pub loading: bool,
    pub icons: &'a IconConfig,
    pub styles: &'a dyn StyleResolver,
}

impl<'a> GridRenderContext<'a> {
    pub fn from_engine<T: Record>(
        engine: &TableEngine<T>,
        cursor: usize,
        focused_column: usize,
        icons: &'a IconConfig,
        styles: &'a dyn StyleResolver,
    ) -> Self {
        let state = engine.state();
        let columns = engine.visible_columns();
        let multi = state.sort.len() > 1;

        let headers = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let sort = state.sort_for(&column.id);
                HeaderCell {
                    label: column.header.clone(),
                    sort: sort.map(|(_, direction)| direction),
                    sort_priority: sort.filter(|_| multi).map(|(pos, _)| pos + 1),
                    sortable: column.enable_sorting,
                    focused: i == focused_column,
                }
            })
            .collect();

        let rows: Vec<GridRow> = engine
            .page_rows()
            .into_iter()
            .map(|row| GridRow {
                cells: columns
                    .iter()
                    .map(|column| GridCell {
                        text: column.display(row),
                        status: matches!(column.renderer, CellRenderer::Badge { .. })
                            .then(|| column.value(row).to_string()),
                    })
                    .collect(),
                selected: state.is_selected(&row.row_key()),
            })
            .collect();

        let cursor = (!rows.is_empty()).then(|| cursor.min(rows.len() - 1));

        Self {
            title: String::new(),
            headers,
            rows,
            cursor,
            page_check: engine.page_check_state(),
            selection_enabled: engine.config().enable_row_selection,
            show_row_numbers: false,
            first_row_number: state.page.offset() + 1,
            loading: engine.is_loading(),
            icons,
            styles,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_row_numbers(mut self, show: bool) -> Self {
        self.show_row_numbers = show;
        self
    }

    fn check_glyph(&self, state: CheckState) -> &str {
        match state {
            CheckState::Checked => &self.icons.checked,
            CheckState::Partial => &self.icons.partial,
            CheckState::Unchecked => &self.icons.unchecked,
        }
    }
}

/// Header text: label, sort arrow, and the priority number for multi-sorts
pub fn header_label(header: &HeaderCell, icons: &IconConfig) -> String {
    let arrow = match header.sort {
        Some(SortDirection::Ascending) => icons.sort_ascending.as_str(),
        Some(SortDirection::Descending) => icons.sort_descending.as_str(),
        None => "",
    };
    match (arrow.is_empty(), header.sort_priority) {
        (true, _) => header.label.clone(),
        (false, Some(priority)) => format!("{} {}{}", header.label, arrow, priority),
        (false, None) => format!("{} {}", header.label, arrow),
    }
}

pub fn render_grid(f: &mut Frame, area: Rect, ctx: &GridRenderContext) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(ctx.styles.border_style())
        .title(ctx.title.clone());

    // Controls stay live while loading; only the grid is replaced
    if ctx.loading {
        let loading = Paragraph::new(format!("{} Loading…", ctx.icons.loading))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        f.render_widget(loading, area);
        return;
    }

    if ctx.rows.is_empty() {
        let empty = Paragraph::new("No matching rows")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let table = Table::new(build_data_rows(ctx), column_widths(ctx))
        .header(build_header_row(ctx))
        .block(block)
        .column_spacing(1);

    f.render_widget(table, area);
}

fn build_header_row(ctx: &GridRenderContext) -> Row<'static> {
    let mut cells: Vec<Cell> = Vec::new();

    if ctx.selection_enabled {
        cells.push(Cell::from(ctx.check_glyph(ctx.page_check).to_string()));
    }
    if ctx.show_row_numbers {
        cells.push(
            Cell::from("#").style(
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
        );
    }

    for header in &ctx.headers {
        let mut style = ctx.styles.header_style();
        if header.focused {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if !header.sortable {
            style = style.add_modifier(Modifier::DIM);
        }
        cells.push(Cell::from(header_label(header, ctx.icons)).style(style));
    }

    Row::new(cells).height(1)
}

fn build_data_rows(ctx: &GridRenderContext) -> Vec<Row<'static>> {
    ctx.rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mut cells: Vec<Cell> = Vec::new();

            if ctx.selection_enabled {
                let state = if row.selected {
                    CheckState::Checked
                } else {
                    CheckState::Unchecked
                };
                cells.push(Cell::from(ctx.check_glyph(state).to_string()));
            }
            if ctx.show_row_numbers {
                cells.push(
                    Cell::from((ctx.first_row_number + row_idx).to_string())
                        .style(Style::default().fg(Color::DarkGray)),
                );
            }

            for cell in &row.cells {
                let style = cell
                    .status
                    .as_deref()
                    .and_then(|status| ctx.styles.status_style(status))
                    .unwrap_or_default();
                cells.push(Cell::from(cell.text.clone()).style(style));
            }

            let row_style = if ctx.cursor == Some(row_idx) {
                ctx.styles.cursor_style()
            } else if row.selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(cells).style(row_style)
        })
        .collect()
}

/// Width of each column: the longest of header and page cells, capped
fn column_widths(ctx: &GridRenderContext) -> Vec<Constraint> {
    const MAX_WIDTH: usize = 40;

    let mut widths = Vec::new();
    if ctx.selection_enabled {
        widths.push(Constraint::Length(3));
    }
    if ctx.show_row_numbers {
        let digits = (ctx.first_row_number + ctx.rows.len()).to_string().len();
        widths.push(Constraint::Length(digits.max(1) as u16));
    }

    for (i, header) in ctx.headers.iter().enumerate() {
        let content = ctx
            .rows
            .iter()
            .filter_map(|row| row.cells.get(i))
            .map(|cell| cell.text.chars().count())
            .max()
            .unwrap_or(0);
        let header_width = header_label(header, ctx.icons).chars().count();
        widths.push(Constraint::Length(content.max(header_width).min(MAX_WIDTH) as u16));
    }
    widths
}
