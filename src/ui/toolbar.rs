// Toolbar summary line and pagination bar
// Text builders are pure so the bar contents can be tested without a terminal

use crate::data::record::Record;
use crate::table::engine::TableEngine;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Numbers behind the pagination bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSummary {
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub first_row: usize,
    pub last_row: usize,
    pub filtered: usize,
    pub total: usize,
    pub selected: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationSummary {
    pub fn from_engine<T: Record>(engine: &TableEngine<T>) -> Self {
        let view = engine.view();
        let state = engine.state();
        let shown = view.page_window.len();
        let first_row = if shown == 0 { 0 } else { view.page_window.start + 1 };
        Self {
            page_index: state.page.index,
            page_count: view.page_count,
            page_size: state.page.size,
            first_row,
            last_row: view.page_window.start + shown,
            filtered: view.total_filtered_count,
            total: view.total_count,
            selected: state.row_selection.len(),
            has_previous: view.has_previous_page(state.page.index),
            has_next: view.has_next_page(state.page.index),
        }
    }

    /// `Page 2 of 5`; an empty result still reads as one page
    pub fn page_label(&self) -> String {
        format!(
            "Page {} of {}",
            self.page_index + 1,
            self.page_count.max(1)
        )
    }

    /// `11-20 of 42 rows`, plus the unfiltered total when filters hide rows
    pub fn rows_label(&self) -> String {
        let range = format!("{}-{} of {} rows", self.first_row, self.last_row, self.filtered);
        if self.filtered == self.total {
            range
        } else {
            format!("{} (filtered from {})", range, self.total)
        }
    }
}

/// Active search, filters and date range as short labelled spans
pub fn toolbar_spans<T: Record>(engine: &TableEngine<T>) -> Vec<Span<'static>> {
    let state = engine.state();
    let label_style = Style::default().fg(Color::DarkGray);
    let value_style = Style::default().fg(Color::Cyan);
    let mut spans = Vec::new();

    if !state.global_query.is_empty() {
        spans.push(Span::styled("Search: ", label_style));
        spans.push(Span::styled(format!("\"{}\"  ", state.global_query), value_style));
    }

    for filter in engine.filters().iter() {
        let Some(values) = state.active_filters.get(&filter.id) else {
            continue;
        };
        let labels: Vec<&str> = values
            .iter()
            .map(|v| filter.option_label(v).unwrap_or(v))
            .collect();
        spans.push(Span::styled(format!("{}: ", filter.label), label_style));
        spans.push(Span::styled(format!("{}  ", labels.join(", ")), value_style));
    }

    if let Some(column) = engine.config().date_column() {
        if state.date_range.is_active() {
            let label = engine
                .columns()
                .get(column)
                .map(|c| c.header.clone())
                .unwrap_or_else(|| column.to_string());
            spans.push(Span::styled(format!("{}: ", label), label_style));
            spans.push(Span::styled(format!("{}  ", state.date_range), value_style));
        }
    }

    if spans.is_empty() {
        spans.push(Span::styled(
            "No filters  (/ search, f filters, d dates, c columns, ? help)",
            label_style,
        ));
    }
    spans
}

pub fn render_toolbar<T: Record>(f: &mut Frame, area: Rect, engine: &TableEngine<T>) {
    let mut spans = toolbar_spans(engine);
    if engine.is_loading() {
        spans.insert(
            0,
            Span::styled(
                "Loading…  ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        );
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_pagination(f: &mut Frame, area: Rect, summary: &PaginationSummary, status: &str) {
    let enabled = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let disabled = Style::default().fg(Color::DarkGray);
    let dim = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(
            "◀ Prev",
            if summary.has_previous { enabled } else { disabled },
        ),
        Span::raw("  "),
        Span::styled(summary.page_label(), enabled),
        Span::raw("  "),
        Span::styled(
            "Next ▶",
            if summary.has_next { enabled } else { disabled },
        ),
        Span::styled("  │  ", dim),
        Span::raw(summary.rows_label()),
        Span::styled("  │  ", dim),
        Span::raw(format!("{} per page", summary.page_size)),
    ];
    if summary.selected > 0 {
        spans.push(Span::styled("  │  ", dim));
        spans.push(Span::styled(
            format!("{} selected", summary.selected),
            Style::default().fg(Color::Yellow),
        ));
    }
    if !status.is_empty() {
        spans.push(Span::styled("  │  ", dim));
        spans.push(Span::styled(status.to_string(), Style::default().fg(Color::Green)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
