//! Interactive terminal shell around one [`TableEngine`]
//!
//! Keys are mapped to [`ShellCommand`]s by the key mapper and applied here;
//! the engine stays the only owner of table state. Drawing reads a snapshot
//! of the engine each frame.

use crate::config::config::{Config, IconConfig};
use crate::data::exporter::{DataExporter, ExportFormat};
use crate::data::record::Record;
use crate::table::engine::{CheckState, TableEngine};
use crate::table::filter::DateRange;
use crate::ui::key_mapper::{map_key, ShellCommand, ShellMode, KEY_HELP};
use crate::ui::style_resolver::{StyleResolver, ThemeStyleResolver};
use crate::ui::table_renderer::{render_grid, GridRenderContext};
use crate::ui::toolbar::{render_pagination, render_toolbar, PaginationSummary};
use crate::utils::app_paths::AppPaths;
use crate::utils::logging::LogRingBuffer;
use crate::widgets::checklist::{Checklist, ChecklistItem};
use crate::widgets::log_pane::LogPane;
use crate::widgets::search_input::{SearchInput, SearchInputAction};
use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Re-reads the row source for the reload command
pub type Reloader<T> = Box<dyn FnMut() -> Result<Vec<T>>>;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub title: String,
    pub export_dir: PathBuf,
    pub export_format: ExportFormat,
    pub search_debounce_ms: u64,
    pub show_row_numbers: bool,
    pub icons: IconConfig,
}

impl ShellOptions {
    pub fn from_config(config: &Config, title: impl Into<String>) -> Result<Self> {
        let export_dir = match &config.behavior.export_dir {
            Some(dir) => dir.clone(),
            None => AppPaths::export_dir()?,
        };
        Ok(Self {
            title: title.into(),
            export_dir,
            export_format: config.behavior.default_export_format,
            search_debounce_ms: config.behavior.search_debounce_ms,
            show_row_numbers: config.display.show_row_numbers,
            icons: config.display.icons.clone(),
        })
    }
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            export_dir: std::env::temp_dir(),
            export_format: ExportFormat::default(),
            search_debounce_ms: 300,
            show_row_numbers: false,
            icons: IconConfig::default(),
        }
    }
}

pub struct TableShell<T: Record> {
    engine: TableEngine<T>,
    options: ShellOptions,
    styles: Box<dyn StyleResolver>,
    mode: ShellMode,
    /// Row cursor within the current page
    cursor: usize,
    /// Index into the visible columns
    focused_column: usize,
    search: SearchInput,
    date_input: SearchInput,
    menu: Checklist,
    logs: Option<LogPane>,
    reloader: Option<Reloader<T>>,
    reload_pending: bool,
    status: String,
    should_quit: bool,
}

impl<T: Record> TableShell<T> {
    pub fn new(engine: TableEngine<T>, options: ShellOptions) -> Self {
        let mut search = SearchInput::new("Search", options.search_debounce_ms);
        search.set_value(engine.state().global_query.clone());
        let date_title = match engine.config().date_column() {
            Some(column) => format!("Date range on {} (from..to, Enter apply)", column),
            None => "Date range".to_string(),
        };

        Self {
            engine,
            options,
            styles: Box::new(ThemeStyleResolver::default()),
            mode: ShellMode::Normal,
            cursor: 0,
            focused_column: 0,
            search,
            date_input: SearchInput::new(date_title, 0)
                .with_style(Style::default().fg(Color::Magenta)),
            menu: Checklist::default(),
            logs: None,
            reloader: None,
            reload_pending: false,
            status: String::new(),
            should_quit: false,
        }
    }

    pub fn with_styles(mut self, styles: Box<dyn StyleResolver>) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_reloader<F>(mut self, reloader: F) -> Self
    where
        F: FnMut() -> Result<Vec<T>> + 'static,
    {
        self.reloader = Some(Box::new(reloader));
        self
    }

    pub fn with_log_buffer(mut self, buffer: LogRingBuffer) -> Self {
        self.logs = Some(LogPane::new(buffer));
        self
    }

    pub fn engine(&self) -> &TableEngine<T> {
        &self.engine
    }

    pub fn into_engine(self) -> TableEngine<T> {
        self.engine
    }

    pub fn mode(&self) -> ShellMode {
        self.mode
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn focused_column(&self) -> usize {
        self.focused_column
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn menu(&self) -> &Checklist {
        &self.menu
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Windows reports releases too
        if key.kind != KeyEventKind::Press {
            return;
        }
        let command = map_key(self.mode, key);
        self.apply(command);
    }

    /// Apply debounced search text. Call between key events.
    pub fn tick(&mut self) {
        if self.mode != ShellMode::Search {
            return;
        }
        if let Some(query) = self.search.check_debounce() {
            debug!("Debounced search: '{}'", query);
            self.engine.set_global_query(&query);
            self.clamp_cursor();
        }
    }

    pub fn apply(&mut self, command: ShellCommand) {
        match command {
            ShellCommand::Quit => self.should_quit = true,

            ShellCommand::CursorUp => self.cursor = self.cursor.saturating_sub(1),
            ShellCommand::CursorDown => self.cursor += 1,
            ShellCommand::CursorTop => self.cursor = 0,
            ShellCommand::CursorBottom => self.cursor = usize::MAX,
            ShellCommand::FocusLeft => {
                self.focused_column = self.focused_column.saturating_sub(1)
            }
            ShellCommand::FocusRight => self.focused_column += 1,

            ShellCommand::SortFocused => self.sort_focused(),
            ShellCommand::ClearSort => {
                self.engine.clear_sort();
            }

            ShellCommand::NextPage => self.change_page(|engine| engine.next_page()),
            ShellCommand::PreviousPage => self.change_page(|engine| engine.previous_page()),
            ShellCommand::FirstPage => self.change_page(|engine| engine.first_page()),
            ShellCommand::LastPage => self.change_page(|engine| engine.last_page()),
            ShellCommand::CyclePageSize => {
                let next = self
                    .engine
                    .config()
                    .next_page_size(self.engine.state().page.size);
                if self.engine.set_page_size(next) {
                    self.status = format!("{} rows per page", next);
                }
            }

            ShellCommand::ToggleRowSelected => {
                if self.selection_allowed() {
                    let key = self
                        .engine
                        .page_rows()
                        .get(self.cursor)
                        .map(|row| row.row_key());
                    if let Some(key) = key {
                        self.engine.toggle_row_selected(key);
                    }
                }
            }
            ShellCommand::TogglePageSelection => {
                if self.selection_allowed() {
                    let select = self.engine.page_check_state() != CheckState::Checked;
                    self.engine.toggle_page_selection(select);
                }
            }
            ShellCommand::SelectAllFiltered => {
                if self.selection_allowed() && self.engine.select_all_filtered() {
                    self.status = format!(
                        "Selected {} rows",
                        self.engine.state().row_selection.len()
                    );
                }
            }
            ShellCommand::ClearSelection => {
                self.engine.clear_selection();
            }

            ShellCommand::OpenSearch => {
                if self.engine.config().enable_global_search {
                    self.search.activate();
                    self.mode = ShellMode::Search;
                } else {
                    self.status = "Search is disabled for this table".to_string();
                }
            }
            ShellCommand::ClearSearch => {
                self.search.set_value("");
                self.engine.set_global_query("");
            }
            ShellCommand::OpenFilterMenu => {
                if self.engine.filters().is_empty() {
                    self.status = "No filters for this table".to_string();
                } else {
                    self.menu = self.filter_menu(0);
                    self.mode = ShellMode::FilterMenu;
                }
            }
            ShellCommand::ClearFilters => {
                self.engine.clear_filters();
            }
            ShellCommand::OpenDateRange => {
                if self.engine.config().date_column().is_some() {
                    self.date_input
                        .set_value(self.engine.state().date_range.to_string());
                    self.date_input.activate();
                    self.mode = ShellMode::DateRange;
                } else {
                    self.status = "No date filter for this table".to_string();
                }
            }
            ShellCommand::ClearDateRange => {
                self.engine.set_date_range(DateRange::default());
            }
            ShellCommand::OpenColumnMenu => {
                if self.engine.config().enable_column_visibility {
                    self.menu = self.column_menu(0);
                    self.mode = ShellMode::ColumnMenu;
                } else {
                    self.status = "Column visibility is fixed for this table".to_string();
                }
            }

            ShellCommand::Export => self.export(false),
            ShellCommand::ExportSelected => self.export(true),
            ShellCommand::Reload => {
                if self.reloader.is_some() {
                    self.engine.set_loading(true);
                    self.reload_pending = true;
                } else {
                    self.status = "Nothing to reload".to_string();
                }
            }
            ShellCommand::ResetTable => {
                self.engine.reset();
                self.search.set_value("");
                self.cursor = 0;
                self.focused_column = 0;
                self.status = "Table reset".to_string();
            }

            ShellCommand::ToggleLogs => {
                if self.logs.is_some() {
                    self.mode = ShellMode::Logs;
                } else {
                    self.status = "Log capture is off".to_string();
                }
            }
            ShellCommand::ToggleHelp => self.mode = ShellMode::Help,

            ShellCommand::MenuUp => match self.mode {
                ShellMode::Logs => {
                    if let Some(logs) = self.logs.as_mut() {
                        logs.scroll_up();
                    }
                }
                _ => self.menu.move_up(),
            },
            ShellCommand::MenuDown => match self.mode {
                ShellMode::Logs => {
                    if let Some(logs) = self.logs.as_mut() {
                        logs.scroll_down();
                    }
                }
                _ => self.menu.move_down(),
            },
            ShellCommand::MenuToggle => {
                if self.menu.toggle_current().is_some() {
                    self.apply_menu();
                }
            }
            ShellCommand::MenuSelectOnly => {
                let changed = match self.mode {
                    ShellMode::FilterMenu => self.menu.select_only_current().is_some(),
                    _ => self.menu.toggle_current().is_some(),
                };
                if changed {
                    self.apply_menu();
                }
            }
            ShellCommand::MenuNextGroup => self.menu.next_group(),
            ShellCommand::MenuReset => self.reset_menu(),
            ShellCommand::CloseOverlay => self.mode = ShellMode::Normal,

            ShellCommand::TextInput(key) => self.text_input(key),
            ShellCommand::None => {}
        }
        self.clamp_cursor();
    }

    fn selection_allowed(&mut self) -> bool {
        if !self.engine.config().enable_row_selection {
            self.status = "Row selection is disabled for this table".to_string();
            return false;
        }
        true
    }

    fn change_page(&mut self, step: impl FnOnce(&mut TableEngine<T>) -> bool) {
        if step(&mut self.engine) {
            self.cursor = 0;
        }
    }

    fn sort_focused(&mut self) {
        let Some((id, header, sortable)) = self
            .engine
            .visible_columns()
            .get(self.focused_column)
            .map(|c| (c.id.clone(), c.header.clone(), c.enable_sorting))
        else {
            return;
        };
        if !sortable {
            self.status = format!("{} is not sortable", header);
            return;
        }
        self.engine.toggle_sort(&id);
        self.status = match self.engine.state().sort_for(&id) {
            Some((_, direction)) => format!("Sorted by {} {}", header, direction.indicator()),
            None => format!("{} unsorted", header),
        };
    }

    fn text_input(&mut self, key: KeyEvent) {
        match self.mode {
            ShellMode::Search => match self.search.handle_key(key) {
                // Esc closes the box but keeps what was typed
                SearchInputAction::Confirm(query) => {
                    self.engine.set_global_query(&query);
                    self.mode = ShellMode::Normal;
                }
                SearchInputAction::Cancel => {
                    let query = self.search.value().to_string();
                    self.engine.set_global_query(&query);
                    self.mode = ShellMode::Normal;
                }
                SearchInputAction::PassThrough => self.mode = ShellMode::Normal,
                SearchInputAction::Changed(_) | SearchInputAction::Continue => {}
            },
            ShellMode::DateRange => match self.date_input.handle_key(key) {
                SearchInputAction::Confirm(text) => {
                    match DateRange::parse(&text) {
                        Ok(range) => {
                            self.engine.set_date_range(range);
                            self.status = if range.is_active() {
                                format!("Date range {}", range)
                            } else {
                                "Date range cleared".to_string()
                            };
                        }
                        Err(e) => {
                            warn!("Rejected date range '{}': {}", text, e);
                            self.status = format!("Invalid date range: {}", e);
                        }
                    }
                    self.mode = ShellMode::Normal;
                }
                SearchInputAction::Cancel | SearchInputAction::PassThrough => {
                    self.mode = ShellMode::Normal
                }
                SearchInputAction::Changed(_) | SearchInputAction::Continue => {}
            },
            _ => {}
        }
    }

    fn filter_menu(&self, cursor: usize) -> Checklist {
        let state = self.engine.state();
        let items = self
            .engine
            .filters()
            .iter()
            .flat_map(|filter| {
                let active = state.active_values(&filter.id);
                filter.options.iter().map(move |option| {
                    ChecklistItem::new(&filter.id, &option.value, &option.label)
                        .group_label(&filter.label)
                        .checked(active.is_some_and(|values| values.contains(&option.value)))
                })
            })
            .collect();
        Checklist::new("Filters", items).with_cursor(cursor)
    }

    fn column_menu(&self, cursor: usize) -> Checklist {
        let state = self.engine.state();
        let items = self
            .engine
            .columns()
            .iter()
            .map(|column| {
                ChecklistItem::new("Columns", &column.id, &column.header)
                    .checked(state.is_column_visible(&column.id))
                    .enabled(column.enable_hiding)
            })
            .collect();
        Checklist::new("Columns", items).with_cursor(cursor)
    }

    /// Push the menu item under the cursor into the engine
    fn apply_menu(&mut self) {
        let Some(item) = self.menu.current().cloned() else {
            return;
        };
        match self.mode {
            ShellMode::FilterMenu => {
                let values = self.menu.checked_values(&item.group);
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                self.engine.set_filter_values(&item.group, &values);
            }
            ShellMode::ColumnMenu => {
                self.engine.toggle_column_visibility(&item.value, item.checked);
                let visible = self.engine.visible_columns().len();
                self.focused_column = self.focused_column.min(visible.saturating_sub(1));
            }
            _ => {}
        }
    }

    fn reset_menu(&mut self) {
        let cursor = self.menu.cursor();
        match self.mode {
            ShellMode::FilterMenu => {
                if let Some(filter) = self.menu.current().map(|item| item.group.clone()) {
                    self.engine.set_filter_values(&filter, &[]);
                }
                self.menu = self.filter_menu(cursor);
            }
            ShellMode::ColumnMenu => {
                self.engine.reset_column_visibility();
                self.menu = self.column_menu(cursor);
            }
            _ => {}
        }
    }

    fn export(&mut self, selected_only: bool) {
        if !self.engine.config().enable_export {
            self.status = "Export is disabled for this table".to_string();
            return;
        }
        if selected_only && self.engine.state().row_selection.is_empty() {
            self.status = "No rows selected".to_string();
            return;
        }

        let dir = &self.options.export_dir;
        let format = self.options.export_format;
        let result = if selected_only {
            DataExporter::export_selected_to_path(&self.engine, None, dir, format)
        } else {
            DataExporter::export_to_path(&self.engine, None, dir, format)
        };
        self.status = match result {
            Ok(summary) => summary.to_string(),
            Err(e) => {
                error!("Export failed: {:#}", e);
                format!("Export failed: {}", e)
            }
        };
    }

    /// Run a reload requested by the reload command. The shell draws one
    /// frame with the loading flag set before this is called.
    pub fn finish_reload(&mut self) {
        if !self.reload_pending {
            return;
        }
        self.reload_pending = false;
        if let Some(reloader) = self.reloader.as_mut() {
            match reloader() {
                Ok(rows) => {
                    let count = rows.len();
                    self.engine.set_rows(rows);
                    info!("Reloaded {} rows", count);
                    self.status = format!("Reloaded {} rows", count);
                }
                Err(e) => {
                    error!("Reload failed: {:#}", e);
                    self.status = format!("Reload failed: {}", e);
                }
            }
        }
        self.engine.set_loading(false);
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let rows = self.engine.view().page_window.len();
        self.cursor = self.cursor.min(rows.saturating_sub(1));
        let columns = self.engine.visible_columns().len();
        self.focused_column = self.focused_column.min(columns.saturating_sub(1));
    }

    pub fn draw(&self, f: &mut Frame) {
        let area = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        if self.mode == ShellMode::DateRange {
            self.date_input.render(f, chunks[0]);
        } else {
            self.search.render(f, chunks[0]);
        }
        render_toolbar(f, chunks[1], &self.engine);

        let grid = GridRenderContext::from_engine(
            &self.engine,
            self.cursor,
            self.focused_column,
            &self.options.icons,
            self.styles.as_ref(),
        )
        .with_title(self.options.title.clone())
        .with_row_numbers(self.options.show_row_numbers);
        render_grid(f, chunks[2], &grid);

        render_pagination(
            f,
            chunks[3],
            &PaginationSummary::from_engine(&self.engine),
            &self.status,
        );

        match self.mode {
            ShellMode::FilterMenu | ShellMode::ColumnMenu => {
                self.menu
                    .render(f, centered_rect(50, 60, area), &self.options.icons)
            }
            ShellMode::Help => render_help(f, centered_rect(60, 70, area)),
            ShellMode::Logs => {
                if let Some(logs) = &self.logs {
                    logs.render(f, centered_rect(90, 70, area));
                }
            }
            _ => {}
        }
    }

    /// Take over the terminal until the user quits. The terminal is restored
    /// even when the loop fails.
    pub fn run(mut self) -> Result<TableEngine<T>> {
        enable_raw_mode().map_err(|e| anyhow!("Failed to enable raw mode: {}", e))?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(anyhow!("Failed to set up terminal: {}", e));
        }

        let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(anyhow!("Failed to create terminal: {}", e));
            }
        };

        let result = self.event_loop(&mut terminal);

        let _ = disable_raw_mode();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result.map(|_| self.engine)
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("Shell started: {} rows", self.engine.rows().len());
        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.reload_pending {
                self.finish_reload();
                continue;
            }

            self.tick();
            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
            if self.should_quit {
                info!("Shell closed");
                return Ok(());
            }
        }
    }
}

fn render_help(f: &mut Frame, area: Rect) {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let lines: Vec<Line> = KEY_HELP
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{:<18}", keys), key_style),
                Span::raw(*what),
            ])
        })
        .collect();

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Keys (Esc close)"),
        ),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::JsonRecord;
    use crate::table::column::{ColumnDescriptor, ColumnModel};
    use crate::table::config::TableConfig;
    use crate::table::filter::{FilterDescriptor, FilterRegistry};
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use serde_json::json;

    fn rooms(n: usize) -> Vec<JsonRecord> {
        (0..n)
            .map(|i| {
                let status = ["vacant", "occupied", "cleaning"][i % 3];
                JsonRecord::new(
                    format!("room-{}", i),
                    json!({
                        "roomNumber": format!("{}", 100 + i),
                        "status": status,
                        "checkIn": format!("2024-06-{:02}", i % 30 + 1),
                    })
                    .as_object()
                    .cloned()
                    .unwrap(),
                )
            })
            .collect()
    }

    fn shell(n: usize, config: TableConfig) -> TableShell<JsonRecord> {
        let engine = TableEngine::new(
            rooms(n),
            ColumnModel::new(vec![
                ColumnDescriptor::new("roomNumber", "Room").hideable(false),
                ColumnDescriptor::new("status", "Status"),
                ColumnDescriptor::new("checkIn", "Check-in"),
            ]),
            FilterRegistry::new(vec![FilterDescriptor::new("status", "Status")
                .option("vacant", "Vacant")
                .option("occupied", "Occupied")
                .option("cleaning", "Cleaning")]),
            config,
        );
        TableShell::new(engine, ShellOptions::default())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(shell: &mut TableShell<JsonRecord>, text: &str) {
        for c in text.chars() {
            shell.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_cursor_stays_on_page() {
        let mut shell = shell(12, TableConfig::default());
        shell.apply(ShellCommand::CursorBottom);
        assert_eq!(shell.cursor(), 9);
        shell.apply(ShellCommand::NextPage);
        assert_eq!(shell.cursor(), 0);
        shell.apply(ShellCommand::CursorBottom);
        assert_eq!(shell.cursor(), 1);
    }

    #[test]
    fn test_search_confirm_applies_query() {
        let mut shell = shell(12, TableConfig::default());
        shell.handle_key(key(KeyCode::Char('/')));
        assert_eq!(shell.mode(), ShellMode::Search);
        type_text(&mut shell, "vacant");
        shell.handle_key(key(KeyCode::Enter));

        assert_eq!(shell.mode(), ShellMode::Normal);
        assert_eq!(shell.engine().view().total_filtered_count, 4);

        shell.handle_key(key(KeyCode::Esc));
        assert_eq!(shell.engine().view().total_filtered_count, 12);
    }

    #[test]
    fn test_filter_menu_select_only_and_reset() {
        let mut shell = shell(12, TableConfig::default());
        shell.handle_key(key(KeyCode::Char('f')));
        assert_eq!(shell.mode(), ShellMode::FilterMenu);

        shell.handle_key(key(KeyCode::Down));
        shell.handle_key(key(KeyCode::Enter));
        let active = shell.engine().state().active_values("status").cloned();
        assert_eq!(active.unwrap().into_iter().collect::<Vec<_>>(), vec!["occupied"]);

        shell.handle_key(key(KeyCode::Up));
        shell.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(shell.engine().view().total_filtered_count, 8);

        shell.handle_key(key(KeyCode::Char('r')));
        assert!(!shell.engine().state().has_active_filters());
        assert!(shell.menu().checked_values("status").is_empty());
    }

    #[test]
    fn test_filter_menu_routes_by_id_when_labels_repeat() {
        let engine = TableEngine::new(
            rooms(12),
            ColumnModel::new(vec![
                ColumnDescriptor::new("roomNumber", "Room"),
                ColumnDescriptor::new("status", "Status"),
            ]),
            FilterRegistry::new(vec![
                FilterDescriptor::new("status", "Room").option("vacant", "Vacant"),
                FilterDescriptor::new("roomNumber", "Room").option("101", "101"),
            ]),
            TableConfig::default(),
        );
        let mut shell = TableShell::new(engine, ShellOptions::default());
        shell.apply(ShellCommand::OpenFilterMenu);
        shell.apply(ShellCommand::MenuNextGroup);
        assert_eq!(shell.menu().current().unwrap().group, "roomNumber");
        assert_eq!(shell.menu().current().unwrap().group_label, "Room");

        shell.apply(ShellCommand::MenuSelectOnly);
        let state = shell.engine().state();
        assert!(state.active_values("status").is_none());
        assert_eq!(
            state.active_values("roomNumber").cloned().unwrap().into_iter().collect::<Vec<_>>(),
            vec!["101"]
        );
        assert_eq!(shell.engine().view().total_filtered_count, 1);
    }

    #[test]
    fn test_column_menu_respects_hideable() {
        let mut shell = shell(3, TableConfig::default());
        shell.apply(ShellCommand::OpenColumnMenu);
        // Room cannot be hidden
        shell.apply(ShellCommand::MenuToggle);
        assert_eq!(shell.engine().visible_columns().len(), 3);

        shell.apply(ShellCommand::MenuDown);
        shell.apply(ShellCommand::MenuToggle);
        assert_eq!(shell.engine().visible_columns().len(), 2);

        shell.apply(ShellCommand::MenuReset);
        assert_eq!(shell.engine().visible_columns().len(), 3);
    }

    #[test]
    fn test_date_range_prompt() {
        let config = TableConfig {
            enable_date_filter: true,
            date_filter_column: Some("checkIn".to_string()),
            ..TableConfig::default()
        };
        let mut shell = shell(12, config);
        shell.handle_key(key(KeyCode::Char('d')));
        assert_eq!(shell.mode(), ShellMode::DateRange);
        type_text(&mut shell, "2024-06-01..2024-06-03");
        shell.handle_key(key(KeyCode::Enter));
        assert_eq!(shell.engine().view().total_filtered_count, 3);

        shell.handle_key(key(KeyCode::Char('d')));
        for _ in 0.."2024-06-01..2024-06-03".len() {
            shell.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut shell, "june");
        shell.handle_key(key(KeyCode::Enter));
        assert!(shell.status().starts_with("Invalid date range"));
        assert_eq!(shell.engine().view().total_filtered_count, 3);
    }

    #[test]
    fn test_date_range_needs_date_column() {
        let mut shell = shell(3, TableConfig::default());
        shell.apply(ShellCommand::OpenDateRange);
        assert_eq!(shell.mode(), ShellMode::Normal);
        assert_eq!(shell.status(), "No date filter for this table");
    }

    #[test]
    fn test_selection_disabled() {
        let config = TableConfig {
            enable_row_selection: false,
            ..TableConfig::default()
        };
        let mut shell = shell(3, config);
        shell.apply(ShellCommand::ToggleRowSelected);
        shell.apply(ShellCommand::SelectAllFiltered);
        assert!(shell.engine().state().row_selection.is_empty());
    }

    #[test]
    fn test_page_selection_toggles() {
        let mut shell = shell(15, TableConfig::default());
        shell.apply(ShellCommand::TogglePageSelection);
        assert_eq!(shell.engine().state().row_selection.len(), 10);
        shell.apply(ShellCommand::TogglePageSelection);
        assert!(shell.engine().state().row_selection.is_empty());
    }

    #[test]
    fn test_reload_sets_loading_until_finished() {
        let mut shell = shell(3, TableConfig::default()).with_reloader(|| Ok(rooms(5)));
        shell.apply(ShellCommand::Reload);
        assert!(shell.engine().is_loading());

        shell.finish_reload();
        assert!(!shell.engine().is_loading());
        assert_eq!(shell.engine().view().total_count, 5);
        assert_eq!(shell.status(), "Reloaded 5 rows");
    }

    #[test]
    fn test_export_disabled() {
        let config = TableConfig {
            enable_export: false,
            ..TableConfig::default()
        };
        let mut shell = shell(3, config);
        shell.apply(ShellCommand::Export);
        assert_eq!(shell.status(), "Export is disabled for this table");
    }

    #[test]
    fn test_export_writes_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let engine = shell(4, TableConfig::default()).into_engine();
        let options = ShellOptions {
            export_dir: dir.path().to_path_buf(),
            ..ShellOptions::default()
        };
        let mut shell = TableShell::new(engine, options);

        shell.apply(ShellCommand::ExportSelected);
        assert_eq!(shell.status(), "No rows selected");

        shell.apply(ShellCommand::Export);
        assert!(shell.status().starts_with("Exported 4 rows"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_draw_frame() {
        let mut shell = shell(12, TableConfig::default());
        shell.apply(ShellCommand::ToggleHelp);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| shell.draw(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Page 1 of 2"));
        assert!(text.contains("Keys (Esc close)"));
    }
}
