//! Debounced text input for the global search box and the date-range prompt
//!
//! Typing restarts a quiet period; the query is applied once the user pauses,
//! so large tables are not re-derived on every keystroke.

use crate::utils::debouncer::Debouncer;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchInputAction {
    /// Key consumed, nothing to apply yet
    Continue,
    /// Text changed; the debounced value follows from `check_debounce`
    Changed(String),
    /// Enter pressed
    Confirm(String),
    /// Esc pressed
    Cancel,
    /// Not an input key
    PassThrough,
}

pub struct SearchInput {
    input: Input,
    debouncer: Debouncer,
    last_applied: Option<String>,
    title: String,
    style: Style,
    active: bool,
}

impl SearchInput {
    pub fn new(title: impl Into<String>, debounce_ms: u64) -> Self {
        Self {
            input: Input::default(),
            debouncer: Debouncer::new(debounce_ms),
            last_applied: None,
            title: title.into(),
            style: Style::default().fg(Color::Yellow),
            active: false,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Start editing, keeping the current text
    pub fn activate(&mut self) {
        self.active = true;
        self.debouncer.reset();
        self.last_applied = Some(self.input.value().to_string());
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.debouncer.reset();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.last_applied = Some(value.clone());
        self.input = Input::default().with_value(value);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SearchInputAction {
        if !self.active {
            return SearchInputAction::PassThrough;
        }

        match key.code {
            KeyCode::Esc => {
                self.deactivate();
                SearchInputAction::Cancel
            }
            KeyCode::Enter => {
                let value = self.input.value().to_string();
                self.last_applied = Some(value.clone());
                self.deactivate();
                SearchInputAction::Confirm(value)
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                SearchInputAction::PassThrough
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                let value = self.input.value().to_string();
                if self.last_applied.as_ref() != Some(&value) {
                    self.debouncer.trigger();
                    SearchInputAction::Changed(value)
                } else {
                    SearchInputAction::Continue
                }
            }
        }
    }

    /// The text to apply once typing has paused, if it changed since last applied.
    /// Call from the event loop between key events.
    pub fn check_debounce(&mut self) -> Option<String> {
        if !self.debouncer.should_execute() {
            return None;
        }
        let value = self.input.value().to_string();
        if self.last_applied.as_ref() == Some(&value) {
            return None;
        }
        self.last_applied = Some(value.clone());
        Some(value)
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let title = if self.debouncer.is_pending() {
            format!("{} (typing...)", self.title)
        } else {
            self.title.clone()
        };

        let border_style = if self.active {
            self.style
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);

        f.render_widget(
            Paragraph::new(self.input.value()).block(block).style(self.style),
            area,
        );

        if self.active {
            let max_x = area.x + area.width.saturating_sub(2);
            let x = (area.x + 1 + self.input.visual_cursor() as u16).min(max_x);
            f.set_cursor_position((x, area.y + 1));
        }
    }
}
