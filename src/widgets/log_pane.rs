//! F5 pane showing the most recent log entries

use crate::utils::logging::{LogEntry, LogRingBuffer};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub struct LogPane {
    buffer: LogRingBuffer,
    scroll_offset: u16,
}

impl LogPane {
    pub fn new(buffer: LogRingBuffer) -> Self {
        Self {
            buffer,
            scroll_offset: 0,
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    fn level_style(entry: &LogEntry) -> Style {
        match entry.level.as_str() {
            "ERROR" => Style::default().fg(Color::Red),
            "WARN" => Style::default().fg(Color::Yellow),
            "INFO" => Style::default().fg(Color::Green),
            "DEBUG" => Style::default().fg(Color::Cyan),
            _ => Style::default().fg(Color::DarkGray),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let entries = self
            .buffer
            .get_recent(visible + self.scroll_offset as usize);
        let end = entries.len().saturating_sub(self.scroll_offset as usize);
        let start = end.saturating_sub(visible);

        let lines: Vec<Line> = entries[start..end]
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", entry.timestamp),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(format!("{:<5} ", entry.level), Self::level_style(entry)),
                    Span::styled(
                        format!("[{}] ", entry.target),
                        Style::default().fg(Color::Magenta),
                    ),
                    Span::raw(entry.message.clone()),
                ])
            })
            .collect();

        let title = format!(
            "Logs ({} entries, Up/Down scroll, F5 close)",
            self.buffer.len()
        );
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title(title))
                .wrap(Wrap { trim: false }),
            area,
        );
    }
}
