//! Colours for status badges, headers and the selection highlight

use crate::config::config::ThemeConfig;
use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;

/// Supplies styles to the grid. Hosts can swap in their own palette.
pub trait StyleResolver {
    /// Style for a badge cell holding the raw status `value`
    fn status_style(&self, value: &str) -> Option<Style>;

    fn header_style(&self) -> Style;

    fn cursor_style(&self) -> Style;

    fn border_style(&self) -> Style;
}

#[derive(Debug, Clone)]
pub struct ThemeStyleResolver {
    status_colors: HashMap<String, Color>,
    header: Color,
    selection: Color,
    border: Color,
}

fn parse_color(name: &str, fallback: Color) -> Color {
    Color::from_str(name).unwrap_or_else(|_| {
        warn!("Unknown colour '{}', using {:?}", name, fallback);
        fallback
    })
}

impl ThemeStyleResolver {
    pub fn from_theme(theme: &ThemeConfig) -> Self {
        Self {
            status_colors: theme
                .status_colors
                .iter()
                .map(|(status, color)| (status.to_lowercase(), parse_color(color, Color::Reset)))
                .collect(),
            header: parse_color(&theme.header_color, Color::Cyan),
            selection: parse_color(&theme.selection_color, Color::Yellow),
            border: parse_color(&theme.border_color, Color::Gray),
        }
    }
}

impl Default for ThemeStyleResolver {
    fn default() -> Self {
        Self::from_theme(&ThemeConfig::default())
    }
}

impl StyleResolver for ThemeStyleResolver {
    fn status_style(&self, value: &str) -> Option<Style> {
        self.status_colors
            .get(&value.to_lowercase())
            .map(|color| Style::default().fg(*color))
    }

    fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header)
            .add_modifier(Modifier::BOLD)
    }

    fn cursor_style(&self) -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .fg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }
}
