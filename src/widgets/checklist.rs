//! Popup list of checkable items, used for filter options and column visibility

use crate::config::config::IconConfig;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    /// Group the item belongs to, e.g. a filter id
    pub group: String,
    /// Heading shown above the group; defaults to the group id
    pub group_label: String,
    pub value: String,
    pub label: String,
    pub checked: bool,
    /// Disabled items are shown but cannot be toggled
    pub enabled: bool,
}

impl ChecklistItem {
    pub fn new(group: impl Into<String>, value: impl Into<String>, label: impl Into<String>) -> Self {
        let group = group.into();
        Self {
            group_label: group.clone(),
            group,
            value: value.into(),
            label: label.into(),
            checked: false,
            enabled: true,
        }
    }

    pub fn group_label(mut self, label: impl Into<String>) -> Self {
        self.group_label = label.into();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Checklist {
    title: String,
    items: Vec<ChecklistItem>,
    cursor: usize,
}

impl Checklist {
    pub fn new(title: impl Into<String>, items: Vec<ChecklistItem>) -> Self {
        Self {
            title: title.into(),
            items,
            cursor: 0,
        }
    }

    /// Start with the cursor on `cursor`, clamped to the item list
    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor.min(self.items.len().saturating_sub(1));
        self
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&ChecklistItem> {
        self.items.get(self.cursor)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    /// Jump to the first item of the next group, wrapping around
    pub fn next_group(&mut self) {
        let Some(current) = self.current().map(|item| item.group.clone()) else {
            return;
        };
        let len = self.items.len();
        let next = (1..=len)
            .map(|step| (self.cursor + step) % len)
            .find(|&i| self.items[i].group != current);
        if let Some(next) = next {
            let group = &self.items[next].group;
            self.cursor = self
                .items
                .iter()
                .position(|item| &item.group == group)
                .unwrap_or(next);
        }
    }

    /// Flip the item under the cursor; returns it when it changed
    pub fn toggle_current(&mut self) -> Option<&ChecklistItem> {
        let item = self.items.get_mut(self.cursor)?;
        if !item.enabled {
            return None;
        }
        item.checked = !item.checked;
        Some(item)
    }

    /// Check the item under the cursor and uncheck the rest of its group.
    /// Selecting the only checked item again clears the group.
    pub fn select_only_current(&mut self) -> Option<&ChecklistItem> {
        let (group, was_checked) = match self.items.get(self.cursor) {
            Some(item) if item.enabled => (item.group.clone(), item.checked),
            _ => return None,
        };
        let others_checked = self
            .items
            .iter()
            .enumerate()
            .any(|(i, item)| i != self.cursor && item.group == group && item.checked);
        let keep = !was_checked || others_checked;
        for (i, item) in self.items.iter_mut().enumerate() {
            if item.group == group && item.enabled {
                item.checked = i == self.cursor && keep;
            }
        }
        self.items.get(self.cursor)
    }

    /// Checked values of one group, in list order
    pub fn checked_values(&self, group: &str) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| item.group == group && item.checked)
            .map(|item| item.value.clone())
            .collect()
    }

    pub fn render(&self, f: &mut Frame, area: Rect, icons: &IconConfig) {
        let mut last_group: Option<&str> = None;
        let mut list_items = Vec::with_capacity(self.items.len());
        let mut selected_line = 0;

        for (i, item) in self.items.iter().enumerate() {
            if last_group != Some(item.group.as_str()) && self.has_many_groups() {
                list_items.push(ListItem::new(Line::from(Span::styled(
                    item.group_label.clone(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))));
            }
            last_group = Some(item.group.as_str());
            if i == self.cursor {
                selected_line = list_items.len();
            }

            let mark = if item.checked {
                &icons.checked
            } else {
                &icons.unchecked
            };
            let style = if item.enabled {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            list_items.push(ListItem::new(Line::from(vec![
                Span::raw(format!(" {} ", mark)),
                Span::styled(item.label.clone(), style),
            ])));
        }

        let list = List::new(list_items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(
                        "{} (Space toggle, Enter only, r reset, Esc close)",
                        self.title
                    )),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );

        let mut state = ListState::default();
        state.select(Some(selected_line));

        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut state);
    }

    fn has_many_groups(&self) -> bool {
        self.items
            .first()
            .map(|first| self.items.iter().any(|item| item.group != first.group))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> Checklist {
        Checklist::new(
            "Filters",
            vec![
                ChecklistItem::new("status", "vacant", "Vacant"),
                ChecklistItem::new("status", "occupied", "Occupied").checked(true),
                ChecklistItem::new("roomType", "suite", "Suite"),
                ChecklistItem::new("roomType", "single", "Single").enabled(false),
            ],
        )
    }

    #[test]
    fn test_toggle_and_checked_values() {
        let mut list = list();
        let toggled = list.toggle_current().cloned().unwrap();
        assert_eq!(toggled.value, "vacant");
        assert!(toggled.checked);
        assert_eq!(list.checked_values("status"), vec!["vacant", "occupied"]);
    }

    #[test]
    fn test_disabled_items_do_not_toggle() {
        let mut list = list();
        for _ in 0..3 {
            list.move_down();
        }
        assert_eq!(list.cursor(), 3);
        assert!(list.toggle_current().is_none());
        list.move_down();
        assert_eq!(list.cursor(), 3);
    }

    #[test]
    fn test_group_label_defaults_to_group() {
        let item = ChecklistItem::new("roomType", "suite", "Suite");
        assert_eq!(item.group_label, "roomType");
        let item = item.group_label("Room Type");
        assert_eq!(item.group, "roomType");
        assert_eq!(item.group_label, "Room Type");
    }

    #[test]
    fn test_select_only_current() {
        let mut list = list();
        assert!(list.select_only_current().unwrap().checked);
        assert_eq!(list.checked_values("status"), vec!["vacant"]);
        // Second press on the sole checked item clears the group
        list.select_only_current();
        assert!(list.checked_values("status").is_empty());
        assert!(list.checked_values("roomType").is_empty());
    }

    #[test]
    fn test_with_cursor_clamps() {
        assert_eq!(list().with_cursor(99).cursor(), 3);
        assert_eq!(Checklist::new("Empty", vec![]).with_cursor(5).cursor(), 0);
    }

    #[test]
    fn test_next_group_wraps() {
        let mut list = list();
        list.next_group();
        assert_eq!(list.current().unwrap().group, "roomType");
        list.move_down();
        list.next_group();
        assert_eq!(list.cursor(), 0);
    }
}
