// Maps keyboard input to shell commands
// Pure: the same (mode, key) always gives the same command

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What currently owns the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellMode {
    Normal,
    Search,
    DateRange,
    FilterMenu,
    ColumnMenu,
    Logs,
    Help,
}

impl ShellMode {
    /// Modes whose keys go to a text input
    pub fn is_text_entry(&self) -> bool {
        matches!(self, ShellMode::Search | ShellMode::DateRange)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Quit,

    // Grid cursor
    CursorUp,
    CursorDown,
    CursorTop,
    CursorBottom,
    FocusLeft,
    FocusRight,

    SortFocused,
    ClearSort,

    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    CyclePageSize,

    ToggleRowSelected,
    TogglePageSelection,
    SelectAllFiltered,
    ClearSelection,

    OpenSearch,
    ClearSearch,
    OpenFilterMenu,
    ClearFilters,
    OpenDateRange,
    ClearDateRange,
    OpenColumnMenu,

    Export,
    ExportSelected,
    Reload,
    ResetTable,

    ToggleLogs,
    ToggleHelp,

    // Menus and overlays
    MenuUp,
    MenuDown,
    MenuToggle,
    /// Make the item under the cursor the only checked one in its group
    MenuSelectOnly,
    MenuNextGroup,
    MenuReset,
    CloseOverlay,

    /// Forwarded to the active text input
    TextInput(KeyEvent),

    None,
}

pub fn map_key(mode: ShellMode, key: KeyEvent) -> ShellCommand {
    use KeyCode::*;

    // Global keys
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, Char('c') | Char('C'))
    {
        return ShellCommand::Quit;
    }
    if key.code == F(5) {
        return match mode {
            ShellMode::Logs => ShellCommand::CloseOverlay,
            _ => ShellCommand::ToggleLogs,
        };
    }
    if key.code == F(1) {
        return match mode {
            ShellMode::Help => ShellCommand::CloseOverlay,
            _ => ShellCommand::ToggleHelp,
        };
    }

    match mode {
        ShellMode::Normal => map_normal(key),
        ShellMode::Search | ShellMode::DateRange => ShellCommand::TextInput(key),
        ShellMode::FilterMenu | ShellMode::ColumnMenu => match key.code {
            Up | Char('k') => ShellCommand::MenuUp,
            Down | Char('j') => ShellCommand::MenuDown,
            Char(' ') => ShellCommand::MenuToggle,
            Enter => ShellCommand::MenuSelectOnly,
            Tab => ShellCommand::MenuNextGroup,
            Char('r') => ShellCommand::MenuReset,
            Esc | Char('q') => ShellCommand::CloseOverlay,
            _ => ShellCommand::None,
        },
        ShellMode::Logs => match key.code {
            Up | Char('k') => ShellCommand::MenuUp,
            Down | Char('j') => ShellCommand::MenuDown,
            Esc | Char('q') => ShellCommand::CloseOverlay,
            _ => ShellCommand::None,
        },
        ShellMode::Help => match key.code {
            Esc | Char('q') | Char('?') => ShellCommand::CloseOverlay,
            _ => ShellCommand::None,
        },
    }
}

fn map_normal(key: KeyEvent) -> ShellCommand {
    use KeyCode::*;

    match key.code {
        Char('q') => ShellCommand::Quit,

        Up | Char('k') => ShellCommand::CursorUp,
        Down | Char('j') => ShellCommand::CursorDown,
        Home | Char('g') => ShellCommand::CursorTop,
        End | Char('G') => ShellCommand::CursorBottom,
        Left | Char('h') => ShellCommand::FocusLeft,
        Right | Char('l') => ShellCommand::FocusRight,

        Char('s') => ShellCommand::SortFocused,
        Char('S') => ShellCommand::ClearSort,

        PageDown | Char('n') | Char(']') => ShellCommand::NextPage,
        PageUp | Char('p') | Char('[') => ShellCommand::PreviousPage,
        Char('<') => ShellCommand::FirstPage,
        Char('>') => ShellCommand::LastPage,
        Char('z') => ShellCommand::CyclePageSize,

        Char(' ') => ShellCommand::ToggleRowSelected,
        Char('a') => ShellCommand::TogglePageSelection,
        Char('A') => ShellCommand::SelectAllFiltered,
        Char('x') => ShellCommand::ClearSelection,

        Char('/') => ShellCommand::OpenSearch,
        Esc => ShellCommand::ClearSearch,
        Char('f') => ShellCommand::OpenFilterMenu,
        Char('F') => ShellCommand::ClearFilters,
        Char('d') => ShellCommand::OpenDateRange,
        Char('D') => ShellCommand::ClearDateRange,
        Char('c') => ShellCommand::OpenColumnMenu,

        Char('e') => ShellCommand::Export,
        Char('E') => ShellCommand::ExportSelected,
        Char('r') => ShellCommand::Reload,
        Char('R') => ShellCommand::ResetTable,

        Char('?') => ShellCommand::ToggleHelp,
        _ => ShellCommand::None,
    }
}

/// Key help shown in the help overlay, in display order
pub const KEY_HELP: &[(&str, &str)] = &[
    ("j/k, Up/Down", "Move row cursor"),
    ("h/l, Left/Right", "Focus column"),
    ("s / S", "Sort focused column / clear sort"),
    ("n/p, PgDn/PgUp", "Next / previous page"),
    ("< / >", "First / last page"),
    ("z", "Cycle page size"),
    ("Space", "Select row"),
    ("a / A", "Select page / all matching rows"),
    ("x", "Clear selection"),
    ("/ / Esc", "Search / clear search"),
    ("f / F", "Filters / clear filters"),
    ("d / D", "Date range / clear date range"),
    ("c", "Show or hide columns"),
    ("e / E", "Export rows / export selection"),
    ("r / R", "Reload file / reset table"),
    ("F5", "Logs"),
    ("q, Ctrl-C", "Quit"),
];
