use crate::data::exporter::ExportFormat;
use crate::table::config::{TableConfig, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS};
use crate::table::renderer::PLACEHOLDER;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for checkboxes and sort arrows
    pub use_glyphs: bool,

    /// Show a row number column in the grid
    pub show_row_numbers: bool,

    /// Text shown for cells whose value could not be read
    pub placeholder: String,

    pub icons: IconConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub checked: String,
    pub unchecked: String,
    pub partial: String,
    pub sort_ascending: String,
    pub sort_descending: String,
    pub loading: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Page size for tables whose schema does not set one
    pub default_page_size: usize,

    pub page_size_options: Vec<usize>,

    /// Quiet period before a typed search is applied
    pub search_debounce_ms: u64,

    /// Where exports land when no path is given (defaults to the data dir)
    pub export_dir: Option<PathBuf>,

    pub default_export_format: ExportFormat,

    /// Header sorts append to the sort list instead of replacing it
    pub enable_multi_sort: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub header_color: String,
    pub selection_color: String,
    pub border_color: String,

    /// Status value -> colour name, used by badge columns
    pub status_colors: BTreeMap<String, String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_row_numbers: false,
            placeholder: PLACEHOLDER.to_string(),
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            checked: "☑".to_string(),
            unchecked: "☐".to_string(),
            partial: "◩".to_string(),
            sort_ascending: "↑".to_string(),
            sort_descending: "↓".to_string(),
            loading: "⏳".to_string(),
        }
    }
}

impl IconConfig {
    /// ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            checked: "[x]".to_string(),
            unchecked: "[ ]".to_string(),
            partial: "[-]".to_string(),
            sort_ascending: "^".to_string(),
            sort_descending: "v".to_string(),
            loading: "...".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            search_debounce_ms: 300,
            export_dir: None,
            default_export_format: ExportFormat::Csv,
            enable_multi_sort: false,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        let status_colors = [
            ("vacant", "green"),
            ("available", "green"),
            ("paid", "green"),
            ("clean", "green"),
            ("occupied", "yellow"),
            ("pending", "yellow"),
            ("in_progress", "yellow"),
            ("confirmed", "cyan"),
            ("checked_in", "cyan"),
            ("maintenance", "red"),
            ("dirty", "red"),
            ("cancelled", "red"),
            ("overdue", "red"),
            ("checked_out", "gray"),
        ]
        .into_iter()
        .map(|(status, color)| (status.to_string(), color.to_string()))
        .collect();

        Self {
            header_color: "cyan".to_string(),
            selection_color: "yellow".to_string(),
            border_color: "gray".to_string(),
            status_colors,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        if !config.display.use_glyphs && config.display.icons == IconConfig::default() {
            config.display.icons = IconConfig::simple();
        }
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(config_path)
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("hotel-table").join("config.toml"))
    }

    /// Table switches before a schema applies its own
    pub fn table_defaults(&self) -> TableConfig {
        TableConfig {
            page_size_options: self.behavior.page_size_options.clone(),
            default_page_size: self.behavior.default_page_size,
            enable_multi_sort: self.behavior.enable_multi_sort,
            ..TableConfig::default()
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r##"# Hotel Table Configuration File
# Location: ~/.config/hotel-table/config.toml (Linux)
#           ~/Library/Application Support/hotel-table/config.toml (macOS)
#           %APPDATA%\hotel-table\config.toml (Windows)

[display]
# Use Unicode glyphs for checkboxes and sort arrows
# Set to false for ASCII-only mode
use_glyphs = true

# Show a row number column in the grid
show_row_numbers = false

# Shown when a cell value cannot be read
placeholder = "—"

# These are automatically set to ASCII when use_glyphs = false
[display.icons]
checked = "☑"
unchecked = "☐"
partial = "◩"
sort_ascending = "↑"
sort_descending = "↓"
loading = "⏳"

[behavior]
# Page size for tables whose schema does not set one
default_page_size = 10
page_size_options = [10, 20, 30, 40, 50]

# Delay before a typed search is applied (milliseconds)
search_debounce_ms = 300

# Export directory (leave commented to use the data directory)
# export_dir = "/path/to/exports"

# "csv", "tsv" or "json"
default_export_format = "csv"

# Sorting a second column keeps the first as a tie-breaker
enable_multi_sort = false

[theme]
# Colour names: "black", "red", "green", "yellow", "blue", "magenta",
# "cyan", "gray", "white", or "#rrggbb"
header_color = "cyan"
selection_color = "yellow"
border_color = "gray"

# Badge colours by status value
[theme.status_colors]
vacant = "green"
occupied = "yellow"
maintenance = "red"
confirmed = "cyan"
checked_out = "gray"
"##
        .to_string()
    }

    /// Initialize config with a setup wizard
    pub fn init_wizard() -> Result<Self> {
        println!("Hotel Table Configuration Setup");
        println!("===============================");

        let mut config = Config::default();

        let use_glyphs = Self::ask("Does your terminal support Unicode glyphs? (y/n) [y]: ")?;
        config.display.use_glyphs = !use_glyphs.eq_ignore_ascii_case("n");
        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        let page_size = Self::ask("Default page size [10]: ")?;
        if let Ok(size) = page_size.parse::<usize>() {
            if size > 0 {
                config.behavior.default_page_size = size;
            }
        }

        let multi_sort = Self::ask("Enable multi-column sorting? (y/n) [n]: ")?;
        config.behavior.enable_multi_sort = multi_sort.eq_ignore_ascii_case("y");

        let path = config.save()?;

        println!("\nConfiguration saved to: {:?}", path);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }

    fn ask(prompt: &str) -> Result<String> {
        print!("{}", prompt);
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}
