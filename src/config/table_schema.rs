//! TOML table schemas: columns, filters and table switches for one list page

use crate::data::loaders::DEFAULT_KEY_FIELDS;
use crate::data::record::{JsonRecord, Record};
use crate::data::value::CellValue;
use crate::table::column::{ColumnDescriptor, ColumnModel, SortingFn};
use crate::table::config::TableConfig;
use crate::table::engine::TableEngine;
use crate::table::filter::{FilterDescriptor, FilterOption, FilterRegistry};
use crate::table::renderer::{is_valid_date_format, CellRenderer};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Schemas compiled into the binary, by name
pub const BUILTIN_SCHEMAS: [(&str, &str); 5] = [
    ("rooms", include_str!("../../schemas/rooms.toml")),
    ("reservations", include_str!("../../schemas/reservations.toml")),
    ("bills", include_str!("../../schemas/bills.toml")),
    ("housekeeping", include_str!("../../schemas/housekeeping.toml")),
    ("feedback", include_str!("../../schemas/feedback.toml")),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Record field holding the row key; `_id` then `id` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_field: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub filters: Vec<FilterDescriptor>,
    #[serde(default)]
    pub table: TableOverrides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// Source field, dotted for nested values; the id when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default = "default_true")]
    pub hideable: bool,
    #[serde(default)]
    pub sorting: SortingSpec,
    #[serde(default)]
    pub renderer: RendererSpec,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortingSpec {
    Text,
    #[default]
    Alphanumeric,
    Datetime,
    Basic,
}

impl From<SortingSpec> for SortingFn {
    fn from(spec: SortingSpec) -> Self {
        match spec {
            SortingSpec::Text => SortingFn::Text,
            SortingSpec::Alphanumeric => SortingFn::Alphanumeric,
            SortingSpec::Datetime => SortingFn::Datetime,
            SortingSpec::Basic => SortingFn::Basic,
        }
    }
}

/// Serializable form of [`CellRenderer`], minus custom closures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RendererSpec {
    #[default]
    Plain,
    Text {
        max_width: usize,
    },
    Currency {
        #[serde(default = "default_currency_symbol")]
        symbol: String,
        #[serde(default = "default_decimals")]
        decimals: usize,
    },
    Date {
        #[serde(default = "default_date_format")]
        format: String,
    },
    Boolean {
        #[serde(default = "default_yes")]
        yes: String,
        #[serde(default = "default_no")]
        no: String,
    },
    Badge {
        #[serde(default)]
        labels: HashMap<String, String>,
    },
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_decimals() -> usize {
    2
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_yes() -> String {
    "Yes".to_string()
}

fn default_no() -> String {
    "No".to_string()
}

impl From<&RendererSpec> for CellRenderer {
    fn from(spec: &RendererSpec) -> Self {
        match spec {
            RendererSpec::Plain => CellRenderer::Plain,
            RendererSpec::Text { max_width } => CellRenderer::Text {
                max_width: *max_width,
            },
            RendererSpec::Currency { symbol, decimals } => CellRenderer::Currency {
                symbol: symbol.clone(),
                decimals: *decimals,
            },
            RendererSpec::Date { format } => CellRenderer::Date {
                format: format.clone(),
            },
            RendererSpec::Boolean { yes, no } => CellRenderer::Boolean {
                yes: yes.clone(),
                no: no.clone(),
            },
            RendererSpec::Badge { labels } => CellRenderer::Badge {
                labels: labels.clone(),
            },
        }
    }
}

/// Table switches a schema sets; anything left unset keeps the base value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_global_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_export: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_column_visibility: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_row_selection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_date_filter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_filter_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size_options: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_multi_sort: Option<bool>,
}

impl TableOverrides {
    pub fn apply(&self, mut base: TableConfig) -> TableConfig {
        if let Some(v) = self.enable_global_search {
            base.enable_global_search = v;
        }
        if let Some(v) = self.enable_export {
            base.enable_export = v;
        }
        if let Some(v) = self.enable_column_visibility {
            base.enable_column_visibility = v;
        }
        if let Some(v) = self.enable_row_selection {
            base.enable_row_selection = v;
        }
        if let Some(v) = self.enable_date_filter {
            base.enable_date_filter = v;
        }
        if let Some(v) = &self.date_filter_column {
            base.date_filter_column = Some(v.clone());
        }
        if let Some(v) = &self.export_file_name {
            base.export_file_name = Some(v.clone());
        }
        if let Some(v) = &self.page_size_options {
            base.page_size_options = v.clone();
        }
        if let Some(v) = self.default_page_size {
            base.default_page_size = v;
        }
        if let Some(v) = self.enable_multi_sort {
            base.enable_multi_sort = v;
        }
        base
    }
}

impl TableSchema {
    pub fn from_toml(contents: &str) -> Result<Self> {
        let schema: Self = toml::from_str(contents).context("Failed to parse table schema")?;
        schema.validate()?;
        Ok(schema)
    }

    /// Checks what serde cannot: date formats chrono would refuse to render
    fn validate(&self) -> Result<()> {
        for column in &self.columns {
            if let RendererSpec::Date { format } = &column.renderer {
                if !is_valid_date_format(format) {
                    bail!(
                        "Column '{}' has an invalid date format '{}'",
                        column.id,
                        format
                    );
                }
            }
        }
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {:?}", path))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid schema file: {:?}", path))
    }

    pub fn builtin(name: &str) -> Option<Result<Self>> {
        BUILTIN_SCHEMAS
            .iter()
            .find(|(builtin, _)| builtin.eq_ignore_ascii_case(name))
            .map(|(_, contents)| Self::from_toml(contents))
    }

    /// A built-in schema name, or a path to a schema file
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        if let Some(schema) = Self::builtin(name_or_path) {
            return schema;
        }
        let path = Path::new(name_or_path);
        if path.exists() {
            return Self::load(path);
        }
        let names: Vec<&str> = BUILTIN_SCHEMAS.iter().map(|(name, _)| *name).collect();
        Err(anyhow!(
            "Unknown schema '{}' (built-in schemas: {})",
            name_or_path,
            names.join(", ")
        ))
    }

    /// One plain column per field of the first record, in field order
    pub fn infer(name: impl Into<String>, records: &[JsonRecord]) -> Self {
        let columns = records
            .first()
            .map(|first| {
                first
                    .field_names()
                    .into_iter()
                    .filter(|field| !field.starts_with('_'))
                    .map(|field| {
                        let sorting = match first.field(&field) {
                            Some(CellValue::DateTime(_)) => SortingSpec::Datetime,
                            Some(CellValue::Integer(_)) | Some(CellValue::Float(_)) => {
                                SortingSpec::Basic
                            }
                            _ => SortingSpec::Alphanumeric,
                        };
                        ColumnSpec {
                            header: Some(humanize(&field)),
                            id: field,
                            field: None,
                            sortable: true,
                            hideable: true,
                            sorting,
                            renderer: RendererSpec::Plain,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let schema = Self {
            name: name.into(),
            columns,
            ..Self::default()
        };
        debug!("Inferred {} columns for '{}'", schema.columns.len(), schema.name);
        schema
    }

    pub fn key_fields(&self) -> Vec<&str> {
        match &self.key_field {
            Some(key) => vec![key.as_str()],
            None => DEFAULT_KEY_FIELDS.to_vec(),
        }
    }

    pub fn build_columns(&self) -> ColumnModel<JsonRecord> {
        ColumnModel::new(
            self.columns
                .iter()
                .map(|spec| {
                    let header = spec.header.clone().unwrap_or_else(|| humanize(&spec.id));
                    let mut column = ColumnDescriptor::new(spec.id.clone(), header)
                        .sortable(spec.sortable)
                        .hideable(spec.hideable)
                        .with_sorting(spec.sorting.into())
                        .with_renderer(CellRenderer::from(&spec.renderer));
                    if let Some(field) = &spec.field {
                        column = column.with_key(field.clone());
                    }
                    column
                })
                .collect(),
        )
    }

    /// Filters declared without options list the distinct values found in `rows`
    pub fn build_filters(&self, rows: &[JsonRecord]) -> FilterRegistry {
        FilterRegistry::new(
            self.filters
                .iter()
                .map(|filter| {
                    if !filter.options.is_empty() {
                        return filter.clone();
                    }
                    let field = self
                        .columns
                        .iter()
                        .find(|c| c.id == filter.id)
                        .and_then(|c| c.field.as_deref())
                        .unwrap_or(&filter.id);
                    let values: BTreeSet<String> = rows
                        .iter()
                        .filter_map(|row| row.field(field))
                        .filter(|value| !value.is_null())
                        .map(|value| value.to_string())
                        .collect();
                    FilterDescriptor {
                        options: values
                            .into_iter()
                            .map(|v| FilterOption::new(v.clone(), humanize(&v)))
                            .collect(),
                        ..filter.clone()
                    }
                })
                .collect(),
        )
    }

    pub fn table_config(&self, base: TableConfig) -> TableConfig {
        let mut config = self.table.apply(base);
        if config.export_file_name.is_none() {
            config.export_file_name = Some(self.name.clone());
        }
        config
    }

    /// Build an engine over `rows` with this schema's columns, filters and switches
    pub fn engine(&self, rows: Vec<JsonRecord>, base: TableConfig) -> TableEngine<JsonRecord> {
        info!(
            "Building '{}' table: {} columns, {} filters, {} rows",
            self.name,
            self.columns.len(),
            self.filters.len(),
            rows.len()
        );
        let filters = self.build_filters(&rows);
        TableEngine::new(rows, self.build_columns(), filters, self.table_config(base))
    }
}

/// `roomNumber` -> `Room Number`, `check_in` -> `Check In`
pub fn humanize(field: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in field.chars() {
        if c == '_' || c == '-' || c == '.' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loaders::parse_json_records;

    #[test]
    fn test_builtin_schemas_parse() -> Result<()> {
        for (name, _) in BUILTIN_SCHEMAS {
            let schema = TableSchema::resolve(name)?;
            assert_eq!(schema.name, name);
            assert!(!schema.columns.is_empty(), "{} has no columns", name);
        }
        Ok(())
    }

    #[test]
    fn test_unknown_schema() {
        let err = TableSchema::resolve("spa").unwrap_err();
        assert!(err.to_string().contains("rooms"));
    }

    #[test]
    fn test_renderer_spec_from_toml() -> Result<()> {
        let schema = TableSchema::from_toml(
            r#"
name = "bills"

[[columns]]
id = "amount"
sorting = "basic"
renderer = { type = "currency", symbol = "€" }

[[columns]]
id = "guestName"
field = "guest.name"
hideable = false
"#,
        )?;
        assert_eq!(
            schema.columns[0].renderer,
            RendererSpec::Currency {
                symbol: "€".to_string(),
                decimals: 2
            }
        );
        let columns = schema.build_columns();
        let guest = columns.get("guestName").unwrap();
        assert_eq!(guest.header, "Guest Name");
        assert!(!guest.enable_hiding);
        assert_eq!(schema.table_config(TableConfig::default()).export_base_name(), "bills");
        Ok(())
    }

    #[test]
    fn test_invalid_date_format_rejected() {
        let err = TableSchema::from_toml(
            r#"
name = "reservations"

[[columns]]
id = "checkIn"
renderer = { type = "date", format = "%Y-%Q" }
"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("invalid date format '%Y-%Q'"));
    }

    #[test]
    fn test_overrides_keep_base_values() {
        let overrides = TableOverrides {
            enable_date_filter: Some(true),
            date_filter_column: Some("checkIn".to_string()),
            ..TableOverrides::default()
        };
        let base = TableConfig {
            default_page_size: 25,
            ..TableConfig::default()
        };
        let config = overrides.apply(base);
        assert_eq!(config.date_column(), Some("checkIn"));
        assert_eq!(config.default_page_size, 25);
    }

    #[test]
    fn test_infer_columns_and_filter_options() -> Result<()> {
        let rows = parse_json_records(
            r#"[
                {"_id": "r1", "roomNumber": "101", "rate": 120, "status": "vacant", "updatedAt": "2024-03-01"},
                {"_id": "r2", "roomNumber": "102", "rate": 90, "status": "occupied", "updatedAt": "2024-03-02"}
            ]"#,
            &DEFAULT_KEY_FIELDS,
        )?;
        let mut schema = TableSchema::infer("rooms", &rows);
        let ids: Vec<&str> = schema.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["roomNumber", "rate", "status", "updatedAt"]);
        assert_eq!(schema.columns[1].sorting, SortingSpec::Basic);
        assert_eq!(schema.columns[3].sorting, SortingSpec::Datetime);

        schema.filters.push(FilterDescriptor::new("status", "Status"));
        let filters = schema.build_filters(&rows);
        let status = filters.get("status").unwrap();
        assert_eq!(status.option_label("occupied"), Some("Occupied"));
        assert_eq!(status.options.len(), 2);
        Ok(())
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("roomNumber"), "Room Number");
        assert_eq!(humanize("check_in"), "Check In");
        assert_eq!(humanize("guest.name"), "Guest Name");
        assert_eq!(humanize("ID"), "ID");
    }
}
