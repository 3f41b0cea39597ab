use anyhow::{bail, Context, Result};
use crossterm::style::Stylize;
use hotel_table::config::{Config, TableSchema};
use hotel_table::data::exporter::{DataExporter, ExportFormat};
use hotel_table::data::loaders::{load_records, DEFAULT_KEY_FIELDS};
use hotel_table::data::record::JsonRecord;
use hotel_table::table::engine::TableEngine;
use hotel_table::table::filter::DateRange;
use hotel_table::table::state::{SortDirection, SortEntry};
use hotel_table::ui::shell::{ShellOptions, TableShell};
use hotel_table::utils::app_paths::AppPaths;
use hotel_table::utils::file_log::get_file_logger;
use hotel_table::utils::logging::init_tracing_with_dual_logging;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

mod table_display;

use table_display::display_page;

fn print_help() {
    println!(
        "{}",
        "hotel-table - filterable, sortable, paginated list pages in the terminal"
            .blue()
            .bold()
    );
    println!();
    println!("{}", "Usage:".yellow());
    println!("  hotel-table [OPTIONS] <FILE.json|FILE.csv>");
    println!();
    println!("{}", "Options:".yellow());
    let options = [
        ("--schema <name|path>", "Table schema (rooms, reservations, bills, housekeeping, feedback)"),
        ("--search <text>", "Global search over visible columns"),
        ("--filter <id=value>", "Discrete filter, repeatable"),
        ("--sort <col[:desc]>", "Sort column, repeatable"),
        ("--from <date>", "Date range start (YYYY-MM-DD)"),
        ("--to <date>", "Date range end, inclusive"),
        ("--page <n>", "Page to show, from 1"),
        ("--page-size <n>", "Rows per page"),
        ("--print", "Print the page and exit"),
        ("--export <path>", "Export the filtered rows and exit"),
        ("--format <csv|tsv|json>", "Export format"),
        ("--init-config", "Initialize configuration with wizard"),
        ("--generate-config", "Generate config file with defaults"),
        ("--help", "Show this help"),
    ];
    for (flag, what) in options {
        println!("  {} {}", format!("{:<26}", flag).green(), what);
    }
    println!();
    println!("{}", "Press ? inside the table for key bindings.".dark_grey());
}

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    file: Option<PathBuf>,
    schema: Option<String>,
    search: Option<String>,
    filters: Vec<(String, String)>,
    sort: Vec<SortEntry>,
    from: Option<String>,
    to: Option<String>,
    /// Zero-based page index
    page: Option<usize>,
    page_size: Option<usize>,
    print: bool,
    export: Option<PathBuf>,
    format: Option<ExportFormat>,
    help: bool,
    init_config: bool,
    generate_config: bool,
}

impl CliOptions {
    fn parse(args: &[String]) -> Result<Self> {
        let mut options = Self::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = || {
                iter.next()
                    .cloned()
                    .with_context(|| format!("{} needs a value", arg))
            };
            match arg.as_str() {
                "--help" | "-h" => options.help = true,
                "--init-config" => options.init_config = true,
                "--generate-config" => options.generate_config = true,
                "--print" => options.print = true,
                "--schema" => options.schema = Some(value()?),
                "--search" => options.search = Some(value()?),
                "--filter" => {
                    let filter = value()?;
                    let Some((id, value)) = filter.split_once('=') else {
                        bail!("--filter expects id=value, got '{}'", filter);
                    };
                    options.filters.push((id.trim().to_string(), value.to_string()));
                }
                "--sort" => options.sort.push(parse_sort(&value()?)?),
                "--from" => options.from = Some(value()?),
                "--to" => options.to = Some(value()?),
                "--page" => {
                    let page: usize = parse_number(arg, &value()?)?;
                    if page == 0 {
                        bail!("--page counts from 1");
                    }
                    options.page = Some(page - 1);
                }
                "--page-size" => options.page_size = Some(parse_number(arg, &value()?)?),
                "--export" => options.export = Some(PathBuf::from(value()?)),
                "--format" => options.format = Some(value()?.parse()?),
                other if other.starts_with("--") => bail!("Unknown option: {}", other),
                file => {
                    if let Some(existing) = &options.file {
                        bail!(
                            "Only one data file may be given ({:?} and {})",
                            existing,
                            file
                        );
                    }
                    options.file = Some(PathBuf::from(file));
                }
            }
        }
        Ok(options)
    }
}

fn parse_number(flag: &str, text: &str) -> Result<usize> {
    text.parse()
        .with_context(|| format!("{} expects a number, got '{}'", flag, text))
}

/// `column`, `column:asc` or `column:desc`
fn parse_sort(text: &str) -> Result<SortEntry> {
    let (column, direction) = match text.rsplit_once(':') {
        Some((column, "desc")) => (column, SortDirection::Descending),
        Some((column, "asc")) => (column, SortDirection::Ascending),
        Some((_, other)) => bail!("Unknown sort direction '{}' (use asc or desc)", other),
        None => (text, SortDirection::Ascending),
    };
    Ok(SortEntry::new(column, direction))
}

/// A schema in the user's schemas directory wins over a built-in of the same
/// name. Paths are loaded as given.
fn find_schema(name: &str) -> Result<TableSchema> {
    let is_path = name.ends_with(".toml") || name.contains(std::path::MAIN_SEPARATOR);
    if !is_path {
        let user_schema = AppPaths::schemas_dir()?.join(format!("{}.toml", name));
        if user_schema.exists() {
            return TableSchema::load(&user_schema);
        }
    }
    TableSchema::resolve(name)
}

fn load_table(
    file: &Path,
    schema_name: Option<&str>,
    config: &Config,
) -> Result<(TableSchema, TableEngine<JsonRecord>)> {
    let schema = schema_name.map(find_schema).transpose()?;
    let keys: Vec<&str> = match &schema {
        Some(schema) => schema.key_fields(),
        None => DEFAULT_KEY_FIELDS.to_vec(),
    };
    let rows = load_records(file, &keys)?;

    let schema = schema.unwrap_or_else(|| {
        let name = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table");
        TableSchema::infer(name, &rows)
    });
    let engine = schema
        .engine(rows, config.table_defaults())
        .on_row_selection_change(|rows| debug!("{} rows selected", rows.len()));
    Ok((schema, engine))
}

/// Apply the command-line criteria in the same order a user would
fn apply_options(engine: &mut TableEngine<JsonRecord>, options: &CliOptions) -> Result<()> {
    if let Some(query) = &options.search {
        if !engine.set_global_query(query) && !engine.config().enable_global_search {
            warn!("Search is disabled for this table");
        }
    }

    let mut filters: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (id, value) in &options.filters {
        filters.entry(id.as_str()).or_default().push(value.as_str());
    }
    for (id, values) in filters {
        if !engine.filters().contains(id) {
            bail!("Unknown filter '{}'", id);
        }
        engine.set_filter_values(id, &values);
    }

    if options.from.is_some() || options.to.is_some() {
        if engine.config().date_column().is_none() {
            bail!("This table has no date filter");
        }
        let range = DateRange::parse_bounds(options.from.as_deref(), options.to.as_deref())?;
        engine.set_date_range(range);
    }

    if !options.sort.is_empty() {
        engine.set_sort(options.sort.clone());
    }
    if let Some(size) = options.page_size {
        engine.set_page_size(size);
    }
    if let Some(page) = options.page {
        engine.set_page(page);
    }
    Ok(())
}

fn run(options: &CliOptions, file: &Path) -> Result<()> {
    let log_buffer = init_tracing_with_dual_logging();
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Using default configuration: {:#}", e);
        Config::default()
    });

    let (schema, mut engine) = load_table(file, options.schema.as_deref(), &config)?;
    apply_options(&mut engine, options)?;

    if let Some(path) = &options.export {
        if !engine.config().enable_export {
            bail!("Export is disabled for the '{}' table", schema.name);
        }
        let format = options
            .format
            .or_else(|| path.extension()?.to_str()?.parse().ok())
            .unwrap_or(config.behavior.default_export_format);
        let summary = DataExporter::export_to_path(&engine, Some(path), Path::new("."), format)?;
        println!("{}", summary.to_string().green());
        return Ok(());
    }

    if options.print {
        display_page(&engine);
        return Ok(());
    }

    let title = schema.title.clone().unwrap_or_else(|| schema.name.clone());
    let mut shell_options = ShellOptions::from_config(&config, title)?;
    if let Some(format) = options.format {
        shell_options.export_format = format;
    }
    let reload_path = file.to_path_buf();
    let reload_schema = schema.clone();
    let shell = TableShell::new(engine, shell_options)
        .with_log_buffer(log_buffer)
        .with_reloader(move || {
            let keys = reload_schema.key_fields();
            load_records(&reload_path, &keys)
        });

    let engine = shell.run()?;
    let selected = engine.selected_rows();
    if !selected.is_empty() {
        info!("Closed with {} rows selected", selected.len());
        println!("{} rows selected", selected.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match CliOptions::parse(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if options.help {
        print_help();
        return Ok(());
    }

    if options.init_config {
        match Config::init_wizard() {
            Ok(config) => {
                println!("\nConfiguration initialized successfully!");
                if !config.display.use_glyphs {
                    println!("Note: Simple mode enabled (ASCII icons)");
                }
                return Ok(());
            }
            Err(e) => {
                eprintln!("Error initializing config: {:#}", e);
                std::process::exit(1);
            }
        }
    }

    if options.generate_config {
        let path = Config::get_config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Error creating config directory: {:?}", parent))?;
        }
        std::fs::write(&path, Config::create_default_with_comments())
            .with_context(|| format!("Error writing config file: {:?}", path))?;
        println!("Configuration file created at: {:?}", path);
        return Ok(());
    }

    let Some(file) = options.file.clone() else {
        print_help();
        std::process::exit(2);
    };

    if let Err(e) = run(&options, &file) {
        eprintln!("{} {:#}", "Error:".red(), e);
        if let Some(logger) = get_file_logger() {
            eprintln!("Log: {}", logger.log_path().display());
        }
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_table::data::record::Record;

    fn rooms_table() -> TableEngine<JsonRecord> {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let schema = root.join("schemas/rooms.toml");
        let (_, engine) = load_table(
            &root.join("data/rooms.json"),
            schema.to_str(),
            &Config::default(),
        )
        .unwrap();
        engine
    }

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_full_command_line() {
        let options = CliOptions::parse(&args(
            "rooms.json --schema rooms --filter status=vacant --filter status=cleaning \
             --sort roomNumber:desc --sort floor --page 2 --page-size 20 --print",
        ))
        .unwrap();

        assert_eq!(options.file, Some(PathBuf::from("rooms.json")));
        assert_eq!(options.schema.as_deref(), Some("rooms"));
        assert_eq!(options.filters.len(), 2);
        assert_eq!(
            options.sort,
            vec![
                SortEntry::new("roomNumber", SortDirection::Descending),
                SortEntry::new("floor", SortDirection::Ascending),
            ]
        );
        assert_eq!(options.page, Some(1));
        assert_eq!(options.page_size, Some(20));
        assert!(options.print);
    }

    #[test]
    fn test_parse_errors() {
        assert!(CliOptions::parse(&args("--page")).is_err());
        assert!(CliOptions::parse(&args("--page 0")).is_err());
        assert!(CliOptions::parse(&args("--filter status")).is_err());
        assert!(CliOptions::parse(&args("--sort name:sideways")).is_err());
        assert!(CliOptions::parse(&args("--format xml")).is_err());
        assert!(CliOptions::parse(&args("--verbose")).is_err());
        assert!(CliOptions::parse(&args("a.json b.json")).is_err());
    }

    #[test]
    fn test_apply_options_unknown_filter() {
        let mut engine = rooms_table();
        let options = CliOptions {
            filters: vec![("wing".to_string(), "east".to_string())],
            ..CliOptions::default()
        };
        assert!(apply_options(&mut engine, &options).is_err());
    }

    #[test]
    fn test_apply_options_narrows_rows() {
        let mut engine = rooms_table();
        let total = engine.view().total_count;
        let options = CliOptions {
            filters: vec![("status".to_string(), "vacant".to_string())],
            page_size: Some(5),
            ..CliOptions::default()
        };
        apply_options(&mut engine, &options).unwrap();

        let view = engine.view();
        assert!(view.total_filtered_count < total);
        assert!(engine.page_rows().len() <= 5);
        assert!(engine
            .filtered_rows()
            .iter()
            .all(|row| row.field("status").map(|v| v.to_string()) == Some("vacant".to_string())));
    }
}
