use crate::data::record::Record;
use crate::table::column::ColumnDescriptor;
use crate::table::engine::TableEngine;
use anyhow::{bail, Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    /// Tab separated, clipboard friendly
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" | "tab" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            other => bail!("Unknown export format '{}' (expected csv, tsv or json)", other),
        }
    }
}

/// Outcome of writing an export file
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub format: ExportFormat,
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exported {} rows to {} file: {}",
            self.rows,
            self.format.extension().to_uppercase(),
            self.path.display()
        )
    }
}

/// Serializes table rows using the same display text the grid shows
pub struct DataExporter;

impl DataExporter {
    /// Export every row matching the current filters and sort, ignoring paging.
    /// Only visible columns are written, in display order.
    pub fn export<T: Record, W: Write>(
        engine: &TableEngine<T>,
        writer: W,
        format: ExportFormat,
    ) -> Result<usize> {
        Self::write_rows(
            writer,
            &engine.visible_columns(),
            &engine.filtered_rows(),
            format,
        )
    }

    /// Export only the selected rows, same layout as [`DataExporter::export`]
    pub fn export_selected<T: Record, W: Write>(
        engine: &TableEngine<T>,
        writer: W,
        format: ExportFormat,
    ) -> Result<usize> {
        Self::write_rows(
            writer,
            &engine.visible_columns(),
            &engine.selected_rows(),
            format,
        )
    }

    pub fn export_to_string<T: Record>(engine: &TableEngine<T>, format: ExportFormat) -> Result<String> {
        let mut buffer = Vec::new();
        Self::export(engine, &mut buffer, format)?;
        String::from_utf8(buffer).context("Export produced invalid UTF-8")
    }

    /// Write the export to `path`, or to a timestamped file in `dir` when no
    /// path is given
    pub fn export_to_path<T: Record>(
        engine: &TableEngine<T>,
        path: Option<&Path>,
        dir: &Path,
        format: ExportFormat,
    ) -> Result<ExportSummary> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => dir.join(Self::default_file_name(
                engine.config().export_base_name(),
                format,
            )),
        };

        Self::write_file(engine, path, format, false)
    }

    /// Same as [`DataExporter::export_to_path`] for the selected rows only
    pub fn export_selected_to_path<T: Record>(
        engine: &TableEngine<T>,
        path: Option<&Path>,
        dir: &Path,
        format: ExportFormat,
    ) -> Result<ExportSummary> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => dir.join(Self::default_file_name(
                &format!("{}_selected", engine.config().export_base_name()),
                format,
            )),
        };
        Self::write_file(engine, path, format, true)
    }

    fn write_file<T: Record>(
        engine: &TableEngine<T>,
        path: PathBuf,
        format: ExportFormat,
        selected_only: bool,
    ) -> Result<ExportSummary> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create export file: {:?}", path))?;
        let writer = BufWriter::new(file);
        let rows = if selected_only {
            Self::export_selected(engine, writer, format)?
        } else {
            Self::export(engine, writer, format)?
        };

        info!("Exported {} rows to {}", rows, path.display());
        Ok(ExportSummary { path, rows, format })
    }

    /// `{base}_{YYYYmmdd_HHMMSS}.{ext}`
    pub fn default_file_name(base: &str, format: ExportFormat) -> String {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        format!("{}_{}.{}", base, timestamp, format.extension())
    }

    /// Write a header line plus one line per row. Zero rows still writes the header.
    pub fn write_rows<T: Record, W: Write>(
        writer: W,
        columns: &[&ColumnDescriptor<T>],
        rows: &[&T],
        format: ExportFormat,
    ) -> Result<usize> {
        match format {
            ExportFormat::Csv => Self::write_csv(writer, columns, rows),
            ExportFormat::Tsv => Self::write_tsv(writer, columns, rows),
            ExportFormat::Json => Self::write_json(writer, columns, rows),
        }
    }

    fn write_csv<T: Record, W: Write>(
        writer: W,
        columns: &[&ColumnDescriptor<T>],
        rows: &[&T],
    ) -> Result<usize> {
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        wtr.write_record(columns.iter().map(|c| c.header.as_str()))?;
        for row in rows {
            wtr.write_record(columns.iter().map(|c| c.display(row)))?;
        }
        wtr.flush()?;
        Ok(rows.len())
    }

    fn write_tsv<T: Record, W: Write>(
        mut writer: W,
        columns: &[&ColumnDescriptor<T>],
        rows: &[&T],
    ) -> Result<usize> {
        let headers: Vec<String> = columns.iter().map(|c| Self::tsv_field(&c.header)).collect();
        write!(writer, "{}\r\n", headers.join("\t"))?;
        for row in rows {
            let values: Vec<String> = columns
                .iter()
                .map(|c| Self::tsv_field(&c.display(row)))
                .collect();
            write!(writer, "{}\r\n", values.join("\t"))?;
        }
        writer.flush()?;
        Ok(rows.len())
    }

    fn write_json<T: Record, W: Write>(
        mut writer: W,
        columns: &[&ColumnDescriptor<T>],
        rows: &[&T],
    ) -> Result<usize> {
        let array: Vec<Value> = rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = columns
                    .iter()
                    .map(|c| (c.header.clone(), Value::String(c.display(row))))
                    .collect();
                Value::Object(object)
            })
            .collect();
        serde_json::to_writer_pretty(&mut writer, &array)?;
        writer.flush()?;
        Ok(rows.len())
    }

    /// Tabs and line breaks would split cells or rows in a spreadsheet paste
    fn tsv_field(value: &str) -> String {
        value.replace('\t', "    ").replace('\n', " ").replace('\r', "")
    }
}
