use crate::data::record::JsonRecord;
use crate::data::value::CellValue;
use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use serde_json::{Map, Value as JsonValue};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// Key fields tried, in order, when no schema names one
pub const DEFAULT_KEY_FIELDS: [&str; 2] = ["_id", "id"];

/// Load a JSON or CSV file, picking the format from the extension
pub fn load_records<P: AsRef<Path>>(path: P, key_fields: &[&str]) -> Result<Vec<JsonRecord>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let records = match extension.as_deref() {
        Some("json") => load_json_records(path, key_fields)?,
        Some("csv") => load_csv_records(path, key_fields)?,
        _ => bail!("Unsupported data file (expected .json or .csv): {:?}", path),
    };

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load a JSON file holding an array of objects, or a list envelope
/// `{ "data": [...] }` as returned by the REST list endpoints
pub fn load_json_records<P: AsRef<Path>>(path: P, key_fields: &[&str]) -> Result<Vec<JsonRecord>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open JSON file: {:?}", path.as_ref()))?;
    let json: JsonValue = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON file: {:?}", path.as_ref()))?;
    records_from_json(json, key_fields)
}

/// Parse records from JSON text
pub fn parse_json_records(text: &str, key_fields: &[&str]) -> Result<Vec<JsonRecord>> {
    let json: JsonValue = serde_json::from_str(text).context("Failed to parse JSON data")?;
    records_from_json(json, key_fields)
}

fn records_from_json(json: JsonValue, key_fields: &[&str]) -> Result<Vec<JsonRecord>> {
    let items = match json {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut envelope) => match envelope.remove("data") {
            Some(JsonValue::Array(items)) => items,
            _ => bail!("JSON object must contain a \"data\" array"),
        },
        _ => bail!("JSON data must be an array of objects"),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(ordinal, item)| match item {
            JsonValue::Object(fields) => Ok(JsonRecord::from_object(fields, key_fields, ordinal)),
            other => bail!("Record {} is not an object: {}", ordinal, other),
        })
        .collect()
}

/// Load a CSV file with a header row; cells are typed as they are read
pub fn load_csv_records<P: AsRef<Path>>(path: P, key_fields: &[&str]) -> Result<Vec<JsonRecord>> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;
    read_csv_records(file, key_fields)
        .with_context(|| format!("Failed to read CSV file: {:?}", path.as_ref()))
}

pub fn read_csv_records<R: Read>(reader: R, key_fields: &[&str]) -> Result<Vec<JsonRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for (ordinal, result) in reader.records().enumerate() {
        let record = result?;
        let mut fields = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            fields.insert(header.to_string(), CellValue::infer_from_csv(cell).to_json());
        }
        records.push(JsonRecord::from_object(fields, key_fields, ordinal));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::Record;
    use std::io::Write;

    #[test]
    fn test_load_csv() -> Result<()> {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        writeln!(temp_file, "id,roomNumber,rate,smoking")?;
        writeln!(temp_file, "1,101,180.5,false")?;
        writeln!(temp_file, "2,102,95,true")?;
        temp_file.flush()?;

        let records = load_records(temp_file.path(), &DEFAULT_KEY_FIELDS)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_key().as_str(), "1");
        assert_eq!(records[0].field("rate"), Some(CellValue::Float(180.5)));
        assert_eq!(records[1].field("smoking"), Some(CellValue::Boolean(true)));
        assert_eq!(records[0].field_names(), vec!["id", "roomNumber", "rate", "smoking"]);
        Ok(())
    }

    #[test]
    fn test_load_json_envelope() -> Result<()> {
        let records = parse_json_records(
            r#"{"data": [{"_id": "a1", "status": "paid"}, {"_id": "a2", "status": null}]}"#,
            &DEFAULT_KEY_FIELDS,
        )?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].row_key().as_str(), "a2");
        assert_eq!(records[1].field("status"), Some(CellValue::Null));
        Ok(())
    }

    #[test]
    fn test_rejects_non_objects() {
        assert!(parse_json_records("[1, 2]", &DEFAULT_KEY_FIELDS).is_err());
        assert!(parse_json_records("\"rooms\"", &DEFAULT_KEY_FIELDS).is_err());
    }

    #[test]
    fn test_unknown_extension() {
        assert!(load_records("rooms.xlsx", &DEFAULT_KEY_FIELDS).is_err());
    }
}
