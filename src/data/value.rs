use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Date layouts accepted when a cell is read as a timestamp, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// A single cell value produced by a column accessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(String), // Kept in its source text form, parsed on demand
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the value. Non-numeric text yields None (the NaN case).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) if !f.is_nan() => Some(*f),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::String(s) => s.trim().parse::<f64>().ok().filter(|f| !f.is_nan()),
            _ => None,
        }
    }

    /// Milliseconds since the Unix epoch, or None when the value is not a date
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            CellValue::DateTime(s) | CellValue::String(s) => parse_timestamp(s),
            CellValue::Integer(ms) => Some(*ms),
            CellValue::Float(ms) if ms.is_finite() => Some(*ms as i64),
            _ => None,
        }
    }

    /// Convert a JSON value, detecting date strings along the way
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    CellValue::Float(f)
                } else {
                    CellValue::String(n.to_string())
                }
            }
            JsonValue::String(s) => Self::from_text(s),
            JsonValue::Array(_) | JsonValue::Object(_) => CellValue::String(json.to_string()),
        }
    }

    /// Type a raw text field (CSV cells, TOML option values)
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if s.len() >= 8 && s.contains(['-', '/']) && parse_timestamp(s).is_some() {
            return CellValue::DateTime(s.to_string());
        }
        CellValue::String(s.to_string())
    }

    /// Type a CSV cell: numbers and booleans are recognised as well as dates
    pub fn infer_from_csv(s: &str) -> Self {
        if s.is_empty() || s.eq_ignore_ascii_case("null") {
            return CellValue::Null;
        }
        if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(s.eq_ignore_ascii_case("true"));
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        Self::from_text(s)
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::String(s) | CellValue::DateTime(s) => JsonValue::String(s.clone()),
            CellValue::Integer(i) => JsonValue::from(*i),
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            CellValue::Boolean(b) => JsonValue::Bool(*b),
            CellValue::Null => JsonValue::Null,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl<V: Into<CellValue>> From<Option<V>> for CellValue {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Parse a date or datetime string to epoch milliseconds (UTC for naive inputs)
pub fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive).timestamp_millis());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&naive).timestamp_millis());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_types() {
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Null);
        assert_eq!(CellValue::from_json(&json!(42)), CellValue::Integer(42));
        assert_eq!(CellValue::from_json(&json!(2.5)), CellValue::Float(2.5));
        assert_eq!(CellValue::from_json(&json!(true)), CellValue::Boolean(true));
        assert_eq!(
            CellValue::from_json(&json!("Deluxe")),
            CellValue::String("Deluxe".to_string())
        );
        assert_eq!(
            CellValue::from_json(&json!("2024-03-01")),
            CellValue::DateTime("2024-03-01".to_string())
        );
    }

    #[test]
    fn test_dash_text_is_not_a_date() {
        // Room codes look date-ish but do not parse
        assert_eq!(
            CellValue::from_json(&json!("B-204-SEA")),
            CellValue::String("B-204-SEA".to_string())
        );
    }

    #[test]
    fn test_as_f64_coercion() {
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::from("12.5").as_f64(), Some(12.5));
        assert_eq!(CellValue::from("twelve").as_f64(), None);
        assert_eq!(CellValue::Null.as_f64(), None);
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let day = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(parse_timestamp("15/01/2024"), Some(day));
        assert_eq!(parse_timestamp("2024-01-15 00:00:00"), Some(day));
        assert_eq!(parse_timestamp("2024-01-15T00:00:00Z"), Some(day));
        assert_eq!(parse_timestamp("2024-01-15T01:00:00+01:00"), Some(day));
        assert_eq!(parse_timestamp("2024-01-15T00:00:01"), Some(day + 1000));
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_infer_from_csv() {
        assert_eq!(CellValue::infer_from_csv("101"), CellValue::Integer(101));
        assert_eq!(CellValue::infer_from_csv("99.5"), CellValue::Float(99.5));
        assert_eq!(CellValue::infer_from_csv("TRUE"), CellValue::Boolean(true));
        assert_eq!(CellValue::infer_from_csv(""), CellValue::Null);
        assert_eq!(
            CellValue::infer_from_csv("2024-05-02"),
            CellValue::DateTime("2024-05-02".to_string())
        );
    }

    #[test]
    fn test_display_null_is_empty() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Integer(7).to_string(), "7");
    }
}
