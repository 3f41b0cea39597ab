//! Display formatting for cells
//!
//! Each column resolves its renderer once, when the column model is built.
//! The same display text feeds the grid, the global search and the export,
//! so what a user searches and exports is what they saw on screen.

use crate::data::value::CellValue;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::sync::Arc;

/// Shown in place of a cell whose accessor failed
pub const PLACEHOLDER: &str = "—";

pub type RenderFn = Arc<dyn Fn(&CellValue) -> String + Send + Sync>;

#[derive(Clone, Default)]
pub enum CellRenderer {
    /// Raw stringification
    #[default]
    Plain,
    /// Text clipped to a maximum number of characters
    Text { max_width: usize },
    /// Fixed-point amount with a currency prefix
    Currency { symbol: String, decimals: usize },
    /// Date or datetime reformatted with a chrono format string
    Date { format: String },
    Boolean { yes: String, no: String },
    /// Enumerated status values mapped to human labels
    Badge { labels: HashMap<String, String> },
    Custom(RenderFn),
}

impl CellRenderer {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&CellValue) -> String + Send + Sync + 'static,
    {
        CellRenderer::Custom(Arc::new(f))
    }

    pub fn render(&self, value: &CellValue) -> String {
        if value.is_null() && !matches!(self, CellRenderer::Custom(_)) {
            return String::new();
        }

        match self {
            CellRenderer::Plain => value.to_string(),
            CellRenderer::Text { max_width } => truncate(&value.to_string(), *max_width),
            CellRenderer::Currency { symbol, decimals } => match value.as_f64() {
                Some(amount) => format_amount(symbol, amount, *decimals),
                None => value.to_string(),
            },
            CellRenderer::Date { format } => value
                .as_timestamp()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .and_then(|dt| format_date(&dt, format))
                .unwrap_or_else(|| value.to_string()),
            CellRenderer::Boolean { yes, no } => match value {
                CellValue::Boolean(true) => yes.clone(),
                CellValue::Boolean(false) => no.clone(),
                other => other.to_string(),
            },
            CellRenderer::Badge { labels } => {
                let raw = value.to_string();
                labels.get(&raw).cloned().unwrap_or(raw)
            }
            CellRenderer::Custom(f) => f(value),
        }
    }
}

impl fmt::Debug for CellRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRenderer::Plain => write!(f, "Plain"),
            CellRenderer::Text { max_width } => write!(f, "Text({})", max_width),
            CellRenderer::Currency { symbol, decimals } => {
                write!(f, "Currency({}, {})", symbol, decimals)
            }
            CellRenderer::Date { format } => write!(f, "Date({})", format),
            CellRenderer::Boolean { yes, no } => write!(f, "Boolean({}/{})", yes, no),
            CellRenderer::Badge { labels } => write!(f, "Badge({} labels)", labels.len()),
            CellRenderer::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// True when chrono can render every item of the format string
pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// `None` when the format string is one chrono cannot render
fn format_date(dt: &DateTime<Utc>, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", dt.format(format)).ok()?;
    Some(out)
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width || max_width == 0 {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// `$1,234.50` style formatting; negative amounts keep the sign before the symbol
fn format_amount(symbol: &str, amount: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}{}.{}", sign, symbol, grouped, frac),
        None => format!("{}{}{}", sign, symbol, grouped),
    }
}
