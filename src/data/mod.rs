//! Data layer: cell values, records and the file adapters around them

pub mod compare;
pub mod exporter;
pub mod loaders;
pub mod record;
pub mod value;

pub use exporter::{DataExporter, ExportFormat, ExportSummary};
pub use record::{JsonRecord, Record, RowKey};
pub use value::CellValue;
