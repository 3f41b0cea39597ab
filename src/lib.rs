pub mod config;
pub mod data;
pub mod table;
pub mod ui;
pub mod utils;
pub mod widgets;

pub use data::record::{JsonRecord, Record, RowKey};
pub use table::engine::TableEngine;
