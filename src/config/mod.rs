//! Configuration: user settings and table schemas

pub mod config;
pub mod table_schema;

pub use config::Config;
pub use table_schema::TableSchema;
