//! Logging, paths and small helpers shared by the shell and the CLI

pub mod app_paths;
pub mod debouncer;
pub mod file_log;
pub mod logging;
