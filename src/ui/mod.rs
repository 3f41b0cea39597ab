//! Terminal presentation layer
//!
//! Everything here reads engine state and issues engine operations; no table
//! state lives in the UI.

pub mod key_mapper;
pub mod shell;
pub mod style_resolver;
pub mod table_renderer;
pub mod toolbar;
