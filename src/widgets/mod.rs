//! Reusable widgets for the table shell

pub mod checklist;
pub mod log_pane;
pub mod search_input;
