//! Generic table engine: column model, filters, state transitions and the
//! derivation pipeline that turns a row set into the visible page.

pub mod action;
pub mod column;
pub mod config;
pub mod derive;
pub mod engine;
pub mod filter;
pub mod predicate;
pub mod reducer;
pub mod renderer;
pub mod state;

pub use action::TableAction;
pub use column::{Accessor, ColumnDescriptor, ColumnModel, SortingFn};
pub use config::TableConfig;
pub use derive::DerivedView;
pub use engine::{CheckState, TableEngine};
pub use filter::{DateRange, FilterDescriptor, FilterOption, FilterRegistry};
pub use renderer::CellRenderer;
pub use state::{EngineState, PageState, SortDirection, SortEntry};
