//! tabula-core - header-aware tables, workbook container and storage.

pub mod error;
pub mod storage;
pub mod table;
pub mod workbook;

pub use error::{Result, TabulaError};
pub use table::{Appendable, Condition, Operator, Table};
pub use workbook::Workbook;

pub use tabula_engine::engine::{CellRef, Grid, Value};
