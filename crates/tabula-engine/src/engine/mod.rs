//! Grid engine API.
//!
//! This module provides addressing and storage for the table layer:
//!
//! - [`CellRef`], [`column_to_index`], [`index_to_column`] - A1 notation ↔ 1-based row/col indices
//! - [`RangeRef`], [`Bounds`], [`parse_range`] - Range text and lazy resolution against a grid
//! - [`Value`] - Scalar cell values
//! - [`Grid`] - Jagged row storage with structural edits
//! - [`Range`] - Bulk read/write over a rectangle or band
//! - [`Section`] - Row and column views with header lookup

mod address;
mod error;
mod grid;
mod range;
mod range_ref;
mod section;
mod value;

pub use address::{
    CellRef, MAX_COLUMN, column_to_index, format_address, index_to_column, offset, parse_address,
    step_column, to_range_text,
};
pub use error::{GridError, Result};
pub use grid::{DeleteTarget, Grid};
pub use range::{Range, RangeValue};
pub use range_ref::{Bounds, RangeRef, parse_range};
pub use section::{Axis, Section, find_header};
pub use value::{Value, format_number};
