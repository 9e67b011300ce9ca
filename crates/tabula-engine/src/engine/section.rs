//! Row and column views.
//!
//! A [`Section`] projects one row or one column of a [`Grid`] onto a 1-D,
//! 1-based index. Like [`Range`](super::range::Range) it is only a handle:
//! the grid is passed to every call and the view's length is read from the
//! grid's current extent each time.

use std::collections::HashMap;

use tracing::debug;

use super::address::{CellRef, column_to_index};
use super::error::{GridError, Result};
use super::grid::{DeleteTarget, Grid};
use super::range::{Range, RangeValue};
use super::value::Value;

/// Which axis a [`Section`] runs along.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

/// One row or one column of a grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Section {
    axis: Axis,
    index: usize,
}

impl Section {
    /// View of row `index` (1-based).
    pub fn row(index: usize) -> Section {
        Section {
            axis: Axis::Row,
            index,
        }
    }

    /// View of column `index` (1-based).
    pub fn column(index: usize) -> Section {
        Section {
            axis: Axis::Column,
            index,
        }
    }

    /// View of the column named by `letters` ("C").
    pub fn column_letters(letters: &str) -> Result<Section> {
        Ok(Section::column(column_to_index(letters)?))
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell at axis-local position `i`.
    pub fn cell(&self, i: usize) -> CellRef {
        match self.axis {
            Axis::Row => CellRef::new(self.index, i),
            Axis::Column => CellRef::new(i, self.index),
        }
    }

    /// Number of positions: the grid's column count for a row view, its row
    /// count for a column view.
    pub fn len(&self, grid: &Grid) -> usize {
        match self.axis {
            Axis::Row => grid.columns(),
            Axis::Column => grid.rows(),
        }
    }

    pub fn read<'g>(&self, grid: &'g Grid, i: usize) -> &'g Value {
        grid.read(self.cell(i))
    }

    pub fn write(&self, grid: &mut Grid, i: usize, value: impl Into<Value>) {
        grid.write(self.cell(i), value);
    }

    /// Values at positions `start..start + len`.
    pub fn read_slice(&self, grid: &Grid, start: usize, len: usize) -> Vec<Value> {
        (start..start + len)
            .map(|i| self.read(grid, i).clone())
            .collect()
    }

    /// Write `value` over positions `start..start + len`, with the same
    /// broadcasting rules as [`Range::write`].
    pub fn write_slice(
        &self,
        grid: &mut Grid,
        start: usize,
        len: usize,
        value: impl Into<RangeValue>,
    ) -> Result<()> {
        if start == 0 {
            return Err(GridError::InvalidAddress(format!(
                "{:?} slice starting at 0 (indexing is 1-based)",
                self.axis
            )));
        }
        let last = start + len.max(1) - 1;
        Range::between(self.cell(start), self.cell(last)).write(grid, value)
    }

    /// Append one value past the end of the view.
    ///
    /// Only row 1 (or column 1) extends the grid; any other view writes to
    /// the last existing position, so appending across every row grows the
    /// grid by a single column rather than diagonally.
    pub fn append(&self, grid: &mut Grid, value: impl Into<Value>) {
        let len = self.len(grid);
        let pos = if self.index == 1 { len + 1 } else { len.max(1) };
        self.write(grid, pos, value);
    }

    /// Cells of the view. `header_rows` leading cells are skipped for a
    /// column view; a row view has no headers along its axis.
    pub fn addresses(&self, grid: &Grid, header_rows: usize) -> Vec<CellRef> {
        let skip = match self.axis {
            Axis::Row => 0,
            Axis::Column => header_rows,
        };
        (skip + 1..=self.len(grid)).map(|i| self.cell(i)).collect()
    }

    pub fn values(&self, grid: &Grid) -> Vec<Value> {
        self.values_without_headers(grid, 0)
    }

    pub fn values_without_headers(&self, grid: &Grid, header_rows: usize) -> Vec<Value> {
        self.addresses(grid, header_rows)
            .into_iter()
            .map(|cell| grid.read(cell).clone())
            .collect()
    }

    /// True when every value outside the header band stringifies to "".
    pub fn is_empty(&self, grid: &Grid, header_rows: usize) -> bool {
        self.addresses(grid, header_rows)
            .into_iter()
            .all(|cell| grid.read(cell).is_blank())
    }

    /// First cell whose value satisfies `pred`, header cells included.
    pub fn find<F>(&self, grid: &Grid, mut pred: F) -> Option<CellRef>
    where
        F: FnMut(&Value) -> bool,
    {
        self.addresses(grid, 0)
            .into_iter()
            .find(|cell| pred(grid.read(*cell)))
    }

    /// Occurrence count of each distinct value outside the header band, in
    /// order of first appearance.
    pub fn summarise(&self, grid: &Grid, header_rows: usize) -> Vec<(Value, usize)> {
        let mut counts: Vec<(Value, usize)> = Vec::new();
        let mut seen: HashMap<Value, usize> = HashMap::new();
        for value in self.values_without_headers(grid, header_rows) {
            match seen.get(&value) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    seen.insert(value.clone(), counts.len());
                    counts.push((value, 1));
                }
            }
        }
        counts
    }

    /// Replace every value outside the header band with `f(value)`.
    pub fn map_in_place<F>(&self, grid: &mut Grid, header_rows: usize, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        for cell in self.addresses(grid, header_rows) {
            let next = f(grid.read(cell));
            grid.write(cell, next);
        }
    }

    pub fn last_cell(&self, grid: &Grid) -> CellRef {
        self.cell(self.len(grid).max(1))
    }

    pub fn last<'g>(&self, grid: &'g Grid) -> &'g Value {
        grid.read(self.last_cell(grid))
    }

    pub fn delete_target(&self) -> DeleteTarget {
        match self.axis {
            Axis::Row => DeleteTarget::Row(self.index),
            Axis::Column => DeleteTarget::Column(self.index),
        }
    }

    /// Remove this row or column from the grid.
    pub fn delete(&self, grid: &mut Grid) -> Result<()> {
        debug!(axis = ?self.axis, index = self.index, "deleting section");
        grid.delete(self.delete_target())
    }

    /// Value in this row under the column labelled `label`.
    pub fn value_by_header<'g>(
        &self,
        grid: &'g Grid,
        header_rows: usize,
        label: &str,
    ) -> Result<&'g Value> {
        let col = self.header_column(grid, header_rows, label)?;
        Ok(self.read(grid, col))
    }

    /// Write into this row under the column labelled `label`.
    pub fn set_value_by_header(
        &self,
        grid: &mut Grid,
        header_rows: usize,
        label: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let col = self.header_column(grid, header_rows, label)?;
        self.write(grid, col, value);
        Ok(())
    }

    fn header_column(&self, grid: &Grid, header_rows: usize, label: &str) -> Result<usize> {
        if self.axis == Axis::Column {
            return Err(GridError::UnsupportedOperand(format!(
                "header lookup on column {}",
                self.index
            )));
        }
        find_header(grid, header_rows, label)
    }

    /// Tab-joined for a row view, newline-joined for a column view. Tabs and
    /// line breaks inside values become spaces.
    pub fn to_text(&self, grid: &Grid) -> String {
        let sep = match self.axis {
            Axis::Row => "\t",
            Axis::Column => "\n",
        };
        self.values(grid)
            .iter()
            .map(|v| v.to_string().replace(['\t', '\n', '\r'], " "))
            .collect::<Vec<_>>()
            .join(sep)
    }
}

/// Column index of the first header cell equal to `label`, scanning header
/// rows top to bottom.
pub fn find_header(grid: &Grid, header_rows: usize, label: &str) -> Result<usize> {
    if header_rows == 0 {
        return Err(GridError::NoHeaders);
    }
    for r in 1..=header_rows {
        if let Some(pos) = grid.row(r).iter().position(|v| v.to_string() == label) {
            return Ok(pos + 1);
        }
    }
    Err(GridError::HeaderNotFound(label.to_string()))
}
