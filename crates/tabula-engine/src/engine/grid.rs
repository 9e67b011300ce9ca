//! Row-major grid storage.
//!
//! The grid is a list of rows, each a list of [`Value`]s. Rows may be jagged:
//! [`Grid::columns`] is the length of the longest row and every shorter row
//! reads as [`Value::Empty`] past its end. Only [`Grid::normalize`] (and the
//! column-axis operations that call it) pads rows to a rectangle.
//!
//! All indices in this module are 1-based.

use tracing::debug;

use super::address::CellRef;
use super::error::{GridError, Result};
use super::range_ref::{Bounds, RangeRef};
use super::value::Value;

static EMPTY: Value = Value::Empty;

/// What a structural delete removes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeleteTarget {
    /// One whole row (1-based index).
    Row(usize),
    /// One whole column (1-based index).
    Column(usize),
    /// A rectangle of cells.
    Rect(Bounds),
}

/// Rectangular (possibly jagged) store of cell values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    data: Vec<Vec<Value>>,
    /// Longest row length. Kept in step with `data` by `recalc_dimensions`.
    cols: usize,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from rows of anything convertible into a [`Value`].
    pub fn from_rows<T: Into<Value>>(rows: Vec<Vec<T>>) -> Self {
        let data = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let mut grid = Grid { data, cols: 0 };
        grid.recalc_dimensions();
        grid
    }

    /// Build a grid from JSON input.
    ///
    /// - an array of arrays becomes rows
    /// - a flat array becomes a single row
    /// - an object is flattened: every nesting level becomes a leading column
    ///   and the leaf value becomes the last column, so
    ///   `{"A": {"B": 1, "C": 2}}` gives rows `[A, B, 1]` and `[A, C, 2]`
    pub fn from_mapping(input: &serde_json::Value) -> Result<Self> {
        Ok(Self::from_rows(json_rows(input)?))
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.data.len()
    }

    /// Length of the longest row.
    pub fn columns(&self) -> usize {
        self.cols
    }

    /// True when the grid holds no rows at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when every cell stringifies to "".
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|row| row.iter().all(Value::is_blank))
    }

    /// Bounds covering `A1` through the last row and column, if any.
    pub fn used_bounds(&self) -> Option<Bounds> {
        if self.rows() == 0 || self.columns() == 0 {
            return None;
        }
        Some(Bounds {
            row_lo: 1,
            row_hi: self.rows(),
            col_lo: 1,
            col_hi: self.columns(),
        })
    }

    /// Read a cell. Cells beyond the current extent read as empty.
    pub fn read(&self, cell: CellRef) -> &Value {
        cell.row
            .checked_sub(1)
            .zip(cell.col.checked_sub(1))
            .and_then(|(r, c)| self.data.get(r)?.get(c))
            .unwrap_or(&EMPTY)
    }

    /// Read a cell by address text.
    pub fn read_address(&self, address: &str) -> Result<&Value> {
        Ok(self.read(CellRef::parse(address)?))
    }

    /// Write a cell, growing the grid as needed.
    ///
    /// Missing rows are appended as empty rows; the target row alone is
    /// padded up to the column (other rows stay jagged).
    pub fn write(&mut self, cell: CellRef, value: impl Into<Value>) {
        let (Some(r), Some(c)) = (cell.row.checked_sub(1), cell.col.checked_sub(1)) else {
            return;
        };
        if r >= self.data.len() {
            self.data.resize_with(r + 1, Vec::new);
        }
        let row = &mut self.data[r];
        if c >= row.len() {
            row.resize(c + 1, Value::Empty);
        }
        row[c] = value.into();
        if cell.col > self.cols {
            self.cols = cell.col;
        }
    }

    /// Write a cell by address text.
    pub fn write_address(&mut self, address: &str, value: impl Into<Value>) -> Result<()> {
        self.write(CellRef::parse(address)?, value);
        Ok(())
    }

    /// Pad every row to [`Grid::columns`].
    pub fn normalize(&mut self) {
        self.recalc_dimensions();
        let cols = self.cols;
        for row in &mut self.data {
            if row.len() < cols {
                row.resize(cols, Value::Empty);
            }
        }
    }

    /// Swap rows and columns. Normalizes first.
    pub fn transpose(&mut self) {
        self.normalize();
        let cols = self.cols;
        let mut out: Vec<Vec<Value>> = (0..cols).map(|_| Vec::with_capacity(self.data.len())).collect();
        for row in std::mem::take(&mut self.data) {
            for (c, value) in row.into_iter().enumerate() {
                out[c].push(value);
            }
        }
        self.data = out;
        self.recalc_dimensions();
    }

    /// Insert `count` empty rows before row `before`. Rows at or after
    /// `before` move down by `count`.
    pub fn insert_rows(&mut self, before: usize, count: usize) -> Result<()> {
        let at = before
            .checked_sub(1)
            .ok_or_else(|| GridError::InvalidAddress(format!("row {}", before)))?;
        if at > self.data.len() {
            self.data.resize_with(at, Vec::new);
        }
        self.data
            .splice(at..at, std::iter::repeat_with(Vec::new).take(count));
        debug!(before, count, rows = self.data.len(), "inserted rows");
        self.recalc_dimensions();
        Ok(())
    }

    /// Insert `count` empty cells before column `before` in every row.
    pub fn insert_columns(&mut self, before: usize, count: usize) -> Result<()> {
        let at = before
            .checked_sub(1)
            .ok_or_else(|| GridError::InvalidAddress(format!("column {}", before)))?;
        for row in &mut self.data {
            // Short rows have nothing to shift; their cells past the end are
            // already empty.
            if row.len() > at {
                row.splice(at..at, std::iter::repeat_n(Value::Empty, count));
            }
        }
        debug!(before, count, "inserted columns");
        self.recalc_dimensions();
        Ok(())
    }

    /// Remove rows `lo..=hi` (1-based, either order).
    pub fn delete_rows(&mut self, lo: usize, hi: usize) -> Result<()> {
        let (lo, hi) = checked_span(lo, hi, "row")?;
        if lo <= self.data.len() {
            let end = hi.min(self.data.len());
            self.data.drain(lo - 1..end);
        }
        debug!(lo, hi, rows = self.data.len(), "deleted rows");
        self.recalc_dimensions();
        Ok(())
    }

    /// Remove columns `lo..=hi` (1-based, either order) from every row.
    pub fn delete_columns(&mut self, lo: usize, hi: usize) -> Result<()> {
        let (lo, hi) = checked_span(lo, hi, "column")?;
        for row in &mut self.data {
            if lo <= row.len() {
                let end = hi.min(row.len());
                row.drain(lo - 1..end);
            }
        }
        debug!(lo, hi, "deleted columns");
        self.recalc_dimensions();
        Ok(())
    }

    /// Clear a rectangle.
    ///
    /// Cells inside the rectangle become empty. A row whose every physical
    /// cell lies inside the rectangle is removed outright; rows that were
    /// already empty, or that keep cells outside the rectangle, stay.
    pub fn delete_rect(&mut self, bounds: Bounds) -> Result<()> {
        let (row_lo, row_hi) = checked_span(bounds.row_lo, bounds.row_hi, "row")?;
        let (col_lo, col_hi) = checked_span(bounds.col_lo, bounds.col_hi, "column")?;

        let mut emptied = Vec::new();
        for r in row_lo..=row_hi.min(self.data.len()) {
            let row = &mut self.data[r - 1];
            if row.is_empty() {
                continue;
            }
            if col_lo == 1 && col_hi >= row.len() {
                emptied.push(r - 1);
                continue;
            }
            if col_hi >= row.len() {
                row.truncate(col_lo - 1);
            } else {
                for value in &mut row[col_lo - 1..col_hi] {
                    *value = Value::Empty;
                }
            }
        }

        let removed = emptied.len();
        for idx in emptied.into_iter().rev() {
            self.data.remove(idx);
        }
        debug!(range = %bounds, removed, rows = self.data.len(), "deleted range");
        self.recalc_dimensions();
        Ok(())
    }

    /// Remove whatever `target` designates.
    pub fn delete(&mut self, target: DeleteTarget) -> Result<()> {
        match target {
            DeleteTarget::Row(idx) => self.delete_rows(idx, idx),
            DeleteTarget::Column(idx) => self.delete_columns(idx, idx),
            DeleteTarget::Rect(bounds) => self.delete_rect(bounds),
        }
    }

    /// Delete by range text: `2:4` removes rows, `B:C` removes columns and
    /// any other reference clears a rectangle.
    pub fn delete_ref(&mut self, text: &str) -> Result<()> {
        match RangeRef::parse(text)? {
            RangeRef::Rows { lo, hi } => self.delete_rows(lo, hi),
            RangeRef::Columns { lo, hi } => self.delete_columns(lo, hi),
            other => self.delete_rect(other.resolve(self)),
        }
    }

    /// Drop every row.
    pub fn delete_all(&mut self) {
        self.data.clear();
        self.recalc_dimensions();
    }

    /// Remove rows whose cells all stringify to "".
    pub fn compact_rows(&mut self) {
        let before = self.data.len();
        self.data.retain(|row| !row.iter().all(Value::is_blank));
        debug!(removed = before - self.data.len(), "compacted rows");
        self.recalc_dimensions();
    }

    /// Remove columns whose cells all stringify to "". Normalizes first.
    pub fn compact_columns(&mut self) {
        self.normalize();
        let keep: Vec<usize> = (1..=self.cols)
            .filter(|&c| !self.data.iter().all(|row| row[c - 1].is_blank()))
            .collect();
        debug!(removed = self.cols - keep.len(), "compacted columns");
        self.select_columns(&keep);
    }

    /// Remove empty columns, then empty rows.
    pub fn compact(&mut self) {
        self.compact_columns();
        self.compact_rows();
    }

    /// Rebuild every row from the given 1-based source columns, in order.
    /// Indices past a row's end produce empty cells. Selecting no columns
    /// leaves no rows.
    pub fn select_columns(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            self.data.clear();
            self.recalc_dimensions();
            return;
        }
        self.normalize();
        for row in &mut self.data {
            let picked: Vec<Value> = indices
                .iter()
                .map(|&c| {
                    c.checked_sub(1)
                        .and_then(|i| row.get(i))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect();
            *row = picked;
        }
        self.recalc_dimensions();
    }

    /// Reverse column order (header cells included).
    pub fn reverse_columns(&mut self) {
        self.normalize();
        for row in &mut self.data {
            row.reverse();
        }
    }

    /// A row by 1-based index; empty if out of range.
    pub fn row(&self, index: usize) -> &[Value] {
        index
            .checked_sub(1)
            .and_then(|i| self.data.get(i))
            .map_or(&[], Vec::as_slice)
    }

    /// Iterate rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Value]> {
        self.data.iter().map(Vec::as_slice)
    }

    /// Copy of all rows.
    pub fn to_rows(&self) -> Vec<Vec<Value>> {
        self.data.clone()
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.data
    }

    /// Replace every row.
    pub fn replace_rows(&mut self, rows: Vec<Vec<Value>>) {
        self.data = rows;
        self.recalc_dimensions();
    }

    /// Append rows at the bottom.
    pub fn extend_rows<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        self.data.extend(rows);
        self.recalc_dimensions();
    }

    /// Append one value to the end of row `index`, creating it if needed.
    pub fn push_to_row(&mut self, index: usize, value: impl Into<Value>) {
        let Some(r) = index.checked_sub(1) else {
            return;
        };
        if r >= self.data.len() {
            self.data.resize_with(r + 1, Vec::new);
        }
        self.data[r].push(value.into());
        self.recalc_dimensions();
    }

    /// Keep rows after the first `skip` for which `keep` returns true. The
    /// first `skip` rows are never passed to `keep` and always stay.
    pub fn retain_rows_after<F>(&mut self, skip: usize, mut keep: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        let mut idx = 0usize;
        self.data.retain(|row| {
            idx += 1;
            idx <= skip || keep(row)
        });
        self.recalc_dimensions();
    }

    /// Run a whole-rows transformation on every row after the first `skip`
    /// and put the result back behind the untouched leading rows.
    pub fn with_body<F>(&mut self, skip: usize, f: F)
    where
        F: FnOnce(Vec<Vec<Value>>) -> Vec<Vec<Value>>,
    {
        let skip = skip.min(self.data.len());
        let body = self.data.split_off(skip);
        self.data.extend(f(body));
        self.recalc_dimensions();
    }

    fn recalc_dimensions(&mut self) {
        self.cols = self.data.iter().map(Vec::len).max().unwrap_or(0);
    }
}

fn checked_span(lo: usize, hi: usize, what: &str) -> Result<(usize, usize)> {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    if lo < 1 {
        return Err(GridError::InvalidAddress(format!(
            "{} 0 (indexing is 1-based)",
            what
        )));
    }
    Ok((lo, hi))
}

fn json_rows(input: &serde_json::Value) -> Result<Vec<Vec<Value>>> {
    match input {
        serde_json::Value::Object(_) => Ok(flatten_mapping(input)),
        serde_json::Value::Array(items) if items.iter().all(|v| v.is_array()) => Ok(items
            .iter()
            .map(|row| match row {
                serde_json::Value::Array(cells) => cells.iter().map(Value::from).collect(),
                _ => Vec::new(),
            })
            .collect()),
        serde_json::Value::Array(items) => Ok(vec![items.iter().map(Value::from).collect()]),
        other => Err(GridError::UnsupportedOperand(format!(
            "JSON {} as grid input",
            json_kind(other)
        ))),
    }
}

fn flatten_mapping(input: &serde_json::Value) -> Vec<Vec<Value>> {
    let serde_json::Value::Object(map) = input else {
        return vec![vec![Value::from(input)]];
    };
    let mut rows = Vec::new();
    for (key, value) in map {
        if value.is_object() {
            for sub in flatten_mapping(value) {
                let mut row = Vec::with_capacity(sub.len() + 1);
                row.push(Value::Text(key.clone()));
                row.extend(sub);
                rows.push(row);
            }
        } else {
            rows.push(vec![Value::Text(key.clone()), Value::from(value)]);
        }
    }
    rows
}

pub(crate) fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(text: &str) -> CellRef {
        CellRef::parse(text).unwrap()
    }

    fn seven_rows() -> Grid {
        Grid::from_rows((1..=7).map(|i| vec![format!("r{i}"), format!("x{i}")]).collect())
    }

    #[test]
    fn test_read_beyond_extent_is_empty() {
        let grid = seven_rows();
        assert_eq!(grid.read(cell("A1")), &Value::from("r1"));
        assert_eq!(grid.read(cell("Z99")), &Value::Empty);
        assert_eq!(grid.read(CellRef::new(0, 0)), &Value::Empty);
    }

    #[test]
    fn test_write_grows_rows_but_keeps_rows_jagged() {
        let mut grid = Grid::from_rows(vec![vec!["a", "b"]]);
        grid.write(cell("D3"), "x");
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.row(1).len(), 2);
        assert_eq!(grid.row(2).len(), 0);
        assert_eq!(grid.row(3).len(), 4);
        assert_eq!(grid.read(cell("C1")), &Value::Empty);
    }

    #[test]
    fn test_normalize_pads_rows() {
        let mut grid = Grid::from_rows(vec![vec![Value::from(1)], vec![Value::from(1), Value::from(2)]]);
        grid.normalize();
        assert!(grid.iter_rows().all(|row| row.len() == 2));
    }

    #[test]
    fn test_insert_rows_shifts_down() {
        let mut grid = seven_rows();
        grid.insert_rows(2, 2).unwrap();
        assert_eq!(grid.rows(), 9);
        assert_eq!(grid.read(cell("A4")), &Value::from("r2"));
        assert!(grid.read(cell("A2")).is_blank());
        assert!(grid.read(cell("B3")).is_blank());
        assert_eq!(grid.read(cell("A1")), &Value::from("r1"));
    }

    #[test]
    fn test_insert_rows_rejects_zero() {
        let mut grid = seven_rows();
        assert!(matches!(grid.insert_rows(0, 1), Err(GridError::InvalidAddress(_))));
        assert_eq!(grid.rows(), 7);
    }

    #[test]
    fn test_insert_columns() {
        let mut grid = seven_rows();
        grid.insert_columns(1, 2).unwrap();
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.read(cell("C1")), &Value::from("r1"));
        assert!(grid.read(cell("B2")).is_blank());
    }

    #[test]
    fn test_delete_rows_and_columns() {
        let mut grid = seven_rows();
        grid.delete(DeleteTarget::Row(1)).unwrap();
        assert_eq!(grid.rows(), 6);
        assert_eq!(grid.read(cell("A1")), &Value::from("r2"));

        grid.delete(DeleteTarget::Column(1)).unwrap();
        assert_eq!(grid.columns(), 1);
        assert_eq!(grid.read(cell("A1")), &Value::from("x2"));

        grid.delete_ref("2:3").unwrap();
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.read(cell("A2")), &Value::from("x5"));
    }

    #[test]
    fn test_delete_full_width_rect_removes_rows() {
        let mut grid = seven_rows();
        grid.delete_ref("A2:B3").unwrap();
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.read(cell("A2")), &Value::from("r4"));
    }

    #[test]
    fn test_delete_partial_rect_blanks_cells() {
        let mut grid = Grid::from_rows(vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
        grid.delete_ref("B1:B2").unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.read(cell("B1")), &Value::Empty);
        assert_eq!(grid.read(cell("C2")), &Value::from("f"));
    }

    #[test]
    fn test_delete_rect_keeps_rows_already_blank_outside_band() {
        let mut grid = Grid::from_rows(vec![
            vec![Value::Empty, Value::from("x")],
            vec![],
            vec![Value::from("y"), Value::from("z")],
        ]);
        grid.delete_ref("B1:B3").unwrap();
        assert_eq!(grid.rows(), 3);
        assert!(grid.row(1).iter().all(Value::is_blank));
        assert_eq!(grid.read(cell("A3")), &Value::from("y"));
    }

    #[test]
    fn test_compact() {
        let mut grid = Grid::from_rows(vec![
            vec![Value::from("a"), Value::Empty, Value::from("b")],
            vec![Value::Empty, Value::from(""), Value::Empty],
            vec![Value::from(1), Value::Empty, Value::from(2)],
        ]);
        grid.compact();
        assert_eq!(
            grid.to_rows(),
            vec![
                vec![Value::from("a"), Value::from("b")],
                vec![Value::from(1), Value::from(2)],
            ]
        );
    }

    #[test]
    fn test_select_columns() {
        let mut grid = seven_rows();
        grid.select_columns(&[2, 2, 9]);
        assert_eq!(grid.columns(), 3);
        assert_eq!(
            grid.row(1),
            [Value::from("x1"), Value::from("x1"), Value::Empty]
        );

        grid.select_columns(&[]);
        assert_eq!(grid.rows(), 0);
        assert_eq!(grid.columns(), 0);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_transpose() {
        let mut grid = Grid::from_rows(vec![vec![1, 2, 3], vec![4]]);
        grid.transpose();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.read(cell("B1")), &Value::from(4));
        assert_eq!(grid.read(cell("B3")), &Value::Empty);
    }

    #[test]
    fn test_from_mapping_flattens_nested_objects() {
        let json = serde_json::json!({ "A": { "B": 1, "C": 2 }, "D": 3 });
        let grid = Grid::from_mapping(&json).unwrap();
        assert_eq!(
            grid.to_rows(),
            vec![
                vec![Value::from("A"), Value::from("B"), Value::from(1)],
                vec![Value::from("A"), Value::from("C"), Value::from(2)],
                vec![Value::from("D"), Value::from(3)],
            ]
        );
    }

    #[test]
    fn test_from_mapping_rejects_scalars() {
        let err = Grid::from_mapping(&serde_json::json!(null)).unwrap_err();
        assert!(matches!(err, GridError::UnsupportedOperand(_)));
    }

    #[test]
    fn test_with_body_leaves_leading_rows() {
        let mut grid = seven_rows();
        grid.with_body(1, |mut body| {
            body.reverse();
            body
        });
        assert_eq!(grid.read(cell("A1")), &Value::from("r1"));
        assert_eq!(grid.read(cell("A2")), &Value::from("r7"));
    }
}
