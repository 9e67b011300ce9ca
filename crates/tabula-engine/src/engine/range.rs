//! Range selection with bulk read and write.
//!
//! A [`Range`] is a small handle around a parsed [`RangeRef`]. It never
//! stores grid bounds: every call takes the grid and resolves against its
//! current extent, so a handle kept across an insert or delete still sees
//! the right rows and columns.

use tracing::trace;

use super::address::CellRef;
use super::error::{GridError, Result};
use super::grid::Grid;
use super::range_ref::{Bounds, RangeRef};
use super::value::Value;

/// Data read from, or written to, a range.
#[derive(Clone, Debug, PartialEq)]
pub enum RangeValue {
    /// One value; read from a single cell, broadcast when written.
    Scalar(Value),
    /// A flat sequence, assigned positionally in expansion order.
    Row(Vec<Value>),
    /// A 2-D array whose shape must match the range exactly.
    Grid(Vec<Vec<Value>>),
}

impl RangeValue {
    /// Flatten into a row-major list.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            RangeValue::Scalar(v) => vec![v],
            RangeValue::Row(values) => values,
            RangeValue::Grid(rows) => rows.into_iter().flatten().collect(),
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            RangeValue::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for RangeValue {
    fn from(v: Value) -> Self {
        RangeValue::Scalar(v)
    }
}

impl From<&str> for RangeValue {
    fn from(s: &str) -> Self {
        RangeValue::Scalar(Value::from(s))
    }
}

impl From<String> for RangeValue {
    fn from(s: String) -> Self {
        RangeValue::Scalar(Value::from(s))
    }
}

impl From<f64> for RangeValue {
    fn from(n: f64) -> Self {
        RangeValue::Scalar(Value::from(n))
    }
}

impl From<i32> for RangeValue {
    fn from(n: i32) -> Self {
        RangeValue::Scalar(Value::from(n))
    }
}

impl From<bool> for RangeValue {
    fn from(b: bool) -> Self {
        RangeValue::Scalar(Value::from(b))
    }
}

impl From<Vec<Value>> for RangeValue {
    fn from(values: Vec<Value>) -> Self {
        RangeValue::Row(values)
    }
}

impl From<Vec<Vec<Value>>> for RangeValue {
    fn from(rows: Vec<Vec<Value>>) -> Self {
        RangeValue::Grid(rows)
    }
}

/// A rectangle, row band, column band or single cell of a grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    reference: RangeRef,
}

impl Range {
    /// Parse any range text accepted by [`RangeRef::parse`].
    pub fn parse(text: &str) -> Result<Range> {
        Ok(Range {
            reference: RangeRef::parse(text)?,
        })
    }

    /// The rectangle spanned by two cells, in either order.
    pub fn between(first: CellRef, last: CellRef) -> Range {
        let bounds = Bounds::from_corners(first, last);
        let reference = if bounds.is_single_cell() {
            RangeRef::Cell(first)
        } else {
            RangeRef::Rect {
                start: bounds.top_left(),
                end: bounds.bottom_right(),
            }
        };
        Range { reference }
    }

    pub fn reference(&self) -> RangeRef {
        self.reference
    }

    /// True when the reference names exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        matches!(self.reference, RangeRef::Cell(_))
    }

    /// Current bounds within `grid`.
    pub fn bounds(&self, grid: &Grid) -> Bounds {
        self.reference.resolve(grid)
    }

    /// Row-major matrix of the covered cells; 1x1 for a single cell.
    pub fn expand(&self, grid: &Grid) -> Vec<Vec<CellRef>> {
        self.bounds(grid).cells()
    }

    /// Like [`Range::expand`] but as address text.
    pub fn expand_text(&self, grid: &Grid) -> Vec<Vec<String>> {
        self.expand(grid)
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    /// Read the range: a scalar for a single cell, otherwise a 2-D array
    /// shaped like [`Range::expand`].
    pub fn read(&self, grid: &Grid) -> RangeValue {
        if let RangeRef::Cell(cell) = self.reference {
            return RangeValue::Scalar(grid.read(cell).clone());
        }
        RangeValue::Grid(
            self.expand(grid)
                .into_iter()
                .map(|row| row.into_iter().map(|cell| grid.read(cell).clone()).collect())
                .collect(),
        )
    }

    /// All values in expansion order.
    pub fn values(&self, grid: &Grid) -> Vec<Value> {
        self.expand(grid)
            .into_iter()
            .flatten()
            .map(|cell| grid.read(cell).clone())
            .collect()
    }

    /// Write to the range.
    ///
    /// - [`RangeValue::Grid`] must match the expanded shape row for row, or
    ///   the call fails with [`GridError::DimensionMismatch`] before any cell
    ///   is written.
    /// - [`RangeValue::Row`] is assigned by position in expansion order;
    ///   cells past the end of the sequence are cleared.
    /// - [`RangeValue::Scalar`] is written to every cell.
    pub fn write(&self, grid: &mut Grid, value: impl Into<RangeValue>) -> Result<()> {
        let value = value.into();

        if let (RangeRef::Cell(cell), RangeValue::Scalar(v)) = (self.reference, &value) {
            grid.write(cell, v.clone());
            return Ok(());
        }

        let cells = self.expand(grid);
        trace!(range = %self.reference, rows = cells.len(), "range write");
        match value {
            RangeValue::Grid(rows) => {
                check_shape(&rows, &cells)?;
                for (cell_row, value_row) in cells.iter().zip(rows) {
                    for (cell, v) in cell_row.iter().zip(value_row) {
                        grid.write(*cell, v);
                    }
                }
            }
            RangeValue::Row(values) => {
                let mut values = values.into_iter();
                for cell in cells.into_iter().flatten() {
                    grid.write(cell, values.next().unwrap_or_default());
                }
            }
            RangeValue::Scalar(v) => {
                for cell in cells.into_iter().flatten() {
                    grid.write(cell, v.clone());
                }
            }
        }
        Ok(())
    }

    /// First cell in expansion order.
    pub fn first_cell(&self, grid: &Grid) -> CellRef {
        self.bounds(grid).top_left()
    }

    /// Last cell in expansion order.
    pub fn last_cell(&self, grid: &Grid) -> CellRef {
        self.bounds(grid).bottom_right()
    }

    /// True when every covered value stringifies to "".
    pub fn is_empty(&self, grid: &Grid) -> bool {
        self.values(grid).iter().all(Value::is_blank)
    }

    /// Replace each value with `f(value)`.
    pub fn map_in_place<F>(&self, grid: &mut Grid, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        for cell in self.expand(grid).into_iter().flatten() {
            let next = f(grid.read(cell));
            grid.write(cell, next);
        }
    }

    /// Tab-separated text, one line per row.
    pub fn to_tsv(&self, grid: &Grid) -> String {
        self.expand(grid)
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| grid.read(*cell).to_string())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn check_shape(rows: &[Vec<Value>], cells: &[Vec<CellRef>]) -> Result<()> {
    let range_cols = cells.iter().map(Vec::len).max().unwrap_or(0);
    let value_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let matches = rows.len() == cells.len()
        && rows.iter().zip(cells).all(|(v, c)| v.len() == c.len());
    if matches {
        Ok(())
    } else {
        Err(GridError::DimensionMismatch {
            value_rows: rows.len(),
            value_cols,
            range_rows: cells.len(),
            range_cols,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_expand_is_row_major() {
        let grid = Grid::new();
        let range = Range::parse("B2:A1").unwrap();
        assert_eq!(
            range.expand_text(&grid),
            vec![vec!["A1", "B1"], vec!["A2", "B2"]]
        );
        assert_eq!(Range::parse("C3").unwrap().expand_text(&grid), vec![vec!["C3"]]);
    }

    #[test]
    fn test_read_single_cell_is_scalar() {
        let grid = Grid::from_rows(vec![vec!["a", "b"], vec!["c", "d"]]);
        assert_eq!(Range::parse("B2").unwrap().read(&grid), RangeValue::Scalar(v("d")));
        assert_eq!(
            Range::parse("A1:B2").unwrap().read(&grid),
            RangeValue::Grid(vec![vec![v("a"), v("b")], vec![v("c"), v("d")]])
        );
    }

    #[test]
    fn test_write_grid_checks_shape_before_writing() {
        let mut grid = Grid::new();
        let value = vec![vec![v("a"), v("b")], vec![v("c"), v("d")]];

        let err = Range::parse("A1").unwrap().write(&mut grid, value.clone()).unwrap_err();
        assert_eq!(
            err,
            GridError::DimensionMismatch {
                value_rows: 2,
                value_cols: 2,
                range_rows: 1,
                range_cols: 1
            }
        );

        let err = Range::parse("A1:C2").unwrap().write(&mut grid, value.clone());
        assert!(matches!(err, Err(GridError::DimensionMismatch { .. })));
        assert!(grid.is_empty());

        Range::parse("B2:C3").unwrap().write(&mut grid, value).unwrap();
        assert_eq!(grid.read(CellRef::new(3, 3)), &v("d"));
        assert_eq!(grid.rows(), 3);
    }

    #[test]
    fn test_write_jagged_grid_is_rejected() {
        let mut grid = Grid::new();
        let jagged = vec![vec![Value::from(1), Value::from(2)], vec![Value::from(3)]];

        let err = Range::parse("A1:B2").unwrap().write(&mut grid, jagged).unwrap_err();
        assert_eq!(
            err,
            GridError::DimensionMismatch {
                value_rows: 2,
                value_cols: 2,
                range_rows: 2,
                range_cols: 2
            }
        );
        assert!(grid.is_empty());
        assert_eq!(grid.read(CellRef::new(1, 1)), &Value::Empty);
    }

    #[test]
    fn test_write_scalar_broadcasts() {
        let mut grid = Grid::new();
        Range::parse("A1:B3").unwrap().write(&mut grid, 7).unwrap();
        assert_eq!(grid.rows(), 3);
        assert!(grid.iter_rows().all(|row| row == [Value::from(7), Value::from(7)]));
    }

    #[test]
    fn test_write_flat_sequence_positionally() {
        let mut grid = Grid::from_rows(vec![vec!["x", "x", "x"]]);
        Range::parse("1:1")
            .unwrap()
            .write(&mut grid, vec![v("a"), v("b")])
            .unwrap();
        assert_eq!(grid.row(1), [v("a"), v("b"), Value::Empty]);
    }

    #[test]
    fn test_column_band_follows_structural_edits() {
        let mut grid = Grid::from_rows(vec![vec!["a"], vec!["b"]]);
        let band = Range::parse("A:A").unwrap();
        assert_eq!(band.values(&grid).len(), 2);
        grid.insert_rows(1, 3).unwrap();
        assert_eq!(band.values(&grid).len(), 5);
        assert_eq!(band.last_cell(&grid), CellRef::new(5, 1));
    }

    #[test]
    fn test_map_in_place_and_tsv() {
        let mut grid = Grid::from_rows(vec![vec![1, 2], vec![3, 4]]);
        let range = Range::parse("A1:B2").unwrap();
        range.map_in_place(&mut grid, |value| {
            Value::from(value.as_number().unwrap_or_default() * 10.0)
        });
        assert_eq!(range.to_tsv(&grid), "10\t20\n30\t40");
        assert!(!range.is_empty(&grid));
        assert!(Range::parse("C1:D2").unwrap().is_empty(&grid));
    }
}
