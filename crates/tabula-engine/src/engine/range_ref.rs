//! Range reference parsing.
//!
//! A range reference is one of:
//! - a single address: `B3`
//! - a rectangle: `A1:C5` (corners in either order)
//! - a column band: `A:C`
//! - a row band: `2:4`
//!
//! Parsing never looks at a grid. Bands are only turned into concrete
//! [`Bounds`] by [`RangeRef::resolve`], which reads the grid's current extent,
//! so a reference stays valid across structural edits.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::address::{CellRef, column_to_index};
use super::error::{GridError, Result};
use super::grid::Grid;

/// A parsed, not yet resolved, range reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RangeRef {
    Cell(CellRef),
    Rect { start: CellRef, end: CellRef },
    Columns { lo: usize, hi: usize },
    Rows { lo: usize, hi: usize },
}

/// Resolved inclusive 1-based bounds. `row_lo <= row_hi`, `col_lo <= col_hi`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub row_lo: usize,
    pub row_hi: usize,
    pub col_lo: usize,
    pub col_hi: usize,
}

impl Bounds {
    /// Build bounds from two corners in any order.
    pub fn from_corners(a: CellRef, b: CellRef) -> Bounds {
        Bounds {
            row_lo: a.row.min(b.row),
            row_hi: a.row.max(b.row),
            col_lo: a.col.min(b.col),
            col_hi: a.col.max(b.col),
        }
    }

    pub fn single(cell: CellRef) -> Bounds {
        Bounds::from_corners(cell, cell)
    }

    pub fn row_count(&self) -> usize {
        self.row_hi - self.row_lo + 1
    }

    pub fn col_count(&self) -> usize {
        self.col_hi - self.col_lo + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.row_lo == self.row_hi && self.col_lo == self.col_hi
    }

    pub fn top_left(&self) -> CellRef {
        CellRef::new(self.row_lo, self.col_lo)
    }

    pub fn bottom_right(&self) -> CellRef {
        CellRef::new(self.row_hi, self.col_hi)
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        (self.row_lo..=self.row_hi).contains(&cell.row)
            && (self.col_lo..=self.col_hi).contains(&cell.col)
    }

    /// Row-major matrix of the covered cells.
    pub fn cells(&self) -> Vec<Vec<CellRef>> {
        (self.row_lo..=self.row_hi)
            .map(|row| {
                (self.col_lo..=self.col_hi)
                    .map(|col| CellRef::new(row, col))
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.top_left())
        } else {
            write!(f, "{}:{}", self.top_left(), self.bottom_right())
        }
    }
}

impl RangeRef {
    /// Parse range text. Corner order is irrelevant.
    pub fn parse(text: &str) -> Result<RangeRef> {
        if !text.contains(':') {
            return Ok(RangeRef::Cell(CellRef::parse(text)?));
        }

        if let Some(caps) = row_band_re().captures(text) {
            let lo = parse_row_number(&caps[1], text)?;
            let hi = parse_row_number(&caps[2], text)?;
            return Ok(RangeRef::Rows {
                lo: lo.min(hi),
                hi: lo.max(hi),
            });
        }

        if let Some(caps) = column_band_re().captures(text) {
            let lo = column_to_index(&caps[1])?;
            let hi = column_to_index(&caps[2])?;
            return Ok(RangeRef::Columns {
                lo: lo.min(hi),
                hi: lo.max(hi),
            });
        }

        if let Some((first, last)) = text.split_once(':') {
            let (Ok(start), Ok(end)) = (CellRef::parse(first), CellRef::parse(last)) else {
                return Err(GridError::InvalidAddress(text.to_string()));
            };
            let bounds = Bounds::from_corners(start, end);
            return Ok(RangeRef::Rect {
                start: bounds.top_left(),
                end: bounds.bottom_right(),
            });
        }

        Err(GridError::InvalidAddress(text.to_string()))
    }

    /// True for the row-band and column-band forms.
    pub fn is_band(&self) -> bool {
        matches!(self, RangeRef::Rows { .. } | RangeRef::Columns { .. })
    }

    /// Resolve against the grid's current extent. A band over an empty axis
    /// still covers index 1 so it stays addressable.
    pub fn resolve(&self, grid: &Grid) -> Bounds {
        match *self {
            RangeRef::Cell(cell) => Bounds::single(cell),
            RangeRef::Rect { start, end } => Bounds::from_corners(start, end),
            RangeRef::Columns { lo, hi } => Bounds {
                row_lo: 1,
                row_hi: grid.rows().max(1),
                col_lo: lo,
                col_hi: hi,
            },
            RangeRef::Rows { lo, hi } => Bounds {
                row_lo: lo,
                row_hi: hi,
                col_lo: 1,
                col_hi: grid.columns().max(1),
            },
        }
    }
}

impl std::str::FromStr for RangeRef {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        RangeRef::parse(s)
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeRef::Cell(cell) => write!(f, "{}", cell),
            RangeRef::Rect { start, end } => write!(f, "{}:{}", start, end),
            RangeRef::Columns { lo, hi } => write!(
                f,
                "{}:{}",
                CellRef::new(1, *lo).column_letters(),
                CellRef::new(1, *hi).column_letters()
            ),
            RangeRef::Rows { lo, hi } => write!(f, "{}:{}", lo, hi),
        }
    }
}

/// Parse range text and resolve it against `grid` in one step, returning
/// `(row_lo, row_hi, col_lo, col_hi)`.
pub fn parse_range(text: &str, grid: &Grid) -> Result<(usize, usize, usize, usize)> {
    let b = RangeRef::parse(text)?.resolve(grid);
    Ok((b.row_lo, b.row_hi, b.col_lo, b.col_hi))
}

fn parse_row_number(digits: &str, text: &str) -> Result<usize> {
    digits
        .parse::<usize>()
        .ok()
        .filter(|row| *row >= 1)
        .ok_or_else(|| GridError::InvalidAddress(text.to_string()))
}

fn row_band_re() -> &'static Regex {
    static ROW_BAND_RE: OnceLock<Regex> = OnceLock::new();
    ROW_BAND_RE.get_or_init(|| Regex::new(r"^([0-9]+):([0-9]+)$").expect("row band regex must compile"))
}

fn column_band_re() -> &'static Regex {
    static COLUMN_BAND_RE: OnceLock<Regex> = OnceLock::new();
    COLUMN_BAND_RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]{1,3}):([A-Za-z]{1,3})$").expect("column band regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Value;

    fn sample_grid() -> Grid {
        Grid::from_rows(vec![
            vec![Value::from("a"), Value::from("b"), Value::from("c")],
            vec![Value::from(1), Value::from(2)],
        ])
    }

    #[test]
    fn test_corner_order_is_irrelevant() {
        let grid = Grid::new();
        assert_eq!(parse_range("B2:A1", &grid).unwrap(), (1, 2, 1, 2));
        assert_eq!(parse_range("A1:B2", &grid).unwrap(), (1, 2, 1, 2));
        assert_eq!(parse_range("A2:B1", &grid).unwrap(), (1, 2, 1, 2));
    }

    #[test]
    fn test_bands_resolve_against_current_extent() {
        let mut grid = sample_grid();
        let cols = RangeRef::parse("B:A").unwrap();
        let rows = RangeRef::parse("2:2").unwrap();
        assert_eq!(cols, RangeRef::Columns { lo: 1, hi: 2 });

        assert_eq!(cols.resolve(&grid).row_hi, 2);
        assert_eq!(rows.resolve(&grid).col_hi, 3);

        grid.write(CellRef::new(5, 4), Value::from("x"));
        assert_eq!(cols.resolve(&grid).row_hi, 5);
        assert_eq!(rows.resolve(&grid).col_hi, 4);
    }

    #[test]
    fn test_single_cell() {
        let grid = Grid::new();
        assert_eq!(RangeRef::parse("c3").unwrap(), RangeRef::Cell(CellRef::new(3, 3)));
        assert_eq!(parse_range("C3", &grid).unwrap(), (3, 3, 3, 3));
    }

    #[test]
    fn test_invalid_ranges() {
        for bad in [
            "", "A1:", ":B2", "A1:B2:C3", "0:3", "A1:3", "ABCD:A", "1A:B2", " A1", "A1 :B2",
            "A: C",
        ] {
            assert!(
                matches!(RangeRef::parse(bad), Err(GridError::InvalidAddress(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["A1", "A1:C5", "A:C", "2:4"] {
            assert_eq!(RangeRef::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_bounds_cells() {
        let b = Bounds::from_corners(CellRef::new(2, 2), CellRef::new(1, 1));
        assert_eq!(b.to_string(), "A1:B2");
        assert_eq!(b.row_count(), 2);
        assert_eq!(b.col_count(), 2);
        assert!(b.contains(&CellRef::new(2, 1)));
        assert!(!b.contains(&CellRef::new(3, 1)));
    }
}
