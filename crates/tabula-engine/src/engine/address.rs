//! Address parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style addresses
//! (e.g., "A1", "B2", "AA100") and 1-based row/column coordinates.
//!
//! # Examples
//!
//! ```
//! use tabula_engine::engine::CellRef;
//!
//! let cell: CellRef = "B3".parse().unwrap();
//! assert_eq!(cell.col, 2); // 1-based
//! assert_eq!(cell.row, 3);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::error::{GridError, Result};

/// Largest column reachable with three letters ("ZZZ").
pub const MAX_COLUMN: usize = 18_278;

/// A reference to a cell by row and column indices (1-based).
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse an address such as "C12". Letters are case-insensitive.
    pub fn parse(text: &str) -> Result<CellRef> {
        let caps = address_re()
            .captures(text)
            .ok_or_else(|| GridError::InvalidAddress(text.to_string()))?;

        let col = column_to_index(&caps["letters"])?;
        let row = caps["numbers"]
            .parse::<usize>()
            .ok()
            .filter(|row| *row >= 1)
            .ok_or_else(|| GridError::InvalidAddress(text.to_string()))?;

        Ok(CellRef::new(row, col))
    }

    /// Column letters of this reference ("AA" for column 27).
    pub fn column_letters(&self) -> String {
        letters_unchecked(self.col)
    }

    /// Shift by the given deltas; fails if the result leaves the sheet.
    pub fn offset(&self, d_row: isize, d_col: isize) -> Result<CellRef> {
        let row = self.row.checked_add_signed(d_row).filter(|r| *r >= 1);
        let col = self.col.checked_add_signed(d_col).filter(|c| *c >= 1);
        match (row, col) {
            (Some(row), Some(col)) => Ok(CellRef::new(row, col)),
            _ => Err(GridError::InvalidAddress(format!(
                "{} offset by ({}, {})",
                self, d_row, d_col
            ))),
        }
    }
}

impl std::str::FromStr for CellRef {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        CellRef::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", letters_unchecked(self.col), self.row)
    }
}

fn address_re() -> &'static Regex {
    static ADDRESS_RE: OnceLock<Regex> = OnceLock::new();
    ADDRESS_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]{1,3})(?<numbers>[0-9]+)$")
            .expect("address regex must compile")
    })
}

/// Convert column letters to a 1-based index (A -> 1, Z -> 26, AA -> 27).
///
/// Accepts one to three ASCII letters in either case.
pub fn column_to_index(letters: &str) -> Result<usize> {
    if letters.is_empty() || letters.len() > 3 || !letters.bytes().all(|b| b.is_ascii_alphabetic())
    {
        return Err(GridError::InvalidAddress(format!(
            "Invalid column reference: {}",
            letters
        )));
    }

    let index = letters
        .to_ascii_uppercase()
        .bytes()
        .fold(0usize, |acc, c| acc * 26 + (c - b'A') as usize + 1);
    Ok(index)
}

/// Convert a 1-based column index to letters (1 -> A, 26 -> Z, 27 -> AA).
pub fn index_to_column(index: usize) -> Result<String> {
    if index < 1 {
        return Err(GridError::InvalidAddress(
            "Indexing is 1-based".to_string(),
        ));
    }
    Ok(letters_unchecked(index))
}

fn letters_unchecked(index: usize) -> String {
    let mut result = String::new();
    let mut n = index as u128;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Parse an address into its 1-based (row, column) pair.
pub fn parse_address(text: &str) -> Result<(usize, usize)> {
    let cell = CellRef::parse(text)?;
    Ok((cell.row, cell.col))
}

/// Format a 1-based (row, column) pair as an address.
pub fn format_address(row: usize, col: usize) -> Result<String> {
    if row < 1 || col < 1 {
        return Err(GridError::InvalidAddress(format!(
            "row {} / column {} (indexing is 1-based)",
            row, col
        )));
    }
    Ok(CellRef::new(row, col).to_string())
}

/// Offset an address by whole rows and columns ("A1" + (1, 1) -> "B2").
pub fn offset(address: &str, d_row: isize, d_col: isize) -> Result<String> {
    Ok(CellRef::parse(address)?.offset(d_row, d_col)?.to_string())
}

/// Join two endpoints into range text. A missing second endpoint yields the
/// first unchanged.
pub fn to_range_text(first: &str, last: Option<&str>) -> String {
    match last {
        Some(last) => format!("{}:{}", first, last),
        None => first.to_string(),
    }
}

/// Advance column letters so that a slice of `len` cells starting at
/// `letters` ends on the returned column ("B", 3 -> "D").
pub fn step_column(letters: &str, len: usize) -> Result<String> {
    let start = column_to_index(letters)?;
    index_to_column(start + len.max(1) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_column_to_index_bounds() {
        assert_eq!(column_to_index("A").unwrap(), 1);
        assert_eq!(column_to_index("z").unwrap(), 26);
        assert_eq!(column_to_index("Aa").unwrap(), 27);
        assert_eq!(column_to_index("ZZZ").unwrap(), MAX_COLUMN);
    }

    #[test]
    fn test_column_to_index_rejects_bad_letters() {
        for bad in ["", "ABCD", "A1", "1", "A-", "Ä", " A"] {
            assert!(
                matches!(column_to_index(bad), Err(GridError::InvalidAddress(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_index_to_column_rejects_zero() {
        assert!(matches!(index_to_column(0), Err(GridError::InvalidAddress(_))));
        assert_eq!(index_to_column(52).unwrap(), "AZ");
        assert_eq!(index_to_column(53).unwrap(), "BA");
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("A1").unwrap(), (1, 1));
        assert_eq!(parse_address("c12").unwrap(), (12, 3));
        assert_eq!(parse_address("AA7").unwrap(), (7, 27));
        assert!(parse_address("A0").is_err());
        assert!(parse_address("1A").is_err());
        assert!(parse_address("ABCD1").is_err());
        assert!(parse_address("A 1").is_err());
        assert!(parse_address(" A1 ").is_err());
    }

    #[test]
    fn test_parse_address_row_overflow_is_invalid() {
        let huge = format!("A{}", "9".repeat(40));
        assert!(matches!(parse_address(&huge), Err(GridError::InvalidAddress(_))));
    }

    #[test]
    fn test_format_address() {
        assert_eq!(format_address(1, 1).unwrap(), "A1");
        assert_eq!(format_address(7, 27).unwrap(), "AA7");
        assert!(format_address(0, 1).is_err());
        assert!(format_address(1, 0).is_err());
    }

    #[test]
    fn test_offset() {
        assert_eq!(offset("A1", 1, 1).unwrap(), "B2");
        assert_eq!(offset("C3", -2, -2).unwrap(), "A1");
        assert!(offset("A1", -1, 0).is_err());
        assert!(offset("A1", 0, -1).is_err());
    }

    #[test]
    fn test_step_column_and_range_text() {
        assert_eq!(step_column("B", 3).unwrap(), "D");
        assert_eq!(step_column("Z", 2).unwrap(), "AA");
        assert_eq!(to_range_text("A1", Some("B2")), "A1:B2");
        assert_eq!(to_range_text("A1", None), "A1");
    }

    proptest! {
        #[test]
        fn prop_index_round_trip(i in 1usize..=MAX_COLUMN) {
            let letters = index_to_column(i).unwrap();
            prop_assert_eq!(column_to_index(&letters).unwrap(), i);
        }

        #[test]
        fn prop_letters_round_trip(letters in "[A-Za-z]{1,3}") {
            let index = column_to_index(&letters).unwrap();
            prop_assert_eq!(index_to_column(index).unwrap(), letters.to_ascii_uppercase());
        }

        #[test]
        fn prop_address_round_trip(row in 1usize..100_000, col in 1usize..=MAX_COLUMN) {
            let text = format_address(row, col).unwrap();
            prop_assert_eq!(parse_address(&text).unwrap(), (row, col));
        }
    }
}
