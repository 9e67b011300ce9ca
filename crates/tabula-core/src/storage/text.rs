//! Plain-text and TSV rendering.

use tabula_engine::engine::{Grid, Value};

use super::csv::to_csv;

/// Tab-separated text with CSV-style quoting.
pub fn to_tsv(grid: &Grid) -> String {
    to_csv(grid, '\t')
}

/// Tab-separated text for reading. Tabs and line breaks inside values
/// become spaces, so every row stays on one line.
pub fn to_text(grid: &Grid) -> String {
    grid.iter_rows()
        .map(|row| {
            row.iter()
                .map(clean)
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean(value: &Value) -> String {
    value.to_string().replace(['\t', '\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_text_flattens_whitespace() {
        let grid = Grid::from_rows(vec![vec!["a\tb", "c\nd"], vec!["e", ""]]);
        assert_eq!(to_text(&grid), "a b\tc d\ne\t");
    }

    #[test]
    fn test_to_tsv_quotes() {
        let grid = Grid::from_rows(vec![vec![Value::from("a\tb"), Value::from(1)]]);
        assert_eq!(to_tsv(&grid), "\"a\tb\"\t1\n");
    }
}
