//! Markdown export functionality

use tabula_engine::engine::{Value, index_to_column};

use crate::table::Table;

/// Render the table as a Markdown table.
///
/// The first header row becomes the Markdown header. Without header rows
/// the column letters are used instead, and every row goes in the body.
pub fn to_markdown(table: &Table) -> String {
    let grid = table.grid();
    let cols = grid.columns();
    if cols == 0 {
        return "*Empty table*\n".to_string();
    }

    let (header, skip): (Vec<String>, usize) = if table.header_rows() > 0 {
        let first = grid.row(1);
        let labels = (0..cols)
            .map(|c| first.get(c).map(Value::to_string).unwrap_or_default())
            .collect();
        (labels, 1)
    } else {
        let letters = (1..=cols)
            .map(|c| index_to_column(c).unwrap_or_default())
            .collect();
        (letters, 0)
    };

    let mut out = String::new();
    write_row(&mut out, header.iter().map(String::as_str));
    out.push('|');
    for _ in 0..cols {
        out.push_str("---|");
    }
    out.push('\n');

    for row in grid.iter_rows().skip(skip) {
        let cells: Vec<String> = (0..cols)
            .map(|c| row.get(c).map(Value::to_string).unwrap_or_default())
            .collect();
        write_row(&mut out, cells.iter().map(String::as_str));
    }
    out
}

fn write_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(&escape_markdown(cell));
        out.push_str(" |");
    }
    out.push('\n');
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_uses_first_header_row() {
        let table = Table::from_rows(vec![vec!["Part", "Qty"], vec!["a|b", "1"]], 1);
        assert_eq!(
            to_markdown(&table),
            "| Part | Qty |\n|---|---|\n| a\\|b | 1 |\n"
        );
    }

    #[test]
    fn test_markdown_without_headers_uses_letters() {
        let table = Table::from_rows(vec![vec!["x", "y"]], 0);
        assert_eq!(to_markdown(&table), "| A | B |\n|---|---|\n| x | y |\n");
    }

    #[test]
    fn test_markdown_empty() {
        assert_eq!(to_markdown(&Table::new("t")), "*Empty table*\n");
    }
}
