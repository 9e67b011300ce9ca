//! HTML table export.

use crate::table::Table;

/// Render the table as an HTML `<table>` captioned with its name. Header
/// rows use `<th>` cells.
pub fn to_html(table: &Table) -> String {
    let mut out = String::from("<table border=1>\n");
    out.push_str(&format!("<caption>{}</caption>\n", escape_html(table.name())));
    for (idx, row) in table.grid().iter_rows().enumerate() {
        let tag = if idx < table.header_rows() { "th" } else { "td" };
        out.push_str("<tr>");
        for value in row {
            out.push_str(&format!("<{tag}>{}</{tag}>", escape_html(&value.to_string())));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>");
    out
}

/// Escape the characters HTML treats specially.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_html() {
        let table = Table::from_rows(vec![vec!["Part", "Note"], vec!["Type1", "a<b & c"]], 1)
            .with_name("Parts");
        assert_eq!(
            to_html(&table),
            "<table border=1>\n<caption>Parts</caption>\n\
             <tr><th>Part</th><th>Note</th></tr>\n\
             <tr><td>Type1</td><td>a&lt;b &amp; c</td></tr>\n\
             </table>"
        );
    }
}
