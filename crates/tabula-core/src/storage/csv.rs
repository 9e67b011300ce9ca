//! CSV import/export functionality

use crate::error::{Result, TabulaError};
use std::io::Write;
use std::path::Path;
use tabula_engine::engine::{Grid, Value};
use tracing::debug;

/// Read a delimited file into a grid.
pub fn read_csv(path: &Path, delimiter: char) -> Result<Grid> {
    let content = std::fs::read_to_string(path)?;
    let grid = parse_csv(&content, delimiter)?;
    debug!(path = %path.display(), rows = grid.rows(), "read csv");
    Ok(grid)
}

/// Parse delimited text into a grid, one row per record. Quoted fields may
/// span lines. Blank lines become empty rows.
pub fn parse_csv(content: &str, delimiter: char) -> Result<Grid> {
    let records = parse_records(content, delimiter)
        .map_err(|(line, message)| TabulaError::Parse { line, message })?;
    let rows = records
        .into_iter()
        .map(|fields| {
            if fields.len() == 1 && fields[0].text.is_empty() && !fields[0].quoted {
                return Vec::new();
            }
            fields
                .iter()
                .map(|f| parse_csv_field(&f.text, f.quoted))
                .collect()
        })
        .collect();
    Ok(Grid::from_rows(rows))
}

#[derive(Debug, PartialEq)]
pub(crate) struct Field {
    pub(crate) text: String,
    pub(crate) quoted: bool,
}

/// Split the whole buffer into records of fields. Errors carry the 1-based
/// line on which the failing record starts.
pub(crate) fn parse_records(
    content: &str,
    delimiter: char,
) -> std::result::Result<Vec<Vec<Field>>, (usize, String)> {
    let mut records = Vec::new();
    let mut record: Vec<Field> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                if c == '\n' {
                    line += 1;
                }
                current.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
            field_was_quoted = true;
        } else if c == delimiter {
            record.push(finish_field(&mut current, &mut field_was_quoted));
        } else if c == '\n' || c == '\r' {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            record.push(finish_field(&mut current, &mut field_was_quoted));
            records.push(std::mem::take(&mut record));
            line += 1;
            record_line = line;
        } else {
            current.push(c);
        }
    }

    if in_quotes {
        return Err((record_line, "unterminated quoted field".to_string()));
    }
    if !record.is_empty() || !current.is_empty() || field_was_quoted {
        record.push(finish_field(&mut current, &mut field_was_quoted));
        records.push(record);
    }
    Ok(records)
}

fn finish_field(current: &mut String, quoted: &mut bool) -> Field {
    let text = std::mem::take(current);
    let quoted = std::mem::take(quoted);
    let text = if quoted { text } else { text.trim().to_string() };
    Field { text, quoted }
}

/// Parse a CSV field into a value
/// - Empty string -> Empty
/// - Quoted field -> Text, kept as is
/// - Leading zeros like "007" -> Text
/// - Valid number -> Number
/// - `true` / `false` -> Bool
/// - Otherwise -> Text
pub(crate) fn parse_csv_field(field: &str, quoted: bool) -> Value {
    if field.is_empty() {
        return Value::Empty;
    }
    if quoted {
        return Value::Text(field.to_string());
    }

    if field.starts_with('0')
        && field.len() > 1
        && !field.starts_with("0.")
        && field.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
    {
        return Value::Text(field.to_string());
    }

    if let Ok(n) = field.parse::<f64>() {
        if n.is_finite() {
            return Value::Number(n);
        }
    }

    match field {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Text(field.to_string()),
    }
}

/// Render rows as delimited text, one line per row.
pub fn to_csv(grid: &Grid, delimiter: char) -> String {
    let mut out = String::new();
    for row in grid.iter_rows() {
        let fields: Vec<String> = (0..grid.columns())
            .map(|c| csv_field(row.get(c).unwrap_or(&Value::Empty), delimiter))
            .collect();
        out.push_str(&fields.join(&delimiter.to_string()));
        out.push('\n');
    }
    out
}

/// Write rows as delimited text.
pub fn write_csv(path: &Path, grid: &Grid, delimiter: char) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(to_csv(grid, delimiter).as_bytes())?;
    Ok(())
}

/// Text that would read back as another kind ("42", "true") is quoted.
fn csv_field(value: &Value, delimiter: char) -> String {
    let text = value.to_string();
    let retypes = matches!(value, Value::Text(_))
        && !text.is_empty()
        && parse_csv_field(&text, false) != *value;
    escape_csv_field(&text, delimiter, retypes)
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str, delimiter: char, force_quotes: bool) -> String {
    if force_quotes
        || field.contains(delimiter)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
        || field != field.trim()
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
