//! Loading and rendering tables.

pub mod csv;
pub mod html;
pub mod md;
pub mod text;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tabula_engine::engine::GridError;
use tracing::debug;

use crate::error::Result;
use crate::table::Table;

pub use csv::{parse_csv, read_csv, to_csv, write_csv};
pub use html::to_html;
pub use md::to_markdown;
pub use text::{to_text, to_tsv};

/// Output formats understood by [`render`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Csv,
    Tsv,
    Markdown,
    Html,
    Text,
}

impl FromStr for Format {
    type Err = GridError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "tsv" => Ok(Format::Tsv),
            "md" | "markdown" => Ok(Format::Markdown),
            "html" => Ok(Format::Html),
            "text" | "txt" => Ok(Format::Text),
            other => Err(GridError::InvalidArguments(format!(
                "unknown format: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Csv => "csv",
            Format::Tsv => "tsv",
            Format::Markdown => "md",
            Format::Html => "html",
            Format::Text => "text",
        })
    }
}

/// Render `table` in `format`. `delimiter` only applies to CSV.
pub fn render(table: &Table, format: Format, delimiter: char) -> String {
    match format {
        Format::Csv => to_csv(table.grid(), delimiter),
        Format::Tsv => to_tsv(table.grid()),
        Format::Markdown => to_markdown(table),
        Format::Html => to_html(table),
        Format::Text => to_text(table.grid()),
    }
}

/// Load a table from a `.json` file (rows or nested object) or from
/// delimited text (any other extension; `.tsv` always splits on tabs).
pub fn load_table(path: &Path, delimiter: char, header_rows: usize) -> Result<Table> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let table = match extension.as_str() {
        "json" => {
            let content = std::fs::read_to_string(path)?;
            let json: serde_json::Value = serde_json::from_str(&content)?;
            Table::from_mapping(&json, header_rows)?
        }
        "tsv" => Table::from_grid(read_csv(path, '\t')?, header_rows),
        _ => Table::from_grid(read_csv(path, delimiter)?, header_rows),
    };
    debug!(path = %path.display(), rows = table.rows(), "loaded table");
    Ok(table.with_name(name))
}
