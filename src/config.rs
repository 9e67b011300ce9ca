//! `config.toml` loading.
//!
//! A missing, oversized or malformed file never stops the program: each
//! problem becomes a warning and the built-in defaults are used instead.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tabula_core::storage::Format;
use tabula_core::table::DEFAULT_HEADER_ROWS;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    table: Option<TableSection>,
    output: Option<OutputSection>,
    csv: Option<CsvSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableSection {
    header_rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputSection {
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CsvSection {
    delimiter: Option<String>,
}

/// Settings after the file has been applied over the defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub header_rows: usize,
    pub format: Format,
    pub delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_rows: DEFAULT_HEADER_ROWS,
            format: Format::Csv,
            delimiter: ',',
        }
    }
}

/// Load `explicit`, or the user config file when no path is given.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let path = explicit.map(Path::to_path_buf).or_else(user_config_path);

    let Some(path) = path else {
        return (Config::default(), warnings);
    };
    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let file = match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<ConfigFile>(&content) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                    None
                }
            },
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            None
        }
    };

    let config = apply(file.unwrap_or_default(), &mut warnings);
    (config, warnings)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "tabula")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

fn apply(file: ConfigFile, warnings: &mut Vec<String>) -> Config {
    let mut config = Config::default();

    if let Some(rows) = file.table.and_then(|t| t.header_rows) {
        config.header_rows = rows;
    }

    if let Some(format) = file.output.and_then(|o| o.format) {
        match format.parse::<Format>() {
            Ok(format) => config.format = format,
            Err(err) => warnings.push(format!("Ignoring [output] format: {}", err)),
        }
    }

    if let Some(delimiter) = file.csv.and_then(|c| c.delimiter) {
        match parse_delimiter(&delimiter) {
            Some(c) => config.delimiter = c,
            None => warnings.push(format!(
                "Ignoring [csv] delimiter '{}': expected a single character",
                delimiter
            )),
        }
    }

    config
}

/// A delimiter is one character; `\t` and `tab` both mean a tab.
pub fn parse_delimiter(raw: &str) -> Option<char> {
    match raw {
        "\\t" | "tab" => return Some('\t'),
        _ => {}
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '"' && c != '\n' && c != '\r' => Some(c),
        _ => None,
    }
}
