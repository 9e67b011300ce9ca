//! Command-line arguments and the transform pipeline they describe.

use std::path::PathBuf;

use tabula_core::storage::Format;
use tabula_core::{Condition, Result, Table};

use crate::config::{Config, parse_delimiter};

pub fn print_usage() {
    eprintln!("Usage: tabula [OPTIONS] <FILE>");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <FILE>                    Table to load (.csv, .tsv or .json)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --headers <N>             Number of header rows (default: 1)");
    eprintln!("  --filter <HEADER=REGEX>   Keep rows whose HEADER cell matches REGEX");
    eprintln!("  --where <H OP CRIT>...    Keep rows passing every condition triple");
    eprintln!("  --unique <HEADER>         Drop rows repeating an earlier HEADER value");
    eprintln!("  --sort <H[,H..]>          Sort rows by the given columns");
    eprintln!("  --columns <H[,H..]>       Keep and reorder columns by header");
    eprintln!("  --reverse                 Reverse the data rows");
    eprintln!("  --compact                 Drop blank rows and columns");
    eprintln!("  --format <FMT>            csv, tsv, md, html or text (default: csv)");
    eprintln!("  --delimiter <CHAR>        Field delimiter for CSV input and output");
    eprintln!("  --config <PATH>           Read settings from PATH");
    eprintln!("  -h, --help                Print help");
}

/// One transform, applied in command-line order.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Filter { header: String, pattern: String },
    Where(Vec<String>),
    Unique(String),
    Sort(Vec<String>),
    Columns(Vec<String>),
    Reverse,
    Compact,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    pub file: PathBuf,
    pub header_rows: Option<usize>,
    pub format: Option<Format>,
    pub delimiter: Option<char>,
    pub config: Option<PathBuf>,
    pub steps: Vec<Step>,
}

#[derive(Debug, PartialEq)]
pub enum Parsed {
    Run(Options),
    Help,
}

/// Parse everything after the program name.
pub fn parse_args(args: &[String]) -> std::result::Result<Parsed, String> {
    let mut options = Options::default();
    let mut file: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(Parsed::Help),
            "--headers" => {
                let raw = value(args, &mut i, "--headers")?;
                let n = raw
                    .parse::<usize>()
                    .map_err(|_| format!("--headers expects a number, got '{}'", raw))?;
                options.header_rows = Some(n);
            }
            "--filter" => {
                let raw = value(args, &mut i, "--filter")?;
                let (header, pattern) = raw
                    .split_once('=')
                    .ok_or_else(|| format!("--filter expects HEADER=REGEX, got '{}'", raw))?;
                options.steps.push(Step::Filter {
                    header: header.to_string(),
                    pattern: pattern.to_string(),
                });
            }
            "--where" => {
                let mut triples = Vec::new();
                while let Some(next) = condition_triple(args, i + 1) {
                    triples.extend_from_slice(next);
                    i += 3;
                }
                if triples.is_empty() {
                    return Err("--where requires HEADER OP CRITERION".to_string());
                }
                options.steps.push(Step::Where(triples));
            }
            "--unique" => {
                let header = value(args, &mut i, "--unique")?;
                options.steps.push(Step::Unique(header.to_string()));
            }
            "--sort" => {
                let list = value(args, &mut i, "--sort")?;
                options.steps.push(Step::Sort(split_list(list)));
            }
            "--columns" => {
                let list = value(args, &mut i, "--columns")?;
                options.steps.push(Step::Columns(split_list(list)));
            }
            "--reverse" => options.steps.push(Step::Reverse),
            "--compact" => options.steps.push(Step::Compact),
            "--format" => {
                let raw = value(args, &mut i, "--format")?;
                options.format = Some(raw.parse::<Format>().map_err(|e| e.to_string())?);
            }
            "--delimiter" => {
                let raw = value(args, &mut i, "--delimiter")?;
                options.delimiter = Some(
                    parse_delimiter(raw)
                        .ok_or_else(|| format!("--delimiter expects one character, got '{}'", raw))?,
                );
            }
            "--config" => {
                options.config = Some(PathBuf::from(value(args, &mut i, "--config")?));
            }
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                if file.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                file = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    options.file = file.ok_or_else(|| "missing input file".to_string())?;
    Ok(Parsed::Run(options))
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> std::result::Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

/// Three arguments starting at `start`, none of them a `--flag`. A lone
/// trailing argument (the input file) is never taken as a criterion.
fn condition_triple(args: &[String], start: usize) -> Option<&[String]> {
    let triple = args.get(start..start + 3)?;
    (!triple.iter().any(|a| a.starts_with("--"))).then_some(triple)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Options {
    /// Command-line values win over the config file.
    pub fn resolve(&self, config: &Config) -> Config {
        Config {
            header_rows: self.header_rows.unwrap_or(config.header_rows),
            format: self.format.unwrap_or(config.format),
            delimiter: self.delimiter.unwrap_or(config.delimiter),
        }
    }
}

/// Run every step against `table`, in order.
pub fn apply_steps(table: &mut Table, steps: &[Step]) -> Result<()> {
    for step in steps {
        match step {
            Step::Filter { header, pattern } => {
                let condition = Condition::matching(header.as_str(), pattern)?;
                table.advanced_filter_in_place(&[condition])?;
            }
            Step::Where(args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                table.advanced_filter_args_in_place(&args)?;
            }
            Step::Unique(header) => table.unique_in_place(header)?,
            Step::Sort(headers) => table.sort_by_headers_in_place(&as_strs(headers))?,
            Step::Columns(headers) => table.select_columns_in_place(&as_strs(headers))?,
            Step::Reverse => table.reverse_rows_in_place(),
            Step::Compact => table.compact_in_place(),
        }
    }
    Ok(())
}

fn as_strs(items: &[String]) -> Vec<&str> {
    items.iter().map(String::as_str).collect()
}
