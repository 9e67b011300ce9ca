//! Tabula - load a table, reshape it by header, print it.

mod cli;
mod config;

use std::env;

use anyhow::{Context, Result};
use tabula_core::storage::{load_table, render};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Options, Parsed};

fn init_logging() {
    let filter = EnvFilter::try_from_env("TABULA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(options: &Options) -> Result<()> {
    let (file_config, warnings) = config::load_config(options.config.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    let config = options.resolve(&file_config);

    let mut table = load_table(&options.file, config.delimiter, config.header_rows)
        .with_context(|| format!("failed to load {}", options.file.display()))?;
    debug!(steps = options.steps.len(), ?config, "applying steps");
    cli::apply_steps(&mut table, &options.steps)
        .with_context(|| format!("failed to transform {}", table.name()))?;

    print!("{}", render(&table, config.format, config.delimiter));
    Ok(())
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match cli::parse_args(&args) {
        Ok(Parsed::Run(options)) => options,
        Ok(Parsed::Help) => {
            cli::print_usage();
            return;
        }
        Err(message) => {
            eprintln!("Error: {}", message);
            cli::print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
