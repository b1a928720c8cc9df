//! Command-line interface for fanout
//!
//! Reads items from a file, stdin or a comma separated list, runs a command for each
//! item on a pool of workers, and prints one line per item as the commands finish.

use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use crate::config::CoordinatorConfig;
use crate::parallel::Coordinator;
use crate::source::StringSource;

mod command;
mod output;

pub use command::CommandDoer;
pub use output::Output;

/// fanout - run a command for every input line, in parallel, with live progress
#[derive(Parser, Debug)]
#[command(
    name = "fanout",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run a command for every input item in parallel, with live progress",
    long_about = "Reads items (one per line) from a file or stdin, or from --items, and runs \
                  COMMAND once per item on a pool of workers. `{}` in COMMAND is replaced by \
                  the item; without it the item is appended. Prints one line per item as soon \
                  as its command finishes."
)]
pub struct Cli {
    /// Number of worker threads (0 = one per CPU core)
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Read items from FILE instead of stdin ("-" for stdin)
    #[arg(short, long, value_name = "FILE", conflicts_with = "items")]
    pub input: Option<PathBuf>,

    /// Use this comma separated list of items
    #[arg(long, value_delimiter = ',', value_name = "ITEMS")]
    pub items: Vec<String>,

    /// Only process items matching this regular expression
    #[arg(short, long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Show a spinner while waiting for results
    #[arg(long, overrides_with = "no_spinner")]
    pub spinner: bool,

    /// Never show the spinner
    #[arg(long)]
    pub no_spinner: bool,

    /// Milliseconds between progress redraws
    #[arg(long, value_name = "MS")]
    pub redraw_ms: Option<u64>,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress everything but results and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run for each item (default: echo)
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Settings given on the command line, layered over the configuration files
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spinner: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redraw_interval_ms: Option<u64>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        let config = CoordinatorConfig::load(self.config.as_deref(), Some(self.overrides()))?;
        output.verbose(&format!("Using {} workers", config.effective_threads()));

        let doer = CommandDoer::new(&self.command);
        let source = self.source()?;

        let mut coordinator = Coordinator::from_config(&config);
        let summary = coordinator.do_with_strings_from_reader(&doer, source)?;

        output.summary(summary.printed, summary.workers, summary.elapsed);
        Ok(())
    }

    fn overrides(&self) -> CliOverrides {
        let spinner = if self.no_spinner {
            Some(false)
        } else if self.spinner {
            Some(true)
        } else {
            None
        };

        CliOverrides {
            threads: self.threads,
            spinner,
            redraw_interval_ms: self.redraw_ms,
        }
    }

    fn source(&self) -> Result<StringSource> {
        let source = if !self.items.is_empty() {
            StringSource::list(self.items.iter().map(|item| item.trim()).filter(|item| !item.is_empty()))
        } else {
            match &self.input {
                Some(path) if path.as_os_str() != "-" => {
                    let file = File::open(path)
                        .with_context(|| format!("Failed to open input file {}", path.display()))?;
                    StringSource::lines(BufReader::new(file))
                }
                _ => StringSource::lines(BufReader::new(io::stdin())),
            }
        };

        match &self.filter {
            Some(pattern) => {
                let regex = Regex::new(pattern)
                    .with_context(|| format!("Invalid filter pattern '{}'", pattern))?;
                Ok(StringSource::filtered(source, regex))
            }
            None => Ok(source),
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info"),
        2 => tracing_subscriber::EnvFilter::new("debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    // Results own stdout
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
