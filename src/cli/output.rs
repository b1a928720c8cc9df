//! Status output for fanout
//!
//! Everything here goes to stderr: stdout carries nothing but result lines.

use console::style;
use std::time::Duration;

/// Output handler for status messages around a run
#[derive(Debug, Clone, Copy)]
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        // Errors are always shown, even in quiet mode
        eprintln!("{} {}", style("✖").red(), message);
    }

    /// Print a verbose message (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            eprintln!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    /// Print the run summary (only if verbose mode is enabled)
    pub fn summary(&self, printed: usize, workers: usize, elapsed: Duration) {
        if self.verbose && !self.quiet {
            eprintln!(
                "{} {} {}",
                style("✔").green(),
                style(format!("{printed} results from {workers} workers")).dim(),
                style(format!("({:.1}s)", elapsed.as_secs_f64())).yellow().bold()
            );
        }
    }
}
