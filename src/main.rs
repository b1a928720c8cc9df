use clap::Parser;
use fanout::cli::{Cli, Output};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::new(false, false).error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
