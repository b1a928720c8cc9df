use console::style;
use std::process::{Command, Stdio};

use crate::parallel::{Doer, ProgressSlot};

const PLACEHOLDER: &str = "{}";

/// Runs an external command for each item.
///
/// Every occurrence of `{}` in the arguments is replaced by the item; when no argument
/// contains it, the item is appended as the last argument. Success yields the first
/// line of the command's stdout, failure a line marked with `✖`.
#[derive(Debug, Clone)]
pub struct CommandDoer {
    program: String,
    args: Vec<String>,
}

impl CommandDoer {
    /// An empty command line falls back to `echo`.
    pub fn new(command: &[String]) -> Self {
        match command.split_first() {
            Some((program, args)) => Self {
                program: program.clone(),
                args: args.to_vec(),
            },
            None => Self {
                program: "echo".to_string(),
                args: Vec::new(),
            },
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn args_for(&self, item: &str) -> Vec<String> {
        if self.args.iter().any(|arg| arg.contains(PLACEHOLDER)) {
            self.args.iter().map(|arg| arg.replace(PLACEHOLDER, item)).collect()
        } else {
            let mut args = self.args.clone();
            args.push(item.to_string());
            args
        }
    }

    fn progress_text(&self, item: &str) -> String {
        format!("{item}: running {}…", self.program)
    }
}

impl Doer<String> for CommandDoer {
    fn work(&self, item: String, progress: &ProgressSlot) -> String {
        progress.set(self.progress_text(&item));
        tracing::debug!("Running {} for {}", self.program, item);

        let outcome = Command::new(&self.program)
            .args(self.args_for(&item))
            .stdin(Stdio::null())
            .output();
        progress.clear();

        match outcome {
            Ok(output) if output.status.success() => match first_line(&output.stdout) {
                Some(line) => format!("{item}: {line}"),
                None => format!("{item}: {}", style("done").green()),
            },
            Ok(output) => {
                let detail = first_line(&output.stderr).unwrap_or_else(|| output.status.to_string());
                format!("{item}: {} {}", style("✖").red(), detail)
            }
            Err(e) => format!(
                "{item}: {} failed to start {}: {}",
                style("✖").red(),
                self.program,
                e
            ),
        }
    }
}

fn first_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
