//! Terminal ports used by the printer
//!
//! The printer only needs a handful of terminal commands and an optional busy
//! indicator. Both sit behind small traits so a real terminal can be swapped for a
//! recording double in tests.

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

/// Minimal set of terminal commands the printer issues.
pub trait TerminalWriter: Send {
    fn write_text(&mut self, text: &str) -> io::Result<()>;

    fn clear_to_end_of_line(&mut self) -> io::Result<()>;

    fn end_line(&mut self) -> io::Result<()>;

    fn move_cursor_up(&mut self, lines: usize) -> io::Result<()>;

    /// Whether overwrite-in-place progress makes sense on this output
    fn is_interactive(&self) -> bool {
        true
    }
}

/// Animated "please wait" decoration, started while the printer is idle.
pub trait BusyIndicator: Send {
    /// Starting an indicator that is already running does nothing.
    fn start(&mut self);

    /// Stopping an indicator that is not running does nothing.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// [`TerminalWriter`] backed by a `console` terminal.
///
/// Escape sequences are only emitted when the output is a real terminal, so piping
/// results to a file yields plain lines.
#[derive(Debug, Clone)]
pub struct ConsoleTerminal {
    term: Term,
}

impl ConsoleTerminal {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for ConsoleTerminal {
    fn default() -> Self {
        Self::stdout()
    }
}

impl TerminalWriter for ConsoleTerminal {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.term.write_str(text)
    }

    fn clear_to_end_of_line(&mut self) -> io::Result<()> {
        if self.term.is_term() {
            self.term.write_str("\x1b[0K")?;
        }
        Ok(())
    }

    fn end_line(&mut self) -> io::Result<()> {
        self.term.write_line("")
    }

    fn move_cursor_up(&mut self, lines: usize) -> io::Result<()> {
        if self.term.is_term() && lines > 0 {
            self.term.move_cursor_up(lines)?;
        }
        Ok(())
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Spinner tick rate, matching the printer's redraw cadence
pub const SPINNER_TICK: Duration = Duration::from_millis(250);

/// [`BusyIndicator`] drawn with an `indicatif` spinner on stderr.
#[derive(Debug)]
pub struct Spinner {
    bar: Option<ProgressBar>,
    message: String,
    tick: Duration,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            bar: None,
            message: message.into(),
            tick: SPINNER_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new("wait...")
    }
}

impl BusyIndicator for Spinner {
    fn start(&mut self) {
        if self.bar.is_some() {
            return;
        }
        let style = ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");

        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_message(self.message.clone());
        bar.enable_steady_tick(self.tick);
        self.bar = Some(bar);
    }

    fn stop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn is_running(&self) -> bool {
        self.bar.is_some()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TermEvent {
        Text(String),
        ClearLine,
        EndLine,
        CursorUp(usize),
    }

    /// Records every command; clones share the same log.
    #[derive(Debug, Clone)]
    pub struct RecordingTerminal {
        events: Arc<Mutex<Vec<TermEvent>>>,
        interactive: bool,
        fail_writes: bool,
    }

    impl RecordingTerminal {
        pub fn new() -> Self {
            Self {
                events: Arc::default(),
                interactive: true,
                fail_writes: false,
            }
        }

        pub fn piped() -> Self {
            Self {
                interactive: false,
                ..Self::new()
            }
        }

        pub fn broken() -> Self {
            Self {
                fail_writes: true,
                ..Self::new()
            }
        }

        pub fn events(&self) -> Vec<TermEvent> {
            self.events.lock().unwrap().clone()
        }

        /// Text of every completed line, in the order it was ended
        pub fn lines(&self) -> Vec<String> {
            let mut lines = Vec::new();
            let mut current = String::new();
            for event in self.events() {
                match event {
                    TermEvent::Text(text) => current.push_str(&text),
                    TermEvent::EndLine => lines.push(std::mem::take(&mut current)),
                    TermEvent::ClearLine | TermEvent::CursorUp(_) => {}
                }
            }
            lines
        }

        fn record(&mut self, event: TermEvent) -> io::Result<()> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    impl TerminalWriter for RecordingTerminal {
        fn write_text(&mut self, text: &str) -> io::Result<()> {
            self.record(TermEvent::Text(text.to_string()))
        }

        fn clear_to_end_of_line(&mut self) -> io::Result<()> {
            self.record(TermEvent::ClearLine)
        }

        fn end_line(&mut self) -> io::Result<()> {
            self.record(TermEvent::EndLine)
        }

        fn move_cursor_up(&mut self, lines: usize) -> io::Result<()> {
            self.record(TermEvent::CursorUp(lines))
        }

        fn is_interactive(&self) -> bool {
            self.interactive
        }
    }

    #[derive(Debug, Default)]
    pub struct IndicatorLog {
        pub starts: usize,
        pub stops: usize,
        pub running: bool,
    }

    #[derive(Debug, Clone, Default)]
    pub struct RecordingIndicator {
        log: Arc<Mutex<IndicatorLog>>,
    }

    impl RecordingIndicator {
        pub fn starts(&self) -> usize {
            self.log.lock().unwrap().starts
        }

        pub fn stops(&self) -> usize {
            self.log.lock().unwrap().stops
        }

        pub fn running(&self) -> bool {
            self.log.lock().unwrap().running
        }
    }

    impl BusyIndicator for RecordingIndicator {
        fn start(&mut self) {
            let mut log = self.log.lock().unwrap();
            if !log.running {
                log.starts += 1;
                log.running = true;
            }
        }

        fn stop(&mut self) {
            let mut log = self.log.lock().unwrap();
            if log.running {
                log.stops += 1;
                log.running = false;
            }
        }

        fn is_running(&self) -> bool {
            self.running()
        }
    }
}
