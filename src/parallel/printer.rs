use super::progress::ProgressTable;
use super::terminal::{BusyIndicator, TerminalWriter};
use crossbeam::channel::{Receiver, TryRecvError};
use std::io;
use std::thread;
use std::time::Duration;

/// Where the printer is in its poll / print / redraw cycle
#[derive(Debug, Clone, PartialEq, Eq)]
enum PrinterState {
    PollingResults,
    PrintingResult(String),
    PrintingProgress,
    Draining,
    Stopped,
}

/// Sole owner of the terminal during a run.
///
/// Prints results as soon as they arrive and, while none are pending, redraws the
/// progress of busy workers in place below the last result.
pub(crate) struct Printer<'a> {
    terminal: &'a mut (dyn TerminalWriter + 'static),
    indicator: Option<&'a mut (dyn BusyIndicator + 'static)>,
    progress: &'a ProgressTable,
    redraw_interval: Duration,
    // Progress rows still visible below the cursor
    stale_lines: usize,
    printed: usize,
}

impl<'a> Printer<'a> {
    pub(crate) fn new(
        terminal: &'a mut (dyn TerminalWriter + 'static),
        indicator: Option<&'a mut (dyn BusyIndicator + 'static)>,
        progress: &'a ProgressTable,
        redraw_interval: Duration,
    ) -> Self {
        Self {
            terminal,
            indicator,
            progress,
            redraw_interval,
            stale_lines: 0,
            printed: 0,
        }
    }

    /// Print until `results` is closed and empty. Returns the number of results printed.
    ///
    /// A failed terminal write stops all further output, but results keep being
    /// drained so no worker is left blocked on a full channel.
    pub(crate) fn run(mut self, results: &Receiver<String>) -> io::Result<usize> {
        let mut state = PrinterState::PollingResults;

        while state != PrinterState::Stopped {
            state = match self.step(state, results) {
                Ok(next) => next,
                Err(e) => {
                    tracing::warn!("Terminal write failed, discarding remaining results: {}", e);
                    self.stop_indicator();
                    let discarded = results.iter().count();
                    tracing::debug!("Discarded {} results", discarded);
                    return Err(e);
                }
            };
        }

        tracing::debug!("Printer stopped after {} results", self.printed);
        Ok(self.printed)
    }

    fn step(&mut self, state: PrinterState, results: &Receiver<String>) -> io::Result<PrinterState> {
        match state {
            PrinterState::PollingResults => {
                self.start_indicator();
                Ok(match results.try_recv() {
                    Ok(text) => PrinterState::PrintingResult(text),
                    Err(TryRecvError::Empty) => PrinterState::PrintingProgress,
                    Err(TryRecvError::Disconnected) => PrinterState::Draining,
                })
            }
            PrinterState::PrintingResult(text) => {
                self.print_result(&text)?;
                Ok(PrinterState::PollingResults)
            }
            PrinterState::PrintingProgress => {
                self.print_progress()?;
                Ok(PrinterState::PollingResults)
            }
            PrinterState::Draining => {
                self.wipe_stale_lines()?;
                self.stop_indicator();
                Ok(PrinterState::Stopped)
            }
            PrinterState::Stopped => Ok(PrinterState::Stopped),
        }
    }

    fn print_result(&mut self, text: &str) -> io::Result<()> {
        self.stop_indicator();
        self.terminal.write_text(text)?;
        self.terminal.clear_to_end_of_line()?;
        self.terminal.end_line()?;
        self.printed += 1;
        self.stale_lines = self.stale_lines.saturating_sub(1);
        Ok(())
    }

    fn print_progress(&mut self) -> io::Result<()> {
        let active = if self.terminal.is_interactive() {
            self.progress.active()
        } else {
            Vec::new()
        };

        for text in &active {
            self.terminal.write_text(text)?;
            self.terminal.clear_to_end_of_line()?;
            self.terminal.end_line()?;
        }
        // Blank out rows left over from a taller previous redraw
        let blanks = self.stale_lines.saturating_sub(active.len());
        for _ in 0..blanks {
            self.terminal.clear_to_end_of_line()?;
            self.terminal.end_line()?;
        }

        thread::sleep(self.redraw_interval);

        let drawn = active.len() + blanks;
        if drawn > 0 {
            self.terminal.move_cursor_up(drawn)?;
        }
        self.stale_lines = active.len();
        Ok(())
    }

    fn wipe_stale_lines(&mut self) -> io::Result<()> {
        let stale = std::mem::take(&mut self.stale_lines);
        for _ in 0..stale {
            self.terminal.clear_to_end_of_line()?;
            self.terminal.end_line()?;
        }
        if stale > 0 {
            self.terminal.move_cursor_up(stale)?;
        }
        Ok(())
    }

    fn start_indicator(&mut self) {
        if let Some(indicator) = self.indicator.as_deref_mut() {
            indicator.start();
        }
    }

    fn stop_indicator(&mut self) {
        if let Some(indicator) = self.indicator.as_deref_mut() {
            indicator.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::terminal::testing::{RecordingIndicator, RecordingTerminal, TermEvent};
    use crossbeam::channel::bounded;

    const FAST: Duration = Duration::from_millis(2);

    fn closed_channel(items: &[&str]) -> Receiver<String> {
        let (tx, rx) = bounded(items.len().max(1));
        for item in items {
            tx.send(item.to_string()).unwrap();
        }
        rx
    }

    #[test]
    fn test_prints_pending_results_then_stops() {
        let mut term = RecordingTerminal::new();
        let progress = ProgressTable::new(2);
        let results = closed_channel(&["first", "second"]);

        let printed = Printer::new(&mut term, None, &progress, FAST).run(&results).unwrap();

        assert_eq!(printed, 2);
        assert_eq!(
            term.events(),
            vec![
                TermEvent::Text("first".into()),
                TermEvent::ClearLine,
                TermEvent::EndLine,
                TermEvent::Text("second".into()),
                TermEvent::ClearLine,
                TermEvent::EndLine,
            ]
        );
    }

    #[test]
    fn test_redraws_progress_in_place_while_idle() {
        let mut term = RecordingTerminal::new();
        let recorder = term.clone();
        let progress = ProgressTable::new(3);
        progress.slot(0).unwrap().set("scanning a");
        progress.slot(2).unwrap().set("scanning c");
        let (tx, rx) = bounded::<String>(1);

        crossbeam::thread::scope(|s| {
            let printer = s.spawn(|_| Printer::new(&mut term, None, &progress, FAST).run(&rx));

            while !recorder.events().contains(&TermEvent::CursorUp(2)) {
                thread::yield_now();
            }
            progress.slot(0).unwrap().clear();
            progress.slot(2).unwrap().clear();
            tx.send("done".to_string()).unwrap();
            drop(tx);

            assert_eq!(printer.join().unwrap().unwrap(), 1);
        })
        .unwrap();

        let events = recorder.events();
        let first_up = events.iter().position(|e| *e == TermEvent::CursorUp(2)).unwrap();
        assert_eq!(
            events[..first_up],
            [
                TermEvent::Text("scanning a".into()),
                TermEvent::ClearLine,
                TermEvent::EndLine,
                TermEvent::Text("scanning c".into()),
                TermEvent::ClearLine,
                TermEvent::EndLine,
            ]
        );
        assert!(recorder.lines().contains(&"done".to_string()));
    }

    #[test]
    fn test_leftover_progress_rows_are_wiped_on_exit() {
        let mut term = RecordingTerminal::new();
        let recorder = term.clone();
        let progress = ProgressTable::new(2);
        progress.slot(0).unwrap().set("busy 0");
        progress.slot(1).unwrap().set("busy 1");
        let (tx, rx) = bounded::<String>(1);

        crossbeam::thread::scope(|s| {
            let printer = s.spawn(|_| Printer::new(&mut term, None, &progress, FAST).run(&rx));
            while !recorder.events().contains(&TermEvent::CursorUp(2)) {
                thread::yield_now();
            }
            drop(tx);
            printer.join().unwrap().unwrap();
        })
        .unwrap();

        // Both progress rows are blanked out and the cursor returns above them
        let events = recorder.events();
        let tail = &events[events.len() - 5..];
        assert_eq!(
            tail,
            [
                TermEvent::ClearLine,
                TermEvent::EndLine,
                TermEvent::ClearLine,
                TermEvent::EndLine,
                TermEvent::CursorUp(2),
            ]
        );
    }

    #[test]
    fn test_shrinking_progress_blanks_leftover_row() {
        let mut term = RecordingTerminal::new();
        let recorder = term.clone();
        let progress = ProgressTable::new(2);
        progress.slot(0).unwrap().set("p0");
        progress.slot(1).unwrap().set("p1");

        let mut printer = Printer::new(&mut term, None, &progress, FAST);
        printer.print_progress().unwrap();
        progress.slot(1).unwrap().clear();
        let first_redraw = recorder.events().len();
        printer.print_progress().unwrap();

        assert_eq!(
            recorder.events()[first_redraw..],
            [
                TermEvent::Text("p0".into()),
                TermEvent::ClearLine,
                TermEvent::EndLine,
                TermEvent::ClearLine,
                TermEvent::EndLine,
                TermEvent::CursorUp(2),
            ]
        );
        assert_eq!(printer.stale_lines, 1);
    }

    #[test]
    fn test_result_overwrites_one_stale_row() {
        let mut term = RecordingTerminal::new();
        let recorder = term.clone();
        let progress = ProgressTable::new(2);
        progress.slot(0).unwrap().set("p0");
        progress.slot(1).unwrap().set("p1");

        let mut printer = Printer::new(&mut term, None, &progress, FAST);
        printer.print_progress().unwrap();
        assert_eq!(printer.stale_lines, 2);

        progress.slot(0).unwrap().clear();
        progress.slot(1).unwrap().clear();
        printer.print_result("done").unwrap();
        assert_eq!(printer.stale_lines, 1);

        // Only the row below the result still needs blanking
        let before_wipe = recorder.events().len();
        printer.wipe_stale_lines().unwrap();
        assert_eq!(
            recorder.events()[before_wipe..],
            [TermEvent::ClearLine, TermEvent::EndLine, TermEvent::CursorUp(1)]
        );
        assert_eq!(printer.stale_lines, 0);
        assert_eq!(printer.printed, 1);
    }

    #[test]
    fn test_non_interactive_terminal_gets_no_progress() {
        let mut term = RecordingTerminal::piped();
        let recorder = term.clone();
        let progress = ProgressTable::new(1);
        progress.slot(0).unwrap().set("should never show");
        let (tx, rx) = bounded::<String>(1);

        crossbeam::thread::scope(|s| {
            let printer = s.spawn(|_| Printer::new(&mut term, None, &progress, FAST).run(&rx));
            thread::sleep(FAST * 10);
            tx.send("result".to_string()).unwrap();
            drop(tx);
            printer.join().unwrap().unwrap();
        })
        .unwrap();

        assert_eq!(recorder.lines(), vec!["result"]);
        assert!(!recorder.events().iter().any(|e| matches!(e, TermEvent::CursorUp(_))));
    }

    #[test]
    fn test_indicator_paused_for_results_and_stopped_at_end() {
        let mut term = RecordingTerminal::new();
        let log = RecordingIndicator::default();
        let mut indicator: Box<dyn BusyIndicator> = Box::new(log.clone());
        let progress = ProgressTable::new(1);
        let results = closed_channel(&["a", "b"]);

        Printer::new(&mut term, Some(indicator.as_mut()), &progress, FAST)
            .run(&results)
            .unwrap();

        // started before each poll, stopped for each result and once more at the end
        assert_eq!(log.starts(), 3);
        assert_eq!(log.stops(), 3);
        assert!(!log.running());
    }

    #[test]
    fn test_write_failure_still_drains_results() {
        let mut term = RecordingTerminal::broken();
        let progress = ProgressTable::new(1);
        let results = closed_channel(&["x", "y", "z"]);

        let err = Printer::new(&mut term, None, &progress, FAST).run(&results).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(results.is_empty());
    }
}
