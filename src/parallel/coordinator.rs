use super::printer::Printer;
use super::progress::{ProgressSlot, ProgressTable};
use super::terminal::{BusyIndicator, ConsoleTerminal, Spinner, TerminalWriter};
use crate::config::CoordinatorConfig;
use crate::source::{Feed, PagedIterator, ReadString};
use anyhow::{Context, Result, anyhow, bail, ensure};
use crossbeam::channel::{Receiver, Sender, bounded};
use std::any::Any;
use std::time::{Duration, Instant};

/// Default pause between progress redraws while no result is pending
pub const DEFAULT_REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// Per-item work performed by the pool.
///
/// `work` may report what it is doing through `progress` at any point; the slot is
/// shown on screen until the item finishes. Failures are reported in the returned
/// text, there is no separate error channel.
pub trait Doer<T>: Sync {
    fn work(&self, item: T, progress: &ProgressSlot) -> String;
}

impl<T, F> Doer<T> for F
where
    F: Fn(T, &ProgressSlot) -> String + Sync,
{
    fn work(&self, item: T, progress: &ProgressSlot) -> String {
        self(item, progress)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Result lines written to the terminal
    pub printed: usize,
    /// Items pushed by the feed's producer, `None` for caller-filled channels
    pub produced: Option<usize>,
    pub workers: usize,
    pub elapsed: Duration,
}

/// Runs a [`Doer`] over a stream of items on a fixed number of worker threads,
/// printing each result as it completes and the workers' progress in between.
///
/// One run at a time: [`Coordinator::run`] borrows the coordinator mutably.
pub struct Coordinator {
    threads: usize,
    redraw_interval: Duration,
    indicator: Option<Box<dyn BusyIndicator>>,
    terminal: Box<dyn TerminalWriter>,
    progress: ProgressTable,
}

impl Coordinator {
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            redraw_interval: DEFAULT_REDRAW_INTERVAL,
            indicator: None,
            terminal: Box::new(ConsoleTerminal::stdout()),
            progress: ProgressTable::default(),
        }
    }

    pub fn from_config(config: &CoordinatorConfig) -> Self {
        let mut coordinator =
            Self::new(config.effective_threads()).with_redraw_interval(config.redraw_interval());
        if config.spinner {
            coordinator.enable_spinner();
        }
        coordinator
    }

    /// Show an animated spinner while waiting for results
    pub fn enable_spinner(&mut self) {
        self.indicator = Some(Box::new(Spinner::default()));
    }

    pub fn with_indicator(mut self, indicator: Box<dyn BusyIndicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    pub fn with_terminal<W: TerminalWriter + 'static>(mut self, terminal: W) -> Self {
        self.terminal = Box::new(terminal);
        self
    }

    pub fn with_redraw_interval(mut self, interval: Duration) -> Self {
        self.redraw_interval = interval;
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Progress slots of the current or most recent run
    pub fn progress(&self) -> &ProgressTable {
        &self.progress
    }

    pub fn is_indicator_running(&self) -> bool {
        self.indicator.as_ref().is_some_and(|i| i.is_running())
    }

    /// Process every string produced by `reader`.
    pub fn do_with_strings_from_reader<R, D>(&mut self, doer: &D, reader: R) -> Result<RunSummary>
    where
        R: ReadString + Send,
        D: Doer<String> + ?Sized,
    {
        self.run(doer, Feed::from_reader(reader))
    }

    /// Process every result of a paginated cursor, fetching up to `buffer_size`
    /// results ahead of the workers.
    pub fn do_with_items_from_paged<P, D>(
        &mut self,
        doer: &D,
        cursor: P,
        buffer_size: usize,
    ) -> Result<RunSummary>
    where
        P: PagedIterator + Send,
        P::Item: Send,
        D: Doer<P::Item> + ?Sized,
    {
        self.run(doer, Feed::from_paged(cursor, buffer_size))
    }

    /// Process items from a channel until its senders are dropped.
    pub fn do_with_items_from_channel<T, D>(&mut self, doer: &D, items: Receiver<T>) -> Result<RunSummary>
    where
        T: Send,
        D: Doer<T> + ?Sized,
    {
        self.run(doer, Feed::from_channel(items))
    }

    /// Process every item of `feed` and print the results.
    ///
    /// Blocks until all workers have exited, then closes the result channel and
    /// waits for the printer to finish. A panic in any thread is reported as an error
    /// once the remaining threads have been joined.
    pub fn run<'a, T, D>(&mut self, doer: &D, feed: Feed<'a, T>) -> Result<RunSummary>
    where
        T: Send + 'a,
        D: Doer<T> + ?Sized,
    {
        ensure!(
            self.threads >= 1,
            "Coordinator needs at least one worker thread, got {}",
            self.threads
        );

        let started = Instant::now();
        let threads = self.threads;
        self.progress = ProgressTable::new(threads);
        tracing::debug!("Starting run with {} workers", threads);

        let (items, producer) = feed.into_parts();
        // Bounded by the worker count so workers cannot outrun the printer
        let (result_tx, result_rx) = bounded::<String>(threads);

        let Self {
            terminal,
            indicator,
            progress,
            redraw_interval,
            ..
        } = self;
        let progress: &ProgressTable = progress;
        let redraw_interval = *redraw_interval;

        let (printed, produced) = crossbeam::thread::scope(|s| -> Result<(usize, Option<usize>)> {
            let producer = producer
                .map(|produce| {
                    s.builder()
                        .name("fanout-producer".to_string())
                        .spawn(move |_| produce())
                })
                .transpose()
                .context("Failed to spawn producer thread")?;

            let mut workers = Vec::with_capacity(threads);
            for (worker_id, slot) in progress.iter().enumerate() {
                let items = items.clone();
                let results = result_tx.clone();
                let handle = s
                    .builder()
                    .name(format!("fanout-worker-{worker_id}"))
                    .spawn(move |_| work_loop(worker_id, doer, &items, &results, slot))
                    .context("Failed to spawn worker thread")?;
                workers.push(handle);
            }
            // Workers hold the only receivers now, so the producer stops if they all die
            drop(items);

            let printer = s
                .builder()
                .name("fanout-printer".to_string())
                .spawn(move |_| {
                    Printer::new(&mut **terminal, indicator.as_deref_mut(), progress, redraw_interval)
                        .run(&result_rx)
                })
                .context("Failed to spawn printer thread")?;

            let mut failures = Vec::new();
            for (worker_id, handle) in workers.into_iter().enumerate() {
                if let Err(panic) = handle.join() {
                    failures.push(format!("worker {worker_id} panicked: {}", panic_message(&*panic)));
                }
            }

            // Last sender gone: the printer drains what is left and stops
            drop(result_tx);
            let printed = match printer.join() {
                Ok(printed) => Some(printed.context("Failed to write results to the terminal")?),
                Err(panic) => {
                    failures.push(format!("printer panicked: {}", panic_message(&*panic)));
                    None
                }
            };

            let produced = match producer.map(|handle| handle.join()).transpose() {
                Ok(produced) => produced,
                Err(panic) => {
                    failures.push(format!("producer panicked: {}", panic_message(&*panic)));
                    None
                }
            };

            if !failures.is_empty() {
                bail!("Run aborted: {}", failures.join("; "));
            }
            Ok((printed.unwrap_or_default(), produced))
        })
        .map_err(|_| anyhow!("Thread panic occurred during parallel execution"))??;

        let summary = RunSummary {
            printed,
            produced,
            workers: threads,
            elapsed: started.elapsed(),
        };
        tracing::debug!(
            "Run finished: {} results from {} workers in {:?}",
            summary.printed,
            summary.workers,
            summary.elapsed
        );
        Ok(summary)
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("threads", &self.threads)
            .field("redraw_interval", &self.redraw_interval)
            .field("spinner", &self.indicator.is_some())
            .field("progress", &self.progress)
            .finish()
    }
}

fn work_loop<T, D>(
    worker_id: usize,
    doer: &D,
    items: &Receiver<T>,
    results: &Sender<String>,
    slot: &ProgressSlot,
) -> usize
where
    D: Doer<T> + ?Sized,
{
    let mut processed = 0;
    for item in items.iter() {
        let text = doer.work(item, slot);
        let sent = results.send(text);
        slot.clear();
        if sent.is_err() {
            break; // Printer dropped
        }
        processed += 1;
    }
    tracing::trace!("Worker {} finished after {} items", worker_id, processed);
    processed
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
