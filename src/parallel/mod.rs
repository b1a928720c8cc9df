//! Parallel work coordination with live terminal progress
//!
//! This module fans work items out across a fixed pool of worker threads and renders
//! both finished results and in-flight progress to the terminal without tearing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  items   ┌──────────────┐ results  ┌──────────────┐
//! │  Producer   │─────────▶│  Worker 0..N │─────────▶│   Printer    │──▶ terminal
//! │  (Feed)     │ channel  │  (Doer)      │ bounded  │ (sole owner) │
//! └─────────────┘          └──────┬───────┘ channel  └──────▲───────┘
//!                                 │ writes                  │ reads
//!                                 ▼                         │
//!                          ┌──────────────┐                 │
//!                          │ProgressTable │─────────────────┘
//!                          └──────────────┘
//! ```
//!
//! - **Workers** share one input channel, which is the only load balancing there is:
//!   whichever worker is free takes the next item.
//! - **Results** go through a channel bounded by the worker count, so workers block
//!   rather than run ahead of the printer.
//! - **The printer** is the only thread that touches the terminal. It polls for results
//!   without blocking; when none is pending it redraws each busy worker's progress line
//!   and moves the cursor back up so the next result overwrites them.
//!
//! There is no cancellation: a run ends when its item source is exhausted.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use fanout::parallel::{Coordinator, ProgressSlot};
//! use fanout::source::StringSource;
//!
//! let mut coordinator = Coordinator::new(4);
//! coordinator.enable_spinner();
//!
//! let lookup = |hash: String, progress: &ProgressSlot| {
//!     progress.set(format!("looking up {hash}..."));
//!     let verdict = "clean"; // query a remote service here
//!     progress.clear();
//!     format!("{hash}: {verdict}")
//! };
//!
//! coordinator
//!     .do_with_strings_from_reader(&lookup, StringSource::list(["44d88612", "e3b0c442"]))
//!     .unwrap();
//! ```

pub mod coordinator;
mod printer;
pub mod progress;
pub mod terminal;

pub use coordinator::{Coordinator, DEFAULT_REDRAW_INTERVAL, Doer, RunSummary};
pub use progress::{ProgressSlot, ProgressTable};
pub use terminal::{BusyIndicator, ConsoleTerminal, Spinner, TerminalWriter};
