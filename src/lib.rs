//! # fanout - parallel work with live progress
//!
//! Fans a stream of work items out across a fixed pool of worker threads, prints each
//! worker's result as soon as it is ready, and keeps an in-place view of what every busy
//! worker is doing, without results and progress ever tearing each other's lines.
//!
//! - [`source`]: where items come from (lists, line streams, regex filters, paginated
//!   cursors, channels)
//! - [`parallel`]: the [`Coordinator`], its worker pool, progress table and printer
//! - [`config`]: layered coordinator settings
//! - [`cli`]: the `fanout` command-line front end
//!
//! ## Quick Start
//!
//! ```bash
//! # Resolve every host in a list with 8 workers
//! fanout -t 8 -i hosts.txt -- host {}
//!
//! # Only items matching a pattern, from stdin
//! cat hashes.txt | fanout --filter '^[0-9a-f]{64}$' -- ./lookup.sh
//! ```

pub mod cli;
pub mod config;
pub mod parallel;
pub mod source;

pub use config::CoordinatorConfig;
pub use parallel::{Coordinator, Doer, ProgressSlot, RunSummary};

/// Result type alias for fanout operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
