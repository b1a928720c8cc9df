//! Configuration management for fanout
//!
//! Coordinator settings are layered with figment, lowest priority first:
//! built-in defaults, the user config (`~/.config/fanout/config.toml`), the repository
//! config (`fanout.toml`), an explicit `--config` file, `FANOUT_*` environment variables,
//! and finally command-line overrides.

mod core;

pub use core::CoordinatorConfig;
