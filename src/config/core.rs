use anyhow::{Context, Result, ensure};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings for a [`Coordinator`](crate::parallel::Coordinator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Number of worker threads (0 = one per CPU core)
    pub threads: usize,

    /// Show a spinner while waiting for results
    pub spinner: bool,

    /// Pause between progress redraws, in milliseconds
    pub redraw_interval_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            spinner: false,
            redraw_interval_ms: 250,
        }
    }
}

impl CoordinatorConfig {
    /// Load the layered configuration.
    ///
    /// `custom_config` must exist when given; the user and repository files are optional.
    pub fn load<T: Serialize>(custom_config: Option<&Path>, cli_overrides: Option<T>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(Self::user_config_path()))
            .merge(Toml::file("fanout.toml"));

        if let Some(path) = custom_config {
            ensure!(path.is_file(), "Config file not found: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("FANOUT_"));

        if let Some(overrides) = cli_overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(overrides));
        }

        let config: Self = figment.extract().context("Invalid fanout configuration")?;
        tracing::trace!("CONFIG LOAD: {:?}", config);
        Ok(config)
    }

    /// Worker count with `0` resolved to the number of CPU cores
    pub fn effective_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            num_cpus::get().max(1)
        }
    }

    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.redraw_interval_ms)
    }

    fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{}/.config/fanout/config.toml", home),
            Err(_) => "~/.config/fanout/config.toml".to_string(),
        }
    }
}
