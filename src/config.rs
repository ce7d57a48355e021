//! Provides a ConfigManager to read and refresh config from files.
//!

use color_eyre::Result;
use color_eyre::eyre::eyre;
use config;
use notify::{RecommendedWatcher, Watcher};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::event::Event;

pub const DEFAULT_FILE: &str = "resmon.toml";

/// The recognized settings. Every field has a default, so running without
/// a config file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between ticks.
    #[serde(default = "default_sampling_interval")]
    pub sampling_interval_seconds: u64,
    /// Rolling history length per metric.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// Where the daily `log_<date>.txt` files go.
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
}

fn default_sampling_interval() -> u64 {
    1
}

fn default_buffer_capacity() -> usize {
    50
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sampling_interval_seconds: default_sampling_interval(),
            buffer_capacity: default_buffer_capacity(),
            log_directory: default_log_directory(),
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sampling_interval_seconds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sampling_interval_seconds == 0 {
            return Err(eyre!("sampling_interval_seconds must be at least 1"));
        }
        if self.buffer_capacity == 0 {
            return Err(eyre!("buffer_capacity must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    pub file_path: PathBuf,
    config: MonitorConfig,
    _watcher: RecommendedWatcher,
}

impl ConfigManager {
    pub fn new(file_path: PathBuf, sender: UnboundedSender<Event>) -> Result<ConfigManager> {
        let captured = sender.clone();
        let mut watcher = notify::recommended_watcher(move |_| {
            let _ = captured.send(Event::Reload);
        })?;
        if file_path.exists() {
            info!(target: "Config", "Watching file {:?}", file_path);
            watcher.watch(&file_path, notify::RecursiveMode::NonRecursive)?;
        } else {
            info!(target: "Config", "No config file at {:?}, using defaults", file_path);
        }
        Ok(ConfigManager {
            file_path: file_path.clone(),
            config: load_from_file(file_path)?,
            _watcher: watcher,
        })
    }

    pub fn current(&self) -> MonitorConfig {
        self.config.clone()
    }

    pub fn reload(&mut self) -> Result<MonitorConfig> {
        self.config = load_from_file(self.file_path.clone())?;
        Ok(self.current())
    }
}

/// Layer the (optional) TOML file under `RESMON_*` environment variables
/// and range-check the result.
pub fn load_from_file(file_path: PathBuf) -> Result<MonitorConfig> {
    let raw = config::Config::builder()
        .add_source(config::File::from(file_path).required(false))
        .add_source(config::Environment::with_prefix("RESMON"))
        .build()?;
    let parsed: MonitorConfig = raw.try_deserialize()?;
    parsed.validate()?;
    Ok(parsed)
}
