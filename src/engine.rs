//! The sampling engine: fixed-cadence snapshots, derived network rates,
//! bounded per-metric history, and the append-only daily log.
//!
//! [`Engine::tick`] is one full cycle and is driven externally (by
//! [`crate::app::App`] on a timer, or directly by tests with scripted
//! snapshots). Every failure mode degrades to "skip this tick's affected
//! output"; the next tick is the retry.

pub mod history;
pub mod logfile;
pub mod rate;
pub mod sampler;

pub use history::{Metric, MetricHistory, SeriesBuffer};
pub use logfile::{LogRecord, LogWriteError, LogWriter};
pub use rate::{NetworkRate, compute_rate};
pub use sampler::{SampleError, Sampler, Snapshot, SystemSampler};

use tracing::warn;

use crate::config::MonitorConfig;

/// What a display refresh pulls: the most recent snapshot and the rates
/// derived from it.
#[derive(Debug, Clone, Copy)]
pub struct TickReading {
    pub snapshot: Snapshot,
    pub rate: NetworkRate,
}

pub struct Engine<S> {
    sampler: S,
    history: MetricHistory,
    log: LogWriter,
    previous: Option<Snapshot>,
    latest: Option<TickReading>,
}

impl<S: Sampler> Engine<S> {
    pub fn new(sampler: S, config: &MonitorConfig) -> Self {
        Self {
            sampler,
            history: MetricHistory::new(config.buffer_capacity),
            log: LogWriter::new(&config.log_directory),
            previous: None,
            latest: None,
        }
    }

    /// Run one tick: sample, derive rates, record history, append the log
    /// line, replace the previous snapshot. Returns the published reading,
    /// or `None` when sampling failed and the tick was skipped.
    pub fn tick(&mut self) -> Option<TickReading> {
        let snapshot = match self.sampler.sample() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(target: "Engine", "Skipping tick: {}", err);
                return None;
            }
        };
        // First tick has no baseline; synthesize a zero rate.
        let rate = match &self.previous {
            Some(previous) => compute_rate(previous, &snapshot),
            None => NetworkRate::default(),
        };

        self.history.push(Metric::Cpu, snapshot.cpu_pct);
        self.history.push(Metric::Ram, snapshot.ram_pct);
        self.history.push(Metric::Disk, snapshot.disk_pct);

        if let Err(err) = self.log.append(&LogRecord::new(&snapshot, &rate)) {
            // Reported only: the buffers are already updated and the next
            // tick writes on schedule.
            warn!(target: "Engine", "{}", err);
        }

        self.previous = Some(snapshot);
        let reading = TickReading { snapshot, rate };
        self.latest = Some(reading);
        Some(reading)
    }

    /// Most recent completed tick, if any.
    pub fn latest(&self) -> Option<&TickReading> {
        self.latest.as_ref()
    }

    /// Rolling buffers for the chart layer.
    pub fn history(&self) -> &MetricHistory {
        &self.history
    }

    /// Re-apply a reloaded configuration. Shrinking the buffer capacity
    /// evicts oldest entries; the log directory switch takes effect on the
    /// next append.
    pub fn apply_config(&mut self, config: &MonitorConfig) {
        self.history.set_capacity(config.buffer_capacity);
        self.log = LogWriter::new(&config.log_directory);
    }
}
