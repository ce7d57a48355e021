use chrono::{DateTime, Local};
use sysinfo::{Disks, Networks, System};
use thiserror::Error;

/// One instantaneous reading of every tracked gauge plus the raw
/// cumulative network counters it was derived from.
///
/// The byte counters are whatever the OS reports since boot; they only
/// ever grow until a reset event (reboot, interface reset), which the
/// rate calculator handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub timestamp: DateTime<Local>,
    pub cpu_pct: f32,
    pub ram_pct: f32,
    pub disk_pct: f32,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

#[derive(Debug, Error)]
pub enum SampleError {
    /// The OS query came back with nothing usable for the named metric.
    #[error("metric unavailable: {0}")]
    MetricUnavailable(&'static str),
}

/// Source of snapshots. The scheduler only sees this seam, so tests can
/// drive a tick with scripted readings and synthetic timestamps.
pub trait Sampler {
    fn sample(&mut self) -> Result<Snapshot, SampleError>;
}

/// The real sampler, backed by sysinfo.
pub struct SystemSampler {
    sys: System,
    networks: Networks,
    disks: Disks,
}

impl SystemSampler {
    pub fn new() -> Self {
        // CPU usage is a delta between refreshes; prime the first one here
        // so the first scheduled sample has a baseline.
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            sys,
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for SystemSampler {
    fn sample(&mut self) -> Result<Snapshot, SampleError> {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.disks.refresh(true);
        self.networks.refresh(true);

        let total_mem = self.sys.total_memory();
        if total_mem == 0 {
            return Err(SampleError::MetricUnavailable("memory totals"));
        }
        let ram_pct = self.sys.used_memory() as f32 / total_mem as f32 * 100.0;
        let disk_pct = disk_usage_percent(&self.disks)?;
        let (bytes_recv, bytes_sent) = total_bytes(&self.networks);

        Ok(Snapshot {
            timestamp: Local::now(),
            cpu_pct: self.sys.global_cpu_usage().clamp(0.0, 100.0),
            ram_pct: ram_pct.clamp(0.0, 100.0),
            disk_pct: disk_pct.clamp(0.0, 100.0),
            bytes_sent,
            bytes_recv,
        })
    }
}

/// Usage percent of the root mount, falling back to an aggregate over all
/// mounts on platforms without one.
fn disk_usage_percent(disks: &Disks) -> Result<f32, SampleError> {
    let (total, available) = match disks
        .iter()
        .find(|d| d.mount_point() == std::path::Path::new("/"))
    {
        Some(root) => (root.total_space(), root.available_space()),
        None => disks.iter().fold((0, 0), |(t, a), d| {
            (t + d.total_space(), a + d.available_space())
        }),
    };
    if total == 0 {
        return Err(SampleError::MetricUnavailable("disk usage"));
    }
    let used = total.saturating_sub(available);
    Ok(used as f32 / total as f32 * 100.0)
}

fn total_bytes(networks: &Networks) -> (u64, u64) {
    let mut rx = 0u64;
    let mut tx = 0u64;
    for (_name, data) in networks.iter() {
        rx += data.total_received();
        tx += data.total_transmitted();
    }
    (rx, tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_stay_in_range() {
        // Hosts without visible disks (some containers) legitimately
        // return MetricUnavailable; the range invariant only applies to
        // snapshots that were actually produced.
        let mut sampler = SystemSampler::new();
        if let Ok(snapshot) = sampler.sample() {
            for pct in [snapshot.cpu_pct, snapshot.ram_pct, snapshot.disk_pct] {
                assert!((0.0..=100.0).contains(&pct), "out of range: {}", pct);
            }
        }
    }
}
