use super::sampler::Snapshot;

/// Throughput derived from two consecutive snapshots. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetworkRate {
    pub upload_kbps: f64,
    pub download_kbps: f64,
}

impl NetworkRate {
    /// Combined up+down rate in MB/s, as written to the daily log.
    pub fn combined_mbps(&self) -> f64 {
        (self.upload_kbps + self.download_kbps) / 1024.0
    }
}

/// Convert two cumulative counter readings into KB/s figures.
///
/// Non-positive elapsed time (clock stepped backwards, duplicate tick)
/// yields a zero rate. A counter that went backwards has been reset by the
/// OS (reboot, interface reset); its delta clamps to zero for this tick
/// instead of wrapping. Either way the next tick self-heals because the
/// caller replaces its previous snapshot unconditionally.
pub fn compute_rate(prev: &Snapshot, curr: &Snapshot) -> NetworkRate {
    let elapsed_ms = curr
        .timestamp
        .signed_duration_since(prev.timestamp)
        .num_milliseconds();
    if elapsed_ms <= 0 {
        return NetworkRate::default();
    }
    let elapsed_secs = elapsed_ms as f64 / 1000.0;
    let delta_sent = curr.bytes_sent.saturating_sub(prev.bytes_sent);
    let delta_recv = curr.bytes_recv.saturating_sub(prev.bytes_recv);
    NetworkRate {
        upload_kbps: delta_sent as f64 / 1024.0 / elapsed_secs,
        download_kbps: delta_recv as f64 / 1024.0 / elapsed_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn snapshot_at(secs: u32, bytes_sent: u64, bytes_recv: u64) -> Snapshot {
        Snapshot {
            timestamp: Local.with_ymd_and_hms(2025, 3, 1, 10, 0, secs).unwrap(),
            cpu_pct: 0.0,
            ram_pct: 0.0,
            disk_pct: 0.0,
            bytes_sent,
            bytes_recv,
        }
    }

    #[test]
    fn one_kib_per_second_is_one_kbps() {
        let prev = snapshot_at(0, 1024, 0);
        let curr = snapshot_at(1, 2048, 0);
        let rate = compute_rate(&prev, &curr);
        assert_eq!(rate.upload_kbps, 1.0);
        assert_eq!(rate.download_kbps, 0.0);
    }

    #[test]
    fn counter_reset_clamps_delta_to_zero() {
        // The cumulative counters reset when the machine reboots or an
        // interface resets. A lower current reading clamps that delta to
        // zero for this tick rather than producing a negative or
        // wrapped-around rate. This is deliberate, not incidental.
        let prev = snapshot_at(0, 5000, 5000);
        let curr = snapshot_at(1, 3000, 9096);
        let rate = compute_rate(&prev, &curr);
        assert_eq!(rate.upload_kbps, 0.0);
        assert_eq!(rate.download_kbps, 4.0);
    }

    #[test]
    fn zero_elapsed_yields_zero_rate() {
        // Duplicate tick: no division by zero, both directions zero.
        let prev = snapshot_at(5, 1024, 1024);
        let curr = snapshot_at(5, 4096, 4096);
        assert_eq!(compute_rate(&prev, &curr), NetworkRate::default());
    }

    #[test]
    fn negative_elapsed_yields_zero_rate() {
        let prev = snapshot_at(9, 0, 0);
        let curr = snapshot_at(3, 4096, 4096);
        assert_eq!(compute_rate(&prev, &curr), NetworkRate::default());
    }

    #[test]
    fn combined_rate_converts_to_mbps() {
        let rate = NetworkRate {
            upload_kbps: 640.0,
            download_kbps: 640.0,
        };
        assert_eq!(rate.combined_mbps(), 1.25);
    }
}
