use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate};
use thiserror::Error;
use tracing::debug;

use super::rate::NetworkRate;
use super::sampler::Snapshot;

#[derive(Debug, Error)]
#[error("log write to {path:?} failed: {source}")]
pub struct LogWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// One line of the daily usage log. Immutable once written.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub cpu_pct: f32,
    pub ram_pct: f32,
    pub disk_pct: f32,
    pub net_mbps: f64,
}

impl LogRecord {
    pub fn new(snapshot: &Snapshot, rate: &NetworkRate) -> Self {
        Self {
            timestamp: snapshot.timestamp,
            cpu_pct: snapshot.cpu_pct,
            ram_pct: snapshot.ram_pct,
            disk_pct: snapshot.disk_pct,
            net_mbps: rate.combined_mbps(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] CPU: {:.1}% | RAM: {:.1}% | Disk: {:.1}% | Network: {:.2} MB/s",
            self.timestamp.format("%H:%M:%S"),
            self.cpu_pct,
            self.ram_pct,
            self.disk_pct,
            self.net_mbps,
        )
    }
}

/// Appends records to one file per calendar day under the configured
/// directory. The file handle is scoped to a single append, so day
/// rollover needs no rotation job: the filename is derived from the
/// record's date on every write.
#[derive(Debug)]
pub struct LogWriter {
    directory: PathBuf,
    last_date: Option<NaiveDate>,
}

impl LogWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            last_date: None,
        }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.directory
            .join(format!("log_{}.txt", date.format("%Y-%m-%d")))
    }

    pub fn append(&mut self, record: &LogRecord) -> Result<(), LogWriteError> {
        let date = record.timestamp.date_naive();
        let path = self.path_for(date);
        if self.last_date.replace(date) != Some(date) {
            debug!(target: "LogWriter", "Appending to {:?}", path);
        }
        let written = (|| {
            fs::create_dir_all(&self.directory)?;
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            writeln!(file, "{}", record)
        })();
        written.map_err(|source| LogWriteError { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(h: u32, m: u32, s: u32) -> LogRecord {
        LogRecord {
            timestamp: Local.with_ymd_and_hms(2025, 3, 1, h, m, s).unwrap(),
            cpu_pct: 42.35,
            ram_pct: 61.0,
            disk_pct: 73.51,
            net_mbps: 1.25,
        }
    }

    #[test]
    fn record_renders_fixed_width_line() {
        assert_eq!(
            record_at(9, 5, 7).to_string(),
            "[09:05:07] CPU: 42.3% | RAM: 61.0% | Disk: 73.5% | Network: 1.25 MB/s"
        );
    }

    #[test]
    fn append_creates_directory_and_file_lazily() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");
        let mut writer = LogWriter::new(&dir);
        assert!(!dir.exists());

        writer.append(&record_at(10, 0, 0)).unwrap();
        writer.append(&record_at(10, 0, 1)).unwrap();

        let path = writer.path_for(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        let contents = fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.ends_with("MB/s\n"));
    }

    #[test]
    fn append_reports_unwritable_directory() {
        let tmp = tempfile::tempdir().unwrap();
        // Occupy the directory path with a plain file.
        let blocker = tmp.path().join("logs");
        fs::write(&blocker, b"not a directory").unwrap();

        let mut writer = LogWriter::new(&blocker);
        let err = writer.append(&record_at(10, 0, 0)).unwrap_err();
        assert!(err.to_string().contains("log write"));
    }
}
