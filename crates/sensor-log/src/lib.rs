//! # Sensor Log
//!
//! This crate keeps the durable record of raw readings: one CSV line
//! `timestamp,sensor,value` per accepted reading, appended to a file.
//! Aggregated statistics are never written here.
use anyhow::{Context, Result};
use sensor_core::SensorReading;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

// --- Sink Trait ---

/// Destination for accepted readings.
pub trait ReadingSink {
    /// Record one reading received at `timestamp` (Unix seconds).
    fn record(&mut self, reading: &SensorReading, timestamp: u64) -> Result<()>;
}

impl<S: ReadingSink + ?Sized> ReadingSink for Box<S> {
    fn record(&mut self, reading: &SensorReading, timestamp: u64) -> Result<()> {
        (**self).record(reading, timestamp)
    }
}

// --- Line Format ---

/// Format a reading as a CSV line, without the trailing newline.
///
/// The value column is always the raw payload as an unsigned integer.
pub fn csv_line(reading: &SensorReading, timestamp: u64) -> String {
    format!("{},{},{}", timestamp, reading.sensor, reading.value.bits())
}

/// Current wall-clock time in whole Unix seconds.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// --- Sinks ---

/// Appends readings to a CSV file, flushing after every line.
pub struct CsvReadingLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvReadingLog {
    /// Open `path` for appending, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open reading log {}", path.display()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadingSink for CsvReadingLog {
    fn record(&mut self, reading: &SensorReading, timestamp: u64) -> Result<()> {
        writeln!(self.writer, "{}", csv_line(reading, timestamp))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps formatted lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

impl ReadingSink for MemorySink {
    fn record(&mut self, reading: &SensorReading, timestamp: u64) -> Result<()> {
        self.lines.push(csv_line(reading, timestamp));
        Ok(())
    }
}

/// Discards every reading.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReadingSink for NullSink {
    fn record(&mut self, _reading: &SensorReading, _timestamp: u64) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_core::{DataType, Payload, SensorId};
    use std::fs;

    fn reading(sensor: i8, data_type: DataType, value: u64) -> SensorReading {
        SensorReading {
            sensor: SensorId::new(sensor).unwrap(),
            data_type,
            value: Payload::from_bits(value),
        }
    }

    fn temp_log_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "sensor-log-{}-{}.csv",
            std::process::id(),
            name
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_csv_line_format() {
        assert_eq!(
            csv_line(&reading(3, DataType::Int8, 42), 1_700_000_000),
            "1700000000,3,42"
        );
        assert_eq!(
            csv_line(&reading(9, DataType::Uint64, u64::MAX), 0),
            "0,9,18446744073709551615"
        );
    }

    #[test]
    fn test_csv_log_appends_across_reopen() {
        let path = temp_log_path("append");

        {
            let mut log = CsvReadingLog::open(&path).unwrap();
            assert_eq!(log.path(), path.as_path());
            log.record(&reading(0, DataType::Int8, 1), 10).unwrap();
            log.record(&reading(1, DataType::Int32, 2), 11).unwrap();
        }
        {
            let mut log = CsvReadingLog::open(&path).unwrap();
            log.record(&reading(2, DataType::Uint64, 3), 12).unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "10,0,1\n11,1,2\n12,2,3\n");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_open_fails_for_missing_directory() {
        let path = std::env::temp_dir()
            .join(format!("sensor-log-missing-{}", std::process::id()))
            .join("sensors.csv");
        assert!(CsvReadingLog::open(&path).is_err());
    }

    #[test]
    fn test_boxed_memory_sink() {
        let mut sink: Box<MemorySink> = Box::default();
        sink.record(&reading(4, DataType::Int8, 7), 5).unwrap();
        assert_eq!(sink.lines, vec!["5,4,7".to_string()]);
    }
}
