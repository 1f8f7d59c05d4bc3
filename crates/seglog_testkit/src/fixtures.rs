//! Test fixtures and log helpers.
//!
//! Provides convenience functions for setting up logs in temporary
//! directories.

use seglog_core::{Config, Log, Record, RecordFormat};
use std::path::Path;
use tempfile::TempDir;

/// A test log with automatic cleanup.
pub struct TestLog {
    /// The log instance.
    pub log: Log,
    config: Config,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TestLog {
    /// Creates a log with `config` in a fresh temporary directory.
    pub fn new(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let log = Log::open(temp_dir.path(), config.clone()).expect("Failed to open log");
        Self {
            log,
            config,
            temp_dir,
        }
    }

    /// Creates a log with small segments so that tests rotate often.
    pub fn small_segments(format: RecordFormat) -> Self {
        Self::new(small_segment_config(format))
    }

    /// Returns the log directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Closes the log and opens the same directory again.
    pub fn reopen(self) -> Self {
        let Self {
            log,
            config,
            temp_dir,
        } = self;
        log.close().expect("Failed to close log");
        drop(log);

        let log = Log::open(temp_dir.path(), config.clone()).expect("Failed to reopen log");
        Self {
            log,
            config,
            temp_dir,
        }
    }
}

impl std::ops::Deref for TestLog {
    type Target = Log;

    fn deref(&self) -> &Self::Target {
        &self.log
    }
}

/// A configuration whose segments hold a handful of small records.
pub fn small_segment_config(format: RecordFormat) -> Config {
    Config::new()
        .max_store_bytes(128)
        .max_index_bytes(12 * 4)
        .record_format(format)
}

/// Runs a test with a temporary log.
///
/// # Example
///
/// ```rust,ignore
/// use seglog_testkit::with_temp_log;
///
/// #[test]
/// fn my_test() {
///     with_temp_log(Config::default(), |log| {
///         log.append(Record::from("a")).unwrap();
///     });
/// }
/// ```
pub fn with_temp_log<F, R>(config: Config, f: F) -> R
where
    F: FnOnce(&Log) -> R,
{
    let test_log = TestLog::new(config);
    f(&test_log)
}

/// Deterministic payload of `size` bytes for record number `i`.
pub fn payload(i: usize, size: usize) -> Vec<u8> {
    let mut bytes = format!("record-{i:08}").into_bytes();
    bytes.resize(size, (i % 251) as u8);
    bytes
}

/// Appends `count` records of `size` bytes and returns their offsets.
pub fn fill_log(log: &Log, count: usize, size: usize) -> Vec<u64> {
    (0..count)
        .map(|i| {
            log.append(Record::new(payload(i, size)))
                .expect("Failed to append record")
        })
        .collect()
}

/// Reads every record from the lowest to the highest offset.
///
/// Returns the payloads in offset order, or a description of the first
/// offset that could not be read.
pub fn read_all(log: &Log) -> Result<Vec<Vec<u8>>, String> {
    let lowest = log.lowest_offset().map_err(|e| e.to_string())?;
    let next = log
        .segments()
        .last()
        .map(|s| s.next_offset)
        .ok_or("log has no segments")?;

    (lowest..next)
        .map(|offset| match log.read(offset) {
            Ok(record) if record.offset == offset => Ok(record.value),
            Ok(record) => Err(format!(
                "offset {offset} returned a record with offset {}",
                record.offset
            )),
            Err(e) => Err(format!("offset {offset}: {e}")),
        })
        .collect()
}
