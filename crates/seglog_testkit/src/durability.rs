//! Close/reopen durability testing for SegLog.
//!
//! Each scenario writes records, closes the log cleanly, reopens the same
//! directory and checks that every acknowledged record reads back with its
//! offset and that appends resume at the next offset.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use seglog_testkit::durability::DurabilityHarness;
//!
//! let harness = DurabilityHarness::new(config);
//! assert!(harness.test_reopen_after_rotation().passed);
//! ```

use crate::fixtures::{payload, read_all};
use seglog_core::{Config, Log, Record};
use tempfile::TempDir;

/// Result of a durability scenario.
#[derive(Debug, Clone)]
pub struct DurabilityResult {
    /// Whether the scenario passed.
    pub passed: bool,
    /// Description of what was tested.
    pub description: String,
    /// Records expected after reopening.
    pub expected_records: usize,
    /// Records found after reopening.
    pub actual_records: usize,
    /// Any error message.
    pub error: Option<String>,
}

impl DurabilityResult {
    /// Creates a passing result.
    pub fn pass(description: &str, records: usize) -> Self {
        Self {
            passed: true,
            description: description.to_string(),
            expected_records: records,
            actual_records: records,
            error: None,
        }
    }

    /// Creates a failing result.
    pub fn fail(description: &str, expected: usize, actual: usize, error: &str) -> Self {
        Self {
            passed: false,
            description: description.to_string(),
            expected_records: expected,
            actual_records: actual,
            error: Some(error.to_string()),
        }
    }
}

/// Runs durability scenarios against fresh temporary directories.
#[derive(Debug, Clone)]
pub struct DurabilityHarness {
    config: Config,
}

impl DurabilityHarness {
    /// Creates a harness that opens every log with `config`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Writes a few records into one segment and reopens.
    pub fn test_reopen_single_segment(&self) -> DurabilityResult {
        self.run("reopen with a single segment", 3, 16, None)
    }

    /// Writes enough records to rotate several times and reopens.
    pub fn test_reopen_after_rotation(&self) -> DurabilityResult {
        self.run("reopen after rotation", 50, 32, None)
    }

    /// Truncates old segments before reopening.
    pub fn test_reopen_after_truncate(&self) -> DurabilityResult {
        self.run("reopen after truncate", 50, 32, Some(20))
    }

    /// Reopens a log that never received a record.
    pub fn test_reopen_empty(&self) -> DurabilityResult {
        self.run("reopen empty log", 0, 0, None)
    }

    /// Runs every scenario.
    pub fn run_all(&self) -> Vec<DurabilityResult> {
        vec![
            self.test_reopen_empty(),
            self.test_reopen_single_segment(),
            self.test_reopen_after_rotation(),
            self.test_reopen_after_truncate(),
        ]
    }

    fn run(
        &self,
        description: &str,
        count: usize,
        size: usize,
        truncate_at: Option<u64>,
    ) -> DurabilityResult {
        match self.try_run(count, size, truncate_at) {
            Ok(Ok(actual)) => DurabilityResult::pass(description, actual),
            Ok(Err((expected, actual, error))) => {
                DurabilityResult::fail(description, expected, actual, &error)
            }
            Err(e) => DurabilityResult::fail(description, count, 0, &e.to_string()),
        }
    }

    /// Outer error: the log failed. Inner error: the contents were wrong.
    #[allow(clippy::type_complexity)]
    fn try_run(
        &self,
        count: usize,
        size: usize,
        truncate_at: Option<u64>,
    ) -> Result<Result<usize, (usize, usize, String)>, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let initial = self.config.initial_offset;

        let log = Log::open(temp_dir.path(), self.config.clone())?;
        for i in 0..count {
            let offset = log.append(Record::new(payload(i, size)))?;
            if offset != initial + i as u64 {
                return Ok(Err((count, i, format!("append {i} got offset {offset}"))));
            }
        }
        if let Some(lowest) = truncate_at {
            log.truncate(initial + lowest)?;
        }
        let lowest_before = log.lowest_offset()?;
        let highest_before = log.highest_offset()?;
        log.close()?;
        drop(log);

        let log = Log::open(temp_dir.path(), self.config.clone())?;
        let lowest = log.lowest_offset()?;
        let highest = log.highest_offset()?;
        if (lowest, highest) != (lowest_before, highest_before) {
            return Ok(Err((
                count,
                0,
                format!(
                    "offsets [{lowest_before}, {highest_before}] became [{lowest}, {highest}]"
                ),
            )));
        }

        let values = read_all(&log)?;
        let skipped = (lowest - initial) as usize;
        let expected = count - skipped.min(count);
        if values.len() != expected {
            return Ok(Err((expected, values.len(), "record count changed".into())));
        }
        for (n, value) in values.iter().enumerate() {
            if *value != payload(skipped + n, size) {
                return Ok(Err((
                    expected,
                    values.len(),
                    format!("payload at offset {} changed", lowest + n as u64),
                )));
            }
        }

        let next = log.append(Record::new(payload(count, size)))?;
        if next != initial + count as u64 {
            return Ok(Err((
                expected,
                values.len(),
                format!("append after reopen got offset {next}"),
            )));
        }
        log.close()?;

        Ok(Ok(values.len()))
    }
}
