//! Stress tests for SegLog.
//!
//! These helpers drive a log under sustained and concurrent load.

use crate::fixtures::payload;
use seglog_core::{Log, Record};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Record and byte counts of a stress run.
#[derive(Debug, Clone, Default)]
pub struct StressTestResult {
    /// Appends or reads that returned the expected record.
    pub records: usize,
    /// Appends or reads that failed or returned the wrong record.
    pub failures: usize,
    /// Payload bytes moved by the successful operations.
    pub payload_bytes: u64,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl StressTestResult {
    fn succeeded(&mut self, payload_len: usize) {
        self.records += 1;
        self.payload_bytes += payload_len as u64;
    }

    fn absorb(&mut self, other: &Self) {
        self.records += other.records;
        self.failures += other.failures;
        self.payload_bytes += other.payload_bytes;
    }

    /// Returns successful records per second.
    pub fn records_per_second(&self) -> f64 {
        rate(self.records as f64, self.elapsed)
    }

    /// Returns payload MiB per second.
    pub fn mib_per_second(&self) -> f64 {
        rate(self.payload_bytes as f64 / (1024.0 * 1024.0), self.elapsed)
    }
}

fn rate(amount: f64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        amount / secs
    } else {
        0.0
    }
}

impl fmt::Display for StressTestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records ({} failed), {} payload bytes in {:?}: {:.0} records/s, {:.2} MiB/s",
            self.records,
            self.failures,
            self.payload_bytes,
            self.elapsed,
            self.records_per_second(),
            self.mib_per_second()
        )
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations per thread.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
    /// Payload size in bytes.
    pub payload_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
            payload_size: 64,
        }
    }
}

/// Run a sequential append stress test.
pub fn stress_sequential_appends(log: &Log, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let mut result = StressTestResult::default();

    for i in 0..config.operations {
        match log.append(Record::new(payload(i, config.payload_size))) {
            Ok(_) => result.succeeded(config.payload_size),
            Err(_) => result.failures += 1,
        }
    }

    result.elapsed = start.elapsed();
    result
}

/// Run a sequential read stress test over the records already in the log.
pub fn stress_sequential_reads(log: &Log, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let mut result = StressTestResult::default();

    let (lowest, highest) = match (log.lowest_offset(), log.highest_offset()) {
        (Ok(lowest), Ok(highest)) => (lowest, highest),
        _ => {
            result.failures = config.operations;
            result.elapsed = start.elapsed();
            return result;
        }
    };
    let span = highest - lowest + 1;

    for i in 0..config.operations {
        let offset = lowest + (i as u64 % span);
        match log.read(offset) {
            Ok(record) if record.offset == offset => result.succeeded(record.len()),
            _ => result.failures += 1,
        }
    }

    result.elapsed = start.elapsed();
    result
}

/// Appends from several threads at once.
///
/// Returns the combined result and every offset that was handed out.
pub fn stress_concurrent_appends(
    log: Arc<Log>,
    config: &StressConfig,
) -> (StressTestResult, Vec<u64>) {
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let log = Arc::clone(&log);
            let operations = config.operations;
            let payload_size = config.payload_size;
            thread::spawn(move || {
                let mut offsets = Vec::with_capacity(operations);
                let mut result = StressTestResult::default();
                for i in 0..operations {
                    match log.append(Record::new(payload(t * operations + i, payload_size))) {
                        Ok(offset) => {
                            offsets.push(offset);
                            result.succeeded(payload_size);
                        }
                        Err(_) => result.failures += 1,
                    }
                }
                (offsets, result)
            })
        })
        .collect();

    let mut offsets = Vec::new();
    let mut total = StressTestResult::default();
    for handle in handles {
        let (thread_offsets, result) = handle.join().expect("Append thread panicked");
        total.absorb(&result);
        offsets.extend(thread_offsets);
    }

    total.elapsed = start.elapsed();
    (total, offsets)
}

/// Appends from one thread while others read random earlier offsets.
///
/// Readers only request offsets that were already acknowledged, so every
/// read is expected to succeed.
pub fn stress_concurrent_readers_writer(log: Arc<Log>, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let done = Arc::new(AtomicBool::new(false));
    let mut total = StressTestResult::default();

    // Seed one record so readers always have something to read.
    let first = log
        .append(Record::new(payload(0, config.payload_size)))
        .expect("Failed to seed log");
    total.succeeded(config.payload_size);

    let readers: Vec<_> = (0..config.threads.saturating_sub(1).max(1))
        .map(|t| {
            let log = Arc::clone(&log);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut result = StressTestResult::default();
                let mut i = t as u64;
                while !done.load(Ordering::Acquire) {
                    let Ok(highest) = log.highest_offset() else {
                        result.failures += 1;
                        continue;
                    };
                    let offset = first + i % (highest - first + 1);
                    match log.read(offset) {
                        Ok(record) if record.offset == offset => result.succeeded(record.len()),
                        _ => result.failures += 1,
                    }
                    i = i.wrapping_mul(31).wrapping_add(7);
                }
                result
            })
        })
        .collect();

    for i in 1..config.operations {
        match log.append(Record::new(payload(i, config.payload_size))) {
            Ok(_) => total.succeeded(config.payload_size),
            Err(_) => total.failures += 1,
        }
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        total.absorb(&reader.join().expect("Reader thread panicked"));
    }

    total.elapsed = start.elapsed();
    total
}
