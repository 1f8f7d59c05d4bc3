//! Concurrent access tests.

use seglog_core::{Log, RecordFormat};
use seglog_testkit::prelude::*;
use std::io::Read;
use std::sync::Arc;
use std::thread;

#[test]
fn readers_see_acknowledged_records_during_appends() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(Log::open(dir.path(), small_segment_config(RecordFormat::Cbor)).unwrap());

    let config = StressConfig {
        operations: 500,
        threads: 4,
        payload_size: 40,
    };
    let result = stress_concurrent_readers_writer(Arc::clone(&log), &config);
    println!("readers during appends: {result}");

    assert_eq!(result.failures, 0);
    assert_eq!(log.highest_offset().unwrap(), 499);
    assert_eq!(read_all(&log).unwrap().len(), 500);
}

#[test]
fn export_runs_alongside_appenders() {
    let log = Arc::new(TestLog::small_segments(RecordFormat::Raw));
    fill_log(&log, 20, 8);

    let writer = {
        let log = Arc::clone(&log);
        thread::spawn(move || fill_log(&log, 100, 8))
    };

    // Each export sees a whole number of entries.
    for _ in 0..20 {
        let mut bytes = Vec::new();
        log.reader().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes.len() % 16, 0);
        assert!(bytes.len() >= 20 * 16);
    }

    let offsets = writer.join().unwrap();
    assert_eq!(offsets.len(), 100);
    assert_eq!(log.highest_offset().unwrap(), 119);
}
