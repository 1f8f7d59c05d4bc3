//! Property tests for the segmented log.

use proptest::prelude::*;
use seglog_core::{Config, Log, Record, RecordFormat};
use seglog_testkit::prelude::*;
use std::io::Read;
use tempfile::tempdir;

/// Checks that segments are sorted, contiguous and only the last may be
/// below its limits.
fn assert_segment_layout(log: &Log) -> Result<(), TestCaseError> {
    let segments = log.segments();
    prop_assert!(!segments.is_empty());
    for pair in segments.windows(2) {
        prop_assert!(pair[0].base_offset <= pair[0].next_offset);
        prop_assert_eq!(pair[0].next_offset, pair[1].base_offset);
    }
    Ok(())
}

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn appended_records_read_back(
        config in small_config_strategy(),
        payloads in payload_batch_strategy(1, 40),
    ) {
        let dir = tempdir().unwrap();
        let log = Log::open(dir.path(), config.clone()).unwrap();

        for (i, payload) in payloads.iter().enumerate() {
            let offset = log.append(Record::new(payload.clone())).unwrap();
            prop_assert_eq!(offset, config.initial_offset + i as u64);
        }

        for (i, payload) in payloads.iter().enumerate() {
            let offset = config.initial_offset + i as u64;
            let record = log.read(offset).unwrap();
            prop_assert_eq!(&record.value, payload);
            prop_assert_eq!(record.offset, offset);
        }

        prop_assert_eq!(log.lowest_offset().unwrap(), config.initial_offset);
        prop_assert_eq!(
            log.highest_offset().unwrap(),
            config.initial_offset + payloads.len() as u64 - 1
        );
        assert_segment_layout(&log)?;
    }

    #[test]
    fn reads_outside_the_log_are_out_of_range(
        config in small_config_strategy(),
        payloads in payload_batch_strategy(0, 20),
    ) {
        let dir = tempdir().unwrap();
        let log = Log::open(dir.path(), config.clone()).unwrap();
        for payload in &payloads {
            log.append(Record::new(payload.clone())).unwrap();
        }

        let end = config.initial_offset + payloads.len() as u64;
        prop_assert!(log.read(end).unwrap_err().is_out_of_range());
        prop_assert!(log.read(end + 100).unwrap_err().is_out_of_range());
        if config.initial_offset > 0 {
            prop_assert!(log.read(config.initial_offset - 1).unwrap_err().is_out_of_range());
        }
    }

    #[test]
    fn raw_export_is_length_prefixed_payloads(
        config in small_config_strategy(),
        payloads in payload_batch_strategy(0, 30),
    ) {
        let dir = tempdir().unwrap();
        let log = Log::open(dir.path(), config.record_format(RecordFormat::Raw)).unwrap();
        for payload in &payloads {
            log.append(Record::new(payload.clone())).unwrap();
        }

        let mut exported = Vec::new();
        log.reader().read_to_end(&mut exported).unwrap();

        let mut expected = Vec::new();
        for payload in &payloads {
            expected.extend_from_slice(&(payload.len() as u64).to_be_bytes());
            expected.extend_from_slice(payload);
        }
        prop_assert_eq!(exported, expected);
    }

    #[test]
    fn default_limits_keep_every_append_addressable(
        payloads in prop::collection::vec(payload_strategy(4), 90..300),
    ) {
        let dir = tempdir().unwrap();
        let log = Log::open(dir.path(), Config::new().record_format(RecordFormat::Raw)).unwrap();
        for (i, payload) in payloads.iter().enumerate() {
            prop_assert_eq!(log.append(Record::new(payload.clone())).unwrap(), i as u64);
        }
        prop_assert!(log.segment_count() > 1);

        let mut exported = Vec::new();
        log.reader().read_to_end(&mut exported).unwrap();
        let addressable: usize = payloads.iter().map(|p| p.len() + 8).sum();
        prop_assert_eq!(exported.len(), addressable);
        prop_assert_eq!(read_all(&log).unwrap(), payloads);
    }

    #[test]
    fn truncation_keeps_records_above_boundary(
        config in small_config_strategy(),
        payloads in payload_batch_strategy(2, 40),
        cut in any::<prop::sample::Index>(),
    ) {
        let dir = tempdir().unwrap();
        let log = Log::open(dir.path(), config.clone()).unwrap();
        for payload in &payloads {
            log.append(Record::new(payload.clone())).unwrap();
        }

        // Boundaries below the highest offset never reach the active segment.
        let relative = cut.index(payloads.len() - 1) as u64;
        let lowest = config.initial_offset + relative;
        log.truncate(lowest).unwrap();

        for segment in log.segments() {
            prop_assert!(segment.next_offset > lowest + 1);
        }
        let new_lowest = log.lowest_offset().unwrap();
        prop_assert!(new_lowest <= lowest + 1);

        for offset in new_lowest..config.initial_offset + payloads.len() as u64 {
            let i = (offset - config.initial_offset) as usize;
            prop_assert_eq!(&log.read(offset).unwrap().value, &payloads[i]);
        }
        if new_lowest > config.initial_offset {
            prop_assert!(log.read(new_lowest - 1).unwrap_err().is_out_of_range());
        }
        assert_segment_layout(&log)?;
    }

    #[test]
    fn reopening_between_appends_preserves_everything(
        config in small_config_strategy(),
        operations in operation_sequence_strategy(1, 40),
    ) {
        let dir = tempdir().unwrap();
        let mut log = Log::open(dir.path(), config.clone()).unwrap();
        let mut expected: Vec<Vec<u8>> = Vec::new();

        for operation in operations {
            match operation {
                LogOperation::Append(payload) => {
                    let offset = log.append(Record::new(payload.clone())).unwrap();
                    prop_assert_eq!(offset, config.initial_offset + expected.len() as u64);
                    expected.push(payload);
                }
                LogOperation::Reopen => {
                    log.close().unwrap();
                    drop(log);
                    log = Log::open(dir.path(), config.clone()).unwrap();
                }
            }
        }

        prop_assert_eq!(read_all(&log).unwrap(), expected);
        assert_segment_layout(&log)?;
    }
}

#[test]
fn durability_scenarios_pass() {
    let harness = DurabilityHarness::new(Config::new().max_store_bytes(256).max_index_bytes(60));
    for result in harness.run_all() {
        assert!(result.passed, "{result:?}");
    }
}
