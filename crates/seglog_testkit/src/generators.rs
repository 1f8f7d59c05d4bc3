//! Property-based test generators using proptest.
//!
//! Provides strategies for payloads and log configurations that keep the
//! log's invariants satisfiable.

use proptest::prelude::*;
use seglog_core::{Config, RecordFormat};

/// Width of one index entry in bytes.
const ENTRY_WIDTH: u64 = 12;

/// Strategy for generating record payloads (arbitrary bytes).
pub fn payload_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Strategy for generating a batch of payloads.
pub fn payload_batch_strategy(
    min_records: usize,
    max_records: usize,
) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(payload_strategy(64), min_records..max_records)
}

/// Strategy for the record format.
pub fn record_format_strategy() -> impl Strategy<Value = RecordFormat> {
    prop_oneof![Just(RecordFormat::Cbor), Just(RecordFormat::Raw)]
}

/// Strategy for configurations with small segments.
///
/// Index limits range over any byte count that holds at least one entry,
/// including ones that leave a partial entry of slack.
pub fn small_config_strategy() -> impl Strategy<Value = Config> {
    (
        16u64..256,
        ENTRY_WIDTH..ENTRY_WIDTH * 8,
        0u64..1_000,
        record_format_strategy(),
    )
        .prop_map(|(max_store_bytes, max_index_bytes, initial_offset, format)| {
            Config::new()
                .max_store_bytes(max_store_bytes)
                .max_index_bytes(max_index_bytes)
                .initial_offset(initial_offset)
                .record_format(format)
        })
}

/// An operation applied to a log.
#[derive(Debug, Clone)]
pub enum LogOperation {
    /// Append a record.
    Append(Vec<u8>),
    /// Close and reopen the log.
    Reopen,
}

/// Strategy for generating a single log operation.
pub fn log_operation_strategy() -> impl Strategy<Value = LogOperation> {
    prop_oneof![
        9 => payload_strategy(48).prop_map(LogOperation::Append),
        1 => Just(LogOperation::Reopen),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<LogOperation>> {
    prop::collection::vec(log_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 64,
            max_shrink_iters: 500,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 16,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn small_configs_are_valid(config in small_config_strategy()) {
            prop_assert!(config.validate().is_ok());
            prop_assert!(config.max_index_bytes >= ENTRY_WIDTH);
        }

        #[test]
        fn payloads_respect_bound(payload in payload_strategy(16)) {
            prop_assert!(payload.len() <= 16);
        }
    }
}
