//! Read command implementation.

use super::{open_existing, LogOptions};
use seglog_core::{CoreResult, Log};
use serde::Serialize;
use std::path::Path;

/// Record representation for output.
#[derive(Debug, Serialize)]
pub struct RecordInfo {
    /// Absolute offset.
    pub offset: u64,
    /// Payload size in bytes.
    pub size: usize,
    /// Payload, lossily decoded as UTF-8.
    pub value: String,
}

/// Runs the read command.
pub fn run(
    path: &Path,
    options: &LogOptions,
    start_offset: u64,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_existing(path, options)?;
    let records = read_records(&log, start_offset, limit)?;
    log.close()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        _ => {
            for record in &records {
                println!("{:>8}  {:>6}B  {}", record.offset, record.size, record.value);
            }
        }
    }

    Ok(())
}

/// Reads consecutive records from `start_offset` until the end of the log
/// or `limit` records.
fn read_records(log: &Log, start_offset: u64, limit: Option<usize>) -> CoreResult<Vec<RecordInfo>> {
    let max_records = limit.unwrap_or(usize::MAX);
    let mut records = Vec::new();
    let mut offset = start_offset.max(log.lowest_offset()?);

    while records.len() < max_records {
        let record = match log.read(offset) {
            Ok(record) => record,
            Err(e) if e.is_out_of_range() => break,
            Err(e) => return Err(e),
        };

        records.push(RecordInfo {
            offset: record.offset,
            size: record.value.len(),
            value: String::from_utf8_lossy(&record.value).into_owned(),
        });
        offset += 1;
    }

    Ok(records)
}
