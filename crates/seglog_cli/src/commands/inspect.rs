//! Inspect command implementation.

use super::{open_existing, LogOptions};
use serde::Serialize;
use std::path::Path;

/// Log inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Log directory.
    pub path: String,
    /// Record format used to open the log.
    pub record_format: String,
    /// Base offset of the oldest segment.
    pub lowest_offset: u64,
    /// Offset of the newest record.
    pub highest_offset: u64,
    /// Number of records across all segments.
    pub record_count: u64,
    /// Total store bytes across all segments.
    pub store_bytes: u64,
    /// Per-segment statistics.
    pub segments: Vec<SegmentStats>,
}

/// Statistics for a single segment.
#[derive(Debug, Serialize)]
pub struct SegmentStats {
    /// Base offset.
    pub base_offset: u64,
    /// Next offset to assign.
    pub next_offset: u64,
    /// Number of records.
    pub records: u64,
    /// Store file size in bytes.
    pub store_size: u64,
    /// Used index bytes.
    pub index_size: u64,
}

/// Runs the inspect command.
pub fn run(path: &Path, options: &LogOptions, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_existing(path, options)?;
    let result = inspect(&log)?;
    log.close()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn inspect(log: &seglog_core::Log) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let segments: Vec<SegmentStats> = log
        .segments()
        .into_iter()
        .map(|info| SegmentStats {
            base_offset: info.base_offset,
            next_offset: info.next_offset,
            records: info.len(),
            store_size: info.store_size,
            index_size: info.index_size,
        })
        .collect();

    Ok(InspectResult {
        path: log.dir().display().to_string(),
        record_format: log.config().record_format.to_string(),
        lowest_offset: log.lowest_offset()?,
        highest_offset: log.highest_offset()?,
        record_count: segments.iter().map(|s| s.records).sum(),
        store_bytes: segments.iter().map(|s| s.store_size).sum(),
        segments,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Log: {}", result.path);
    println!("  Record format:  {}", result.record_format);
    println!("  Lowest offset:  {}", result.lowest_offset);
    println!("  Highest offset: {}", result.highest_offset);
    println!("  Records:        {}", result.record_count);
    println!("  Store bytes:    {}", result.store_bytes);
    println!();
    println!("Segments ({}):", result.segments.len());
    for segment in &result.segments {
        println!(
            "  [{}, {})  records={}  store={}B  index={}B",
            segment.base_offset,
            segment.next_offset,
            segment.records,
            segment.store_size,
            segment.index_size
        );
    }
}
