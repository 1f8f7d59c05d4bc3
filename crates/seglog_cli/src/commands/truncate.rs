//! Truncate command implementation.

use super::{open_existing, LogOptions};
use std::path::Path;

/// Runs the truncate command.
pub fn run(path: &Path, options: &LogOptions, lowest: u64) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_existing(path, options)?;

    let before = log.segment_count();
    let highest = log.highest_offset()?;
    if lowest >= highest {
        return Err(format!(
            "Boundary {lowest} would remove the active segment (highest offset {highest})"
        )
        .into());
    }

    log.truncate(lowest)?;
    println!(
        "Removed {} segment(s); lowest offset is now {}",
        before - log.segment_count(),
        log.lowest_offset()?
    );

    log.close()?;
    Ok(())
}
