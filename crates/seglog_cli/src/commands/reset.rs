//! Reset command implementation.

use super::{open_existing, LogOptions};
use std::path::Path;

/// Runs the reset command.
pub fn run(path: &Path, options: &LogOptions) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_existing(path, options)?;
    log.reset()?;
    println!("Reset {:?}; next offset is {}", path, log.lowest_offset()?);
    log.close()?;
    Ok(())
}
