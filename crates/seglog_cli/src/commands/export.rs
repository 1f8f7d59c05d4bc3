//! Export command implementation.

use super::{open_existing, LogOptions};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Runs the export command.
pub fn run(path: &Path, options: &LogOptions, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let log = open_existing(path, options)?;

    let mut writer = BufWriter::new(File::create(output)?);
    let bytes = {
        let mut reader = log.reader();
        io::copy(&mut reader, &mut writer)?
    };
    writer.flush()?;
    writer.get_ref().sync_all()?;

    info!("Exported {} bytes from {:?} to {:?}", bytes, path, output);
    println!("{bytes}");

    log.close()?;
    Ok(())
}
