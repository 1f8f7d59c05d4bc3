//! Append command implementation.

use super::{open_log, LogOptions};
use seglog_core::Record;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::info;

/// Runs the append command.
pub fn run(
    path: &Path,
    options: &LogOptions,
    values: Vec<String>,
    from_stdin: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let values = if from_stdin {
        io::stdin().lock().lines().collect::<Result<Vec<_>, _>>()?
    } else {
        values
    };

    if values.is_empty() {
        return Err("Nothing to append".into());
    }

    let log = open_log(path, options)?;
    info!("Appending {} record(s) to {:?}", values.len(), path);

    for value in values {
        let offset = log.append(Record::new(value.into_bytes()))?;
        println!("{offset}");
    }

    log.close()?;
    Ok(())
}
