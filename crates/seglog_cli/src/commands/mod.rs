//! CLI command implementations.

pub mod append;
pub mod export;
pub mod inspect;
pub mod read;
pub mod reset;
pub mod truncate;

use seglog_core::{Config, Log, RecordFormat};
use std::path::Path;

/// Log settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Store rotation threshold override.
    pub max_store_bytes: Option<u64>,
    /// Index rotation threshold override.
    pub max_index_bytes: Option<u64>,
    /// Initial offset override.
    pub initial_offset: Option<u64>,
    /// Use the raw record format.
    pub raw: bool,
}

impl LogOptions {
    /// Builds the log configuration, starting from the defaults.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(bytes) = self.max_store_bytes {
            config = config.max_store_bytes(bytes);
        }
        if let Some(bytes) = self.max_index_bytes {
            config = config.max_index_bytes(bytes);
        }
        if let Some(offset) = self.initial_offset {
            config = config.initial_offset(offset);
        }
        if self.raw {
            config = config.record_format(RecordFormat::Raw);
        }
        config
    }
}

/// Opens the log at `path` with the given options.
pub fn open_log(path: &Path, options: &LogOptions) -> Result<Log, Box<dyn std::error::Error>> {
    Ok(Log::open(path, options.config())?)
}

/// Opens the log at `path`, failing if the directory does not exist.
pub fn open_existing(path: &Path, options: &LogOptions) -> Result<Log, Box<dyn std::error::Error>> {
    if !path.is_dir() {
        return Err(format!("No log found at {:?}", path).into());
    }
    open_log(path, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_override_defaults() {
        let options = LogOptions {
            max_store_bytes: Some(64),
            max_index_bytes: None,
            initial_offset: Some(9),
            raw: true,
        };
        let config = options.config();

        assert_eq!(config.max_store_bytes, 64);
        assert_eq!(config.max_index_bytes, seglog_core::DEFAULT_MAX_INDEX_BYTES);
        assert_eq!(config.initial_offset, 9);
        assert_eq!(config.record_format, RecordFormat::Raw);
    }

    #[test]
    fn open_existing_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        assert!(open_existing(&missing, &LogOptions::default()).is_err());
        assert!(!missing.exists());
    }
}
