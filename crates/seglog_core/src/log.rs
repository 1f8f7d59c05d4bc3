//! The segmented log.
//!
//! A log owns an ordered list of segments sorted by base offset. Their
//! offset ranges are contiguous and the last one is active: it takes all
//! appends until it reaches a size limit, at which point a new segment
//! starting at the next offset takes its place.
//!
//! ## Recovery
//!
//! Opening a directory lists its `<base>.store` / `<base>.index` files,
//! opens one segment per distinct base offset in ascending order, and
//! recovers each segment's next offset from its index. An empty directory
//! yields a single segment at the configured initial offset.
//!
//! ## Locking
//!
//! One reader/writer lock guards the segment list. Appends, truncation,
//! close and reset take it exclusively; reads, offset queries and
//! [`Log::reader`] take it shared.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::reader::LogReader;
use crate::segment::{Segment, SegmentInfo, INDEX_EXT, STORE_EXT};
use parking_lot::RwLock;
use seglog_codec::Record;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A durable, segmented, append-only sequence of records.
///
/// # Example
///
/// ```no_run
/// use seglog_core::{Config, Log, Record};
///
/// let log = Log::open("data/log", Config::default())?;
/// let offset = log.append(Record::new(b"hello".to_vec()))?;
/// assert_eq!(log.read(offset)?.value, b"hello");
/// log.close()?;
/// # Ok::<(), seglog_core::CoreError>(())
/// ```
#[derive(Debug)]
pub struct Log {
    dir: PathBuf,
    config: Config,
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Opens the log stored in `dir`, creating the directory if needed.
    ///
    /// Zero size limits in `config` are replaced by their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the directory
    /// cannot be listed, or a segment cannot be opened.
    pub fn open(dir: impl AsRef<Path>, config: Config) -> CoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        let config = config.normalized();
        config.validate()?;

        let segments = setup(&dir, &config)?;
        info!(
            "Opened log {:?} with {} segment(s), offsets [{}, {})",
            dir,
            segments.len(),
            segments.first().map_or(0, Segment::base_offset),
            segments.last().map_or(0, Segment::next_offset),
        );

        Ok(Self {
            dir,
            config,
            segments: RwLock::new(segments),
        })
    }

    /// Appends a record and returns the offset assigned to it.
    ///
    /// If the active segment is full afterwards, a new segment starting at
    /// the following offset becomes active.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoSegments`] if the log has been closed, or any
    /// codec or I/O error from the active segment.
    pub fn append(&self, mut record: Record) -> CoreResult<u64> {
        let mut segments = self.segments.write();
        let active = segments.last_mut().ok_or(CoreError::NoSegments)?;

        let offset = active.append(&mut record)?;

        if active.is_maxed() {
            let segment = Segment::open(&self.dir, offset + 1, &self.config)?;
            info!("Rotated log {:?} to segment {}", self.dir, offset + 1);
            segments.push(segment);
        }

        Ok(offset)
    }

    /// Reads the record at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OffsetOutOfRange`] if no segment holds `offset`.
    pub fn read(&self, offset: u64) -> CoreResult<Record> {
        let segments = self.segments.read();
        let segment = segments
            .iter()
            .find(|s| s.contains(offset))
            .ok_or_else(|| CoreError::out_of_range(offset))?;

        segment.read(offset)
    }

    /// Returns the base offset of the oldest segment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoSegments`] if the log holds no segments.
    pub fn lowest_offset(&self) -> CoreResult<u64> {
        self.segments
            .read()
            .first()
            .map(Segment::base_offset)
            .ok_or(CoreError::NoSegments)
    }

    /// Returns the offset of the newest record, or 0 if the active segment
    /// would assign offset 0 next.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoSegments`] if the log holds no segments.
    pub fn highest_offset(&self) -> CoreResult<u64> {
        let next = self
            .segments
            .read()
            .last()
            .map(Segment::next_offset)
            .ok_or(CoreError::NoSegments)?;

        Ok(next.saturating_sub(1))
    }

    /// Removes every segment whose records are all at or below `lowest`.
    ///
    /// A segment is removed when its next offset is at most `lowest + 1`.
    /// The boundary is expected to only grow between calls; nothing stops
    /// a boundary past the end from removing the active segment.
    ///
    /// # Errors
    ///
    /// Stops at the first segment that fails to be removed and returns its
    /// error. Segments after it are kept.
    pub fn truncate(&self, lowest: u64) -> CoreResult<()> {
        let mut segments = self.segments.write();
        let boundary = lowest.saturating_add(1);

        let mut iter = std::mem::take(&mut *segments).into_iter();
        let mut removed = 0usize;

        while let Some(segment) = iter.next() {
            if segment.next_offset() <= boundary {
                if let Err(e) = segment.remove() {
                    segments.extend(iter);
                    return Err(e);
                }
                removed += 1;
            } else {
                segments.push(segment);
            }
        }

        if removed > 0 {
            info!(
                "Truncated {} segment(s) at or below offset {} from {:?}",
                removed, lowest, self.dir
            );
        }
        Ok(())
    }

    /// Returns a reader over the raw store bytes of every segment, in
    /// segment order.
    ///
    /// The reader holds the log's shared lock until it is dropped: appends
    /// and truncation wait for it. Do not append to the log from the
    /// thread holding a reader.
    pub fn reader(&self) -> LogReader<'_> {
        LogReader::new(self.segments.read())
    }

    /// Closes every segment in order.
    ///
    /// # Errors
    ///
    /// Stops at the first segment that fails to close. Segments after it
    /// stay open and owned by the log, so `close` can be retried.
    pub fn close(&self) -> CoreResult<()> {
        let mut segments = self.segments.write();
        close_segments(&mut segments)?;
        info!("Closed log {:?}", self.dir);
        Ok(())
    }

    /// Closes the log and deletes its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment fails to close or the directory
    /// cannot be deleted.
    pub fn remove(&self) -> CoreResult<()> {
        let mut segments = self.segments.write();
        self.remove_locked(&mut segments)
    }

    /// Deletes the log and recreates it empty, starting at
    /// the configured initial offset.
    ///
    /// # Errors
    ///
    /// Returns an error if removal or recovery fails.
    pub fn reset(&self) -> CoreResult<()> {
        let mut segments = self.segments.write();
        self.remove_locked(&mut segments)?;
        *segments = setup(&self.dir, &self.config)?;
        info!("Reset log {:?}", self.dir);
        Ok(())
    }

    /// Returns the bookkeeping of every segment, oldest first.
    pub fn segments(&self) -> Vec<SegmentInfo> {
        self.segments.read().iter().map(Segment::info).collect()
    }

    /// Returns the number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.read().len()
    }

    /// Returns the log directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the effective configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn remove_locked(&self, segments: &mut Vec<Segment>) -> CoreResult<()> {
        close_segments(segments)?;
        fs::remove_dir_all(&self.dir)?;
        info!("Removed log {:?}", self.dir);
        Ok(())
    }
}

impl Drop for Log {
    fn drop(&mut self) {
        let segments = self.segments.get_mut();
        if segments.is_empty() {
            return;
        }
        if let Err(e) = close_segments(segments) {
            warn!("Failed to close log {:?} on drop: {}", self.dir, e);
        }
    }
}

/// Opens one segment per base offset found in `dir`, or a single segment
/// at the initial offset if there are none.
fn setup(dir: &Path, config: &Config) -> CoreResult<Vec<Segment>> {
    fs::create_dir_all(dir)?;

    let mut base_offsets = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        match parse_base_offset(&path) {
            Some(base_offset) => base_offsets.push(base_offset),
            None => warn!("Ignoring non-segment file {:?}", path),
        }
    }

    // Each segment shows up twice, once per file.
    base_offsets.sort_unstable();
    base_offsets.dedup();

    if base_offsets.is_empty() {
        base_offsets.push(config.initial_offset);
    }

    let mut segments = Vec::with_capacity(base_offsets.len() + 1);
    if let Err(e) = open_segments(dir, config, &base_offsets, &mut segments) {
        if let Err(close_err) = close_segments(&mut segments) {
            warn!("Failed to close segments after recovery error: {}", close_err);
        }
        return Err(e);
    }

    debug!("Recovered {} segment(s) from {:?}", segments.len(), dir);
    Ok(segments)
}

/// Opens the segments at `base_offsets` in order. If the last one is
/// already full, a fresh active segment is opened after it.
fn open_segments(
    dir: &Path,
    config: &Config,
    base_offsets: &[u64],
    segments: &mut Vec<Segment>,
) -> CoreResult<()> {
    for &base_offset in base_offsets {
        segments.push(Segment::open(dir, base_offset, config)?);
    }

    if let Some(next_offset) = segments
        .last()
        .filter(|s| s.is_maxed())
        .map(Segment::next_offset)
    {
        segments.push(Segment::open(dir, next_offset, config)?);
        info!("Rotated recovered log {:?} to segment {}", dir, next_offset);
    }
    Ok(())
}

/// Parses `<digits>.store` or `<digits>.index` into a base offset.
fn parse_base_offset(path: &Path) -> Option<u64> {
    let ext = path.extension()?.to_str()?;
    if ext != STORE_EXT && ext != INDEX_EXT {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

/// Closes segments front to back, removing each from `segments` once
/// closed. On failure the failing segment is dropped and the rest stay.
fn close_segments(segments: &mut Vec<Segment>) -> CoreResult<()> {
    let mut iter = std::mem::take(segments).into_iter();
    while let Some(segment) = iter.next() {
        if let Err(e) = segment.close() {
            segments.extend(iter);
            return Err(e);
        }
    }
    Ok(())
}
