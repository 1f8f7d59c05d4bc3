//! A segment: one store plus one index sharing a base offset.
//!
//! Segment files live side by side in the log directory:
//!
//! ```text
//! <dir>/
//! ├─ 0.store     0.index      # records [0, 3)
//! └─ 3.store     3.index      # records [3, ...)
//! ```

use crate::config::Config;
use crate::encoding::{ENTRY_WIDTH, LEN_WIDTH};
use crate::error::{CoreError, CoreResult};
use crate::index::Index;
use crate::store::Store;
use seglog_codec::{Record, RecordFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extension of store files.
pub(crate) const STORE_EXT: &str = "store";

/// File extension of index files.
pub(crate) const INDEX_EXT: &str = "index";

/// Bookkeeping of one segment, as reported by [`crate::Log::segments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentInfo {
    /// Offset of the first record the segment may hold.
    pub base_offset: u64,
    /// Offset the segment assigns to its next record.
    pub next_offset: u64,
    /// Store file size in bytes.
    pub store_size: u64,
    /// Bytes of the index holding entries.
    pub index_size: u64,
}

impl SegmentInfo {
    /// Returns the number of records in the segment.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.next_offset - self.base_offset
    }

    /// Returns true if the segment holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next_offset == self.base_offset
    }
}

/// A bounded, contiguous range of the log.
///
/// Holds the records in `[base_offset, next_offset)`. Segments do no
/// locking of their own; the log serializes access.
#[derive(Debug)]
pub(crate) struct Segment {
    base_offset: u64,
    next_offset: u64,
    store: Store,
    index: Index,
    max_store_bytes: u64,
    max_index_bytes: u64,
    record_format: RecordFormat,
}

impl Segment {
    /// Opens or creates the segment with `base_offset` in `dir`.
    ///
    /// The next offset is recovered from the last index entry; an empty
    /// index means the segment holds no records yet. Trailing entries that
    /// do not point at a record in the store are dropped first.
    pub(crate) fn open(dir: &Path, base_offset: u64, config: &Config) -> CoreResult<Self> {
        let store = Store::open(&segment_path(dir, base_offset, STORE_EXT))?;
        let mut index = Index::open(
            &segment_path(dir, base_offset, INDEX_EXT),
            config.max_index_bytes,
        )?;

        let valid = valid_entries(&index, store.size())?;
        if valid < index.entries() {
            warn!(
                "Segment {} index holds {} entries, recovered {}",
                base_offset,
                index.entries(),
                valid
            );
            index.truncate(valid);
        }

        let next_offset = match index.last() {
            Ok(entry) => base_offset + u64::from(entry.relative_offset) + 1,
            Err(CoreError::IndexEof { .. }) => base_offset,
            Err(e) => return Err(e),
        };

        debug!(
            "Opened segment {} with next offset {}, store size {}",
            base_offset,
            next_offset,
            store.size()
        );

        Ok(Self {
            base_offset,
            next_offset,
            store,
            index,
            max_store_bytes: config.max_store_bytes,
            max_index_bytes: config.max_index_bytes,
            record_format: config.record_format,
        })
    }

    /// Appends a record, assigning it the next offset.
    ///
    /// Returns the assigned offset.
    pub(crate) fn append(&mut self, record: &mut Record) -> CoreResult<u64> {
        let current = self.next_offset;
        let relative = u32::try_from(current - self.base_offset).map_err(|_| {
            CoreError::IndexFull {
                size: self.index.size(),
                capacity: self.max_index_bytes,
            }
        })?;
        // A rejected append must not leave bytes in the store.
        self.index.check_room()?;

        record.offset = current;
        let encoded = self.record_format.encode(record)?;
        let (_, position) = self.store.append(&encoded)?;
        self.index.write(relative, position)?;

        self.next_offset += 1;
        Ok(current)
    }

    /// Reads the record at absolute `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OffsetOutOfRange`] if `offset` is below the
    /// base offset, and an end-of-index error if it is past the last entry.
    pub(crate) fn read(&self, offset: u64) -> CoreResult<Record> {
        let relative = offset
            .checked_sub(self.base_offset)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| CoreError::out_of_range(offset))?;

        let entry = self.index.read(relative)?;
        let bytes = self.store.read(entry.position)?;
        Ok(self.record_format.decode(&bytes, offset)?)
    }

    /// Returns true once the store reached its size limit or the index
    /// limit leaves no room for another entry.
    pub(crate) fn is_maxed(&self) -> bool {
        self.store.size() >= self.max_store_bytes
            || self.index.size() + ENTRY_WIDTH > self.max_index_bytes
    }

    /// Returns true if `offset` falls in `[base_offset, next_offset)`.
    pub(crate) fn contains(&self, offset: u64) -> bool {
        self.base_offset <= offset && offset < self.next_offset
    }

    pub(crate) fn base_offset(&self) -> u64 {
        self.base_offset
    }

    pub(crate) fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    /// Returns a snapshot of the segment's bookkeeping.
    pub(crate) fn info(&self) -> SegmentInfo {
        SegmentInfo {
            base_offset: self.base_offset,
            next_offset: self.next_offset,
            store_size: self.store.size(),
            index_size: self.index.size(),
        }
    }

    /// Closes the index, then the store.
    pub(crate) fn close(self) -> CoreResult<()> {
        let base_offset = self.base_offset;
        self.index.close()?;
        self.store.close()?;
        debug!("Closed segment {}", base_offset);
        Ok(())
    }

    /// Closes the segment and deletes its files.
    pub(crate) fn remove(self) -> CoreResult<()> {
        let base_offset = self.base_offset;
        let index_path = self.index.path().to_path_buf();
        let store_path = self.store.path().to_path_buf();

        self.close()?;
        fs::remove_file(&index_path)?;
        fs::remove_file(&store_path)?;

        debug!("Removed segment {}", base_offset);
        Ok(())
    }
}

fn segment_path(dir: &Path, base_offset: u64, ext: &str) -> PathBuf {
    dir.join(format!("{base_offset}.{ext}"))
}

/// Counts the leading index entries that name their own slot and point
/// inside the store.
///
/// An index that was never closed keeps its pre-allocated length, so its
/// tail is zeroed slots, and entries written after the last store flush
/// point past the end of the store. Both only occur after the valid
/// prefix, which makes the count a binary search.
fn valid_entries(index: &Index, store_size: u64) -> CoreResult<u64> {
    let is_valid = |n: u64| -> CoreResult<bool> {
        let Ok(slot) = u32::try_from(n) else {
            return Ok(false);
        };
        let entry = index.read(slot)?;
        Ok(entry.relative_offset == slot && entry.position.saturating_add(LEN_WIDTH) <= store_size)
    };

    let (mut low, mut high) = (0, index.entries());
    while low < high {
        let mid = low + (high - low) / 2;
        if is_valid(mid)? {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    Ok(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PAYLOAD: &[u8] = b"hello world";

    fn raw_config() -> Config {
        Config::new()
            .max_store_bytes(1024)
            .max_index_bytes(ENTRY_WIDTH * 3)
            .record_format(RecordFormat::Raw)
    }

    #[test]
    fn append_assigns_offsets_from_base() {
        let dir = tempdir().unwrap();
        let mut segment = Segment::open(dir.path(), 16, &raw_config()).unwrap();
        assert_eq!(segment.next_offset(), 16);

        for i in 0..3u64 {
            let mut record = Record::new(PAYLOAD);
            let offset = segment.append(&mut record).unwrap();
            assert_eq!(offset, 16 + i);
            assert_eq!(record.offset, offset);

            let read = segment.read(offset).unwrap();
            assert_eq!(read.value, PAYLOAD);
            assert_eq!(read.offset, offset);
        }

        assert!(segment.is_maxed(), "index limit of three entries reached");
        let store_size = segment.info().store_size;
        let err = segment.append(&mut Record::new(PAYLOAD)).unwrap_err();
        assert!(err.is_eof());
        assert_eq!(segment.info().store_size, store_size);
        assert_eq!(segment.next_offset(), 19);
    }

    #[test]
    fn maxed_when_index_limit_is_not_a_whole_entry() {
        let dir = tempdir().unwrap();
        let config = raw_config().max_index_bytes(ENTRY_WIDTH * 2 + 6);
        let mut segment = Segment::open(dir.path(), 0, &config).unwrap();

        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        assert!(!segment.is_maxed());
        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        assert!(segment.is_maxed(), "six bytes left cannot hold an entry");
    }

    #[test]
    fn unclosed_segment_recovers_flushed_records() {
        let dir = tempdir().unwrap();
        let config = raw_config().max_index_bytes(1024);

        let mut segment = Segment::open(dir.path(), 4, &config).unwrap();
        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        // Reading flushes the store; the third record stays buffered.
        segment.read(5).unwrap();
        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        std::mem::forget(segment);

        assert_eq!(
            fs::metadata(dir.path().join("4.index")).unwrap().len(),
            1024
        );

        let mut segment = Segment::open(dir.path(), 4, &config).unwrap();
        assert_eq!(segment.next_offset(), 6);
        assert_eq!(segment.info().index_size, ENTRY_WIDTH * 2);
        assert_eq!(segment.read(5).unwrap().value, PAYLOAD);
        assert!(!segment.is_maxed());

        assert_eq!(segment.append(&mut Record::new(b"next".to_vec())).unwrap(), 6);
        assert_eq!(segment.read(6).unwrap().value, b"next");
    }

    #[test]
    fn unclosed_empty_segment_recovers_empty() {
        let dir = tempdir().unwrap();
        let config = raw_config().max_index_bytes(1024);

        std::mem::forget(Segment::open(dir.path(), 0, &config).unwrap());

        let mut segment = Segment::open(dir.path(), 0, &config).unwrap();
        assert_eq!(segment.next_offset(), 0);
        assert_eq!(segment.info().index_size, 0);
        assert_eq!(segment.append(&mut Record::new(PAYLOAD)).unwrap(), 0);
    }

    #[test]
    fn maxed_by_store_size() {
        let dir = tempdir().unwrap();
        let config = raw_config()
            .max_index_bytes(1024)
            .max_store_bytes((PAYLOAD.len() as u64 + LEN_WIDTH) * 3);
        let mut segment = Segment::open(dir.path(), 0, &config).unwrap();

        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        assert!(!segment.is_maxed());
        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        assert!(segment.is_maxed());
    }

    #[test]
    fn reopen_recovers_next_offset() {
        let dir = tempdir().unwrap();
        let config = raw_config().max_index_bytes(1024);

        let mut segment = Segment::open(dir.path(), 16, &config).unwrap();
        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        segment.close().unwrap();

        let segment = Segment::open(dir.path(), 16, &config).unwrap();
        assert_eq!(segment.next_offset(), 18);
        assert_eq!(segment.read(17).unwrap().value, PAYLOAD);
        assert!(!segment.is_maxed());
    }

    #[test]
    fn cbor_records_roundtrip() {
        let dir = tempdir().unwrap();
        let config = Config::new();
        let mut segment = Segment::open(dir.path(), 5, &config).unwrap();

        let offset = segment.append(&mut Record::new(b"cbor".to_vec())).unwrap();
        let record = segment.read(offset).unwrap();
        assert_eq!(record, Record::with_offset(b"cbor".to_vec(), 5));
    }

    #[test]
    fn read_outside_segment() {
        let dir = tempdir().unwrap();
        let mut segment = Segment::open(dir.path(), 10, &raw_config()).unwrap();
        segment.append(&mut Record::new(PAYLOAD)).unwrap();

        assert!(segment.read(9).unwrap_err().is_out_of_range());
        assert!(segment.read(11).unwrap_err().is_eof());
        assert!(segment.contains(10));
        assert!(!segment.contains(11));
    }

    #[test]
    fn remove_deletes_files() {
        let dir = tempdir().unwrap();
        let mut segment = Segment::open(dir.path(), 0, &raw_config()).unwrap();
        segment.append(&mut Record::new(PAYLOAD)).unwrap();

        assert!(dir.path().join("0.store").exists());
        assert!(dir.path().join("0.index").exists());

        segment.remove().unwrap();
        assert!(!dir.path().join("0.store").exists());
        assert!(!dir.path().join("0.index").exists());
    }

    #[test]
    fn info_reports_sizes() {
        let dir = tempdir().unwrap();
        let mut segment = Segment::open(dir.path(), 3, &raw_config()).unwrap();
        segment.append(&mut Record::new(PAYLOAD)).unwrap();

        let info = segment.info();
        assert_eq!(info.base_offset, 3);
        assert_eq!(info.next_offset, 4);
        assert_eq!(info.len(), 1);
        assert_eq!(info.store_size, PAYLOAD.len() as u64 + LEN_WIDTH);
        assert_eq!(info.index_size, ENTRY_WIDTH);
    }
}
