//! Memory-mapped offset index.
//!
//! An index file maps a segment-relative offset to the position of the
//! record in the segment's store:
//!
//! ```text
//! | relative offset (4, big-endian) | store position (8, big-endian) | ...
//! ```
//!
//! ## Open/Close Protocol
//!
//! The file is extended to its full capacity before it is mapped, so the
//! mapping never changes size while the segment is open. On close the
//! mapping and the file are synced and the file is truncated back to the
//! bytes actually used. A reopened index takes its logical size from the
//! file length; there is no other metadata.

use crate::encoding::{get_u32, get_u64, put_u32, put_u64, ENTRY_WIDTH, OFF_WIDTH};
use crate::error::{CoreError, CoreResult};
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// One decoded index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IndexEntry {
    /// Offset relative to the segment's base offset.
    pub relative_offset: u32,
    /// Byte position of the record in the store file.
    pub position: u64,
}

/// A fixed-capacity, memory-mapped index file.
///
/// The index holds no lock. It is only reachable through a segment, which
/// is only reachable under the log's lock.
#[derive(Debug)]
pub(crate) struct Index {
    path: PathBuf,
    file: File,
    mmap: MmapMut,
    /// Bytes of the mapping holding entries.
    size: u64,
}

impl Index {
    /// Opens or creates the index file at `path`, extends it to
    /// `max_index_bytes` and maps it.
    ///
    /// A file already longer than `max_index_bytes` keeps its length, so
    /// lowering the limit never discards entries.
    pub(crate) fn open(path: &Path, max_index_bytes: u64) -> CoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let size = file.metadata()?.len();
        file.set_len(max_index_bytes.max(size))?;

        // SAFETY: the file is opened read-write and owned by this index for
        // the whole life of the mapping. Its length is only changed in
        // `close`, after the mapping has been dropped.
        #[allow(unsafe_code)]
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            path: path.to_path_buf(),
            file,
            mmap,
            size,
        })
    }

    /// Writes an entry after the last one.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexFull`] if the mapping has no room for
    /// another entry.
    pub(crate) fn write(&mut self, relative_offset: u32, position: u64) -> CoreResult<()> {
        self.check_room()?;

        let start = self.size as usize;
        let pos_start = start + OFF_WIDTH as usize;
        put_u32(&mut self.mmap[start..pos_start], relative_offset);
        put_u64(
            &mut self.mmap[pos_start..start + ENTRY_WIDTH as usize],
            position,
        );
        self.size += ENTRY_WIDTH;

        Ok(())
    }

    /// Reads the entry at slot `n`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexEof`] if slot `n` has not been written.
    pub(crate) fn read(&self, n: u32) -> CoreResult<IndexEntry> {
        let position = u64::from(n) * ENTRY_WIDTH;
        if self.size < position + ENTRY_WIDTH {
            return Err(CoreError::IndexEof {
                position,
                size: self.size,
            });
        }

        let start = position as usize;
        let entry = &self.mmap[start..start + ENTRY_WIDTH as usize];
        Ok(IndexEntry {
            relative_offset: get_u32(entry),
            position: get_u64(&entry[OFF_WIDTH as usize..]),
        })
    }

    /// Reads the most recently written entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexEof`] if the index is empty.
    pub(crate) fn last(&self) -> CoreResult<IndexEntry> {
        if self.size < ENTRY_WIDTH {
            return Err(CoreError::IndexEof {
                position: 0,
                size: self.size,
            });
        }
        let n = u32::try_from(self.size / ENTRY_WIDTH - 1).map_err(|_| CoreError::IndexEof {
            position: self.size,
            size: self.size,
        })?;
        self.read(n)
    }

    /// Fails with [`CoreError::IndexFull`] unless one more entry fits in
    /// the mapping.
    pub(crate) fn check_room(&self) -> CoreResult<()> {
        let capacity = self.mmap.len() as u64;
        if capacity < self.size + ENTRY_WIDTH {
            return Err(CoreError::IndexFull {
                size: self.size,
                capacity,
            });
        }
        Ok(())
    }

    /// Returns the number of written entries.
    pub(crate) fn entries(&self) -> u64 {
        self.size / ENTRY_WIDTH
    }

    /// Drops every entry from slot `entries` on.
    ///
    /// Only the logical size changes; the dropped slots are overwritten
    /// by later writes and cut off by [`Index::close`].
    pub(crate) fn truncate(&mut self, entries: u64) {
        self.size = self.size.min(entries * ENTRY_WIDTH);
    }

    /// Returns the bytes used by written entries.
    pub(crate) fn size(&self) -> u64 {
        self.size
    }

    /// Returns the path to the index file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Syncs the mapping and the file, truncates the file to the used size
    /// and closes it.
    pub(crate) fn close(self) -> CoreResult<()> {
        let Self {
            file, mmap, size, ..
        } = self;

        mmap.flush()?;
        file.sync_all()?;
        drop(mmap);
        file.set_len(size)?;
        Ok(())
    }
}
