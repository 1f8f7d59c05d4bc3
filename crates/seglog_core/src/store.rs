//! Append-only record store.
//!
//! A store file is a plain concatenation of entries:
//!
//! ```text
//! | length (8, big-endian) | payload (length) | length (8) | payload | ...
//! ```
//!
//! There is no header, padding, checksum or trailer. Writes go through a
//! buffered writer; any read flushes it first so pending appends are
//! visible.

use crate::encoding::{get_u64, put_u64, LEN_WIDTH};
use crate::error::CoreResult;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A length-prefixed, append-only record file.
///
/// # Thread Safety
///
/// The buffered writer and the size counter live behind an internal
/// mutex, so a store stays consistent even if reached outside the log's
/// lock.
#[derive(Debug)]
pub(crate) struct Store {
    path: PathBuf,
    inner: Mutex<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    writer: BufWriter<File>,
    /// End of the last fully buffered entry.
    size: u64,
}

impl Store {
    /// Opens or creates the store file at `path` in append mode.
    ///
    /// The size is taken from the file length, so a reopened store
    /// continues where it left off.
    pub(crate) fn open(path: &Path) -> CoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(StoreInner {
                writer: BufWriter::new(file),
                size,
            }),
        })
    }

    /// Appends a length-prefixed payload.
    ///
    /// Returns `(bytes_written, position)`, where `position` is where the
    /// entry starts. The entry is only buffered; it becomes durable at the
    /// next flush (any read, or close).
    pub(crate) fn append(&self, payload: &[u8]) -> CoreResult<(u64, u64)> {
        let mut inner = self.inner.lock();
        let position = inner.size;

        let mut prefix = [0u8; LEN_WIDTH as usize];
        put_u64(&mut prefix, payload.len() as u64);
        inner.writer.write_all(&prefix)?;
        inner.writer.write_all(payload)?;

        let written = LEN_WIDTH + payload.len() as u64;
        inner.size += written;

        Ok((written, position))
    }

    /// Reads the payload of the entry starting at `position`.
    ///
    /// # Errors
    ///
    /// Returns an `UnexpectedEof` I/O error if the entry's prefix or payload
    /// extends past the end of the store.
    pub(crate) fn read(&self, position: u64) -> CoreResult<Vec<u8>> {
        let mut inner = self.inner.lock();
        inner.writer.flush()?;
        let size = inner.size;

        if position.saturating_add(LEN_WIDTH) > size {
            return Err(past_end(position, size).into());
        }

        let mut file = inner.writer.get_ref();
        file.seek(SeekFrom::Start(position))?;

        let mut prefix = [0u8; LEN_WIDTH as usize];
        file.read_exact(&mut prefix)?;
        let len = get_u64(&prefix);

        let start = position + LEN_WIDTH;
        if start.saturating_add(len) > size {
            return Err(past_end(start, size).into());
        }

        let len = usize::try_from(len).map_err(|_| past_end(start, size))?;
        let mut payload = vec![0u8; len];
        file.read_exact(&mut payload)?;

        Ok(payload)
    }

    /// Reads raw store bytes starting at `offset` into `buf`.
    ///
    /// Returns the number of bytes read, which is 0 at the end of the file.
    pub(crate) fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut inner = self.inner.lock();
        inner.writer.flush()?;

        let mut file = inner.writer.get_ref();
        file.seek(SeekFrom::Start(offset))?;
        file.read(buf)
    }

    /// Returns the current write position.
    pub(crate) fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Returns the path to the store file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffered entries and closes the file.
    pub(crate) fn close(self) -> CoreResult<()> {
        let inner = self.inner.into_inner();
        let file = inner.writer.into_inner().map_err(|e| e.into_error())?;
        drop(file);
        Ok(())
    }
}

fn past_end(position: u64, size: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("read at {position} past end of store (size {size})"),
    )
}
