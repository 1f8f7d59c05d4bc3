//! Sequential export of raw store bytes.

use crate::segment::Segment;
use parking_lot::RwLockReadGuard;
use std::io::{self, Read};

/// Reads the store files of every segment back to back, oldest first.
///
/// Returned by [`crate::Log::reader`]. The bytes are the on-disk store
/// format: `[8-byte big-endian length][payload]` entries with no
/// separator between segments.
///
/// The reader borrows the log's segment list under its shared lock for as
/// long as it lives, so no segment can be rotated out or truncated away
/// underneath it.
pub struct LogReader<'a> {
    segments: RwLockReadGuard<'a, Vec<Segment>>,
    /// Segment currently being read.
    current: usize,
    /// Byte offset within the current segment's store.
    position: u64,
}

impl<'a> LogReader<'a> {
    pub(crate) fn new(segments: RwLockReadGuard<'a, Vec<Segment>>) -> Self {
        Self {
            segments,
            current: 0,
            position: 0,
        }
    }
}

impl Read for LogReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(segment) = self.segments.get(self.current) {
            let n = segment.store().read_at(buf, self.position)?;
            if n > 0 {
                self.position += n as u64;
                return Ok(n);
            }
            self.current += 1;
            self.position = 0;
        }

        Ok(0)
    }
}

impl std::fmt::Debug for LogReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogReader")
            .field("segments", &self.segments.len())
            .field("current", &self.current)
            .field("position", &self.position)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Config, Log, Record, RecordFormat};
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn empty_log_reads_nothing() {
        let dir = tempdir().unwrap();
        let log = Log::open(dir.path(), Config::default()).unwrap();

        let mut bytes = Vec::new();
        assert_eq!(log.reader().read_to_end(&mut bytes).unwrap(), 0);
    }

    #[test]
    fn small_buffers_cross_segment_boundaries() {
        let dir = tempdir().unwrap();
        let config = Config::new()
            .max_store_bytes(12)
            .record_format(RecordFormat::Raw);
        let log = Log::open(dir.path(), config).unwrap();

        for value in [b"aaaa", b"bbbb", b"cccc"] {
            log.append(Record::new(&value[..])).unwrap();
        }
        // Every append fills its segment; the last one is empty.
        assert_eq!(log.segment_count(), 4);

        let mut reader = log.reader();
        let mut out = Vec::new();
        let mut buf = [0u8; 5];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }

        assert_eq!(out.len(), 36);
        assert_eq!(&out[8..12], b"aaaa");
        assert_eq!(&out[20..24], b"bbbb");
        assert_eq!(&out[32..36], b"cccc");
    }
}
