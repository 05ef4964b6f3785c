use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::QueueDevice;

/// Character-device-backed eDMA queue.
///
/// Wraps the open device node and maps the queue capability onto plain file
/// operations: `lseek` for cursor positioning, raw `read`/`write` for
/// transfers, and `fsync` for commit. Each transfer issues exactly one
/// syscall so that a device returning a partial count stays visible to the
/// harness instead of being papered over by a retry loop.
pub struct CharQueue {
    file: File,
}

impl CharQueue {
    /// Opens the queue device node for reading and writing.
    ///
    /// The handle owns the descriptor for its lifetime; the queue is closed
    /// when the value is dropped.
    ///
    /// # Arguments
    ///
    /// * `path` - Device node path, e.g. `/dev/edma0_queue_0`
    ///
    /// # Returns
    ///
    /// Ok(CharQueue) on success, or the underlying I/O error if the node
    /// cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { file })
    }
}

impl QueueDevice for CharQueue {
    fn seek(&mut self, offset: u64) -> io::Result<u64> {
        self.file.seek(SeekFrom::Start(offset))
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn commit(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }
}
