use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::QueueDevice;

/// In-memory model of the eDMA queue contract.
///
/// Writes land in a staging area that reads cannot see; a commit moves the
/// staged bytes into the committed stream, which reads drain in FIFO order.
/// A read request larger than the committed backlog returns short, which is
/// exactly how a real queue would expose a caller reading ahead of commit.
///
/// Faults can be injected at a specific operation ordinal to exercise the
/// harness's fatal paths without hardware.
pub struct SimQueue {
    staged: Vec<u8>,
    committed: VecDeque<u8>,
    short_write_on: Option<u64>,
    short_read_on: Option<u64>,
    fail_seek_on: Option<u64>,
    seeks: u64,
    counters: Arc<Counters>,
}

#[derive(Default)]
struct Counters {
    writes: AtomicU64,
    reads: AtomicU64,
    commits: AtomicU64,
    bytes_written: AtomicU64,
    bytes_read: AtomicU64,
}

/// Observer handle onto a [`SimQueue`]'s operation counters.
///
/// Cloneable and independent of the queue's ownership, so a test can keep a
/// probe while the queue itself moves into the harness.
#[derive(Clone)]
pub struct SimProbe {
    counters: Arc<Counters>,
}

impl SimProbe {
    pub fn writes(&self) -> u64 {
        self.counters.writes.load(Ordering::Relaxed)
    }

    pub fn reads(&self) -> u64 {
        self.counters.reads.load(Ordering::Relaxed)
    }

    pub fn commits(&self) -> u64 {
        self.counters.commits.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.counters.bytes_written.load(Ordering::Relaxed)
    }

    pub fn bytes_read(&self) -> u64 {
        self.counters.bytes_read.load(Ordering::Relaxed)
    }
}

impl SimQueue {
    pub fn new() -> Self {
        Self {
            staged: Vec::new(),
            committed: VecDeque::new(),
            short_write_on: None,
            short_read_on: None,
            fail_seek_on: None,
            seeks: 0,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Accepts only half the requested bytes on the `nth` write (1-based).
    pub fn short_write_on(mut self, nth: u64) -> Self {
        self.short_write_on = Some(nth);
        self
    }

    /// Returns only half the requested bytes on the `nth` read (1-based).
    pub fn short_read_on(mut self, nth: u64) -> Self {
        self.short_read_on = Some(nth);
        self
    }

    /// Fails the `nth` seek (1-based).
    pub fn fail_seek_on(mut self, nth: u64) -> Self {
        self.fail_seek_on = Some(nth);
        self
    }

    pub fn probe(&self) -> SimProbe {
        SimProbe {
            counters: Arc::clone(&self.counters),
        }
    }
}

impl Default for SimQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueDevice for SimQueue {
    fn seek(&mut self, offset: u64) -> io::Result<u64> {
        self.seeks += 1;
        if self.fail_seek_on == Some(self.seeks) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "injected seek failure",
            ));
        }
        Ok(offset)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let nth = self.counters.writes.fetch_add(1, Ordering::Relaxed) + 1;
        let accepted = if self.short_write_on == Some(nth) {
            buf.len() / 2
        } else {
            buf.len()
        };
        self.staged.extend_from_slice(&buf[..accepted]);
        self.counters
            .bytes_written
            .fetch_add(accepted as u64, Ordering::Relaxed);
        Ok(accepted)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let nth = self.counters.reads.fetch_add(1, Ordering::Relaxed) + 1;
        let mut transferred = buf.len().min(self.committed.len());
        if self.short_read_on == Some(nth) {
            transferred /= 2;
        }
        for (slot, byte) in buf.iter_mut().zip(self.committed.drain(..transferred)) {
            *slot = byte;
        }
        self.counters
            .bytes_read
            .fetch_add(transferred as u64, Ordering::Relaxed);
        Ok(transferred)
    }

    fn commit(&mut self) -> io::Result<()> {
        self.committed.extend(self.staged.drain(..));
        self.counters.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_bytes_are_invisible_until_commit() {
        let mut queue = SimQueue::new();
        queue.write(b"hello").expect("write");

        let mut buf = [0u8; 5];
        assert_eq!(queue.read(&mut buf).expect("read"), 0);

        queue.commit().expect("commit");
        assert_eq!(queue.read(&mut buf).expect("read"), 5);
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn reads_drain_commits_in_fifo_order() {
        let mut queue = SimQueue::new();
        queue.write(b"abc").expect("write");
        queue.commit().expect("commit");
        queue.write(b"def").expect("write");
        queue.commit().expect("commit");

        let mut buf = [0u8; 4];
        assert_eq!(queue.read(&mut buf).expect("read"), 4);
        assert_eq!(&buf, b"abcd");

        let mut rest = [0u8; 8];
        assert_eq!(queue.read(&mut rest).expect("read"), 2);
        assert_eq!(&rest[..2], b"ef");
    }

    #[test]
    fn short_write_truncates_only_the_chosen_op() {
        let queue = SimQueue::new().short_write_on(2);
        let probe = queue.probe();
        let mut queue = queue;

        assert_eq!(queue.write(b"aaaa").expect("write"), 4);
        assert_eq!(queue.write(b"bbbb").expect("write"), 2);
        assert_eq!(queue.write(b"cccc").expect("write"), 4);
        assert_eq!(probe.writes(), 3);
        assert_eq!(probe.bytes_written(), 10);
    }

    #[test]
    fn injected_seek_failure_hits_the_chosen_ordinal() {
        let mut queue = SimQueue::new().fail_seek_on(2);
        queue.seek(0).expect("first seek");
        queue.seek(0).expect_err("second seek must fail");
        queue.seek(0).expect("third seek");
    }
}
