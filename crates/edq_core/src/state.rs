use parking_lot::{Condvar, Mutex};
pub use parking_lot::MutexGuard;

use crate::error::HarnessError;
use crate::stats::TransferStats;

/// Shared queue state for one stress run.
///
/// One mutex guards everything the actors touch: the device handle (so
/// seek-then-operate pairs stay atomic relative to the other actors sharing
/// the queue cursor), both byte counters, both mirror buffers, the lifecycle
/// flags, and the statistics. The condition variable gates the consumer on
/// committed bytes becoming readable.
pub struct QueueState<D> {
    shared: Mutex<Shared<D>>,
    readable_cv: Condvar,
}

/// The lock-protected interior of [`QueueState`].
pub struct Shared<D> {
    /// The queue device. Public so actors can seek and transfer while holding
    /// the same lock acquisition that updates the counters.
    pub dev: D,
    pending: usize,
    readable: usize,
    write_mirror: Vec<u8>,
    read_mirror: Vec<u8>,
    done: bool,
    halted: bool,
    stats: TransferStats,
}

impl<D> QueueState<D> {
    /// Creates the run state with both mirrors sized for `total` bytes.
    pub fn new(dev: D, total: usize) -> Self {
        Self {
            shared: Mutex::new(Shared {
                dev,
                pending: 0,
                readable: 0,
                write_mirror: Vec::with_capacity(total),
                read_mirror: Vec::with_capacity(total),
                done: false,
                halted: false,
                stats: TransferStats::default(),
            }),
            readable_cv: Condvar::new(),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Shared<D>> {
        self.shared.lock()
    }

    /// Blocks until at least one byte is readable or the run is halted.
    ///
    /// The guard is re-acquired before returning, so the caller observes a
    /// consistent readable count for its length pick.
    pub fn wait_readable(&self, guard: &mut MutexGuard<'_, Shared<D>>) {
        while guard.readable == 0 && !guard.halted {
            self.readable_cv.wait(guard);
        }
    }

    /// Wakes any consumer parked on the readable gate.
    pub fn notify_readable(&self) {
        self.readable_cv.notify_all();
    }

    /// Stops all actors at their next check and wakes any condvar waiter.
    ///
    /// Used by a failing actor after it records its error, and by tests that
    /// need to unwind a deliberately stalled run.
    pub fn halt(&self) {
        self.lock().halted = true;
        self.readable_cv.notify_all();
    }
}

impl<D> Shared<D> {
    /// Appends a successfully written chunk to the write mirror and counts it
    /// as pending. Must be called under the same lock acquisition as the
    /// device write it records.
    pub fn record_write(&mut self, chunk: &[u8]) {
        self.write_mirror.extend_from_slice(chunk);
        self.pending += chunk.len();
        self.stats.record_write(chunk.len());
    }

    /// Drains the pending count into the readable count.
    ///
    /// Runs under the same lock acquisition as the device commit, so the
    /// transfer covers exactly the bytes pending at that instant: never fewer
    /// (no lost commits), never more (no double count). Returns the number of
    /// bytes made readable.
    pub fn commit_pending(&mut self) -> usize {
        let moved = self.pending;
        self.readable += moved;
        self.pending = 0;
        self.stats.record_commit();
        moved
    }

    /// Appends consumed bytes to the read mirror, decrements the readable
    /// count, and verifies the full consumed prefix against the write mirror.
    ///
    /// The caller must have sized the read within the current readable count
    /// under this same lock acquisition.
    pub fn record_read(&mut self, bytes: &[u8]) -> Result<(), HarnessError> {
        debug_assert!(bytes.len() <= self.readable);
        self.readable -= bytes.len();
        self.read_mirror.extend_from_slice(bytes);
        self.stats.record_read(bytes.len());
        self.verify_prefix()
    }

    /// Marks the consumption target reached. The committer exits its loop on
    /// the next iteration.
    pub fn set_done(&mut self) {
        self.done = true;
    }

    pub fn mark_halted(&mut self) {
        self.halted = true;
    }

    /// Final whole-run check: both mirrors must cover `total` bytes and agree
    /// byte for byte.
    pub fn verify_complete(&self, total: usize) -> Result<(), HarnessError> {
        self.verify_prefix()?;
        if self.write_mirror.len() != total || self.read_mirror.len() != total {
            return Err(HarnessError::Incomplete {
                produced: self.write_mirror.len(),
                consumed: self.read_mirror.len(),
                total,
            });
        }
        Ok(())
    }

    fn verify_prefix(&self) -> Result<(), HarnessError> {
        if let Some(offset) = self
            .read_mirror
            .iter()
            .zip(&self.write_mirror)
            .position(|(read, wrote)| read != wrote)
        {
            return Err(HarnessError::Mismatch {
                offset,
                expected: self.write_mirror[offset],
                actual: self.read_mirror[offset],
            });
        }
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn readable(&self) -> usize {
        self.readable
    }

    pub fn produced(&self) -> usize {
        self.write_mirror.len()
    }

    pub fn consumed(&self) -> usize {
        self.read_mirror.len()
    }

    pub fn done(&self) -> bool {
        self.done
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn stats(&self) -> &TransferStats {
        &self.stats
    }

    pub fn mirrors(&self) -> (&[u8], &[u8]) {
        (&self.write_mirror, &self.read_mirror)
    }
}

/// Prints both mirror buffers for diagnosis after a verification failure,
/// 90 payload bytes per row.
pub fn dump_mirrors(write_mirror: &[u8], read_mirror: &[u8]) {
    eprintln!("data written:");
    dump_rows(write_mirror);
    eprintln!("data read:");
    dump_rows(read_mirror);
}

fn dump_rows(buf: &[u8]) {
    for row in buf.chunks(90) {
        eprintln!("{}", String::from_utf8_lossy(row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn commit_moves_exactly_the_pending_bytes() {
        let state = QueueState::new((), 16);
        let mut shared = state.lock();
        shared.record_write(b"abcd");
        shared.record_write(b"ef");
        assert_eq!(shared.pending(), 6);
        assert_eq!(shared.readable(), 0);

        let moved = shared.commit_pending();
        assert_eq!(moved, 6);
        assert_eq!(shared.pending(), 0);
        assert_eq!(shared.readable(), 6);

        // A second commit with nothing pending moves nothing.
        assert_eq!(shared.commit_pending(), 0);
        assert_eq!(shared.readable(), 6);
    }

    #[test]
    fn record_read_verifies_the_consumed_prefix() {
        let state = QueueState::new((), 8);
        let mut shared = state.lock();
        shared.record_write(b"abcdef");
        shared.commit_pending();

        shared.record_read(b"abc").expect("matching prefix");
        assert_eq!(shared.readable(), 3);

        let err = shared.record_read(b"dXf").expect_err("corrupted byte");
        match err {
            HarnessError::Mismatch {
                offset,
                expected,
                actual,
            } => {
                assert_eq!(offset, 4);
                assert_eq!(expected, b'e');
                assert_eq!(actual, b'X');
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn verify_complete_rejects_partial_transfers() {
        let state = QueueState::new((), 8);
        let mut shared = state.lock();
        shared.record_write(b"abcdefgh");
        shared.commit_pending();
        shared.record_read(b"abcd").expect("prefix ok");

        let err = shared.verify_complete(8).expect_err("half consumed");
        assert!(matches!(
            err,
            HarnessError::Incomplete {
                produced: 8,
                consumed: 4,
                total: 8,
            }
        ));

        shared.record_read(b"efgh").expect("prefix ok");
        shared.verify_complete(8).expect("full transfer");
    }

    #[test]
    fn halt_wakes_a_parked_waiter() {
        let state = Arc::new(QueueState::new((), 4));
        let waiter = {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                let mut shared = state.lock();
                state.wait_readable(&mut shared);
                (shared.readable(), shared.halted())
            })
        };
        state.halt();
        let (readable, halted) = waiter.join().expect("waiter thread");
        assert_eq!(readable, 0);
        assert!(halted);
    }
}
