use std::thread;
use std::time::Duration;

use edq_common::MAX_BACKOFF_MICROS;
use edq_core::error::HarnessError;
use edq_core::rng::Xorshift64;
use edq_core::state::{MutexGuard, QueueState, Shared, dump_mirrors};
use edq_dev::QueueDevice;
use tracing::{debug, warn};

use crate::run::RunConfig;

/// Writer actor: streams `cfg.total` bytes of random printable payload into
/// the queue in randomly sized chunks. A short or failed write is fatal.
pub fn produce<D: QueueDevice>(
    state: &QueueState<D>,
    cfg: RunConfig,
    mut rng: Xorshift64,
) -> Result<(), HarnessError> {
    let mut chunk = vec![0u8; cfg.max_chunk];
    let mut remaining = cfg.total;

    while remaining > 0 {
        let len = chunk_len(remaining, cfg.max_chunk, &mut rng);
        rng.fill_payload(&mut chunk[..len]);

        let mut shared = state.lock();
        if shared.halted() {
            return Ok(());
        }
        if let Err(source) = shared.dev.seek(cfg.base_offset) {
            let err = HarnessError::Seek {
                offset: cfg.base_offset,
                source,
            };
            return Err(abort(state, shared, err));
        }
        let accepted = match shared.dev.write(&chunk[..len]) {
            Ok(n) => n,
            Err(source) => return Err(abort(state, shared, HarnessError::Write(source))),
        };
        if accepted != len {
            let err = HarnessError::ShortWrite {
                requested: len,
                accepted,
            };
            return Err(abort(state, shared, err));
        }
        shared.record_write(&chunk[..len]);
        debug!(bytes = len, pending = shared.pending(), "wrote chunk");
        drop(shared);

        remaining -= len;
        backoff(&mut rng);
    }

    Ok(())
}

/// Committer actor: loops until the consumer reports done, committing the
/// queue and draining the pending count into the readable count.
///
/// A device commit failure is not a test failure; the bytes simply stay
/// pending and the commit is retried on the next interval.
pub fn commit_loop<D: QueueDevice>(
    state: &QueueState<D>,
    mut rng: Xorshift64,
) -> Result<(), HarnessError> {
    loop {
        {
            let mut shared = state.lock();
            if shared.done() || shared.halted() {
                break;
            }
            match shared.dev.commit() {
                Ok(()) => {
                    let moved = shared.commit_pending();
                    if moved > 0 {
                        debug!(bytes = moved, readable = shared.readable(), "committed");
                        state.notify_readable();
                    }
                }
                Err(err) => {
                    warn!(%err, "queue commit failed; will retry next interval");
                }
            }
        }
        backoff(&mut rng);
    }

    Ok(())
}

/// Reader actor: drains `cfg.total` bytes from the queue, gated on committed
/// bytes being readable, verifying the full consumed prefix against the write
/// mirror after every read. A short read or any mismatch is fatal.
pub fn consume<D: QueueDevice>(
    state: &QueueState<D>,
    cfg: RunConfig,
    mut rng: Xorshift64,
) -> Result<(), HarnessError> {
    let mut buf = vec![0u8; cfg.total];
    let mut remaining = cfg.total;

    while remaining > 0 {
        let mut shared = state.lock();
        state.wait_readable(&mut shared);
        if shared.halted() {
            return Ok(());
        }

        let readable = shared.readable();
        let len = if readable == 1 {
            1
        } else {
            1 + rng.next_below(readable as u64 - 1) as usize
        };

        if let Err(source) = shared.dev.seek(cfg.base_offset) {
            let err = HarnessError::Seek {
                offset: cfg.base_offset,
                source,
            };
            return Err(abort(state, shared, err));
        }
        let returned = match shared.dev.read(&mut buf[..len]) {
            Ok(n) => n,
            Err(source) => return Err(abort(state, shared, HarnessError::Read(source))),
        };
        if returned != len {
            let err = HarnessError::ShortRead {
                requested: len,
                returned,
            };
            return Err(abort(state, shared, err));
        }
        if let Err(err) = shared.record_read(&buf[..len]) {
            let (write_mirror, read_mirror) = shared.mirrors();
            dump_mirrors(write_mirror, read_mirror);
            return Err(abort(state, shared, err));
        }
        debug!(bytes = len, readable = shared.readable(), "read chunk");
        drop(shared);

        remaining -= len;
        backoff(&mut rng);
    }

    state.lock().set_done();
    Ok(())
}

/// Chunk length for the next write: `min(remaining, uniform [1, max_chunk))`.
/// A bound of 1 pins the length to 1.
fn chunk_len(remaining: usize, max_chunk: usize, rng: &mut Xorshift64) -> usize {
    if max_chunk <= 1 {
        return 1;
    }
    let pick = 1 + rng.next_below(max_chunk as u64 - 1) as usize;
    remaining.min(pick)
}

/// Records the fatal error: halts every actor, wakes any condvar waiter, and
/// hands the error back for the actor to return.
fn abort<D>(
    state: &QueueState<D>,
    mut shared: MutexGuard<'_, Shared<D>>,
    err: HarnessError,
) -> HarnessError {
    shared.mark_halted();
    drop(shared);
    state.notify_readable();
    err
}

fn backoff(rng: &mut Xorshift64) {
    thread::sleep(Duration::from_micros(rng.next_below(MAX_BACKOFF_MICROS)));
}
