use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use edq_core::error::HarnessError;
use edq_core::rng::Xorshift64;
use edq_core::state::{QueueState, dump_mirrors};
use edq_core::stats::TransferStats;
use edq_dev::QueueDevice;
use tracing::debug;

use crate::actors;

/// Inputs for a single stress run.
#[derive(Clone, Copy, Debug)]
pub struct RunConfig {
    /// Total bytes to move through the queue.
    pub total: usize,
    /// Exclusive upper bound on producer chunk sizes.
    pub max_chunk: usize,
    /// Queue cursor position established before every read and write.
    pub base_offset: u64,
    /// Base seed; each actor derives its own stream from it.
    pub seed: u64,
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub stats: TransferStats,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn print_report(&self) {
        self.stats.print_report(self.elapsed);
    }
}

/// Drives a full stress run over `dev`: spawns the producer, committer, and
/// consumer threads, joins them, and performs the final whole-buffer
/// comparison of the two mirrors.
///
/// Returns the first actor failure, or the final verification failure, with
/// mirror dumps already printed for mismatches. Mirror allocation happens
/// here, before any thread spawns.
pub fn run<D>(dev: D, cfg: RunConfig) -> Result<RunReport, HarnessError>
where
    D: QueueDevice + Send + 'static,
{
    assert!(cfg.total > 0, "transfer target must be non-zero");
    assert!(cfg.max_chunk > 0, "chunk bound must be non-zero");

    let state = Arc::new(QueueState::new(dev, cfg.total));

    let mut seeder = Xorshift64::new(cfg.seed);
    let producer_rng = Xorshift64::new(seeder.next_u64());
    let committer_rng = Xorshift64::new(seeder.next_u64());
    let consumer_rng = Xorshift64::new(seeder.next_u64());

    debug!(
        total = cfg.total,
        max_chunk = cfg.max_chunk,
        seed = cfg.seed,
        "starting stress run"
    );
    let start = Instant::now();

    let producer = spawn_actor("producer", {
        let state = Arc::clone(&state);
        move || actors::produce(&state, cfg, producer_rng)
    });
    let committer = spawn_actor("committer", {
        let state = Arc::clone(&state);
        move || actors::commit_loop(&state, committer_rng)
    });
    let consumer = spawn_actor("consumer", {
        let state = Arc::clone(&state);
        move || actors::consume(&state, cfg, consumer_rng)
    });

    let produced = producer.join().unwrap();
    let committed = committer.join().unwrap();
    let consumed = consumer.join().unwrap();
    let elapsed = start.elapsed();

    produced?;
    consumed?;
    committed?;

    let shared = state.lock();
    if let Err(err) = shared.verify_complete(cfg.total) {
        if matches!(err, HarnessError::Mismatch { .. }) {
            let (write_mirror, read_mirror) = shared.mirrors();
            dump_mirrors(write_mirror, read_mirror);
        }
        return Err(err);
    }
    let stats = shared.stats().clone();
    drop(shared);

    Ok(RunReport { stats, elapsed })
}

fn spawn_actor<F>(name: &str, body: F) -> thread::JoinHandle<Result<(), HarnessError>>
where
    F: FnOnce() -> Result<(), HarnessError> + Send + 'static,
{
    thread::Builder::new()
        .name(name.into())
        .spawn(body)
        .expect("spawn actor thread")
}
