//! Run-level scenarios driving the full harness against the queue model.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use edq_common::QUEUE_BASE_OFFSET;
use edq_core::error::HarnessError;
use edq_core::rng::Xorshift64;
use edq_core::state::QueueState;
use edq_dev::SimQueue;
use edq_harness::{RunConfig, actors, run};

fn cfg(total: usize, max_chunk: usize, seed: u64) -> RunConfig {
    RunConfig {
        total,
        max_chunk,
        base_offset: QUEUE_BASE_OFFSET,
        seed,
    }
}

#[test]
fn end_to_end_mirrors_match() {
    let dev = SimQueue::new();
    let probe = dev.probe();

    let report = run(dev, cfg(4096, 256, 12345)).expect("run succeeds");

    assert_eq!(report.stats.bytes_written, 4096);
    assert_eq!(report.stats.bytes_read, 4096);
    assert_eq!(probe.bytes_written(), 4096);
    assert_eq!(probe.bytes_read(), 4096);
    assert!(probe.commits() > 0);
}

#[test]
fn conservation_holds_across_seeds() {
    for seed in 1..=8 {
        let report = run(SimQueue::new(), cfg(2048, 128, seed)).expect("run succeeds");
        assert_eq!(report.stats.bytes_written, 2048);
        assert_eq!(report.stats.bytes_read, 2048);
    }
}

#[test]
fn single_byte_total_takes_the_unit_read_path() {
    let report = run(SimQueue::new(), cfg(1, 8, 7)).expect("run succeeds");

    assert_eq!(report.stats.writes, 1);
    assert_eq!(report.stats.reads, 1);
    assert_eq!(report.stats.bytes_read, 1);
    assert_eq!(report.stats.largest_read, 1);
}

#[test]
fn short_write_is_fatal_with_no_retry() {
    let dev = SimQueue::new().short_write_on(3);
    let probe = dev.probe();

    let err = run(dev, cfg(4096, 256, 99)).expect_err("short write must abort the run");

    assert!(matches!(err, HarnessError::ShortWrite { .. }));
    assert_eq!(err.exit_code(), 1);
    // The producer must not have issued another write after the violation.
    assert_eq!(probe.writes(), 3);
}

#[test]
fn short_read_is_fatal() {
    let err =
        run(SimQueue::new().short_read_on(1), cfg(4096, 256, 5)).expect_err("short read aborts");

    assert!(matches!(err, HarnessError::ShortRead { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn seek_failure_is_fatal() {
    let err =
        run(SimQueue::new().fail_seek_on(1), cfg(4096, 256, 5)).expect_err("seek failure aborts");

    assert!(matches!(err, HarnessError::Seek { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn consumer_makes_no_progress_without_a_committer() {
    let total = 512;
    let config = cfg(total, 64, 3);
    let state = Arc::new(QueueState::new(SimQueue::new(), total));

    let producer = {
        let state = Arc::clone(&state);
        thread::spawn(move || actors::produce(&state, config, Xorshift64::new(1)))
    };
    let consumer = {
        let state = Arc::clone(&state);
        thread::spawn(move || actors::consume(&state, config, Xorshift64::new(2)))
    };

    producer
        .join()
        .expect("producer thread")
        .expect("producer finishes without a committer");
    thread::sleep(Duration::from_millis(100));

    {
        let shared = state.lock();
        assert_eq!(shared.pending(), total);
        assert_eq!(shared.readable(), 0);
        assert_eq!(shared.consumed(), 0);
    }

    state.halt();
    consumer
        .join()
        .expect("consumer thread")
        .expect("consumer unwinds cleanly");
    assert_eq!(state.lock().consumed(), 0);
}
