//! Common definitions and constants shared across the eDMA queue harness.
//!
//! This module provides the device node path, queue addressing constants, and
//! payload parameters used by the stress actors, the device layer, and the
//! host CLI.

#![no_std]

/// Path of the first eDMA queue character device node.
///
/// The eDMA driver exposes one device node per hardware queue; queue 0 of
/// device 0 is the conventional target for single-queue stress runs. The host
/// CLI uses this as the default for its `run` subcommand.
pub const DEFAULT_QUEUE_PATH: &str = "/dev/edma0_queue_0";

/// Fixed base offset for every queue read and write.
///
/// The transfer protocol positions the queue cursor at this offset before each
/// operation. The value addresses the start of the queue's DMA window and must
/// stay in sync with the driver's queue mapping.
pub const QUEUE_BASE_OFFSET: u64 = 0x1000_0000;

/// Host page size in bytes.
///
/// Transfer totals and chunk bounds are conventionally expressed in pages;
/// the CLI defaults derive from this.
pub const PAGE_SIZE: usize = 4096;

/// Character set for generated payload chunks.
///
/// Every payload byte is drawn from this printable set so that mirror-buffer
/// diffs stay human-readable when a run fails verification.
pub const PAYLOAD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRTSUVWXYZ1234567890";

/// Exclusive upper bound on the per-iteration actor backoff, in microseconds.
///
/// Each actor sleeps a random duration below this bound between iterations to
/// shuffle thread interleavings. The bound is a throughput knob, not part of
/// the correctness contract.
pub const MAX_BACKOFF_MICROS: u64 = 200;
