//! Core state and verification logic for the eDMA queue stress harness.
//!
//! This crate provides the shared queue state that the producer, committer,
//! and consumer actors operate on, the typed fatal-error taxonomy, the
//! deterministic payload generator, and the transfer statistics collected
//! over a run. It knows nothing about threads or concrete devices; the
//! harness crate wires it to both.

/// Typed fatal-error taxonomy for stress runs.
///
/// Every anomaly the harness can hit maps to one variant, and each variant
/// carries the process exit code the host reports, so failure modes stay
/// distinguishable from scripts driving the binary.
pub mod error;

/// Deterministic pseudo-random generation for payloads and scheduling.
///
/// Provides an xorshift64* generator used for chunk sizing, backoff timing,
/// and printable payload bytes. Seeds are explicit so any run can be
/// reproduced exactly.
pub mod rng;

/// Shared queue state guarded by a single exclusion lock.
///
/// Tracks pending and readable byte counters, the write and read mirror
/// buffers, and the run lifecycle flags. All mutation happens through one
/// mutex so device cursor movement and counter updates stay atomic relative
/// to the other actors.
pub mod state;

/// Transfer statistics accumulated over a run.
pub mod stats;
