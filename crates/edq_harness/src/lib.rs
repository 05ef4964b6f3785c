//! Concurrent stress harness for a streaming eDMA queue device.
//!
//! Three actors share one queue handle: a producer appends random printable
//! chunks, a committer periodically commits so written bytes become readable,
//! and a consumer drains committed bytes while verifying them against the
//! producer's mirror. The orchestrator in [`run`] wires the actors to a
//! [`edq_dev::QueueDevice`], joins them, and performs the final end-to-end
//! comparison.

pub mod actors;
pub mod run;

pub use run::{RunConfig, RunReport, run};
