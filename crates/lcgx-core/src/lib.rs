//! # lcgx Core
//!
//! Keystream-generation and parallel-XOR pipeline.
//!
//! A run proceeds in strict stages:
//!
//! 1. Map the input file ([`lcgx_files::FileView`])
//! 2. Generate the full keystream on a single producer thread
//! 3. Partition `[0, N)` into one contiguous [`WorkRange`] per worker
//! 4. XOR each range on its own thread ([`WorkerPool`])
//! 5. Rendezvous at the [`CompletionBarrier`]
//! 6. Persist the output ([`lcgx_files::ResultWriter`])
//!
//! Each worker is handed its own `&mut [u8]` slice of the output, so no two
//! workers can touch the same byte.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod barrier;
pub mod error;
pub mod partition;
pub mod pipeline;
pub mod pool;

pub use barrier::{BarrierError, CompletionBarrier};
pub use error::{Error, ErrorKind};
pub use partition::{WorkRange, partition};
pub use pipeline::{Pipeline, RunConfig, RunReport, Stage, StageTimings, transform};
pub use pool::{PoolError, PoolReport, WorkerPool, WorkerReport};

pub use lcgx_crypto::CipherParameters;
pub use lcgx_files::DEFAULT_MAX_INPUT_SIZE;

/// Available hardware parallelism, never less than 1.
#[must_use]
pub fn available_workers() -> usize {
    num_cpus::get().max(1)
}
