//! Partitioned XOR worker pool.
//!
//! Thread-per-range model:
//! - The output is split into one disjoint `&mut [u8]` per worker
//! - Every worker XORs its range, then arrives at the completion barrier
//! - The coordinator arrives last and only then treats the output as complete
//!
//! Workers are scoped threads, so they borrow the input, keystream and
//! output directly; nothing is copied and nothing outlives the call.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use lcgx_crypto::xor_into;
use thiserror::Error;
use tracing::{debug, error, trace};

use crate::barrier::{BarrierError, CompletionBarrier};
use crate::partition::{WorkRange, partition, split_mut};

/// Worker pool errors
#[derive(Debug, Error)]
pub enum PoolError {
    /// A worker thread could not be spawned
    #[error("failed to start worker {worker}: {source}")]
    WorkerStart {
        /// Index of the worker that failed to start
        worker: usize,
        /// Underlying OS error
        source: io::Error,
    },

    /// A worker panicked before finishing its range
    #[error("worker {worker} panicked")]
    WorkerPanicked {
        /// Index of the worker that panicked
        worker: usize,
    },

    /// Completion barrier failure
    #[error("completion barrier: {0}")]
    Barrier(#[from] BarrierError),

    /// Input, keystream and output lengths differ
    #[error("length mismatch: input {input}, keystream {keystream}, output {output}")]
    LengthMismatch {
        /// Input length
        input: usize,
        /// Keystream length
        keystream: usize,
        /// Output length
        output: usize,
    },
}

/// Per-worker statistics
#[derive(Debug, Default)]
struct WorkerStats {
    bytes_processed: AtomicU64,
    busy_nanos: AtomicU64,
}

impl WorkerStats {
    fn record(&self, bytes: usize, busy: Duration) {
        self.bytes_processed.fetch_add(bytes as u64, Ordering::Relaxed);
        self.busy_nanos
            .fetch_add(busy.as_nanos().min(u128::from(u64::MAX)) as u64, Ordering::Relaxed);
    }
}

/// Result of one worker's range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker index
    pub id: usize,
    /// Range the worker owned
    pub range: WorkRange,
    /// Bytes the worker XORed
    pub bytes: u64,
    /// Time spent in the XOR loop
    pub busy: Duration,
}

/// Result of a full pool execution
#[derive(Debug, Clone)]
pub struct PoolReport {
    /// Per-worker results, ordered by worker index
    pub workers: Vec<WorkerReport>,
    /// Wall time from first spawn to barrier release
    pub elapsed: Duration,
}

impl PoolReport {
    /// Total bytes processed across all workers
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.workers.iter().map(|w| w.bytes).sum()
    }

    /// Throughput in bytes per second
    #[must_use]
    pub fn bytes_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.total_bytes() as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Fixed-size pool that XORs a buffer in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with `workers` threads (0 = auto-detect from CPU count).
    ///
    /// # Examples
    /// ```
    /// use lcgx_core::WorkerPool;
    ///
    /// let pool = WorkerPool::new(4);
    /// assert_eq!(pool.workers(), 4);
    /// ```
    #[must_use]
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 {
            crate::available_workers()
        } else {
            workers
        };
        Self { workers }
    }

    /// Number of workers the pool spawns per execution
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Compute `output[i] = input[i] ^ keystream[i]` for every index.
    ///
    /// Returns once every worker has finished its range and the completion
    /// barrier has released. On error the contents of `output` are
    /// unspecified and must not be used.
    ///
    /// # Errors
    ///
    /// - [`PoolError::LengthMismatch`] if the three slices differ in length
    /// - [`PoolError::WorkerStart`] if a worker thread cannot be spawned
    /// - [`PoolError::WorkerPanicked`] if a worker dies before finishing
    pub fn execute(
        &self,
        input: &[u8],
        keystream: &[u8],
        output: &mut [u8],
    ) -> Result<PoolReport, PoolError> {
        self.execute_with(input, keystream, output, |_| Ok(()), |_| {})
    }

    /// [`execute`](Self::execute) with a hook run before each spawn and one
    /// run on each worker thread before its XOR. A `before_spawn` error is
    /// treated as that worker failing to start.
    fn execute_with<F, G>(
        &self,
        input: &[u8],
        keystream: &[u8],
        output: &mut [u8],
        mut before_spawn: F,
        on_worker: G,
    ) -> Result<PoolReport, PoolError>
    where
        F: FnMut(usize) -> io::Result<()>,
        G: Fn(usize) + Sync,
    {
        let len = output.len();
        if input.len() != len || keystream.len() != len {
            return Err(PoolError::LengthMismatch {
                input: input.len(),
                keystream: keystream.len(),
                output: len,
            });
        }

        let ranges = partition(len, self.workers);
        let barrier = CompletionBarrier::new(self.workers + 1)?;
        let stats: Vec<WorkerStats> = (0..self.workers).map(|_| WorkerStats::default()).collect();
        let slices = split_mut(output, &ranges);

        debug!("starting {} workers over {} bytes", self.workers, len);
        let start = Instant::now();

        thread::scope(|scope| -> Result<(), PoolError> {
            let mut handles = Vec::with_capacity(self.workers);
            let on_worker = &on_worker;

            for (id, (range, out)) in ranges.iter().zip(slices).enumerate() {
                let input = &input[range.as_range()];
                let keystream = &keystream[range.as_range()];
                let barrier = &barrier;
                let stats = &stats[id];

                let spawned = before_spawn(id).and_then(|()| {
                    thread::Builder::new()
                        .name(format!("lcgx-worker-{id}"))
                        .spawn_scoped(scope, move || {
                            let arrival = Arrival::new(barrier);
                            on_worker(id);
                            let began = Instant::now();
                            xor_into(out, input, keystream);
                            stats.record(out.len(), began.elapsed());
                            trace!("worker {} finished {} bytes", id, out.len());
                            arrival.complete()
                        })
                });

                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        error!("failed to start worker {}: {}", id, source);
                        // Release the workers that did start; their output is discarded.
                        barrier.abort();
                        return Err(PoolError::WorkerStart { worker: id, source });
                    }
                }
            }

            let gate = barrier.arrive_and_wait();

            for (id, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    error!("worker {} panicked", id);
                    return Err(PoolError::WorkerPanicked { worker: id });
                }
            }

            gate.map_err(PoolError::from)
        })?;

        let elapsed = start.elapsed();
        let workers = ranges
            .iter()
            .zip(&stats)
            .enumerate()
            .map(|(id, (range, stats))| WorkerReport {
                id,
                range: *range,
                bytes: stats.bytes_processed.load(Ordering::Relaxed),
                busy: Duration::from_nanos(stats.busy_nanos.load(Ordering::Relaxed)),
            })
            .collect();

        debug!("barrier released after {:?}", elapsed);
        Ok(PoolReport { workers, elapsed })
    }
}

/// A worker's pending arrival at the barrier.
///
/// Dropping it without calling [`complete`](Self::complete) (a panic inside
/// the worker) aborts the barrier so the coordinator is not left waiting.
struct Arrival<'a> {
    barrier: &'a CompletionBarrier,
    done: bool,
}

impl<'a> Arrival<'a> {
    fn new(barrier: &'a CompletionBarrier) -> Self {
        Self {
            barrier,
            done: false,
        }
    }

    fn complete(mut self) -> Result<(), BarrierError> {
        self.done = true;
        self.barrier.arrive_and_wait()
    }
}

impl Drop for Arrival<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.barrier.abort();
        }
    }
}
