//! Run coordinator.
//!
//! Stages run in a fixed order and each one is a hard gate for the next:
//! the keystream producer is joined before any worker starts, and the output
//! is handed to the writer only after the completion barrier releases.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use lcgx_crypto::{CipherParameters, KeystreamBuffer, KeystreamGenerator};
use lcgx_files::{DEFAULT_MAX_INPUT_SIZE, FileView, ResultWriter, hasher};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::pool::{PoolReport, WorkerPool};

/// Pipeline stage, reported to observers as the run progresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening and mapping the input
    Map,
    /// Generating the keystream
    Keystream,
    /// Parallel XOR
    Xor,
    /// Persisting the output
    Write,
}

impl Stage {
    /// Short human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Map => "mapping input",
            Self::Keystream => "generating keystream",
            Self::Xor => "applying keystream",
            Self::Write => "writing output",
        }
    }
}

/// Configuration of a single file transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Input file
    pub input: PathBuf,
    /// Output file
    pub output: PathBuf,
    /// LCG parameters
    pub params: CipherParameters,
    /// Worker count (0 = auto-detect)
    pub workers: usize,
    /// Largest accepted input in bytes
    pub max_input_size: u64,
    /// Compute a BLAKE3 digest of the output
    pub digest: bool,
}

impl RunConfig {
    /// Create a configuration with default worker count and size limit.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q, params: CipherParameters) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            params,
            workers: 0,
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            digest: false,
        }
    }

    /// Set the worker count (0 = auto-detect)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the input size limit
    #[must_use]
    pub fn with_max_input_size(mut self, max_input_size: u64) -> Self {
        self.max_input_size = max_input_size;
        self
    }

    /// Enable or disable the output digest
    #[must_use]
    pub fn with_digest(mut self, digest: bool) -> Self {
        self.digest = digest;
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a config-category error if the parameters are invalid or the
    /// size limit is zero.
    pub fn validate(&self) -> Result<(), Error> {
        self.params.validate()?;

        if self.max_input_size == 0 {
            return Err(Error::InvalidConfig("maximum input size must be at least 1 byte".into()));
        }

        Ok(())
    }
}

/// Wall time spent in each stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    /// Opening and mapping the input
    pub map: Duration,
    /// Keystream generation, including the producer thread join
    pub keystream: Duration,
    /// Parallel XOR, up to barrier release
    pub xor: Duration,
    /// Writing, syncing and renaming the output
    pub write: Duration,
}

impl StageTimings {
    /// Sum of all stages
    #[must_use]
    pub fn total(&self) -> Duration {
        self.map + self.keystream + self.xor + self.write
    }
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Bytes transformed and written
    pub bytes: u64,
    /// Worker pool details
    pub pool: PoolReport,
    /// Per-stage timings
    pub timings: StageTimings,
    /// BLAKE3 digest of the output, if requested
    pub digest: Option<[u8; 32]>,
}

impl RunReport {
    /// Number of workers used
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.workers.len()
    }
}

/// Single-run transform pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: RunConfig,
    pool: WorkerPool,
}

impl Pipeline {
    /// Validate `config` and size the worker pool.
    ///
    /// # Errors
    ///
    /// Returns an error if [`RunConfig::validate`] fails.
    pub fn new(config: RunConfig) -> Result<Self, Error> {
        config.validate()?;
        let pool = WorkerPool::new(config.workers);
        Ok(Self { config, pool })
    }

    /// Configuration this pipeline runs
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Worker count the pool will use
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Run the transform end to end.
    ///
    /// # Errors
    ///
    /// Any stage failure aborts the run; the output path is left untouched.
    pub fn run(&self) -> Result<RunReport, Error> {
        self.run_with(|_| {})
    }

    /// Run the transform, calling `on_stage` as each stage begins.
    ///
    /// # Errors
    ///
    /// Any stage failure aborts the run; the output path is left untouched.
    pub fn run_with<F>(&self, mut on_stage: F) -> Result<RunReport, Error>
    where
        F: FnMut(Stage),
    {
        let mut timings = StageTimings::default();
        info!(
            "transforming {} -> {} with {} workers",
            self.config.input.display(),
            self.config.output.display(),
            self.pool.workers()
        );

        on_stage(Stage::Map);
        let started = Instant::now();
        let view = FileView::open(&self.config.input, self.config.max_input_size)?;
        let len = view.len();
        timings.map = started.elapsed();

        on_stage(Stage::Keystream);
        let started = Instant::now();
        let keystream = produce_keystream(self.config.params, len)?;
        timings.keystream = started.elapsed();
        debug!("keystream ready ({} bytes) in {:?}", keystream.len(), timings.keystream);

        on_stage(Stage::Xor);
        let started = Instant::now();
        let mut output = allocate_output(len)?;
        let pool = self.pool.execute(view.as_bytes(), &keystream, &mut output)?;
        timings.xor = started.elapsed();

        // Input is no longer needed once every range is done.
        drop(view);

        on_stage(Stage::Write);
        let started = Instant::now();
        let bytes = ResultWriter::new(&self.config.output).write_all(&output)?;
        timings.write = started.elapsed();

        let digest = self.config.digest.then(|| hasher::digest(&output));
        drop(keystream);

        info!(
            "wrote {} bytes to {} in {:?}",
            bytes,
            self.config.output.display(),
            timings.total()
        );

        Ok(RunReport {
            bytes,
            pool,
            timings,
            digest,
        })
    }
}

/// XOR an in-memory buffer with the keystream for `params`.
///
/// Same keystream and partitioning as a file run; `workers` of 0 means
/// auto-detect. An empty input yields an empty output.
///
/// # Errors
///
/// Returns an error if the parameters are invalid or a buffer, thread, or
/// barrier cannot be set up.
///
/// # Examples
/// ```
/// use lcgx_core::{CipherParameters, transform};
///
/// let params = CipherParameters::new(0, 1, 1, 256).unwrap();
/// let out = transform(&params, &[0, 1, 2, 3, 4], 2).unwrap();
/// assert_eq!(out, vec![1, 3, 1, 7, 1]);
/// ```
pub fn transform(params: &CipherParameters, input: &[u8], workers: usize) -> Result<Vec<u8>, Error> {
    params.validate()?;

    let keystream = produce_keystream(*params, input.len())?;
    let mut output = allocate_output(input.len())?;
    WorkerPool::new(workers).execute(input, &keystream, &mut output)?;

    Ok(output)
}

/// Generate `len` keystream bytes on a dedicated producer thread and join it.
fn produce_keystream(params: CipherParameters, len: usize) -> Result<KeystreamBuffer, Error> {
    let generator = KeystreamGenerator::new(params)?;

    thread::scope(|scope| {
        let producer = thread::Builder::new()
            .name("lcgx-keystream".into())
            .spawn_scoped(scope, || generator.keystream(len))
            .map_err(Error::ProducerStart)?;

        match producer.join() {
            Ok(keystream) => Ok(keystream?),
            Err(_) => {
                warn!("keystream producer panicked");
                Err(Error::ProducerPanicked)
            }
        }
    })
}

/// Zero-initialized output buffer of `len` bytes.
fn allocate_output(len: usize) -> Result<Vec<u8>, Error> {
    let mut output = Vec::new();
    output
        .try_reserve_exact(len)
        .map_err(|_| Error::OutputAllocation { len })?;
    output.resize(len, 0);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;

    fn params(seed: u64, a: u64, c: u64, m: u64) -> CipherParameters {
        CipherParameters::new(seed, a, c, m).unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bin");
        let output = dir.path().join("out.bin");
        fs::write(&input, [0x00, 0x01, 0x02, 0x03, 0x04]).unwrap();

        let pipeline = Pipeline::new(RunConfig::new(&input, &output, params(0, 1, 1, 256))).unwrap();
        let report = pipeline.run().unwrap();

        assert_eq!(report.bytes, 5);
        assert_eq!(fs::read(&output).unwrap(), vec![0x01, 0x03, 0x01, 0x07, 0x01]);
        assert!(report.digest.is_none());
    }

    #[test]
    fn test_involution_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.bin");
        let cipher = dir.path().join("cipher.bin");
        let restored = dir.path().join("restored.bin");
        let data: Vec<u8> = (0..65_537u32).map(|i| (i * 7 % 256) as u8).collect();
        fs::write(&plain, &data).unwrap();

        let p = params(12345, 1_103_515_245, 12345, 1 << 31);
        Pipeline::new(RunConfig::new(&plain, &cipher, p).with_workers(3))
            .unwrap()
            .run()
            .unwrap();
        Pipeline::new(RunConfig::new(&cipher, &restored, p).with_workers(5))
            .unwrap()
            .run()
            .unwrap();

        assert_ne!(fs::read(&cipher).unwrap(), data);
        assert_eq!(fs::read(&restored).unwrap(), data);
    }

    #[test]
    fn test_empty_input_rejected_before_workers() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.bin");
        let output = dir.path().join("out.bin");
        fs::write(&input, []).unwrap();

        let mut stages = Vec::new();
        let err = Pipeline::new(RunConfig::new(&input, &output, params(0, 1, 1, 256)))
            .unwrap()
            .run_with(|stage| stages.push(stage))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Size);
        assert_eq!(stages, vec![Stage::Map]);
        assert!(!output.exists());
    }

    #[test]
    fn test_oversized_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("big.bin");
        let output = dir.path().join("out.bin");
        fs::write(&input, vec![0u8; 2048]).unwrap();

        let config = RunConfig::new(&input, &output, params(0, 1, 1, 256)).with_max_input_size(1024);
        let err = Pipeline::new(config).unwrap().run().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Size);
        assert_eq!(err.stage(), "input");
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig::new(dir.path().join("nope"), dir.path().join("out"), params(0, 1, 1, 256));
        let err = Pipeline::new(config).unwrap().run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_unwritable_output_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bin");
        fs::write(&input, [1, 2, 3]).unwrap();
        let output = dir.path().join("missing-dir").join("out.bin");

        let err = Pipeline::new(RunConfig::new(&input, &output, params(0, 1, 1, 256)))
            .unwrap()
            .run()
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.stage(), "output");
        assert!(!output.exists());
    }

    #[test]
    fn test_zero_modulus_rejected_at_construction() {
        let bad = CipherParameters {
            seed: 0,
            multiplier: 1,
            increment: 0,
            modulus: 0,
        };
        let err = Pipeline::new(RunConfig::new("in", "out", bad)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_zero_size_limit_rejected() {
        let config = RunConfig::new("in", "out", params(0, 1, 1, 256)).with_max_input_size(0);
        assert_eq!(Pipeline::new(config).unwrap_err().kind(), ErrorKind::Config);
    }

    #[test]
    fn test_digest_and_stages_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bin");
        let output = dir.path().join("out.bin");
        fs::write(&input, vec![0x42; 1000]).unwrap();

        let mut stages = Vec::new();
        let report = Pipeline::new(
            RunConfig::new(&input, &output, params(1, 5, 3, 16))
                .with_workers(2)
                .with_digest(true),
        )
        .unwrap()
        .run_with(|stage| stages.push(stage))
        .unwrap();

        assert_eq!(stages, vec![Stage::Map, Stage::Keystream, Stage::Xor, Stage::Write]);
        assert_eq!(report.workers(), 2);
        assert_eq!(report.digest, Some(hasher::digest(&fs::read(&output).unwrap())));
    }

    #[test]
    fn test_in_place_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let data = b"overwrite the input with its own transform".to_vec();
        fs::write(&path, &data).unwrap();

        let p = params(9, 33, 7, 65_521);
        Pipeline::new(RunConfig::new(&path, &path, p)).unwrap().run().unwrap();
        assert_eq!(fs::read(&path).unwrap(), transform(&p, &data, 1).unwrap());
    }

    #[test]
    fn test_transform_empty_input() {
        assert!(transform(&params(0, 1, 1, 256), &[], 4).unwrap().is_empty());
    }

    #[test]
    fn test_transform_worker_count_independent() {
        let p = params(77, 6_364_136_223_846_793_005, 1, u64::MAX);
        let data: Vec<u8> = (0..10_000u32).map(|i| (i >> 2) as u8).collect();

        let single = transform(&p, &data, 1).unwrap();
        for workers in [2, 3, 7, 16, 64] {
            assert_eq!(transform(&p, &data, workers).unwrap(), single);
        }
    }
}
