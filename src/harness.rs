use crate::job::{FeatureFit, JobError};
use crate::loader::{load_table, LoadError};
use crate::orchestrator::Orchestrator;
use crate::strategy::Strategy;
use crate::table::Table;
use log::{debug, info};
use rayon::ThreadPoolBuildError;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_TRIALS: usize = 100;

/// Where each trial gets its table from.
///
/// The two variants measure different things: `Loaded` times compute only, while
/// `ReloadEachTrial` includes reading and parsing the file in every trial.
#[derive(Debug, Clone, Copy)]
pub enum DataSource<'a> {
    Loaded(&'a Table),
    ReloadEachTrial(&'a Path),
}

#[derive(Debug, Clone)]
pub struct BenchmarkOptions {
    strategy: Strategy,
    trials: NonZeroUsize,
    threads: Option<NonZeroUsize>,
}

impl BenchmarkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn trials(mut self, trials: NonZeroUsize) -> Self {
        self.trials = trials;
        self
    }

    /// Runs concurrent jobs on a dedicated pool of `threads` threads instead of rayon's
    /// global pool.
    pub fn threads(mut self, threads: NonZeroUsize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn build(self) -> Result<BenchmarkHarness, BenchmarkError> {
        let orchestrator = match self.threads {
            Some(threads) => Orchestrator::with_threads(threads)?,
            None => Orchestrator::new(),
        };
        Ok(BenchmarkHarness {
            strategy: self.strategy,
            trials: self.trials,
            orchestrator,
        })
    }

    pub fn measure(self, source: DataSource) -> Result<Benchmark, BenchmarkError> {
        self.build()?.measure(source)
    }
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Concurrent,
            trials: NonZeroUsize::new(DEFAULT_TRIALS).expect("never fails"),
            threads: None,
        }
    }
}

/// Repeats a full fit-all-features pass and times each repetition.
#[derive(Debug)]
pub struct BenchmarkHarness {
    strategy: Strategy,
    trials: NonZeroUsize,
    orchestrator: Orchestrator,
}

impl BenchmarkHarness {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn measure(&self, source: DataSource) -> Result<Benchmark, BenchmarkError> {
        let trials = (0..self.trials.get()).try_fold(
            Accumulator::default(),
            |acc, trial| -> Result<_, BenchmarkError> {
                let start = Instant::now();
                let fits = self.pass(source)?;
                let duration = start.elapsed();
                debug!("{} trial {}: {:?}", self.strategy, trial, duration);
                Ok(acc.record(TrialMeasurement { trial, duration }, fits))
            },
        )?;

        let benchmark = trials.finish(self.strategy);
        info!(
            "{}: {} trials, total {:?}, average {:?}",
            benchmark.strategy,
            benchmark.trials.len(),
            benchmark.total,
            benchmark.average
        );
        Ok(benchmark)
    }

    fn pass(&self, source: DataSource) -> Result<Vec<FeatureFit>, BenchmarkError> {
        let fits = match source {
            DataSource::Loaded(table) => self.strategy.fit_all(&self.orchestrator, table)?,
            DataSource::ReloadEachTrial(path) => {
                let table = load_table(path)?;
                self.strategy.fit_all(&self.orchestrator, &table)?
            }
        };
        Ok(fits)
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    total: Duration,
    trials: Vec<TrialMeasurement>,
    fits: Vec<FeatureFit>,
}

impl Accumulator {
    fn record(mut self, measurement: TrialMeasurement, fits: Vec<FeatureFit>) -> Self {
        self.total += measurement.duration;
        self.trials.push(measurement);
        self.fits = fits;
        self
    }

    fn finish(self, strategy: Strategy) -> Benchmark {
        debug_assert!(!self.trials.is_empty());
        let average = self.total.div_f64(self.trials.len() as f64);
        Benchmark {
            strategy,
            trials: self.trials,
            total: self.total,
            average,
            fits: self.fits,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialMeasurement {
    pub trial: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct Benchmark {
    pub strategy: Strategy,
    pub trials: Vec<TrialMeasurement>,
    pub total: Duration,
    pub average: Duration,
    /// Fits of the final trial, in feature-index order.
    pub fits: Vec<FeatureFit>,
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total execution time over {} runs: {:?}",
            self.trials.len(),
            self.total
        )?;
        write!(f, "Average execution time per run: {:?}", self.average)
    }
}

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("cannot build the worker thread pool")]
    ThreadPool(#[from] ThreadPoolBuildError),

    #[error("cannot load the table")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Job(#[from] JobError),
}
