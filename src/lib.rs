pub use harness::{
    Benchmark, BenchmarkError, BenchmarkHarness, BenchmarkOptions, DataSource, TrialMeasurement,
    DEFAULT_TRIALS,
};
pub use job::{FeatureFit, FeatureJob, JobError};
pub use loader::{load_table, read_table, LoadError};
pub use orchestrator::{FeatureOutcome, Orchestrator, TaskDone, TaskGroup};
pub use regression::{fit, FitError, LinearFit};
pub use strategy::{best_predictor, fit_all_sequential, results_agree, Strategy};
pub use table::{Table, TableError};

mod functions;
mod harness;
mod job;
mod loader;
mod orchestrator;
mod regression;
mod strategy;
mod table;
