use crate::job::{FeatureFit, FeatureJob, JobError};
use crate::table::Table;
use itertools::Itertools as _;
use log::debug;
use rayon::{Scope, ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::sync::{mpsc, Condvar, Mutex, PoisonError};
use std::thread;

/// Outcome of one feature job. Failed jobs keep their slot.
pub type FeatureOutcome = Result<FeatureFit, JobError>;

/// Countdown of outstanding tasks that can be waited on.
#[derive(Debug)]
pub struct TaskGroup {
    pending: Mutex<usize>,
    drained: Condvar,
}

impl TaskGroup {
    pub fn new(tasks: usize) -> Self {
        Self {
            pending: Mutex::new(tasks),
            drained: Condvar::new(),
        }
    }

    /// Returns a guard that marks one task as finished when dropped, including on unwind.
    pub fn done(&self) -> TaskDone<'_> {
        TaskDone(self)
    }

    /// Blocks until every task of the group has finished.
    pub fn wait(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        while *pending > 0 {
            pending = self
                .drained
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn finish_one(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        debug_assert!(*pending > 0, "more tasks finished than were started");
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.drained.notify_all();
        }
    }
}

#[must_use]
#[derive(Debug)]
pub struct TaskDone<'a>(&'a TaskGroup);

impl Drop for TaskDone<'_> {
    fn drop(&mut self) {
        self.0.finish_one();
    }
}

/// Concurrent strategy: one task per feature column, fanned in through a channel.
#[derive(Debug, Default)]
pub struct Orchestrator {
    pool: Option<ThreadPool>,
}

impl Orchestrator {
    /// Runs jobs on rayon's global thread pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs jobs on a dedicated pool of `threads` threads.
    ///
    /// One task per feature is still spawned; only the number of threads executing
    /// them at once is bounded.
    pub fn with_threads(threads: NonZeroUsize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .thread_name(|i| format!("fit-worker-{}", i))
            .build()?;
        Ok(Self { pool: Some(pool) })
    }

    /// Fits every feature of `table` concurrently.
    ///
    /// The returned vector has exactly one outcome per feature, ordered by feature index.
    /// Must not be called from a thread of the pool this orchestrator runs on.
    pub fn run_all(&self, table: &Table) -> Vec<FeatureOutcome> {
        self.run_jobs(table, |feature, table| FeatureJob::new(feature).run(table))
    }

    /// Like [`Orchestrator::run_all`] but fails with the lowest-indexed job error, if any.
    pub fn fit_all(&self, table: &Table) -> Result<Vec<FeatureFit>, JobError> {
        self.run_all(table).into_iter().collect()
    }

    /// A panicking job resumes its panic here once every other job has finished.
    fn run_jobs<F>(&self, table: &Table, job: F) -> Vec<FeatureOutcome>
    where
        F: Fn(usize, &Table) -> FeatureOutcome + Sync,
    {
        let features = table.features_len();
        let group = TaskGroup::new(features);
        let (tx, rx) = mpsc::channel();

        let outcomes = thread::scope(|threads| {
            let group = &group;
            let worker_tx = tx.clone();

            // Sole closer: the channel cannot close before the group is drained.
            threads.spawn(move || {
                group.wait();
                drop(tx);
            });

            let job = &job;
            self.in_place_scope(|scope| {
                for feature in 0..features {
                    let tx = worker_tx.clone();
                    scope.spawn(move |_| {
                        let _done = group.done();
                        let outcome = job(feature, table);
                        if let Err(e) = &outcome {
                            debug!("{}: {}", e, e.source);
                        }
                        // The receiver is drained until every sender is gone.
                        let _ = tx.send(outcome);
                    });
                }
                drop(worker_tx);
                rx.iter().collect::<Vec<_>>()
            })
        });

        debug_assert_eq!(outcomes.len(), features);
        outcomes
            .into_iter()
            .sorted_by_key(outcome_feature)
            .collect()
    }

    fn in_place_scope<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&Scope<'scope>) -> R,
    {
        match &self.pool {
            Some(pool) => pool.in_place_scope(op),
            None => rayon::in_place_scope(op),
        }
    }
}

fn outcome_feature(outcome: &FeatureOutcome) -> usize {
    match outcome {
        Ok(fit) => fit.feature,
        Err(e) => e.feature,
    }
}
