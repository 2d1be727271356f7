//! Extension ID search engine

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use ceid_identity::{Candidate, KeySource};
use ceid_pattern::{estimated_tries, PatternError, Prefix};

use crate::stats::SearchStats;

/// Consecutive generation failures after which a worker gives up
pub const MAX_CONSECUTIVE_FAILURES: u32 = 16;

/// Default refresh interval for progress callbacks
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("Thread count must be at least 1")]
    NoWorkers,
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Key generation failed {0} times in a row")]
    GenerationFailed(u32),
    #[error("All workers stopped without a result")]
    WorkersExited,
}

/// Search configuration, fixed before any worker starts
#[derive(Debug, Clone)]
pub struct SearchConfig {
    prefix: Prefix,
    threads: usize,
}

impl SearchConfig {
    pub fn new(prefix: Prefix, threads: usize) -> Result<Self, SearchError> {
        if threads == 0 {
            return Err(SearchError::NoWorkers);
        }
        Ok(Self { prefix, threads })
    }

    /// Validate a raw prefix and thread count
    pub fn parse(prefix: &str, threads: usize) -> Result<Self, SearchError> {
        Self::new(Prefix::new(prefix)?, threads)
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

/// Search result
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The winning candidate
    pub candidate: Candidate,
    /// Prefix that was matched
    pub prefix: String,
    /// Total keys tested
    pub keys_tested: u64,
    /// Time taken in seconds
    pub time_secs: f64,
    /// Keys per second achieved
    pub keys_per_second: f64,
}

/// How a search ended without an error
#[derive(Debug)]
pub enum SearchOutcome {
    Found(SearchResult),
    Cancelled,
}

/// Terminal state of a single worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerExit {
    /// Claimed the match and handed its candidate to the coordinator
    Won,
    /// Another worker claimed first
    Lost,
    Cancelled,
    /// Stopped because another worker gave up
    Aborted,
    /// Gave up after too many consecutive generation failures
    Failed,
}

/// Extension ID search engine
pub struct VanitySearch {
    source: Arc<dyn KeySource>,
    config: SearchConfig,
    stats: Arc<SearchStats>,
    difficulty: f64,
}

impl VanitySearch {
    /// Create a new search
    pub fn new(config: SearchConfig, source: Box<dyn KeySource>) -> Self {
        let difficulty = estimated_tries(config.prefix.len());
        Self {
            source: Arc::from(source),
            config,
            stats: SearchStats::new(),
            difficulty,
        }
    }

    /// Expected number of attempts
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Shared stats handle, usable to observe or cancel the search
    pub fn stats(&self) -> Arc<SearchStats> {
        Arc::clone(&self.stats)
    }

    /// Run the search, blocking until a match, cancellation or failure
    pub fn run(self) -> Result<SearchOutcome, SearchError> {
        self.run_with_callback(PROGRESS_INTERVAL, |_| {})
    }

    /// Run the search, calling `callback` every `interval` while workers run
    ///
    /// Returns only after every worker has left its loop.
    pub fn run_with_callback<F>(
        self,
        interval: Duration,
        mut callback: F,
    ) -> Result<SearchOutcome, SearchError>
    where
        F: FnMut(&SearchStats),
    {
        let threads = self.config.threads;
        info!(
            prefix = %self.config.prefix,
            threads,
            difficulty = self.difficulty,
            "starting search"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("ceid-worker-{i}"))
            .build()?;

        // Only the worker that wins the claim ever sends, so one slot is enough
        let (tx, rx) = bounded::<Candidate>(1);

        for worker in 0..threads {
            let source = Arc::clone(&self.source);
            let prefix = self.config.prefix.clone();
            let stats = Arc::clone(&self.stats);
            let tx = tx.clone();

            stats.worker_started();
            pool.spawn(move || {
                let (exit, attempts) = worker_loop(worker, source.as_ref(), &prefix, &stats, &tx);
                stats.worker_stopped();
                debug!(worker, state = ?exit, attempts, "worker stopped");
            });
        }
        drop(tx);

        // The channel disconnects once every worker has dropped its sender
        let mut winner = None;
        loop {
            match rx.recv_timeout(interval) {
                Ok(candidate) => winner = Some(candidate),
                Err(RecvTimeoutError::Timeout) => callback(&self.stats),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        callback(&self.stats);

        if let Some(candidate) = winner {
            let result = SearchResult {
                candidate,
                prefix: self.config.prefix.to_string(),
                keys_tested: self.stats.total_keys(),
                time_secs: self.stats.elapsed().as_secs_f64(),
                keys_per_second: self.stats.keys_per_second(),
            };
            info!(
                id = %result.candidate.id,
                keys_tested = result.keys_tested,
                time_secs = result.time_secs,
                "match found"
            );
            return Ok(SearchOutcome::Found(result));
        }

        if self.stats.is_failed() {
            return Err(SearchError::GenerationFailed(MAX_CONSECUTIVE_FAILURES));
        }
        if self.stats.is_cancelled() {
            info!(keys_tested = self.stats.total_keys(), "search cancelled");
            return Ok(SearchOutcome::Cancelled);
        }
        Err(SearchError::WorkersExited)
    }
}

/// One worker's generate / derive / test loop
fn worker_loop(
    worker: usize,
    source: &dyn KeySource,
    prefix: &Prefix,
    stats: &SearchStats,
    slot: &Sender<Candidate>,
) -> (WorkerExit, u64) {
    let mut attempts = 0u64;
    let mut consecutive_failures = 0u32;

    loop {
        if stats.is_found() {
            return (WorkerExit::Lost, attempts);
        }
        if stats.is_cancelled() {
            return (WorkerExit::Cancelled, attempts);
        }
        if stats.is_failed() {
            return (WorkerExit::Aborted, attempts);
        }

        let candidate = match source.generate() {
            Ok(candidate) => {
                consecutive_failures = 0;
                candidate
            }
            Err(e) => {
                consecutive_failures += 1;
                warn!(worker, consecutive_failures, error = %e, "candidate generation failed");
                if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    stats.mark_failed();
                    return (WorkerExit::Failed, attempts);
                }
                continue;
            }
        };

        attempts += 1;
        stats.add_keys(1);

        if !prefix.matches(candidate.id.as_str()) {
            continue;
        }

        if !stats.try_claim() {
            return (WorkerExit::Lost, attempts);
        }
        if let Err(e) = slot.try_send(candidate) {
            error!(worker, error = %e, "failed to hand over winning candidate");
        }
        return (WorkerExit::Won, attempts);
    }
}
