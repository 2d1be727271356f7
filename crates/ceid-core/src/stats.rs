//! Shared search state

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ceid_pattern::difficulty::{estimate_time_50pct, format_duration};

/// Thread-safe search state shared by the coordinator and every worker
///
/// `found` is claimed exactly once through compare-and-swap. The attempt
/// counter is advisory and uses relaxed ordering.
#[derive(Debug)]
pub struct SearchStats {
    keys_tested: AtomicU64,
    start_time: Instant,
    found: AtomicBool,
    cancelled: AtomicBool,
    failed: AtomicBool,
    active_workers: AtomicUsize,
}

impl SearchStats {
    /// Create new stats
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Increment keys tested by amount
    pub fn add_keys(&self, count: u64) {
        self.keys_tested.fetch_add(count, Ordering::Relaxed);
    }

    /// Get total keys tested
    pub fn total_keys(&self) -> u64 {
        self.keys_tested.load(Ordering::Relaxed)
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get keys per second
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_keys() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Claim the winning slot. Returns true for exactly one caller.
    pub fn try_claim(&self) -> bool {
        self.found
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Check if a match was claimed
    pub fn is_found(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }

    /// Request every worker to stop without a result
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Mark the search as failed, stopping every worker
    pub fn mark_failed(&self) {
        self.failed.store(true, Ordering::Release);
    }

    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Check if workers should keep generating candidates
    pub fn is_running(&self) -> bool {
        !(self.is_found() || self.is_cancelled() || self.is_failed())
    }

    pub(crate) fn worker_started(&self) {
        self.active_workers.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn worker_stopped(&self) {
        self.active_workers.fetch_sub(1, Ordering::AcqRel);
    }

    /// Number of workers currently inside their search loop
    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::Acquire)
    }

    /// Get formatted stats string
    pub fn format(&self, difficulty: f64) -> String {
        let keys = self.total_keys();
        let kps = self.keys_per_second();

        // Probability of at least one hit so far
        let prob = if difficulty > 0.0 {
            1.0 - (-(keys as f64) / difficulty).exp()
        } else {
            0.0
        };

        let remaining_for_50 = estimate_time_50pct(difficulty, keys, kps);

        format!(
            "Tries: {} [{:.2} key/s][Prob {:.1}%][50% in {}]",
            keys,
            kps,
            prob * 100.0,
            format_duration(remaining_for_50)
        )
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self {
            keys_tested: AtomicU64::new(0),
            start_time: Instant::now(),
            found: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            failed: AtomicBool::new(false),
            active_workers: AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_single_claim() {
        let stats = SearchStats::new();
        assert!(stats.try_claim());
        assert!(!stats.try_claim());
        assert!(stats.is_found());
        assert!(!stats.is_running());
    }

    #[test]
    fn test_concurrent_claim_has_one_winner() {
        let stats = SearchStats::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || stats.try_claim())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_counter() {
        let stats = SearchStats::new();
        stats.add_keys(3);
        stats.add_keys(4);
        assert_eq!(stats.total_keys(), 7);
    }

    #[test]
    fn test_cancel_and_fail_stop_running() {
        let stats = SearchStats::new();
        assert!(stats.is_running());
        stats.cancel();
        assert!(!stats.is_running());
        assert!(!stats.is_found());

        let stats = SearchStats::new();
        stats.mark_failed();
        assert!(!stats.is_running());
        assert!(stats.is_failed());
    }

    #[test]
    fn test_format_contains_tries() {
        let stats = SearchStats::new();
        stats.add_keys(42);
        assert!(stats.format(16.0).starts_with("Tries: 42 "));
    }

    #[test]
    fn test_format_past_median() {
        let stats = SearchStats::new();
        stats.add_keys(100);
        // 100 tries against a 1-in-16 prefix is well past the median
        assert!(stats.format(16.0).ends_with("[50% in now]"));
    }
}
