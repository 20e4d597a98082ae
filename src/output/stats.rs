//! Statistics gathering for a crawl run
//!
//! Workers record one outcome per job into `CrawlStats`; at the end of the
//! run the session turns it into a `CrawlStatistics` snapshot.

use crate::state::JobState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters shared by all workers
#[derive(Debug, Default)]
pub struct CrawlStats {
    by_state: [AtomicU64; 6],
    bytes_written: AtomicU64,
    links_discovered: AtomicU64,
}

impl CrawlStats {
    /// Creates zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the terminal state of one job
    pub fn record(&self, state: JobState) {
        self.by_state[state.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Records bytes written to the mirror
    pub fn add_bytes(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records links extracted from a page, before scope and depth filtering
    pub fn add_links(&self, links: u64) {
        self.links_discovered.fetch_add(links, Ordering::Relaxed);
    }

    /// Current count for one state
    pub fn count(&self, state: JobState) -> u64 {
        self.by_state[state.index()].load(Ordering::Relaxed)
    }

    /// Total number of processed jobs
    pub fn total_jobs(&self) -> u64 {
        JobState::all_states()
            .iter()
            .map(|state| self.count(*state))
            .sum()
    }

    /// Builds a snapshot of the counters
    pub fn snapshot(
        &self,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        urls_claimed: usize,
        jobs_dropped: u64,
    ) -> CrawlStatistics {
        let jobs_by_state = JobState::all_states()
            .iter()
            .filter_map(|state| {
                let count = self.count(*state);
                (count > 0).then_some((*state, count))
            })
            .collect();

        CrawlStatistics {
            started_at,
            finished_at: Utc::now(),
            elapsed,
            total_jobs: self.total_jobs(),
            jobs_by_state,
            urls_claimed,
            jobs_dropped,
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the last worker exited
    pub finished_at: DateTime<Utc>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Total number of jobs processed
    pub total_jobs: u64,

    /// Count of jobs by terminal state (zero counts omitted)
    pub jobs_by_state: HashMap<JobState, u64>,

    /// Number of distinct URLs claimed in the visited set
    pub urls_claimed: usize,

    /// Jobs dropped because the queue was full
    pub jobs_dropped: u64,

    /// Links extracted from HTML pages, before filtering
    pub links_discovered: u64,

    /// Bytes written to the mirror
    pub bytes_written: u64,
}

impl CrawlStatistics {
    /// Count for one state, zero if none
    pub fn count(&self, state: JobState) -> u64 {
        self.jobs_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Number of files written to the mirror
    pub fn mirrored(&self) -> u64 {
        self.sum_where(JobState::is_success)
    }

    /// Jobs that failed on the network side (dead links included)
    pub fn fetch_failures(&self) -> u64 {
        self.sum_where(JobState::is_fetch_failure)
    }

    fn sum_where(&self, predicate: impl Fn(&JobState) -> bool) -> u64 {
        self.jobs_by_state
            .iter()
            .filter(|(state, _)| predicate(state))
            .map(|(_, count)| count)
            .sum()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Finished: {}", stats.finished_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Duration: {:.2}s", stats.elapsed.as_secs_f64());
    println!("  Jobs processed: {}", stats.total_jobs);
    println!("  URLs claimed: {}", stats.urls_claimed);
    println!("  Links discovered: {}", stats.links_discovered);
    println!("  Bytes written: {}", stats.bytes_written);
    println!();

    println!("Jobs by State:");
    // Sort states by count (descending)
    let mut state_counts: Vec<_> = stats.jobs_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (state, count) in state_counts {
        let percentage = if stats.total_jobs > 0 {
            (*count as f64 / stats.total_jobs as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    if stats.jobs_dropped > 0 {
        println!("Dropped (queue full): {}", stats.jobs_dropped);
    }
    println!("Fetch failures: {}", stats.fetch_failures());
    println!();

    let success_rate = if stats.total_jobs > 0 {
        (stats.mirrored() as f64 / stats.total_jobs as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} jobs mirrored)",
        success_rate,
        stats.mirrored(),
        stats.total_jobs
    );
}
