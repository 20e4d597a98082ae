//! Crawl session - state shared by every worker of one run
//!
//! A `Downloader` owns everything a run needs: the seed origin, the output
//! root, the depth limit, the visited set, the job queue with its completion
//! tracker, the HTTP client and the statistics counters. Nothing is global,
//! so several sessions can run side by side in one process.

use crate::config::{validate, Config};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::queue::{Job, JobQueue};
use crate::crawler::visited::VisitedSet;
use crate::crawler::worker::run_worker;
use crate::output::{CrawlStatistics, CrawlStats};
use crate::url::{canonicalize, is_render_asset, Origin};
use crate::{MirrorError, Result};
use chrono::Utc;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// One crawl run
pub struct Downloader {
    pub(super) seed: Url,
    pub(super) origin: Origin,
    pub(super) output_root: PathBuf,
    pub(super) max_depth: u32,
    pub(super) workers: usize,
    pub(super) visited: VisitedSet,
    pub(super) queue: JobQueue,
    pub(super) client: Client,
    pub(super) stats: CrawlStats,
}

impl Downloader {
    /// Creates a new session
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute http(s) URL the crawl starts from; its host is the
    ///   only host ever fetched
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Downloader)` - Ready to `run`
    /// * `Err(MirrorError)` - Invalid configuration or seed, or the HTTP
    ///   client could not be built
    pub fn new(seed: Url, config: &Config) -> Result<Self> {
        validate(config)?;

        let origin = Origin::from_seed(&seed)?;

        let client =
            build_http_client(&config.http, &origin).map_err(|source| MirrorError::Http {
                url: seed.to_string(),
                source,
            })?;

        Ok(Self {
            seed,
            origin,
            output_root: PathBuf::from(&config.output.directory),
            max_depth: config.crawler.max_depth,
            workers: config.crawler.workers,
            visited: VisitedSet::new(),
            queue: JobQueue::new(config.crawler.queue_capacity),
            client,
            stats: CrawlStats::new(),
        })
    }

    /// The origin this session is restricted to
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Root directory of the mirror
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// URLs claimed so far
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// The job queue of this session
    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Offers a URL to the queue if it passes the enqueue gate
    ///
    /// # Gate
    ///
    /// 1. Out-of-scope URLs are dropped silently
    /// 2. `depth` must be at most `max_depth`, unless the URL is a render asset
    /// 3. The canonical URL must be claimed for the first time
    /// 4. The queue must have room (otherwise the job is dropped)
    ///
    /// The depth check runs before the claim so that a URL first seen too
    /// deep can still be scheduled when found again at a shallower depth.
    /// Within the limit the first claim wins: workers do not run strictly
    /// breadth-first, so a page first found at `d + 1` keeps that depth even
    /// if it is found again at `d`, and its children may fall outside
    /// `max_depth` depending on scheduling.
    ///
    /// # Returns
    ///
    /// `true` if a job was queued
    pub fn enqueue(&self, mut url: Url, depth: u32) -> bool {
        if !self.origin.contains(&url) {
            return false;
        }

        if depth > self.max_depth && !is_render_asset(&url) {
            tracing::trace!("Depth {} exceeds limit for {}", depth, url);
            return false;
        }

        url.set_fragment(None);
        if !self.visited.try_claim(&canonicalize(&url)) {
            return false;
        }

        tracing::debug!("Queueing {} (depth {})", url, depth);
        self.queue.offer(Job::new(url, depth))
    }

    /// Runs the crawl to completion
    ///
    /// Seeds the queue at depth 0, spawns the workers and waits until all of
    /// them have exited, which happens once no job is outstanding. Fetch,
    /// persist and extraction failures are logged and counted, never
    /// returned.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStatistics)` - Crawl finished
    /// * `Err(MirrorError::Worker)` - A worker task panicked
    pub async fn run(self) -> Result<CrawlStatistics> {
        let started_at = Utc::now();
        let start = Instant::now();

        tracing::info!(
            "Mirroring {} into {} (max depth {}, {} workers)",
            self.seed,
            self.output_root.display(),
            self.max_depth,
            self.workers
        );

        let session = Arc::new(self);

        if !session.enqueue(session.seed.clone(), 0) {
            tracing::warn!("Seed {} could not be queued", session.seed);
            session.queue.close();
        }

        let mut workers = JoinSet::new();
        for id in 0..session.workers {
            workers.spawn(run_worker(id, Arc::clone(&session)));
        }

        let mut failure = None;
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!("Worker task failed: {}", e);
                // The failed worker never settled its job; release the others
                session.queue.close();
                failure.get_or_insert(MirrorError::Worker(e.to_string()));
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        let statistics = session.stats.snapshot(
            started_at,
            start.elapsed(),
            session.visited.len(),
            session.queue.dropped(),
        );

        tracing::info!(
            "Crawl completed: {} jobs, {} mirrored in {:?}",
            statistics.total_jobs,
            statistics.mirrored(),
            statistics.elapsed
        );

        Ok(statistics)
    }
}
