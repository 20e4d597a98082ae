//! Bounded job queue and completion tracking
//!
//! The queue is a bounded tokio channel shared by every worker. Producers
//! never block: a job offered to a full queue is dropped. The completion
//! tracker counts jobs that were accepted but not yet fully processed; when
//! it returns to zero the queue closes and every pending `take` returns
//! `None`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use url::Url;

/// A URL waiting to be fetched, with its distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// The URL to fetch
    pub url: Url,

    /// Number of links followed from the seed (the seed is 0)
    pub depth: u32,
}

impl Job {
    /// Creates a new job
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }
}

/// Counter of outstanding jobs
///
/// Credited once per accepted job and settled once per processed job. The
/// counter never goes below zero; reaching zero fires the `done` signal,
/// which is never reset.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    outstanding: AtomicUsize,
    done: CancellationToken,
}

impl CompletionTracker {
    /// Creates a tracker with no outstanding jobs
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more outstanding job
    pub fn credit(&self) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
    }

    /// Records that one outstanding job is finished
    ///
    /// Returns `true` if this call brought the counter to zero.
    pub fn settle(&self) -> bool {
        match self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => {
                self.done.cancel();
                true
            }
            Ok(_) => false,
            Err(_) => {
                tracing::error!("Completion tracker settled with no outstanding jobs");
                false
            }
        }
    }

    /// Number of jobs accepted but not yet processed
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Fires the done signal regardless of the counter
    pub fn finish(&self) {
        self.done.cancel();
    }

    /// Returns true once the counter has reached zero (or `finish` was called)
    pub fn is_done(&self) -> bool {
        self.done.is_cancelled()
    }

    /// Waits until the tracker is done
    pub async fn wait(&self) {
        self.done.cancelled().await
    }
}

/// Bounded multi-consumer queue of pending jobs
#[derive(Debug)]
pub struct JobQueue {
    sender: mpsc::Sender<Job>,
    receiver: Mutex<mpsc::Receiver<Job>>,
    tracker: CompletionTracker,
    dropped: AtomicU64,
}

impl JobQueue {
    /// Creates a queue holding at most `capacity` pending jobs
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Configuration validation rejects it.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);

        Self {
            sender,
            receiver: Mutex::new(receiver),
            tracker: CompletionTracker::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Offers a job without blocking
    ///
    /// The tracker is credited before the job becomes visible to workers.
    /// If the queue is full the job is dropped, the credit is taken back,
    /// and `false` is returned. Offers after the queue closed are refused.
    pub fn offer(&self, job: Job) -> bool {
        if self.tracker.is_done() {
            tracing::debug!("Queue closed, refusing {}", job.url);
            return false;
        }

        self.tracker.credit();

        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                tracing::warn!("Queue full, dropping {} (depth {})", job.url, job.depth);
                self.dropped.fetch_add(1, Ordering::Relaxed);
                self.tracker.settle();
                false
            }
            Err(TrySendError::Closed(job)) => {
                tracing::debug!("Queue closed, refusing {}", job.url);
                self.tracker.settle();
                false
            }
        }
    }

    /// Takes the next job, waiting while the queue is empty
    ///
    /// Returns `None` once the queue is closed. The queue only closes when
    /// no job is outstanding, so nothing is left behind.
    pub async fn take(&self) -> Option<Job> {
        let mut receiver = tokio::select! {
            biased;
            _ = self.tracker.wait() => return None,
            receiver = self.receiver.lock() => receiver,
        };

        tokio::select! {
            biased;
            _ = self.tracker.wait() => None,
            job = receiver.recv() => job,
        }
    }

    /// Marks one taken job as fully processed
    ///
    /// Closes the queue when this was the last outstanding job.
    pub fn complete(&self) {
        if self.tracker.settle() {
            tracing::debug!("No outstanding jobs left, closing queue");
        }
    }

    /// Closes the queue immediately
    pub fn close(&self) {
        self.tracker.finish();
    }

    /// Returns true once the queue is closed
    pub fn is_closed(&self) -> bool {
        self.tracker.is_done()
    }

    /// Number of jobs accepted but not yet processed
    pub fn outstanding(&self) -> usize {
        self.tracker.outstanding()
    }

    /// Number of jobs dropped because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
