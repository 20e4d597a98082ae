//! Visited-URL set shared by all workers

use std::collections::HashSet;
use std::sync::Mutex;

/// Set of canonical URLs already scheduled during one crawl run
///
/// `try_claim` is the only way in and the set only grows, so each URL is
/// handed to the queue at most once for the lifetime of the run.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for scheduling
    ///
    /// Returns `true` for the first caller that claims `url` and `false` for
    /// every later one. Check and insert happen under one lock.
    pub fn try_claim(&self, url: &str) -> bool {
        let mut urls = self.urls.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        urls.insert(url.to_string())
    }

    /// Returns true if the URL was already claimed
    pub fn contains(&self, url: &str) -> bool {
        let urls = self.urls.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        urls.contains(url)
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        let urls = self.urls.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        urls.len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
