//! Worker loop: fetch → persist → extract → re-enqueue

use crate::crawler::fetcher::{fetch_url, is_html_content_type, FetchResult};
use crate::crawler::parser::parse_html;
use crate::crawler::persist::persist_body;
use crate::crawler::queue::Job;
use crate::crawler::session::Downloader;
use crate::state::JobState;
use std::sync::Arc;
use url::Url;

/// Drains the session queue until it closes
///
/// Every job taken is settled exactly once, whatever its outcome.
pub(crate) async fn run_worker(id: usize, session: Arc<Downloader>) {
    tracing::debug!("Worker {} started", id);

    let mut processed = 0u64;
    while let Some(job) = session.queue.take().await {
        let state = session.process(&job).await;
        session.stats.record(state);
        session.queue.complete();
        processed += 1;
    }

    tracing::debug!("Worker {} exiting after {} jobs", id, processed);
}

impl Downloader {
    /// Processes a single job
    ///
    /// This method:
    /// 1. Fetches the URL
    /// 2. Writes a successful body to the mirror
    /// 3. For HTML bodies, extracts links and offers them at `depth + 1`
    ///
    /// Failures are logged and mapped to a terminal `JobState`.
    pub(crate) async fn process(&self, job: &Job) -> JobState {
        match fetch_url(&self.client, &job.url).await {
            FetchResult::Success {
                final_url,
                status_code,
                content_type,
                body,
            } => {
                let state = match persist_body(&job.url, &self.output_root, &body).await {
                    Ok(path) => {
                        self.stats.add_bytes(body.len() as u64);
                        tracing::info!("{} {} -> {}", status_code, job.url, path.display());
                        JobState::Mirrored
                    }
                    Err(e) => {
                        tracing::error!("{} {}: {}", status_code, job.url, e);
                        JobState::PersistFailed
                    }
                };

                // Links are followed even when the write failed
                if is_html_content_type(&content_type) {
                    self.follow_links(job, &final_url, &content_type, &body);
                }

                state
            }

            FetchResult::HttpError { status_code, state } => {
                tracing::warn!("{} {}", status_code, job.url);
                state
            }

            FetchResult::NetworkError { error, state } => {
                tracing::warn!("ERR {}: {}", job.url, error);
                state
            }
        }
    }

    /// Offers every link of an HTML body to the queue
    ///
    /// Kept synchronous: the parsed document never lives across an await.
    fn follow_links(&self, job: &Job, base: &Url, content_type: &str, body: &[u8]) {
        let page = parse_html(body, content_type);

        let child_depth = job.depth.saturating_add(1);
        let mut found = 0u64;
        let mut queued = 0u64;

        for link in page.links(base) {
            found += 1;
            if self.enqueue(link, child_depth) {
                queued += 1;
            }
        }

        self.stats.add_links(found);
        tracing::debug!(
            "{}: {} links found, {} queued at depth {}",
            job.url,
            found,
            queued,
            child_depth
        );
    }
}
