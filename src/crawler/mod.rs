//! Crawler module for mirroring a site
//!
//! This module contains the core crawling logic, including:
//! - The visited set and the bounded job queue with completion tracking
//! - HTTP fetching and writing bodies into the mirror
//! - HTML parsing and link extraction
//! - The worker pool and the session that ties it together

mod fetcher;
mod parser;
mod persist;
mod queue;
mod session;
mod visited;
mod worker;

pub use fetcher::{build_http_client, fetch_url, is_html_content_type, FetchResult};
pub use parser::{decode_body, extract_links, parse_html, HtmlPage, Links};
pub use persist::persist_body;
pub use queue::{CompletionTracker, Job, JobQueue};
pub use session::Downloader;
pub use visited::VisitedSet;

use crate::config::{parse_seed, Config};
use crate::output::CrawlStatistics;
use crate::MirrorError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed URL and configuration
/// 2. Build the HTTP client
/// 3. Queue the seed and start the workers
/// 4. Fetch, persist and follow links until no work is left
/// 5. Return the run statistics
///
/// # Arguments
///
/// * `seed` - The absolute URL to start from
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed
/// * `Err(MirrorError)` - Crawl could not start, or a worker panicked
///
/// # Example
///
/// ```no_run
/// use mirrorcrawl::config::Config;
/// use mirrorcrawl::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stats = crawl("https://example.com/", Config::default()).await?;
/// println!("{} files mirrored", stats.mirrored());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(seed: &str, config: Config) -> Result<CrawlStatistics, MirrorError> {
    let seed = parse_seed(seed)?;
    Downloader::new(seed, &config)?.run().await
}
