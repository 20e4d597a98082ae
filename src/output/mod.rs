//! Output module for crawl reporting
//!
//! This module handles:
//! - Recording per-job outcomes while the crawl runs
//! - Producing the final statistics snapshot
//! - Printing the statistics report

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics, CrawlStats};
