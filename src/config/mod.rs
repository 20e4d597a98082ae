//! Configuration module for mirrorcrawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every key is optional; command-line flags override file values.
//!
//! # Example
//!
//! ```no_run
//! use mirrorcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirrorcrawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config, parse_seed};
pub use validation::validate;
