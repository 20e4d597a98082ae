//! mirrorcrawl main entry point
//!
//! This is the command-line interface for the mirrorcrawl site mirror.

use anyhow::Context;
use clap::Parser;
use mirrorcrawl::config::{load_config, parse_seed, validate, Config};
use mirrorcrawl::output::print_statistics;
use mirrorcrawl::Downloader;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// mirrorcrawl: mirror a website into a local directory
///
/// Starting from URL, mirrorcrawl downloads pages on the same host up to the
/// given link depth, plus every stylesheet, script, image and font they
/// reference, into OUTPUT/<host>/<path>.
#[derive(Parser, Debug)]
#[command(name = "mirrorcrawl")]
#[command(version)]
#[command(about = "Mirror a website into a local directory", long_about = None)]
struct Cli {
    /// Seed URL (absolute http or https)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory [default: ./mirror]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Maximum link depth from the seed [default: 2]
    #[arg(short, long, value_name = "N")]
    depth: Option<u32>,

    /// Number of concurrent workers [default: 4]
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Job queue capacity; jobs beyond it are dropped [default: 1024]
    #[arg(long, value_name = "N")]
    queue_capacity: Option<usize>,

    /// Per-request timeout in seconds [default: 30]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// User-Agent header
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Do not validate TLS certificates
    #[arg(long)]
    insecure: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of a loaded configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(output) = &self.output {
            config.output.directory = output.to_string_lossy().into_owned();
        }
        if let Some(depth) = self.depth {
            config.crawler.max_depth = depth;
        }
        if let Some(workers) = self.workers {
            config.crawler.workers = workers;
        }
        if let Some(capacity) = self.queue_capacity {
            config.crawler.queue_capacity = capacity;
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout_secs = timeout;
        }
        if let Some(user_agent) = &self.user_agent {
            config.http.user_agent = user_agent.clone();
        }
        if self.insecure {
            config.http.accept_invalid_certs = true;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    let config = cli.apply(config);
    validate(&config).context("Invalid command-line options")?;

    let seed = parse_seed(&cli.url)?;

    if config.http.accept_invalid_certs {
        tracing::warn!("TLS certificate validation is disabled");
    }

    let downloader = Downloader::new(seed, &config).context("Failed to start crawl")?;

    match downloader.run().await {
        Ok(stats) => {
            if !cli.quiet {
                println!();
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mirrorcrawl=info,warn"),
            1 => EnvFilter::new("mirrorcrawl=debug,info"),
            2 => EnvFilter::new("mirrorcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
