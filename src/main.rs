//! Onpage-Crawl main entry point
//!
//! This is the command-line interface for the Onpage-Crawl domain crawler.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use onpage_crawl::config::{load_config_or_default, Config};
use onpage_crawl::output::simple_report;
use onpage_crawl::scope::load_domain_inputs;
use onpage_crawl::storage::open_job_store;
use onpage_crawl::{CrawlJob, DomainInput, JobRunner, JobStatus};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Onpage-Crawl: a single-domain on-page crawler
///
/// Crawls a domain breadth-first from its root, records meta robots and
/// index status per page, and probes the HTTP status of every link found.
#[derive(Parser, Debug)]
#[command(name = "onpage-crawl")]
#[command(version)]
#[command(about = "A single-domain on-page crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a single domain
    Crawl {
        /// Domain or URL to crawl, e.g. example.com
        domain: String,

        /// Page budget (defaults to limits.max-pages-per-domain)
        #[arg(long, value_name = "N")]
        max_pages: Option<usize>,

        /// Only crawl links under this path prefix (repeatable)
        #[arg(long = "allow", value_name = "PREFIX")]
        allow: Vec<String>,

        /// Never crawl links under this path prefix (repeatable)
        #[arg(long = "block", value_name = "PREFIX")]
        block: Vec<String>,
    },

    /// Crawl every domain listed in a JSON file
    CrawlFile {
        /// JSON array of domains, or {"domains": [...]}
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Print the latest job status
    Status,

    /// Print the simplified report of the latest job
    Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Invalid default configuration".to_string(),
        })?;

    match cli.command {
        Command::Crawl {
            domain,
            max_pages,
            allow,
            block,
        } => {
            let input = DomainInput {
                max_pages,
                allowed_paths: allow,
                blocked_paths: block,
                ..DomainInput::new(domain)
            };
            handle_crawl(config, vec![input]).await
        }
        Command::CrawlFile { path } => {
            let inputs = load_domain_inputs(&path)
                .with_context(|| format!("Failed to read domain list {}", path.display()))?;
            if inputs.is_empty() {
                bail!("No domains found in {}", path.display());
            }
            handle_crawl(config, inputs).await
        }
        Command::Status => handle_status(&config),
        Command::Report => handle_report(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("onpage_crawl=info,warn"),
            1 => EnvFilter::new("onpage_crawl=debug,info"),
            2 => EnvFilter::new("onpage_crawl=trace,debug"),
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

/// Runs a crawl job to completion and prints a per-domain summary
async fn handle_crawl(config: Config, inputs: Vec<DomainInput>) -> anyhow::Result<()> {
    let store = open_job_store(Path::new(&config.output.status_path));
    let runner = Arc::new(JobRunner::new(config, store)?);

    let (job, handle) = runner.spawn(inputs);
    tracing::info!("Job {} scheduled", job.job_id);

    let job = handle.await.context("Crawl job task aborted")?;
    print_summary(&job);

    if job.status == JobStatus::Failed {
        bail!(
            "Crawl job {} failed: {}",
            job.job_id,
            job.message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn print_summary(job: &CrawlJob) {
    println!("Job {}: {}", job.job_id, job.status);
    if let Some(message) = &job.message {
        println!("  {}", message);
    }

    for report in job.reports.iter().flatten() {
        let failed = report.pages.iter().filter(|p| !p.ok).count();
        println!(
            "  {} - {} page(s), {} failed, {} ms",
            report.domain,
            report.pages.len(),
            failed,
            report.duration_ms
        );
        println!("    report: {}", report.report_path);
    }
}

/// Prints the persisted job as JSON
fn handle_status(config: &Config) -> anyhow::Result<()> {
    let job = open_job_store(Path::new(&config.output.status_path)).current();
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

/// Prints the simplified report of the persisted job as JSON
fn handle_report(config: &Config) -> anyhow::Result<()> {
    let job = open_job_store(Path::new(&config.output.status_path)).current();
    match simple_report(&job) {
        Some(pages) => println!("{}", serde_json::to_string_pretty(&pages)?),
        None => println!("No crawl report available yet"),
    }
    Ok(())
}
