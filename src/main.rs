//! Site-Scribe main entry point
//!
//! Command-line interface for converting a website into an archive of
//! per-page Word documents.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use site_scribe::config::{load_config, Config};
use site_scribe::storage::open_storage;
use site_scribe::{JobManager, JobOptions, JobStatus};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Site-Scribe: turn a website into a zip of .docx documents
///
/// Crawls a site breadth-first from a seed URL, extracts the main content of
/// every page it finds, writes one document per page and packs them into a
/// single archive.
#[derive(Parser, Debug)]
#[command(name = "site-scribe")]
#[command(version)]
#[command(about = "Convert a website into a document archive", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a job to completion and print its status
    Run(RunArgs),

    /// Print the stored status of a job
    Status {
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },

    /// List the pages recorded for a job
    Pages {
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Seed URL (http or https)
    #[arg(value_name = "URL")]
    url: String,

    /// Follow links to other hosts
    #[arg(long)]
    follow_all_domains: bool,

    /// Save images next to each document
    #[arg(long)]
    include_images: bool,

    /// Convert only the seed page
    #[arg(long)]
    single_page: bool,

    /// CSS selector for each page's main content
    #[arg(long, value_name = "CSS")]
    selector: Option<String>,

    /// Destination for the completion notice
    #[arg(long, value_name = "DEST")]
    notify: Option<String>,
}

impl From<RunArgs> for JobOptions {
    fn from(args: RunArgs) -> Self {
        JobOptions {
            follow_all_domains: args.follow_all_domains,
            include_images: args.include_images,
            single_page_only: args.single_page,
            content_selector: args.selector,
            notify: args.notify,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    match cli.command {
        Command::Run(args) => handle_run(&config, args).await,
        Command::Status { job_id } => handle_status(&config, &job_id),
        Command::Pages { job_id } => handle_pages(&config, &job_id),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_scribe=info,warn"),
            1 => EnvFilter::new("site_scribe=debug,info"),
            2 => EnvFilter::new("site_scribe=trace,debug"),
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

fn open_manager(config: &Config) -> anyhow::Result<JobManager<site_scribe::storage::SqliteStore>> {
    let store = open_storage(Path::new(&config.output.database_path))?;
    Ok(JobManager::new(config, store)?)
}

async fn handle_run(config: &Config, args: RunArgs) -> anyhow::Result<()> {
    let manager = open_manager(config)?;
    let url = args.url.clone();

    let (job_id, status) = manager.run_to_completion(&url, args.into()).await?;
    let snapshot = manager.snapshot(&job_id)?;

    println!("Job: {}", job_id);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    if let Some(path) = manager.job(&job_id)?.archive_path {
        println!("Archive: {}", path);
    }

    if status != JobStatus::Completed {
        anyhow::bail!("job {} ended in status {}", job_id, status);
    }
    Ok(())
}

fn handle_status(config: &Config, job_id: &str) -> anyhow::Result<()> {
    let manager = open_manager(config)?;
    let snapshot = manager.snapshot(job_id)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn handle_pages(config: &Config, job_id: &str) -> anyhow::Result<()> {
    let manager = open_manager(config)?;
    let pages = manager.pages(job_id)?;

    println!("{} pages for job {}\n", pages.len(), job_id);
    for page in &pages {
        let document = page.document_path.as_deref().unwrap_or("-");
        println!(
            "{:>4}  {}  {}",
            page.id,
            page.url,
            page.title.as_deref().unwrap_or("(untitled)")
        );
        println!("      {}", document);
    }
    Ok(())
}
