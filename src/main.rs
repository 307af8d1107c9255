mod app;
mod domain;
mod repo;
mod ui;
mod usecase;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use app::App;
use domain::task::{Status, TaskFields};
use repo::TaskRepository;
use repo::http::{DEFAULT_API_URL, HttpTaskRepo};
use repo::memory::InMemoryTaskRepo;
use usecase::dispatch::Dispatcher;

#[derive(Parser, Debug)]
#[command(author, version, about = "taskboard: terminal client for a REST task API", long_about = None)]
struct Args {
    /// Base URL of the task collection
    #[arg(long, env = "TASKBOARD_API_URL", default_value = DEFAULT_API_URL)]
    api_url: Url,

    /// Accept invalid TLS certificates (local dev servers)
    #[arg(long, default_value_t = false)]
    insecure: bool,

    /// Use an in-memory backend with demo tasks instead of the API
    #[arg(long, default_value_t = false)]
    demo: bool,

    /// Tick interval of render loop in milliseconds
    #[arg(long, default_value_t = 120)]
    tick_ms: u64,

    /// Log file (default: OS local data dir)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_path = match args.log_file.clone() {
        Some(path) => path,
        None => default_log_path()?,
    };
    init_logging(&log_path)?;

    let repo: Arc<dyn TaskRepository> = if args.demo {
        info!("using in-memory demo backend");
        Arc::new(InMemoryTaskRepo::with_seed(seed_tasks()))
    } else {
        let repo = HttpTaskRepo::new(args.api_url, args.insecure)
            .context("failed to init HTTP client")?;
        info!(url = %repo.base_url(), insecure = args.insecure, "using task API");
        Arc::new(repo)
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("failed to build tokio runtime: {e}"))?;

    let app = App::new(Dispatcher::new(repo, rt.handle().clone()));
    let res = ui::run(app, Duration::from_millis(args.tick_ms));
    // Requests still in flight have nobody left to report to.
    rt.shutdown_background();
    res
}

fn seed_tasks() -> Vec<TaskFields> {
    [
        ("Write documentation", 2, Status::InProgress),
        ("Review open pull requests", 1, Status::NotStarted),
        ("Draft release notes", 3, Status::Completed),
    ]
    .into_iter()
    .map(|(name, priority, status)| TaskFields {
        name: name.to_string(),
        priority: Some(priority),
        status,
    })
    .collect()
}

fn default_log_path() -> Result<PathBuf> {
    let base = dirs::data_local_dir().context("failed to resolve local data dir")?;
    Ok(base.join("taskboard").join("taskboard.log"))
}

/// Route tracing output to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TASKBOARD_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))
}
