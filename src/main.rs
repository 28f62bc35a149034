use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use folio_extract::fetch::{self, Fetcher, PageToc};
use folio_extract::hud::RequestLog;
use folio_extract::process_html;
use folio_extract::settings::Settings;
use folio_extract::toc::platform::{flatten_api_toc, ApiTocNode};
use folio_extract::toc::{self, HeadingNode, Platform, SourceKind};

#[derive(Parser)]
#[command(name = "folio_extract", about = "Table-of-contents and Zenn scrap extraction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum InputKind {
    Markdown,
    Html,
    /// TOC JSON from Zenn's article API
    ZennApi,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract TOCs from local files (processed in parallel)
    Toc {
        paths: Vec<PathBuf>,
        #[arg(short, long, value_enum, default_value = "markdown")]
        kind: InputKind,
        #[arg(short, long, value_enum, default_value = "generic")]
        platform: Platform,
        /// Emit a nested tree instead of a flat list
        #[arg(long)]
        tree: bool,
    },
    /// Fetch pages and extract their TOCs concurrently
    TocBatch {
        urls: Vec<String>,
        #[arg(short, long, value_enum, default_value = "note")]
        platform: Platform,
        /// Max concurrent requests (default: from settings)
        #[arg(short = 'c', long)]
        concurrency: Option<usize>,
    },
    /// Clean and structure a local HTML file
    Structure { path: PathBuf },
    /// Fetch a Zenn scrap and structure its target comment
    Scrap {
        url: String,
        /// Comment keyword (default: from settings)
        #[arg(short, long)]
        keyword: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(untagged)]
enum Outcome<T> {
    Ok(T),
    Failed { source: String, error: String },
}

impl<T> Outcome<T> {
    fn from_result(source: impl Into<String>, result: Result<T, impl std::fmt::Display>) -> Self {
        match result {
            Ok(v) => Outcome::Ok(v),
            Err(e) => Outcome::Failed {
                source: source.into(),
                error: e.to_string(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    info!(?settings, "Starting");

    match cli.command {
        Commands::Toc {
            paths,
            kind,
            platform,
            tree,
        } => {
            if paths.is_empty() {
                println!("No input files.");
                return Ok(());
            }
            let results: Vec<_> = paths
                .par_iter()
                .map(|path| {
                    let extracted = file_toc(path, kind, platform).map(|headings| {
                        let value = if tree {
                            json!(toc::build_tree(&headings))
                        } else {
                            json!(headings)
                        };
                        json!({ "path": path, "toc": value })
                    });
                    Outcome::from_result(path.display().to_string(), extracted)
                })
                .collect();
            print_json(&results)?;
        }
        Commands::TocBatch {
            urls,
            platform,
            concurrency,
        } => {
            if urls.is_empty() {
                println!("No URLs given.");
                return Ok(());
            }
            let fetcher = Arc::new(Fetcher::new(&settings)?);
            let log = Arc::new(Mutex::new(RequestLog::with_capacity(settings.log_capacity)));
            let concurrency = concurrency.unwrap_or(settings.concurrency);

            let pb = ProgressBar::new(urls.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                    .progress_chars("=> "),
            );
            let results =
                fetch::fetch_tocs(fetcher, urls, platform, concurrency, Arc::clone(&log), &pb)
                    .await;
            pb.finish_and_clear();

            let items: Vec<Outcome<PageToc>> = results
                .into_iter()
                .map(|(url, r)| Outcome::from_result(url, r))
                .collect();
            print_json(&items)?;

            let log = log.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            print_request_summary(&log);
        }
        Commands::Structure { path } => {
            let html = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            print_json(&process_html(&html))?;
        }
        Commands::Scrap { url, keyword } => {
            let fetcher = Fetcher::new(&settings)?;
            let log = Mutex::new(RequestLog::with_capacity(settings.log_capacity));
            let keyword = keyword.unwrap_or(settings.keyword);
            let content = fetcher
                .fetch_scrap(&url, &keyword, &log)
                .await
                .with_context(|| format!("Failed to process scrap {}", url))?;
            print_json(&content)?;
            print_request_summary(&log.into_inner().unwrap_or_else(|e| e.into_inner()));
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn file_toc(path: &Path, kind: InputKind, platform: Platform) -> Result<Vec<HeadingNode>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let strategy = platform.strategy();

    let headings = match kind {
        InputKind::Markdown => toc::extract_headings_with(&source, SourceKind::Markdown, strategy),
        InputKind::Html => toc::extract_headings_with(&source, SourceKind::Html, strategy),
        InputKind::ZennApi => {
            let nodes: Vec<ApiTocNode> = serde_json::from_str(&source)
                .with_context(|| format!("Invalid TOC JSON in {}", path.display()))?;
            flatten_api_toc(&nodes, strategy)
        }
    };
    Ok(toc::normalize(headings))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_request_summary(log: &RequestLog) {
    if log.is_empty() {
        return;
    }
    eprintln!(
        "\n{:>6} | {:>6} | {:>8} | {:<10} | {}",
        "Status", "ms", "server", "Cache", "URL"
    );
    eprintln!("{}", "-".repeat(72));
    for r in log.records() {
        eprintln!(
            "{:>6} | {:>6} | {:>8.1} | {:<10} | {}",
            r.status,
            r.total_ms,
            r.server_ms,
            truncate(&r.cache, 10),
            r.url
        );
    }
    eprintln!(
        "\n{} requests ({} failed), {} ms total",
        log.len(),
        log.error_count(),
        log.total_ms()
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
