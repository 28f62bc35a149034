use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, PRAGMA};
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

use crate::error::{ExtractError, Result};
use crate::hud::{RequestLog, RequestRecord};
use crate::scrap::{comments, process_html, ScrapContent};
use crate::settings::Settings;
use crate::toc::{self, html, HeadingNode, Platform, SourceKind};

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize)]
pub struct PageToc {
    pub url: String,
    pub title: String,
    pub toc: Vec<HeadingNode>,
}

/// HTTP collaborator. Owns retries; the extraction core never sees the network.
pub struct Fetcher {
    client: reqwest::Client,
    max_retries: u32,
    backoff: Duration,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()?;

        Ok(Fetcher {
            client,
            max_retries: settings.max_retries,
            backoff: settings.backoff(),
        })
    }

    /// GET a page body, retrying rate limits and upstream 5xx with exponential backoff.
    /// Every attempt lands in `log`.
    pub async fn fetch_page(&self, url: &str, log: &Mutex<RequestLog>) -> Result<String> {
        let mut attempt = 0;
        loop {
            let (record, result) = self.get_once(url).await;
            log.lock().unwrap_or_else(PoisonError::into_inner).record(record);

            match result {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let backoff = backoff_delay(self.backoff, attempt);
                    warn!(
                        "{} for {} (attempt {}/{}), backing off {:.1}s",
                        e,
                        url,
                        attempt + 1,
                        self.max_retries,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn get_once(&self, url: &str) -> (RequestRecord, Result<String>) {
        let start = Instant::now();
        let mut record = RequestRecord::new(url, "GET");

        let result = match self.client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                record.status = status.as_u16();
                let headers = resp.headers();
                if let Some(timing) = header_str(headers, "server-timing") {
                    record = record.with_server_timing(&timing);
                }
                if let Some(region) = header_str(headers, "x-region") {
                    record.region = region;
                }
                if let Some(cache) = header_str(headers, "x-cache") {
                    record.cache = cache;
                }

                if status.is_success() {
                    resp.text().await.map_err(ExtractError::from)
                } else {
                    Err(ExtractError::Http {
                        url: url.to_string(),
                        status: status.as_u16(),
                    })
                }
            }
            Err(e) => Err(e.into()),
        };

        record.total_ms = start.elapsed().as_millis() as u64;
        if let Err(e) = &result {
            record.error = Some(e.to_string());
        }
        debug!(url, status = record.status, ms = record.total_ms, "fetched");
        (record, result)
    }

    /// Fetch a Zenn scrap, pick the comment containing `keyword`, and process it.
    pub async fn fetch_scrap(
        &self,
        url: &str,
        keyword: &str,
        log: &Mutex<RequestLog>,
    ) -> Result<ScrapContent> {
        let page = self.fetch_page(url, log).await?;
        let comments = comments::comments_from_page(&page)?;
        info!("Scrap {} has {} comments", url, comments.len());
        let body = comments::select_comment(&comments, keyword)?;
        Ok(process_html(body))
    }

    pub async fn fetch_toc(
        &self,
        url: &str,
        platform: Platform,
        log: &Mutex<RequestLog>,
    ) -> Result<PageToc> {
        let page = self.fetch_page(url, log).await?;
        let headings = toc::extract_headings_with(&page, SourceKind::Html, platform.strategy());
        Ok(PageToc {
            url: url.to_string(),
            title: html::extract_title(&page),
            toc: toc::normalize(headings),
        })
    }
}

/// `base * 2^attempt`, capped at `MAX_BACKOFF` instead of overflowing.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    2u32.checked_pow(attempt)
        .and_then(|factor| base.checked_mul(factor))
        .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Fetch TOCs for many pages concurrently. One result per URL, in input order.
pub async fn fetch_tocs(
    fetcher: Arc<Fetcher>,
    urls: Vec<String>,
    platform: Platform,
    concurrency: usize,
    log: Arc<Mutex<RequestLog>>,
    pb: &ProgressBar,
) -> Vec<(String, Result<PageToc>)> {
    let results = run_batch(urls.clone(), concurrency, pb, move |url: String| {
        let fetcher = Arc::clone(&fetcher);
        let log = Arc::clone(&log);
        async move { fetcher.fetch_toc(&url, platform, &log).await }
    })
    .await;

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(
        "Fetched {} {} pages ({} ok, {} errors)",
        urls.len(),
        platform.strategy().name(),
        urls.len() - failed,
        failed
    );
    urls.into_iter().zip(results).collect()
}

/// Run `job` over `inputs` with at most `concurrency` in flight.
///
/// Results come back in input order. A job that errors or panics yields an
/// `Err` in its own slot and never affects the others.
pub async fn run_batch<T, R, F, Fut>(
    inputs: Vec<T>,
    concurrency: usize,
    pb: &ProgressBar,
    job: F,
) -> Vec<Result<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let concurrency = concurrency.max(1);
    let total = inputs.len();
    let job = Arc::new(job);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    // Workers send (index, result); the loop below slots them back in order.
    let (tx, mut rx) = mpsc::channel::<(usize, Result<R>)>(concurrency * 2);

    for (idx, input) in inputs.into_iter().enumerate() {
        let job = Arc::clone(&job);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return;
            };
            let result = job(input).await;
            let _ = tx.send((idx, result)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut slots: Vec<Option<Result<R>>> = (0..total).map(|_| None).collect();
    while let Some((idx, result)) = rx.recv().await {
        if let Err(e) = &result {
            warn!("Batch item {} failed: {}", idx, e);
        }
        slots[idx] = Some(result);
        pb.inc(1);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            slot.unwrap_or_else(|| {
                pb.inc(1);
                Err(ExtractError::Task(format!("batch item {idx} exited without a result")))
            })
        })
        .collect()
}
