use crate::dataset::{DatasetEntry, format_filename, write_dataset, write_dataset_readme};
use crate::topics::TopicCatalog;
use chrono::Local;
use harvest_scanner::{
    BatchEvent, BatchOutcome, CancelToken, ContentMode, CrawlError, Crawler, DepthMode,
    HtmlPageParser, LinkFilter, RecordSink, Seed, SeedFailure, Throttle, VisitedPolicy, VisitedSet,
    fetch::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT},
    seed::DEFAULT_BASE_URL,
    select::DEFAULT_PRIORITY_KEYWORDS,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Which outbound links count as content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkScope {
    /// Wikipedia article links only
    #[default]
    Wikipedia,
    /// Anything on the seed's host
    SameHost,
    /// Any http(s) link
    Any,
}

impl LinkScope {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wikipedia" | "wiki" => Some(LinkScope::Wikipedia),
            "same-host" | "host" => Some(LinkScope::SameHost),
            "any" => Some(LinkScope::Any),
            _ => None,
        }
    }

    pub fn filter(&self) -> LinkFilter {
        match self {
            LinkScope::Wikipedia => LinkFilter::wikipedia(),
            LinkScope::SameHost => LinkFilter::permissive().with_same_host_only(true),
            LinkScope::Any => LinkFilter::permissive(),
        }
    }
}

/// Where records go
#[derive(Clone, Default)]
pub enum OutputMode {
    /// Keep every record and return them at the end
    #[default]
    Collect,
    /// Write each record as soon as it is crawled
    Stream(Arc<dyn RecordSink>),
}

/// Options for configuring a crawl operation
#[derive(Clone)]
pub struct CrawlOptions {
    pub seeds: Vec<Seed>,
    pub base_url: Url,
    pub max_depth: usize,
    pub depth_mode: DepthMode,
    pub max_branches: usize,
    pub priority_keywords: Vec<String>,
    pub visited_policy: VisitedPolicy,
    pub link_scope: LinkScope,
    pub throttle: Throttle,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub content_mode: ContentMode,
    pub output: OutputMode,
    pub show_progress_bars: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            max_depth: 2,
            depth_mode: DepthMode::Exact,
            max_branches: 3,
            priority_keywords: Vec::new(),
            visited_policy: VisitedPolicy::PerCall,
            link_scope: LinkScope::Wikipedia,
            throttle: Throttle::Fixed(Duration::from_secs(1)),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            content_mode: ContentMode::Summary,
            output: OutputMode::Collect,
            show_progress_bars: false,
        }
    }
}

/// The keywords the topic scraper has always prioritized
pub fn default_priority_keywords() -> Vec<String> {
    DEFAULT_PRIORITY_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Build an HTTP-backed crawler from options
pub fn build_crawler(options: &CrawlOptions, cancel: CancelToken) -> Result<Crawler, CrawlError> {
    let crawler = Crawler::with_timeout(options.timeout_secs, &options.user_agent)?;
    Ok(configure_crawler(crawler, options, cancel))
}

/// Apply every option except the HTTP client settings.
pub fn configure_crawler(crawler: Crawler, options: &CrawlOptions, cancel: CancelToken) -> Crawler {
    let mut crawler = crawler
        .with_parser(Arc::new(HtmlPageParser::new(options.content_mode)))
        .with_base_url(options.base_url.clone())
        .with_max_depth(options.max_depth)
        .with_depth_mode(options.depth_mode)
        .with_max_branches(options.max_branches)
        .with_priority_keywords(options.priority_keywords.clone())
        .with_visited_policy(options.visited_policy)
        .with_link_filter(options.link_scope.filter())
        .with_throttle(options.throttle)
        .with_cancel_token(cancel);

    if let OutputMode::Stream(ref sink) = options.output {
        crawler = crawler.with_sink(sink.clone());
    }

    crawler
}

/// Drive a spinner from the crawler's per-fetch progress hook.
///
/// Pass the returned bar to [`finish_spinner`] once the run is over.
pub fn attach_spinner(crawler: Crawler) -> (Crawler, ProgressBar) {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message("Starting crawl...");

    let count = Arc::new(AtomicUsize::new(0));
    let spinner = pb.clone();
    let crawler = crawler.with_progress_callback(Arc::new(move |depth: usize, url: String| {
        let n = count.fetch_add(1, Ordering::Relaxed) + 1;
        spinner.set_message(format!("Crawling... {} pages fetched (depth {}) {}", n, depth, url));
        spinner.tick();
    }));
    (crawler, pb)
}

pub fn finish_spinner(pb: &ProgressBar, batch: &BatchOutcome) {
    let totals = batch.totals();
    let status = if batch.cancelled { "Crawl cancelled" } else { "Crawl complete" };
    pb.finish_with_message(format!(
        "{}: {} pages visited, {} skipped",
        status, totals.visited, totals.skipped
    ));
}

/// Execute a crawl with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    cancel: CancelToken,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<BatchOutcome, CrawlError> {
    let crawler = build_crawler(&options, cancel)?;
    if !options.show_progress_bars {
        return Ok(execute_crawl_with(&crawler, &options.seeds, progress_callback).await);
    }

    let (crawler, pb) = attach_spinner(crawler);
    let batch = execute_crawl_with(&crawler, &options.seeds, progress_callback).await;
    finish_spinner(&pb, &batch);
    Ok(batch)
}

/// Run `seeds` through an already-configured crawler, reporting each seed.
///
/// Invalid seeds and sink failures are recorded and the batch moves on.
pub async fn execute_crawl_with(
    crawler: &Crawler,
    seeds: &[Seed],
    progress_callback: Option<CrawlProgressCallback>,
) -> BatchOutcome {
    crawler
        .crawl_batch_with(seeds, |event| {
            let Some(ref callback) = progress_callback else {
                return;
            };
            match event {
                BatchEvent::Started { index, total, seed } if total > 1 => {
                    callback(format!("Crawling seed {}/{}: {}", index + 1, total, seed));
                }
                BatchEvent::Started { .. } => {}
                BatchEvent::Failed { seed, error } => {
                    callback(format!("[!]  Failed to crawl {}: {}", seed, error));
                }
            }
        })
        .await
}

/// Generate the end-of-run summary
pub fn generate_crawl_report(batch: &BatchOutcome) -> String {
    let totals = batch.totals();

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Seeds crawled: {}\n", batch.outcomes.len()));
    report.push_str(&format!("  Seeds failed: {}\n", batch.failures.len()));
    report.push_str(&format!("  Nodes visited: {}\n", totals.visited));
    report.push_str(&format!("  Nodes skipped (errors): {}\n", totals.skipped));
    report.push_str(&format!("  Duplicates avoided: {}\n", totals.duplicates));
    if batch.cancelled {
        report.push_str("  Cancelled: yes (partial results kept)\n");
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for outcome in &batch.outcomes {
        report.push_str(&format!("## {}\n", outcome.seed));
        report.push_str(&format!(
            "  {} visited, {} skipped, {} duplicates\n",
            outcome.stats.visited, outcome.stats.skipped, outcome.stats.duplicates
        ));
        for record in &outcome.records {
            // Indent by depth so the tree shape is visible
            report.push_str(&format!(
                "  {}{} \x1b[90m{}\x1b[0m\n",
                "  ".repeat(record.depth),
                record.title,
                record.url
            ));
        }
        report.push('\n');
    }

    for failure in &batch.failures {
        report.push_str(&format!("\x1b[31m✗\x1b[0m {}: {}\n", failure.seed, failure.error));
    }

    report
}

/// What a topic run produced
#[derive(Debug, Default)]
pub struct TopicRunSummary {
    pub datasets: Vec<DatasetEntry>,
    pub batch: BatchOutcome,
    pub readme_path: Option<PathBuf>,
}

/// Crawl one search seed per catalog topic, write one dataset file per topic,
/// then the dataset README.
///
/// A topic that fails to crawl or to save is recorded in `batch.failures` and
/// the run moves on. Only an unusable `output_dir` or README write is an error.
pub async fn run_topic_catalog(
    catalog: &TopicCatalog,
    crawler: &Crawler,
    output_dir: &Path,
    progress_callback: Option<CrawlProgressCallback>,
) -> std::io::Result<TopicRunSummary> {
    let cancel = crawler.cancel_token();
    let mut summary = TopicRunSummary::default();
    let mut shared = VisitedSet::new();
    std::fs::create_dir_all(output_dir)?;

    for entry in catalog.entries() {
        if cancel.is_cancelled() {
            summary.batch.cancelled = true;
            break;
        }

        if let Some(ref callback) = progress_callback {
            callback(format!(
                "Scraping topic {}/{} in {} > {}: {}",
                entry.index,
                catalog.subcategory_len(entry),
                entry.category,
                entry.subcategory,
                entry.topic
            ));
        }

        let seed = Seed::Search(entry.topic.clone());
        let outcome = match crawler.crawl_under_policy(&seed, &mut shared).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Skipping topic {}: {}", entry.topic, e);
                summary.batch.failures.push(SeedFailure {
                    seed: seed.to_string(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        let file_name =
            format_filename(&entry.category, &entry.subcategory, &entry.topic, entry.index);
        if let Err(e) = write_dataset(output_dir, &file_name, &outcome.records) {
            warn!("Failed to write {}: {}", file_name, e);
            summary.batch.failures.push(SeedFailure {
                seed: seed.to_string(),
                error: format!("Failed to write {}: {}", file_name, e),
            });
            continue;
        }
        info!("Saved {} ({} records)", file_name, outcome.records.len());
        if let Some(ref callback) = progress_callback {
            callback(format!("Saved {}", file_name));
        }

        summary.datasets.push(DatasetEntry {
            category: entry.category.clone(),
            subcategory: entry.subcategory.clone(),
            topic: entry.topic.clone(),
            file_name,
        });
        summary.batch.push(outcome);
    }

    if !summary.datasets.is_empty() {
        let path = write_dataset_readme(
            output_dir,
            &summary.datasets,
            crawler.depth_limit() + 1,
            Local::now().naive_local(),
        )?;
        summary.readme_path = Some(path);
    }

    Ok(summary)
}
