use crate::cancel::CancelToken;
use crate::error::{CrawlError, Result};
use crate::fetch::{DEFAULT_USER_AGENT, Fetcher, HttpFetcher};
use crate::parse::{HtmlPageParser, PageParser};
use crate::result::{BatchOutcome, CrawlOutcome, CrawlRecord, SeedFailure};
use crate::seed::{DEFAULT_BASE_URL, Seed, canonical_url};
use crate::select::{LinkFilter, select_links};
use crate::sink::RecordSink;
use crate::throttle::Throttle;
use crate::visited::{VisitedPolicy, VisitedSet};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Called before each fetch with `(depth, url)`
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Per-seed notifications from `Crawler::crawl_batch_with`
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// `index` is 0-based
    Started {
        index: usize,
        total: usize,
        seed: &'a Seed,
    },
    Failed {
        seed: &'a Seed,
        error: &'a CrawlError,
    },
}

/// How `max_depth` bounds the traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DepthMode {
    /// Depths `0..=max_depth` are visited; `max_depth = 0` is the seed alone
    #[default]
    Exact,
    /// Depths `0..=max_depth + 1`, matching the legacy topic scraper which
    /// only stopped once `depth > max_depth` had already been entered
    OneExtraLevel,
}

pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn PageParser>,
    base_url: Url,
    max_depth: usize,
    depth_mode: DepthMode,
    max_branches: usize,
    link_filter: LinkFilter,
    priority_keywords: Vec<String>,
    visited_policy: VisitedPolicy,
    throttle: Throttle,
    sink: Option<Arc<dyn RecordSink>>,
    cancel: CancelToken,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    /// HTTP fetcher and HTML parser with default settings
    pub fn new() -> Result<Self> {
        Self::with_timeout(crate::fetch::DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT)
    }

    pub fn with_timeout(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let fetcher = HttpFetcher::with_options(timeout_secs, user_agent)?;
        Ok(Self::with_collaborators(
            Arc::new(fetcher),
            Arc::new(HtmlPageParser::default()),
        ))
    }

    pub fn with_collaborators(fetcher: Arc<dyn Fetcher>, parser: Arc<dyn PageParser>) -> Self {
        Self {
            fetcher,
            parser,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            max_depth: 2,
            depth_mode: DepthMode::Exact,
            max_branches: 3,
            link_filter: LinkFilter::wikipedia(),
            priority_keywords: Vec::new(),
            visited_policy: VisitedPolicy::PerCall,
            throttle: Throttle::None,
            sink: None,
            cancel: CancelToken::new(),
            progress_callback: None,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn PageParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_depth_mode(mut self, mode: DepthMode) -> Self {
        self.depth_mode = mode;
        self
    }

    pub fn with_max_branches(mut self, branches: usize) -> Self {
        self.max_branches = branches;
        self
    }

    pub fn with_link_filter(mut self, filter: LinkFilter) -> Self {
        self.link_filter = filter;
        self
    }

    pub fn with_priority_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_visited_policy(mut self, policy: VisitedPolicy) -> Self {
        self.visited_policy = policy;
        self
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    /// Stream records into `sink` instead of collecting them.
    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Deepest level that will be fetched
    pub fn depth_limit(&self) -> usize {
        match self.depth_mode {
            DepthMode::Exact => self.max_depth,
            DepthMode::OneExtraLevel => self.max_depth + 1,
        }
    }

    /// Crawl one seed with a fresh visited set.
    pub async fn crawl(&self, seed: &Seed) -> Result<CrawlOutcome> {
        let mut visited = VisitedSet::new();
        self.crawl_with_visited(seed, &mut visited).await
    }

    /// Crawl one seed, skipping everything already in `visited`.
    pub async fn crawl_with_visited(
        &self,
        seed: &Seed,
        visited: &mut VisitedSet,
    ) -> Result<CrawlOutcome> {
        let start = seed.resolve(&self.base_url)?;
        info!(
            "Starting crawl of {} (depth limit {}, {} branches)",
            start,
            self.depth_limit(),
            self.max_branches
        );

        let outcome = self.traverse(seed.to_string(), start, visited).await?;

        info!(
            "Crawl of {} complete. Visited {} pages, skipped {}",
            seed, outcome.stats.visited, outcome.stats.skipped
        );
        Ok(outcome)
    }

    /// Crawl `seed` under the configured visited policy. `shared` is only
    /// read and extended under `SharedAcrossSeeds`.
    pub async fn crawl_under_policy(
        &self,
        seed: &Seed,
        shared: &mut VisitedSet,
    ) -> Result<CrawlOutcome> {
        match self.visited_policy {
            VisitedPolicy::PerCall => self.crawl(seed).await,
            VisitedPolicy::SharedAcrossSeeds => self.crawl_with_visited(seed, shared).await,
        }
    }

    /// Crawl every seed in order. A failing seed never stops the batch.
    pub async fn crawl_batch(&self, seeds: &[Seed]) -> BatchOutcome {
        self.crawl_batch_with(seeds, |_| {}).await
    }

    /// `crawl_batch`, reporting each seed to `on_event` as it starts and fails.
    pub async fn crawl_batch_with<F>(&self, seeds: &[Seed], on_event: F) -> BatchOutcome
    where
        F: Fn(BatchEvent<'_>),
    {
        let mut batch = BatchOutcome::default();
        let mut shared = VisitedSet::new();

        for (index, seed) in seeds.iter().enumerate() {
            if self.cancel.is_cancelled() {
                batch.cancelled = true;
                break;
            }

            on_event(BatchEvent::Started {
                index,
                total: seeds.len(),
                seed,
            });

            match self.crawl_under_policy(seed, &mut shared).await {
                Ok(outcome) => batch.push(outcome),
                Err(e) => {
                    warn!("Failed to crawl {}: {}", seed, e);
                    on_event(BatchEvent::Failed { seed, error: &e });
                    batch.failures.push(SeedFailure {
                        seed: seed.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        batch
    }

    /// Depth-first pre-order walk over an explicit stack of `(url, depth)`.
    async fn traverse(
        &self,
        seed_label: String,
        start: Url,
        visited: &mut VisitedSet,
    ) -> Result<CrawlOutcome> {
        let mut outcome = CrawlOutcome::new(seed_label);
        let mut failed: HashSet<String> = HashSet::new();
        let limit = self.depth_limit();
        let mut stack: Vec<(Url, usize)> = vec![(start, 0)];
        let mut fetched_any = false;

        while let Some((url, depth)) = stack.pop() {
            if self.cancel.is_cancelled() {
                info!("Crawl cancelled with {} pages pending", stack.len() + 1);
                outcome.cancelled = true;
                break;
            }

            if depth > limit {
                continue;
            }

            let identifier = url.to_string();
            if visited.contains(&identifier) {
                debug!("Already visited {}", identifier);
                outcome.stats.duplicates += 1;
                continue;
            }
            if failed.contains(&identifier) {
                debug!("Already failed {}", identifier);
                continue;
            }

            if fetched_any {
                self.throttle.pause().await;
            }
            fetched_any = true;

            if let Some(ref callback) = self.progress_callback {
                callback(depth, identifier.clone());
            }

            let page = match self.fetcher.fetch(&identifier).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", identifier, e);
                    failed.insert(identifier);
                    outcome.stats.skipped += 1;
                    continue;
                }
            };

            let parsed = match self.parser.parse(&page.body, page.content_type.as_deref()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Failed to parse {}: {}", identifier, e);
                    failed.insert(identifier);
                    outcome.stats.skipped += 1;
                    continue;
                }
            };

            visited.check_and_mark(&identifier);

            // A search or redirect can land on a page that is already known
            let mut current = vec![url.clone()];
            if let Ok(final_url) = Url::parse(&page.final_url).map(canonical_url)
                && final_url != url
            {
                if !visited.check_and_mark(final_url.as_str()) {
                    debug!("{} redirected to visited page {}", identifier, final_url);
                    outcome.stats.duplicates += 1;
                    continue;
                }
                current.push(final_url);
            }

            let title = parsed
                .title
                .unwrap_or_else(|| title_from_url(current.last().unwrap_or(&url)));
            let record = CrawlRecord::new(
                identifier.clone(),
                title,
                identifier,
                parsed.content,
                depth,
            );
            outcome.stats.visited += 1;
            self.emit(record, &mut outcome)?;

            if depth == limit {
                continue;
            }

            let selected = select_links(
                &parsed.links,
                &current,
                &self.link_filter,
                &self.priority_keywords,
                self.max_branches,
            );
            debug!("Following {} links from {}", selected.len(), url);

            // Reversed so the first selected link is popped first
            for candidate in selected.into_iter().rev() {
                if let Ok(next) = Url::parse(&candidate.identifier) {
                    stack.push((next, depth + 1));
                }
            }
        }

        Ok(outcome)
    }

    fn emit(&self, record: CrawlRecord, outcome: &mut CrawlOutcome) -> Result<()> {
        match self.sink {
            Some(ref sink) => sink.write(&record),
            None => {
                outcome.records.push(record);
                Ok(())
            }
        }
    }
}

/// Last path segment with underscores as spaces, e.g. `/wiki/AI_ethics` -> `AI ethics`
fn title_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace('_', " "))
        .unwrap_or_else(|| url.to_string())
}
