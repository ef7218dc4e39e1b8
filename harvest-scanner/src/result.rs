use serde::{Deserialize, Serialize};

/// One visited page. Written once, at first visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRecord {
    pub identifier: String,
    pub title: String,
    pub url: String,
    #[serde(alias = "summary")]
    pub content: String,
    pub depth: usize,
}

impl CrawlRecord {
    pub fn new(identifier: String, title: String, url: String, content: String, depth: usize) -> Self {
        Self {
            identifier,
            title,
            url,
            content,
            depth,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Nodes fetched and recorded
    pub visited: usize,
    /// Nodes dropped because fetching or parsing failed
    pub skipped: usize,
    /// Candidates popped after they had already been visited
    pub duplicates: usize,
}

impl CrawlStats {
    pub fn absorb(&mut self, other: &CrawlStats) {
        self.visited += other.visited;
        self.skipped += other.skipped;
        self.duplicates += other.duplicates;
    }
}

/// Result of one top-level traversal.
///
/// `records` is empty when the crawler streams into a sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub seed: String,
    pub records: Vec<CrawlRecord>,
    pub stats: CrawlStats,
    pub cancelled: bool,
}

impl CrawlOutcome {
    pub fn new(seed: String) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

/// A seed that could not be crawled at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFailure {
    pub seed: String,
    pub error: String,
}

/// Per-seed outcomes of a multi-seed run, in seed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub outcomes: Vec<CrawlOutcome>,
    pub failures: Vec<SeedFailure>,
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn push(&mut self, outcome: CrawlOutcome) {
        self.cancelled |= outcome.cancelled;
        self.outcomes.push(outcome);
    }

    pub fn totals(&self) -> CrawlStats {
        let mut totals = CrawlStats::default();
        for outcome in &self.outcomes {
            totals.absorb(&outcome.stats);
        }
        totals
    }

    /// All collected records, seed by seed
    pub fn records(&self) -> impl Iterator<Item = &CrawlRecord> {
        self.outcomes.iter().flat_map(|o| o.records.iter())
    }
}
